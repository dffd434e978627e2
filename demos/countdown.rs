use color_eyre::eyre::Result;

use mips_sim::instruction::{Instruction, Opcode};
use mips_sim::machine::StdMachine;
use mips_sim::memory::parse::Program;
use log::LevelFilter;
use simple_logger::SimpleLogger;

const T0: u8 = 8;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let program = Program {
        words: vec![
            // t0 = 10
            Instruction::i_type(Opcode::Addi, 0, T0, 10).0,
            // loop: t0 -= 1
            Instruction::i_type(Opcode::Addi, T0, T0, 0xFFFF).0,
            // bne t0, zr, loop
            Instruction::i_type(Opcode::Bne, T0, 0, 0xFFFE).0,
        ],
    };

    let mut machine = StdMachine::default();
    machine.load(&program)?;
    let report = machine.run()?;

    println!(
        "Counted down in {} instruction(s), t0 = {}",
        report.executed,
        machine.register(T0)
    );

    Ok(())
}
