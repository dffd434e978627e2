use color_eyre::eyre::Result;

use mips_sim::machine::StdMachine;
use mips_sim::memory::Word;
use mips_sim::write_instructions;
use simple_logger::SimpleLogger;

/// The main entrypoint. First instruction should be placed here.
const ENTRYPOINT: Word = 0x1000;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let mut machine = StdMachine::default();
    let mem = &mut machine.memory;

    write_instructions!(mem : ENTRYPOINT =>
        0x20090020, // addi t1, zr, 32
        0xac090000, // sw t1, 0(zr)
        0xffffffff  // halt
    )?;

    let report = machine.run()?;
    println!(
        "Executed {} instruction(s). t1 = {:?}, memory[0] = 0x{:08x}",
        report.executed,
        machine.register_by_name("t1"),
        machine.memory.read_word(0)?
    );

    Ok(())
}
