use std::io::Write;

use color_eyre::eyre::Result;
use tempfile::NamedTempFile;

use mips_sim::instruction::{Funct, Instruction, Opcode};
use mips_sim::machine::StdMachine;
use mips_sim::memory::parse::{LoadError, Program};
use mips_sim::processor::Step;
use mips_sim::registers::REG_RA;

fn program_file(contents: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn store_program_from_file() -> Result<()> {
    let file = program_file(
        "0x20090020 // addi t1, zr, 32\n\
         0xac090000 // sw t1, 0(zr)\n",
    )?;

    let mut machine = StdMachine::default();
    machine.load(&Program::from_file(file.path())?)?;
    let report = machine.run()?;

    assert_eq!(report.executed, 2);
    assert_eq!(report.stop, Step::Halted);
    assert_eq!(machine.register_by_name("t1"), Some(32));
    assert_eq!(machine.memory.read_word(0)?, 0x0000_0020);
    assert_eq!(machine.pc(), 0x100C);

    Ok(())
}

#[test]
fn malformed_file_is_not_loaded() -> Result<()> {
    let file = program_file("0x20090020\nnot a word\n")?;

    match Program::from_file(file.path()) {
        Err(LoadError::Parse(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("unexpected {:?}", other),
    }

    Ok(())
}

#[test]
fn countdown_loop() -> Result<()> {
    const T0: u8 = 8;
    let program = Program {
        words: vec![
            Instruction::i_type(Opcode::Addi, 0, T0, 10).0,
            Instruction::i_type(Opcode::Addi, T0, T0, 0xFFFF).0,
            Instruction::i_type(Opcode::Bne, T0, 0, 0xFFFE).0,
        ],
    };

    let mut machine = StdMachine::default();
    machine.load(&program)?;
    let report = machine.run()?;

    assert_eq!(report.executed, 21);
    assert_eq!(machine.register(T0), 0);

    Ok(())
}

#[test]
fn call_and_return() -> Result<()> {
    const V0: u8 = 2;
    // 0x1000: jal 0x1010
    // 0x1004: sw v0, 0x40(zr)
    // 0x1008: halt
    // 0x1010: addi v0, zr, 7
    // 0x1014: jr ra
    let mut machine = StdMachine::default();
    machine.memory.write_words(
        0x1000,
        &[
            Instruction::j_type(Opcode::Jal, 0x1010 >> 2).0,
            Instruction::i_type(Opcode::Sw, 0, V0, 0x40).0,
            0xFFFF_FFFF,
            0,
            Instruction::i_type(Opcode::Addi, 0, V0, 7).0,
            Instruction::r_type(Funct::Jr, REG_RA, 0, 0, 0).0,
        ],
    )?;

    let report = machine.run()?;

    assert_eq!(report.executed, 4);
    assert_eq!(machine.register(REG_RA), 0x1004);
    assert_eq!(machine.memory.read_word(0x40)?, 7);

    Ok(())
}

#[test]
fn fetch_outside_memory_fails() -> Result<()> {
    let mut machine = StdMachine::default();
    // jr s6, where s6 boots as 0xffffffff
    machine
        .memory
        .write_word(0x1000, Instruction::r_type(Funct::Jr, 22, 0, 0, 0).0)?;

    let err = machine.run().unwrap_err();
    assert!(format!("{:#}", err).contains("0xffffffff"));

    Ok(())
}
