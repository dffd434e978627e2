use std::io::Write;

use color_eyre::eyre::Result;
use tempfile::NamedTempFile;

use mips_sim::machine::StdMachine;
use mips_sim::shell::Shell;

#[test]
fn load_run_and_inspect() -> Result<()> {
    let mut program = NamedTempFile::new()?;
    writeln!(program, "0x20090020 // addi t1, zr, 32")?;
    writeln!(program, "0xac090000 // sw t1, 0(zr)")?;

    let mut shell = Shell::new(StdMachine::default());
    let mut out = Vec::new();
    let script = format!(
        "load {}\nrun\nshow t1\nshow pc\ndump 0 8\n",
        program.path().display()
    );
    for line in script.lines() {
        assert!(shell.run_command(line, &mut out)?);
    }

    assert_eq!(
        String::from_utf8(out)?,
        "[09:t1] 0x00000020    32\n\
         [  pc ] 0x0000100c\n\
         0x00000000:  00 00 00 20    . . .  \n\
         0x00000004:  44 55 66 77    D U f w\n"
    );

    Ok(())
}

#[test]
fn raw_instruction_words() -> Result<()> {
    let mut shell = Shell::new(StdMachine::default());
    let mut out = Vec::new();

    // addi t0, s3, -1 with s3 booting as 3
    shell.run_command("0x2268ffff", &mut out)?;
    // andi t1, s6, 0xffff with s6 booting as 0xffffffff
    shell.run_command("0x32c9ffff # comment", &mut out)?;

    assert!(out.is_empty());
    assert_eq!(shell.machine.register_by_name("t0"), Some(2));
    assert_eq!(shell.machine.register_by_name("t1"), Some(0xffff));
    assert_eq!(shell.machine.pc(), 0x1000);

    Ok(())
}

#[test]
fn unknown_commands_keep_the_shell_alive() -> Result<()> {
    let mut shell = Shell::new(StdMachine::default());
    let mut out = Vec::new();

    assert!(shell.run_command("frobnicate", &mut out)?);
    assert!(shell.run_command("dump 0x10", &mut out)?);
    assert_eq!(
        String::from_utf8(out)?,
        "Unknown command `frobnicate`\nUsage: dump [start address] [length]\n"
    );

    Ok(())
}

#[test]
fn run_reports_unknown_instruction() -> Result<()> {
    let mut shell = Shell::new(StdMachine::default());
    let mut out = Vec::new();
    shell.machine.memory.write_word(0x1000, 0x3c01_1000)?;

    shell.run_command("run", &mut out)?;

    assert_eq!(
        String::from_utf8(out)?,
        "Stopped at unknown instruction 0x3c011000 after 0 instruction(s)\n"
    );

    Ok(())
}
