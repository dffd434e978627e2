use color_eyre::eyre::Result;

use mips_sim::machine::StdMachine;
use mips_sim::memory::parse::Program;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let program = Program::from_file("demos/programs/store.hex")?;
    let mut machine = StdMachine::default();
    machine.load(&program)?;
    print!("{}", machine.memory.dump(machine.pc(), program.words.len() * 4 + 4)?);

    machine.run()?;
    println!("t0 = 0x{:08x}", machine.register(8));

    Ok(())
}
