use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use mips_sim::config::{Config, INITIAL_PC, INITIAL_SP};
use mips_sim::machine::StdMachine;
use mips_sim::memory::parse::parse_word;
use mips_sim::memory::Word;
use mips_sim::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "mips-sim", version, about = "Interactive MIPS instruction stepper")]
struct Cli {
    /// Command script to execute instead of reading commands from stdin
    script: Option<PathBuf>,

    /// Where programs are loaded and `run` starts
    #[arg(long, value_parser = parse_address, default_value_t = INITIAL_PC)]
    entrypoint: Word,

    /// Boot value of the stack pointer
    #[arg(long, value_parser = parse_address, default_value_t = INITIAL_SP)]
    stack_pointer: Word,

    /// Ignore writes to the zero register
    #[arg(long)]
    hardwire_zero: bool,

    /// One of off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_address(literal: &str) -> Result<Word, String> {
    parse_word(literal).map_err(|radix| format!("not a 32-bit number (radix {})", radix))
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let cli = Cli::parse();

    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|_| eyre!("Unknown log level `{}`", cli.log_level))?;
    SimpleLogger::new()
        .with_level(level)
        .init()
        .map_err(|err| eyre!("Failed to install logger: {}", err))?; // logging

    let config = Config {
        entrypoint: cli.entrypoint,
        stack_pointer: cli.stack_pointer,
        hardwire_zero: cli.hardwire_zero,
    };
    let mut shell = Shell::new(StdMachine::new(config));
    let stderr = io::stderr();
    let mut out = stderr.lock();

    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .wrap_err_with(|| format!("No input file {}", path.display()))?;
            for line in BufReader::new(file).lines() {
                if !shell.run_command(&line?, &mut out)? {
                    break;
                }
            }
        }
        None => {
            let stdin = io::stdin();
            print_banner();
            prompt()?;
            for line in stdin.lock().lines() {
                if !shell.run_command(&line?, &mut out)? {
                    break;
                }
                prompt()?;
            }
        }
    }

    Ok(())
}

fn print_banner() {
    println!("*********************************************************");
    println!("*              >> MIPS Simulator v{:<8} <<            *", env!("CARGO_PKG_VERSION"));
    println!("*                                                       *");
    println!("*   load <file>  run  step  show [reg|all|pc]           *");
    println!("*   dump <addr> <len>  <instruction word>  exit         *");
    println!("*********************************************************");
    println!();
}

fn prompt() -> Result<()> {
    print!(">> ");
    io::stdout().flush()?;
    Ok(())
}
