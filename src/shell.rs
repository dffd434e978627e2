use std::io::Write;
use std::path::PathBuf;

use crate::machine::Machine;
use crate::memory::parse::{parse_word, Program};
use crate::memory::Word;
use crate::processor::Step;
use crate::registers::REGISTER_NAMES;
use color_eyre::eyre::{Result, WrapErr};
use log::*;

/// What `show` prints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowTarget {
    All,
    Pc,
    Register(u8),
}

/// A single operator command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(PathBuf),
    Run,
    Step,
    Show(ShowTarget),
    Dump { address: Word, length: usize },
    /// Execute a raw instruction word on the current state
    Execute(Word),
    Exit,
}

impl Command {
    /// Parses one command line. Returns `Ok(None)` for blank and comment
    /// lines and `Err` with an operator facing message otherwise.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if let Some(comment) = tokens.iter().position(|t| *t == "//" || *t == "#") {
            tokens.truncate(comment);
        }

        let keyword = match tokens.first() {
            Some(keyword) => keyword.to_ascii_lowercase(),
            None => return Ok(None),
        };

        let command = match (keyword.as_str(), &tokens[1..]) {
            ("load", [path]) => Command::Load(PathBuf::from(path)),
            ("load", _) => return Err("Usage: load [program filename]".into()),
            ("run", []) => Command::Run,
            ("run", _) => return Err("Usage: run".into()),
            ("step", []) => Command::Step,
            ("step", _) => return Err("Usage: step".into()),
            ("show", []) => Command::Show(ShowTarget::All),
            ("show", [name]) => Command::Show(parse_show_target(name)?),
            ("show", _) => return Err("Usage: show { [register name] }".into()),
            ("dump", [address, length]) => Command::Dump {
                address: parse_argument(address)?,
                length: parse_argument(length)? as usize,
            },
            ("dump", _) => return Err("Usage: dump [start address] [length]".into()),
            ("exit", []) | ("quit", []) => Command::Exit,
            (literal, []) => Command::Execute(
                parse_word(literal).map_err(|_| format!("Unknown command `{}`", literal))?,
            ),
            (keyword, _) => return Err(format!("Unknown command `{}`", keyword)),
        };

        Ok(Some(command))
    }
}

fn parse_show_target(name: &str) -> Result<ShowTarget, String> {
    match name.to_ascii_lowercase().as_str() {
        "all" => Ok(ShowTarget::All),
        "pc" => Ok(ShowTarget::Pc),
        name => REGISTER_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| ShowTarget::Register(index as u8))
            .ok_or_else(|| format!("Unknown register `{}`", name)),
    }
}

fn parse_argument(literal: &str) -> Result<Word, String> {
    parse_word(&literal.to_ascii_lowercase())
        .map_err(|radix| format!("`{}` is not a number (radix {})", literal, radix))
}

/// Drives a machine from operator commands
#[derive(Debug)]
pub struct Shell<const S: usize> {
    pub machine: Machine<S>,
}

impl<const S: usize> Shell<S> {
    pub fn new(machine: Machine<S>) -> Self {
        Self { machine }
    }

    /// Run a command line, writing its output to `out`. Returns true if
    /// more commands should be read, else false.
    ///
    /// # Errors
    ///
    /// Only failures to write to `out` are returned; command failures are
    /// reported to `out` and logged.
    pub fn run_command<W: Write>(&mut self, line: &str, out: &mut W) -> Result<bool> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                writeln!(out, "{}", message)?;
                return Ok(true);
            }
        };

        debug!("Running {:?}", command);

        if let Command::Exit = command {
            return Ok(false);
        }

        if let Err(err) = self.execute(command, out) {
            error!("{:?}", err);
            writeln!(out, "Error: {:#}", err)?;
        }

        Ok(true)
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Load(path) => {
                let program = Program::from_file(&path)?;
                self.machine.load(&program).wrap_err_with(|| {
                    format!("Program `{}` does not fit into memory", path.display())
                })?;
            }
            Command::Run => {
                let report = self.machine.run()?;
                if let Step::IllegalInstruction(word) = report.stop {
                    writeln!(
                        out,
                        "Stopped at unknown instruction 0x{:08x} after {} instruction(s)",
                        word, report.executed
                    )?;
                }
            }
            Command::Step => {
                let pc = self.machine.pc();
                let (word, operation) = self.machine.next_operation()?;
                match operation {
                    Some(operation) => writeln!(out, "0x{:08x}:  {}", pc, operation)?,
                    None => writeln!(out, "0x{:08x}:  0x{:08x} ??", pc, word)?,
                }
                self.machine.step()?;
            }
            Command::Show(target) => self.show(&target, out)?,
            Command::Dump { address, length } => {
                let dump = self.machine.memory.dump(address, length)?;
                out.write_all(dump.as_bytes())?;
            }
            Command::Execute(word) => {
                self.machine.execute_word(word)?;
            }
            Command::Exit => {}
        }

        Ok(())
    }

    fn show<W: Write>(&self, target: &ShowTarget, out: &mut W) -> Result<()> {
        let (registers, include_pc) = match target {
            ShowTarget::All => (0..32, true),
            ShowTarget::Pc => (0..0, true),
            ShowTarget::Register(index) => (*index..*index + 1, false),
        };

        for index in registers {
            let value = self.machine.register(index);
            writeln!(
                out,
                "[{:02}:{:>2}] 0x{:08x}    {}",
                index, REGISTER_NAMES[index as usize], value, value
            )?;
        }
        if include_pc {
            writeln!(out, "[  pc ] 0x{:08x}", self.machine.pc())?;
        }

        Ok(())
    }
}
