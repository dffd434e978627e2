use std::fmt;

use crate::config::Config;
use crate::instruction::{Funct, Instruction, Opcode, Operation};
use crate::memory::{self, Memory, Word};
use crate::registers::{Registers, REG_RA};
use color_eyre::eyre::{Result, WrapErr};
use log::*;

/// Outcome of executing a single instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// The instruction was executed, fetch the next one
    Continue,
    /// The `halt` sentinel was reached
    Halted,
    /// The word encodes no known instruction. Nothing was modified
    IllegalInstruction(Word),
}

impl Step {
    pub fn is_continue(self) -> bool {
        self == Step::Continue
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Continue => f.write_str("continue"),
            Step::Halted => f.write_str("halted"),
            Step::IllegalInstruction(word) => write!(f, "illegal instruction 0x{:08x}", word),
        }
    }
}

/// Summary of a program run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunReport {
    /// Number of instructions which were executed (the final one excluded)
    pub executed: u64,
    /// Why the run stopped, never [`Step::Continue`]
    pub stop: Step,
}

/// Emulates a MIPS CPU without delay slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Processor {
    /// General purpose registers
    pub registers: Registers,
    /// Program counter
    pub pc: Word,
    /// Where `run` starts
    pub entrypoint: Word,
}

impl Default for Processor {
    /// Initializes a new CPU with the default config
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Processor {
    /// Initializes a new CPU, the program counter points at the entrypoint
    pub fn new(config: &Config) -> Self {
        Self {
            registers: Registers::new(config),
            pc: config.entrypoint,
            entrypoint: config.entrypoint,
        }
    }

    /// Executes a single instruction. The program counter is expected to
    /// already point past the instruction, so branch and jump targets are
    /// relative to it.
    ///
    /// # Errors
    ///
    /// Loads and stores outside of `memory` fail without modifying any state.
    pub fn execute_instruction<const S: usize>(
        &mut self,
        instruction: Instruction,
        memory: &mut Memory<S>,
    ) -> memory::Result<Step> {
        let operation = match instruction.decode() {
            Some(operation) => operation,
            None => {
                warn!("Illegal instruction 0x{:08x}", instruction.0);
                return Ok(Step::IllegalInstruction(instruction.0));
            }
        };

        debug!("{}", operation);

        match operation {
            Operation::Halt => Ok(Step::Halted),
            Operation::Register {
                funct,
                rs,
                rt,
                rd,
                shamt,
            } => {
                self.execute_register(funct, rs, rt, rd, shamt);
                Ok(Step::Continue)
            }
            Operation::Immediate {
                opcode,
                rs,
                rt,
                immediate,
            } => self.execute_immediate(instruction, opcode, rs, rt, immediate, memory),
            Operation::Jump { opcode, target } => Ok(self.execute_jump(instruction, opcode, target)),
        }
    }

    fn execute_register(&mut self, funct: Funct, rs: u8, rt: u8, rd: u8, shamt: u8) {
        let s = self.registers.get(rs);
        let t = self.registers.get(rt);
        let shamt = u32::from(shamt);

        let result = match funct {
            Funct::Add => s.wrapping_add(t),
            Funct::Sub => s.wrapping_sub(t),
            Funct::And => s & t,
            Funct::Or => s | t,
            Funct::Nor => !(s | t),
            Funct::Sll => t << shamt,
            Funct::Srl => t >> shamt,
            Funct::Sra => shift_right_arithmetic(t, shamt),
            Funct::Slt => Word::from((s as i32) < (t as i32)),
            Funct::Jr => {
                trace!("jump to 0x{:08x}", s);
                self.pc = s;
                return;
            }
        };

        trace!("{} = 0x{:08x}", rd, result);
        self.registers.set(rd, result);
    }

    fn execute_immediate<const S: usize>(
        &mut self,
        instruction: Instruction,
        opcode: Opcode,
        rs: u8,
        rt: u8,
        immediate: u16,
        memory: &mut Memory<S>,
    ) -> memory::Result<Step> {
        let s = self.registers.get(rs);
        let signed = sign_extend(immediate);
        let unsigned = Word::from(immediate);

        match opcode {
            Opcode::Addi => self.registers.set(rt, s.wrapping_add(signed)),
            Opcode::Andi => self.registers.set(rt, s & unsigned),
            Opcode::Ori => self.registers.set(rt, s | unsigned),
            Opcode::Slti => self
                .registers
                .set(rt, Word::from((s as i32) < (signed as i32))),
            Opcode::Lw => {
                let address = s.wrapping_add(unsigned);
                let value = memory.read_word(address)?;
                trace!("load 0x{:08x} from 0x{:08x}", value, address);
                self.registers.set(rt, value);
            }
            Opcode::Sw => {
                let address = s.wrapping_add(unsigned);
                let value = self.registers.get(rt);
                trace!("store 0x{:08x} to 0x{:08x}", value, address);
                memory.write_word(address, value)?;
            }
            Opcode::Beq | Opcode::Bne => {
                let equal = s == self.registers.get(rt);
                if equal == (opcode == Opcode::Beq) {
                    self.pc = self.pc.wrapping_add(signed << 2);
                    trace!("branch taken to 0x{:08x}", self.pc);
                }
            }
            Opcode::Special | Opcode::J | Opcode::Jal => {
                return Ok(Step::IllegalInstruction(instruction.0));
            }
        }

        Ok(Step::Continue)
    }

    fn execute_jump(&mut self, instruction: Instruction, opcode: Opcode, target: Word) -> Step {
        let address = (self.pc & 0xF000_0000) | (target << 2);

        match opcode {
            Opcode::J => {}
            Opcode::Jal => self.registers.set(REG_RA, self.pc),
            _ => return Step::IllegalInstruction(instruction.0),
        }

        trace!("jump to 0x{:08x}", address);
        self.pc = address;
        Step::Continue
    }

    /// Runs one execution step: fetches the word at the program counter,
    /// advances the program counter by 4 and executes the word
    pub fn execute<const S: usize>(&mut self, memory: &mut Memory<S>) -> Result<Step> {
        let address = self.pc;
        let word = memory
            .read_word(address)
            .wrap_err_with(|| format!("Failed to fetch instruction at 0x{:08x}", address))?;
        self.pc = self.pc.wrapping_add(4);

        self.execute_instruction(Instruction(word), memory)
            .wrap_err_with(|| format!("Failed to execute 0x{:08x} at 0x{:08x}", word, address))
    }

    /// Run program from the program counter until a termination condition is met
    pub fn execute_until_halt<const S: usize>(
        &mut self,
        memory: &mut Memory<S>,
    ) -> Result<RunReport> {
        let mut executed = 0;

        loop {
            match self.execute(memory)? {
                Step::Continue => executed += 1,
                stop => {
                    info!(
                        "Program terminated after {} instruction(s): {}",
                        executed, stop
                    );
                    return Ok(RunReport { executed, stop });
                }
            }
        }
    }

    /// Restarts at the entrypoint and runs until a termination condition is
    /// met. Registers and memory are left as they are.
    pub fn run<const S: usize>(&mut self, memory: &mut Memory<S>) -> Result<RunReport> {
        self.pc = self.entrypoint;
        self.execute_until_halt(memory)
    }
}

/// Replicates bit 15 into the upper half
fn sign_extend(immediate: u16) -> Word {
    immediate as i16 as i32 as Word
}

/// Shifts right one bit at a time, each time filling in the original sign bit
fn shift_right_arithmetic(value: Word, shamt: u32) -> Word {
    let sign = value & 0x8000_0000;
    (0..shamt).fold(value, |acc, _| (acc >> 1) | sign)
}
