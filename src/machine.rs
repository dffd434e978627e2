use crate::config::Config;
use crate::instruction::{Instruction, Operation};
use crate::memory::parse::Program;
use crate::memory::{self, Memory, Word, MEMORY_SIZE};
use crate::processor::{Processor, RunReport, Step};
use crate::registers::Registers;
use color_eyre::eyre::Result;

/// Machine with the default 1 MiB memory
pub type StdMachine = Machine<MEMORY_SIZE>;

/// The complete architectural state: registers, program counter and memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine<const S: usize> {
    pub processor: Processor,
    pub memory: Memory<S>,
}

impl<const S: usize> Default for Machine<S> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<const S: usize> Machine<S> {
    /// Boots a machine with diagnostic register and memory contents
    pub fn new(config: Config) -> Self {
        Self {
            processor: Processor::new(&config),
            memory: Memory::with_diagnostics(),
        }
    }

    /// Places `program` at the entrypoint
    pub fn load(&mut self, program: &Program) -> memory::Result<usize> {
        program.load_into(&mut self.memory, self.processor.entrypoint)
    }

    /// Fetches and executes the instruction at the program counter
    pub fn step(&mut self) -> Result<Step> {
        self.processor.execute(&mut self.memory)
    }

    /// Runs the loaded program from the entrypoint until it stops
    pub fn run(&mut self) -> Result<RunReport> {
        self.processor.run(&mut self.memory)
    }

    /// Executes `word` on the current state without fetching it
    pub fn execute_word(&mut self, word: Word) -> memory::Result<Step> {
        self.processor
            .execute_instruction(Instruction(word), &mut self.memory)
    }

    /// Decodes the instruction the program counter points at
    pub fn next_operation(&self) -> memory::Result<(Word, Option<Operation>)> {
        let word = self.memory.read_word(self.processor.pc)?;
        Ok((word, Instruction(word).decode()))
    }

    pub fn pc(&self) -> Word {
        self.processor.pc
    }

    pub fn registers(&self) -> &Registers {
        &self.processor.registers
    }

    pub fn register(&self, index: u8) -> Word {
        self.processor.registers.get(index)
    }

    pub fn register_by_name(&self, name: &str) -> Option<Word> {
        self.processor.registers.get_by_name(name)
    }

    /// Borrows `len` bytes of memory starting at `address`
    pub fn read_memory(&self, address: Word, len: usize) -> memory::Result<&[u8]> {
        self.memory.read_array(address, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::HALT;
    use crate::memory::AccessError;
    use color_eyre::eyre::Result;

    #[test]
    fn test_boot_state() -> Result<()> {
        let machine = StdMachine::default();

        assert_eq!(machine.pc(), 0x1000);
        assert_eq!(machine.register_by_name("sp"), Some(0x8000));
        assert_eq!(machine.read_memory(0x20, 7)?, b"awesome");

        Ok(())
    }

    #[test]
    fn test_store_scenario() -> Result<()> {
        let mut machine = StdMachine::default();
        let program: Program = "0x20090020\n0xac090000\n".parse()?;
        machine.load(&program)?;

        let report = machine.run()?;

        assert_eq!(report.executed, 2);
        assert_eq!(report.stop, Step::Halted);
        assert_eq!(machine.register_by_name("t1"), Some(32));
        assert_eq!(machine.memory.read_word(0)?, 0x0000_0020);

        Ok(())
    }

    #[test]
    fn test_step() -> Result<()> {
        let mut machine = StdMachine::default();
        machine.load(&Program {
            words: vec![0x2009_0020],
        })?;

        assert_eq!(machine.next_operation()?.0, 0x2009_0020);
        assert_eq!(machine.step()?, Step::Continue);
        assert_eq!(machine.pc(), 0x1004);
        assert_eq!(machine.next_operation()?, (HALT, Some(Operation::Halt)));
        assert_eq!(machine.step()?, Step::Halted);
        assert_eq!(machine.pc(), 0x1008);

        Ok(())
    }

    #[test]
    fn test_execute_word() -> Result<()> {
        let mut machine = StdMachine::default();

        // addi t1, zr, 32 does not touch the program counter
        assert_eq!(machine.execute_word(0x2009_0020)?, Step::Continue);
        assert_eq!(machine.register(9), 32);
        assert_eq!(machine.pc(), 0x1000);

        assert_eq!(
            machine.execute_word(0xdead_beef)?,
            Step::IllegalInstruction(0xdead_beef)
        );

        Ok(())
    }

    #[test]
    fn test_independent_machines() -> Result<()> {
        let mut first = Machine::<0x2000>::default();
        let second = Machine::<0x2000>::default();

        first.execute_word(0x2009_0020)?;

        assert_ne!(first, second);
        assert_eq!(second.register(9), 0);
        assert_eq!(
            first.read_memory(0x1FFE, 4),
            Err(AccessError::OutOfBounds {
                address: 0x1FFE,
                len: 4
            })
        );

        Ok(())
    }
}
