use crate::memory::Word;

/// Initial value of the program counter; programs are loaded here
pub const INITIAL_PC: Word = 0x1000;
/// Initial location of the stack pointer
pub const INITIAL_SP: Word = 0x8000;

/// The config for [`Processor`](crate::processor::Processor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Where programs are loaded and where `run` starts
    pub entrypoint: Word,
    /// Boot value of `sp`
    pub stack_pointer: Word,
    /// Drop writes to `zr` like real hardware does
    pub hardwire_zero: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entrypoint: INITIAL_PC,
            stack_pointer: INITIAL_SP,
            hardwire_zero: false,
        }
    }
}
