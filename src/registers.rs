use crate::config::Config;
use crate::memory::Word;

/// Canonical register names. Note that `$zero` is shortened to `zr`
pub const REGISTER_NAMES: [&str; 32] = [
    "zr", "at", "v0", "v1", "a0", "a1", "a2", "a3", //
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", //
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", //
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra", //
];

pub const REG_ZR: u8 = 0;
/// The stack pointer register
pub const REG_SP: u8 = 29;
/// The return address register, written by `jal`
pub const REG_RA: u8 = 31;

/// Holds the processor's general purpose registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registers {
    values: [Word; 32],
    hardwire_zero: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Registers {
    /// Boots the register file. The saved registers carry diagnostic values
    /// so that programs have something to work with.
    pub fn new(config: &Config) -> Self {
        let mut values = [0; 32];
        values[16..24].copy_from_slice(&[
            0x10,
            config.entrypoint,
            0x20,
            3,
            0xbadacafe,
            0xcdcdcdcd,
            0xffffffff,
            7,
        ]);
        values[REG_SP as usize] = config.stack_pointer;

        Registers {
            values,
            hardwire_zero: config.hardwire_zero,
        }
    }

    /// A register file with every register cleared
    pub fn zeroed(hardwire_zero: bool) -> Self {
        Registers {
            values: [0; 32],
            hardwire_zero,
        }
    }

    /// Get the value of a register
    pub fn get(&self, register: u8) -> Word {
        self.values[register as usize]
    }

    /// Set the value of a register
    pub fn set(&mut self, register: u8, value: Word) {
        if self.hardwire_zero && register == REG_ZR {
            return;
        }

        self.values[register as usize] = value;
    }

    /// Resolves a canonical register name to its index
    pub fn index_of(name: &str) -> Option<u8> {
        REGISTER_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| index as u8)
    }

    pub fn get_by_name(&self, name: &str) -> Option<Word> {
        Self::index_of(name).map(|index| self.get(index))
    }

    /// Iterates over `(index, name, value)` of every register
    pub fn iter(&self) -> impl Iterator<Item = (u8, &'static str, Word)> + '_ {
        REGISTER_NAMES
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .map(|(index, (name, value))| (index as u8, *name, *value))
    }
}
