use std::convert::TryFrom;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::memory::Word;
use crate::registers::REGISTER_NAMES;

/// The pseudo instruction `halt`. Not part of the instruction set, it marks
/// the end of a loaded program.
pub const HALT: Word = 0xFFFF_FFFF;

macro_rules! codes {
    (
        $( #[doc = $enum_doc:expr] )+
        $enum:ident {
            $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal => $mnemonic:literal , )+
        }
    ) => {
        $( #[doc = $enum_doc] )+
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum $enum {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl $enum {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn mnemonic(&self) -> &'static str {
                match self {
                    $( Self::$name => $mnemonic , )+
                }
            }
        }

        impl fmt::Display for $enum {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    }
}

codes! {
    /// Operation codes (bits 31..26)
    Opcode {
        /// Register format, the operation is selected by [`Funct`]
        Special = 0x00 => "special",
        /// Jump
        J = 0x02 => "j",
        /// Jump and link
        Jal = 0x03 => "jal",
        /// Branch on equal
        Beq = 0x04 => "beq",
        /// Branch on not equal
        Bne = 0x05 => "bne",
        /// Add immediate (sign extended)
        Addi = 0x08 => "addi",
        /// Set on less than immediate (signed)
        Slti = 0x0a => "slti",
        /// Bitwise and immediate (zero extended)
        Andi = 0x0c => "andi",
        /// Bitwise or immediate (zero extended)
        Ori = 0x0d => "ori",
        /// Load word
        Lw = 0x23 => "lw",
        /// Store word
        Sw = 0x2b => "sw",
    }
}

codes! {
    /// Register format function codes (bits 5..0)
    Funct {
        /// Shift left logical
        Sll = 0x00 => "sll",
        /// Shift right logical
        Srl = 0x02 => "srl",
        /// Shift right arithmetic
        Sra = 0x03 => "sra",
        /// Jump register
        Jr = 0x08 => "jr",
        /// Add (wrapping)
        Add = 0x20 => "add",
        /// Subtract (wrapping)
        Sub = 0x22 => "sub",
        /// Bitwise and
        And = 0x24 => "and",
        /// Bitwise or
        Or = 0x25 => "or",
        /// Bitwise nor
        Nor = 0x27 => "nor",
        /// Set on less than (signed)
        Slt = 0x2a => "slt",
    }
}

/// A raw instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction(pub Word);

impl Instruction {
    /// Get the operation code
    pub fn opcode(self) -> u8 {
        (self.0 >> 26) as u8
    }

    /// Get the s register (for R and I type instructions)
    pub fn rs(self) -> u8 {
        ((self.0 >> 21) & 0x1F) as u8
    }

    /// Get the t register (for R and I type instructions)
    pub fn rt(self) -> u8 {
        ((self.0 >> 16) & 0x1F) as u8
    }

    /// Get the d register (for R type instructions)
    pub fn rd(self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    /// Get the shift amount (for R type instructions)
    pub fn shamt(self) -> u8 {
        ((self.0 >> 6) & 0x1F) as u8
    }

    /// Get the ALU function (for R type instructions)
    pub fn funct(self) -> u8 {
        (self.0 & 0x3F) as u8
    }

    /// Get the raw immediate (for I type instructions)
    pub fn immediate(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    /// Get the pseudo address (for J type instructions)
    pub fn target(self) -> Word {
        self.0 & 0x03FF_FFFF
    }

    pub fn is_halt(self) -> bool {
        self.0 == HALT
    }

    pub fn r_type(funct: Funct, rs: u8, rt: u8, rd: u8, shamt: u8) -> Self {
        Instruction(
            (Word::from(rs & 0x1F) << 21)
                | (Word::from(rt & 0x1F) << 16)
                | (Word::from(rd & 0x1F) << 11)
                | (Word::from(shamt & 0x1F) << 6)
                | Word::from(u8::from(funct)),
        )
    }

    pub fn i_type(opcode: Opcode, rs: u8, rt: u8, immediate: u16) -> Self {
        Instruction(
            (Word::from(u8::from(opcode)) << 26)
                | (Word::from(rs & 0x1F) << 21)
                | (Word::from(rt & 0x1F) << 16)
                | Word::from(immediate),
        )
    }

    pub fn j_type(opcode: Opcode, target: Word) -> Self {
        Instruction((Word::from(u8::from(opcode)) << 26) | (target & 0x03FF_FFFF))
    }

    /// Splits the word into its fields. Returns `None` for words which
    /// encode no known operation.
    pub fn decode(self) -> Option<Operation> {
        if self.is_halt() {
            return Some(Operation::Halt);
        }

        let operation = match Opcode::try_from(self.opcode()).ok()? {
            Opcode::Special => Operation::Register {
                funct: Funct::try_from(self.funct()).ok()?,
                rs: self.rs(),
                rt: self.rt(),
                rd: self.rd(),
                shamt: self.shamt(),
            },
            opcode @ Opcode::J | opcode @ Opcode::Jal => Operation::Jump {
                opcode,
                target: self.target(),
            },
            opcode => Operation::Immediate {
                opcode,
                rs: self.rs(),
                rt: self.rt(),
                immediate: self.immediate(),
            },
        };

        Some(operation)
    }
}

impl From<Word> for Instruction {
    fn from(word: Word) -> Self {
        Instruction(word)
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register {
        funct: Funct,
        rs: u8,
        rt: u8,
        rd: u8,
        shamt: u8,
    },
    Immediate {
        opcode: Opcode,
        rs: u8,
        rt: u8,
        immediate: u16,
    },
    Jump {
        opcode: Opcode,
        target: Word,
    },
    Halt,
}

impl Operation {
    /// Packs the fields back into an instruction word
    pub fn encode(&self) -> Instruction {
        match *self {
            Operation::Register {
                funct,
                rs,
                rt,
                rd,
                shamt,
            } => Instruction::r_type(funct, rs, rt, rd, shamt),
            Operation::Immediate {
                opcode,
                rs,
                rt,
                immediate,
            } => Instruction::i_type(opcode, rs, rt, immediate),
            Operation::Jump { opcode, target } => Instruction::j_type(opcode, target),
            Operation::Halt => Instruction(HALT),
        }
    }
}

/// Pretty-print the register using its name
struct Register(u8);

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REGISTER_NAMES[(self.0 & 0x1F) as usize])
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Operation::Register {
                funct: Funct::Jr,
                rs,
                ..
            } => write!(f, "jr {}", Register(rs)),
            Operation::Register {
                funct: funct @ Funct::Sll,
                rt,
                rd,
                shamt,
                ..
            }
            | Operation::Register {
                funct: funct @ Funct::Srl,
                rt,
                rd,
                shamt,
                ..
            }
            | Operation::Register {
                funct: funct @ Funct::Sra,
                rt,
                rd,
                shamt,
                ..
            } => write!(f, "{} {}, {}, {}", funct, Register(rd), Register(rt), shamt),
            Operation::Register {
                funct, rs, rt, rd, ..
            } => write!(
                f,
                "{} {}, {}, {}",
                funct,
                Register(rd),
                Register(rs),
                Register(rt)
            ),
            Operation::Immediate {
                opcode,
                rs,
                rt,
                immediate,
            } => match opcode {
                Opcode::Lw | Opcode::Sw => write!(
                    f,
                    "{} {}, {}({})",
                    opcode,
                    Register(rt),
                    immediate,
                    Register(rs)
                ),
                Opcode::Beq | Opcode::Bne => write!(
                    f,
                    "{} {}, {}, {}",
                    opcode,
                    Register(rs),
                    Register(rt),
                    immediate as i16
                ),
                Opcode::Andi | Opcode::Ori => write!(
                    f,
                    "{} {}, {}, 0x{:x}",
                    opcode,
                    Register(rt),
                    Register(rs),
                    immediate
                ),
                _ => write!(
                    f,
                    "{} {}, {}, {}",
                    opcode,
                    Register(rt),
                    Register(rs),
                    immediate as i16
                ),
            },
            Operation::Jump { opcode, target } => write!(f, "{} 0x{:x}", opcode, target << 2),
            Operation::Halt => f.write_str("halt"),
        }
    }
}
