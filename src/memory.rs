use std::error;
use std::fmt;
use std::ops::Range;

pub mod parse;

pub type Byte = u8; // 1 byte
pub type Word = u32; // 4 bytes

/// Size of the default memory (1 MiB)
pub const MEMORY_SIZE: usize = 1 << 20;

/// Default memory
pub type StdMem = Memory<MEMORY_SIZE>;

/// Diagnostic constants and test strings found at address 0 after boot
pub const DIAGNOSTIC_IMAGE: [Byte; 64] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, //
    0xde, 0xad, 0xbe, 0xef, 0x00, 0x00, 0x00, 0x00, //
    b'h', b'e', b'l', b'l', b'o', b' ', b'w', b'o', //
    b'r', b'l', b'd', b'!', b'!', 0x00, 0x00, 0x00, //
    b'a', b'w', b'e', b's', b'o', b'm', b'e', b' ', //
    b'c', b'o', b'm', b'p', b'u', b't', b'e', b'r', //
    b' ', b'a', b'r', b'c', b'h', b'i', b't', b'e', //
    b'c', b't', b'u', b'r', b'e', b'!', 0x00, 0x00, //
];

/// Raised when an access touches bytes outside of the memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    OutOfBounds { address: Word, len: usize },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::OutOfBounds { address, len } => write!(
                f,
                "access of {} byte(s) at `0x{:08x}` is outside of memory",
                len, address
            ),
        }
    }
}

impl error::Error for AccessError {}

pub type Result<T, E = AccessError> = std::result::Result<T, E>;

/// Emulates byte addressable, big endian memory for use with the CPU
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Memory<const S: usize> {
    /// The actual data of the memory, always `S` bytes long
    pub data: Box<[Byte]>,
}

impl<const S: usize> Default for Memory<S> {
    /// Initializes zeroed memory
    fn default() -> Self {
        Memory {
            data: vec![0; S].into_boxed_slice(),
        }
    }
}

impl<const S: usize> fmt::Debug for Memory<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory({} bytes)", S)
    }
}

impl<const S: usize> Memory<S> {
    /// Initializes memory with [`DIAGNOSTIC_IMAGE`] at address 0. Memories
    /// smaller than the image receive as much of it as fits.
    pub fn with_diagnostics() -> Self {
        let mut memory = Self::default();
        let len = DIAGNOSTIC_IMAGE.len().min(S);
        memory.data[..len].copy_from_slice(&DIAGNOSTIC_IMAGE[..len]);
        memory
    }

    /// Number of addressable bytes
    pub fn size(&self) -> usize {
        S
    }

    /// Resolves `len` bytes at `address` into an index range
    fn range(&self, address: Word, len: usize) -> Result<Range<usize>> {
        let start = address as usize;
        match start.checked_add(len) {
            Some(end) if end <= S => Ok(start..end),
            _ => Err(AccessError::OutOfBounds { address, len }),
        }
    }

    /// Reads a byte from the memory
    pub fn read_byte(&self, address: Word) -> Result<Byte> {
        let range = self.range(address, 1)?;
        Ok(self.data[range.start])
    }

    /// Writes a byte to the memory
    pub fn write_byte(&mut self, address: Word, value: Byte) -> Result<()> {
        let range = self.range(address, 1)?;
        self.data[range.start] = value;
        Ok(())
    }

    /// Reads a word from the memory (big endian)
    pub fn read_word(&self, address: Word) -> Result<Word> {
        let bytes = &self.data[self.range(address, 4)?];
        Ok(Word::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Writes a word to the memory (big endian)
    pub fn write_word(&mut self, address: Word, value: Word) -> Result<()> {
        let range = self.range(address, 4)?;
        self.data[range].copy_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Borrows `len` bytes starting at `address`
    pub fn read_array(&self, address: Word, len: usize) -> Result<&[Byte]> {
        Ok(&self.data[self.range(address, len)?])
    }

    /// Writes an array of bytes to the memory
    pub fn write_array(&mut self, address: Word, data: &[Byte]) -> Result<()> {
        let range = self.range(address, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    /// Writes consecutive big endian words starting at `address`. Nothing is
    /// written if the block does not fit.
    pub fn write_words(&mut self, address: Word, words: &[Word]) -> Result<()> {
        let range = self.range(address, words.len() * 4)?;
        for (chunk, word) in self.data[range].chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(())
    }

    /// Formats `length` bytes starting at `address` as rows of four bytes,
    /// followed by their printable characters. `length` is rounded up to a
    /// whole row.
    pub fn dump(&self, address: Word, length: usize) -> Result<String> {
        let rows = (length + 3) / 4;
        let bytes = self.read_array(address, rows * 4)?;
        let printable = |b: Byte| {
            if b == b' ' || b.is_ascii_graphic() {
                b as char
            } else {
                '.'
            }
        };

        let mut out = String::with_capacity(rows * 40);
        for (row, chunk) in bytes.chunks_exact(4).enumerate() {
            out.push_str(&format!(
                "0x{:08x}:  {:02x} {:02x} {:02x} {:02x}    {} {} {} {}\n",
                address as usize + row * 4,
                chunk[0],
                chunk[1],
                chunk[2],
                chunk[3],
                printable(chunk[0]),
                printable(chunk[1]),
                printable(chunk[2]),
                printable(chunk[3]),
            ));
        }
        Ok(out)
    }
}

/// Writes a block of instruction words directly into the memory
#[macro_export]
macro_rules! write_instructions {
    ( $mem:ident : $pos:expr => $( $word:expr ),+ $(,)? ) => {
        {
            let words: &[$crate::memory::Word] = &[
                $(
                    $word,
                )+
            ];
            $mem.write_words($pos, words)
        }
    };
}
