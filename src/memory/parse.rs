//! Loads programs given as one instruction word per line:
//!
//! ```text
//! 0x8c090008
//! 0xac090020  // sw t1, 32(zr)
//! 0x8c080000  # lw t0, 0(zr)
//! ```

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::{FromStr, Lines};

use crate::instruction::HALT;

use super::{AccessError, Memory, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidNumber { radix: u32 },
    TrailingInput,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::InvalidNumber { radix } => {
                write!(f, "failed to parse word with radix `{}`", radix)
            }
            ParseErrorKind::TrailingInput => f.write_str("unexpected input after word"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ParseErrorKind,
    context: Option<Cow<'static, str>>,
    line_nr: usize,
}

impl ParseError {
    fn new<C, S>(kind: ParseErrorKind, context: C, line_nr: usize) -> Self
    where
        C: Into<Option<S>>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            kind,
            context: context.into().map(|inner| inner.into()),
            line_nr,
        }
    }

    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    pub fn line_nr(&self) -> usize {
        self.line_nr
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(
                f,
                "error [ln: {}]: {} - {}",
                self.line_nr, self.kind, context
            )
        } else {
            write!(f, "error [ln: {}]: {}", self.line_nr, self.kind)
        }
    }
}

impl error::Error for ParseError {}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Why a program could not be loaded
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse(Vec<ParseError>),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read `{}`: {}", path.display(), source)
            }
            LoadError::Parse(errors) => {
                write!(f, "{} malformed line(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n  {}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse(errors) => errors
                .first()
                .map(|err| err as &(dyn error::Error + 'static)),
        }
    }
}

/// Parses an integer literal the way C's `strtoimax(.., 0)` would accept it,
/// except that octal needs the `0o` prefix. On failure the radix is returned.
pub fn parse_word(literal: &str) -> std::result::Result<Word, u32> {
    let (radix, offset) = match literal.as_bytes() {
        [b'0', b'b', ..] | [b'0', b'B', ..] => (2, 2),
        [b'0', b'o', ..] | [b'0', b'O', ..] => (8, 2),
        [b'0', b'x', ..] | [b'0', b'X', ..] => (16, 2),
        _ => (10, 0),
    };

    Word::from_str_radix(&literal[offset..], radix).map_err(|_| radix)
}

/// Removes a trailing `//` or `#` comment
fn strip_comment(line: &str) -> &str {
    let end = [line.find("//"), line.find('#')]
        .iter()
        .flatten()
        .min()
        .copied()
        .unwrap_or_else(|| line.len());

    &line[..end]
}

/// A parsed program, without the `halt` sentinel
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Program {
    pub words: Vec<Word>,
}

impl Program {
    /// Reads and parses the program file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Parsing program `{}`", path.display());
        data.parse()
    }

    /// Places the program followed by the `halt` sentinel at `base`. Returns
    /// the number of words written, the sentinel included.
    ///
    /// # Errors
    ///
    /// Nothing is written if the program does not fit into `memory`.
    pub fn load_into<const S: usize>(
        &self,
        memory: &mut Memory<S>,
        base: Word,
    ) -> Result<usize, AccessError> {
        let mut image = Vec::with_capacity(self.words.len() + 1);
        image.extend_from_slice(&self.words);
        image.push(HALT);

        memory.write_words(base, &image)?;
        log::info!(
            "Loaded {} word(s) at 0x{:08x}",
            self.words.len(),
            base
        );

        Ok(image.len())
    }
}

impl FromStr for Program {
    type Err = LoadError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Parser::new(data).parse().map_err(LoadError::Parse)
    }
}

#[derive(Debug, Clone)]
pub struct Parser<'a> {
    lines: Lines<'a>,
    line_nr: usize,
    words: Vec<Word>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for `data`
    pub fn new(data: &'a str) -> Self {
        Self {
            lines: data.lines(),
            line_nr: 0,
            words: Vec::new(),
        }
    }

    /// Consumes `self` and tries to parse all of the data into a program.
    ///
    /// # Errors
    ///
    /// All errors which may occur are collected and returned at the end.
    pub fn parse(mut self) -> Result<Program, Vec<ParseError>> {
        let mut errors = Vec::new();

        while let Some(res) = self.parse_next_line() {
            if let Err(err) = res {
                log::error!("{}", err);
                errors.push(err);
            }
        }

        if errors.is_empty() {
            Ok(Program { words: self.words })
        } else {
            Err(errors)
        }
    }

    /// Tries to parse the next line. Each instruction word should be located
    /// on its own line.
    fn parse_next_line(&mut self) -> Option<Result<()>> {
        let line = strip_comment(self.lines.next()?).trim();
        self.line_nr += 1;

        if line.is_empty() {
            // Comment or empty line; skip
            return Some(Ok(()));
        }

        Some(self.parse_instruction(line))
    }

    /// Tries to parse line as an instruction word. The comment should
    /// already be stripped.
    ///
    /// # Examples
    ///
    /// - `0x20090020`
    /// - `537460768`
    fn parse_instruction(&mut self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();
        let literal = tokens.next().unwrap_or_default();

        if let Some(extra) = tokens.next() {
            return Err(ParseError::new(
                ParseErrorKind::TrailingInput,
                format!("found `{}`", extra),
                self.line_nr,
            ));
        }

        let word = parse_word(literal).map_err(|radix| {
            ParseError::new(
                ParseErrorKind::InvalidNumber { radix },
                format!("`{}` is not a 32-bit word", literal),
                self.line_nr,
            )
        })?;

        log::debug!("[{}] Found word 0x{:08x}", self.line_nr, word);
        self.words.push(word);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::StdMem;

    use super::*;
    use color_eyre::Result;

    #[test]
    fn parse_program() -> Result<()> {
        let data = r#"
            0x20090020
            0xac090000  // sw t1, 0(zr)

            # full line comment
            0x8c080000#lw t0, 0(zr)
        "#;

        let program: Program = data.parse()?;

        assert_eq!(program.words, vec![0x20090020, 0xac090000, 0x8c080000]);

        Ok(())
    }

    #[test]
    fn parse_radixes() -> Result<()> {
        let program: Program = "0x10\n0X10\n16\n0b10000\n0o20\n".parse()?;

        assert_eq!(program.words, vec![16; 5]);

        Ok(())
    }

    #[test]
    fn parse_errors_are_collected() -> Result<()> {
        let data = "0x20090020\n0xzz\n0x123456789\n0x1 0x2\n0xac090000\n";

        let errors = match Parser::new(data).parse() {
            Err(errors) => errors,
            Ok(program) => panic!("parsed {:?}", program),
        };

        let found: Vec<_> = errors
            .iter()
            .map(|err| (err.line_nr(), err.kind()))
            .collect();
        assert_eq!(
            found,
            vec![
                (2, ParseErrorKind::InvalidNumber { radix: 16 }),
                (3, ParseErrorKind::InvalidNumber { radix: 16 }),
                (4, ParseErrorKind::TrailingInput),
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            "error [ln: 2]: failed to parse word with radix `16` - `0xzz` is not a 32-bit word"
        );

        Ok(())
    }

    #[test]
    fn load_appends_halt() -> Result<()> {
        let mut mem = StdMem::default();
        let program: Program = "0x20090020\n0xac090000\n".parse()?;

        assert_eq!(program.load_into(&mut mem, 0x1000)?, 3);
        assert_eq!(mem.read_word(0x1000)?, 0x20090020);
        assert_eq!(mem.read_word(0x1004)?, 0xac090000);
        assert_eq!(mem.read_word(0x1008)?, HALT);

        // an empty program is just the sentinel
        Program::default().load_into(&mut mem, 0x2000)?;
        assert_eq!(mem.read_word(0x2000)?, HALT);

        Ok(())
    }

    #[test]
    fn load_does_not_fit() -> Result<()> {
        let mut mem = Memory::<0x10>::default();
        let program = Program {
            words: vec![1, 2, 3],
        };

        assert!(program.load_into(&mut mem, 0x4).is_err());
        assert_eq!(mem, Memory::<0x10>::default());
        assert_eq!(program.load_into(&mut mem, 0x0)?, 4);

        Ok(())
    }

    #[test]
    fn missing_file() {
        let err = Program::from_file("does/not/exist.hex").unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.hex"));
    }
}
