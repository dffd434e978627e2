//! A stepping interpreter for a small MIPS subset.
//!
//! [`processor::Processor`] decodes and executes 32-bit instruction words
//! against its registers and a [`memory::Memory`]. [`machine::Machine`]
//! bundles both into the complete architectural state, and
//! [`shell::Shell`] drives a machine from operator commands.

pub mod config;
pub mod instruction;
pub mod machine;
pub mod memory;
pub mod processor;
pub mod registers;
pub mod shell;
