//! Output formatting for the print instructions.
//!
//! The engine never writes to a console directly: everything goes through an
//! injectable [`Write`] sink, so hosts pick the destination and tests capture
//! the bytes. Every print instruction ends with a line terminator.

use crate::engine::memory::Memory;
use std::io::{self, Write};

/// Formats print-instruction output onto a sink.
#[derive(Debug)]
pub struct OutputHandler<W> {
    sink: W,
}

impl<W: Write> OutputHandler<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Consume the handler and hand the sink back.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Borrow the sink, e.g. to inspect captured output.
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// Print a cell as a character.
    pub fn print_ascii(&mut self, byte: u8) -> io::Result<()> {
        writeln!(self.sink, "{}", byte as char)
    }

    /// Print a cell as its unsigned numeric value.
    pub fn print_value(&mut self, byte: u8) -> io::Result<()> {
        writeln!(self.sink, "{}", byte)
    }

    /// Print every cell, in address order, as characters with no separators.
    pub fn print_ascii_table(&mut self, mem: &Memory) -> io::Result<()> {
        for &byte in mem.cells() {
            write!(self.sink, "{}", byte as char)?;
        }
        writeln!(self.sink)
    }

    /// Print every cell, in address order, as numeric values, each followed
    /// by a single space.
    pub fn print_value_table(&mut self, mem: &Memory) -> io::Result<()> {
        for &byte in mem.cells() {
            write!(self.sink, "{} ", byte)?;
        }
        writeln!(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_table_format() {
        let mem = Memory::with_size(4);
        let mut out = OutputHandler::new(Vec::new());
        out.print_value_table(&mem).unwrap();
        assert_eq!(out.into_inner(), b"0 0 0 0 \n");
    }

    #[test]
    fn test_ascii_table_has_no_separators() {
        let mut mem = Memory::with_size(3);
        mem.set_current_byte(b'H' as i32);
        mem.increment_pointer();
        mem.set_current_byte(b'i' as i32);
        let mut out = OutputHandler::new(Vec::new());
        out.print_ascii_table(&mem).unwrap();
        assert_eq!(out.into_inner(), b"Hi\0\n");
    }

    #[test]
    fn test_single_prints_end_the_line() {
        let mut out = OutputHandler::new(Vec::new());
        out.print_ascii(b'A').unwrap();
        out.print_value(200).unwrap();
        assert_eq!(out.into_inner(), b"A\n200\n");
    }
}
