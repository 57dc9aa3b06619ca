//! Program text parsing.
//!
//! A program is a comma-separated list of signed integers, e.g.
//! `1,9,10,3,2,3,11,0,99,30,40,50`. Whitespace around each cell, including the
//! trailing newline of an input file, is ignored.

use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::ProgramError;
use crate::virtual_machine::memory::Memory;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Initial memory image of an Intcode program.
///
/// A program is parsed once and then instantiated any number of times; each
/// [`Computer`](super::vm::Computer) receives its own copy of the cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    cells: Vec<Cell>,
}

impl Program {
    /// Creates a program from raw cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Parses comma-separated program text.
    pub fn parse(source: &str) -> Result<Self, ProgramError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ProgramError::Empty);
        }

        source
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token
                    .parse::<Cell>()
                    .map_err(|source| ProgramError::InvalidCell {
                        index,
                        token: token.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Reads and parses a program file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Returns the program's cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns a copy with `address` overwritten by `value`, growing the image if needed.
    pub fn with_patch(mut self, address: usize, value: Cell) -> Self {
        if address >= self.cells.len() {
            self.cells.resize(address + 1, 0);
        }
        self.cells[address] = value;
        self
    }

    /// Builds a fresh memory image holding a copy of the program.
    pub fn to_memory(&self) -> Memory {
        Memory::new(self.cells.clone())
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let program = Program::parse("1,9,10,3,2,3,11,0,99,30,40,50").unwrap();
        assert_eq!(program.cells(), &[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
        assert_eq!(program.len(), 12);
    }

    #[test]
    fn parse_signed_and_whitespace() {
        let program: Program = " 109, -1 ,+4,\n1125899906842624\n".parse().unwrap();
        assert_eq!(program.cells(), &[109, -1, 4, 1125899906842624]);
    }

    #[test]
    fn parse_empty() {
        assert!(matches!(Program::parse(""), Err(ProgramError::Empty)));
        assert!(matches!(Program::parse(" \n"), Err(ProgramError::Empty)));
    }

    #[test]
    fn parse_bad_token_reports_index() {
        match Program::parse("1,2,x3,99") {
            Err(ProgramError::InvalidCell { index, token, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(token, "x3");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn parse_empty_token_is_invalid() {
        assert!(matches!(
            Program::parse("1,,99"),
            Err(ProgramError::InvalidCell { index: 1, .. })
        ));
    }

    #[test]
    fn load_missing_file() {
        assert!(matches!(
            Program::load("/nonexistent/intcode/program.txt"),
            Err(ProgramError::Io(_))
        ));
    }

    #[test]
    fn patch_does_not_touch_original() {
        let program = Program::new(vec![1, 0, 0, 0, 99]);
        let patched = program.clone().with_patch(1, 12).with_patch(2, 2);
        assert_eq!(program.cells(), &[1, 0, 0, 0, 99]);
        assert_eq!(patched.cells(), &[1, 12, 2, 0, 99]);
    }

    #[test]
    fn patch_grows_image() {
        let patched = Program::new(vec![99]).with_patch(3, 7);
        assert_eq!(patched.cells(), &[99, 0, 0, 7]);
    }

    #[test]
    fn memory_is_a_copy() {
        let program = Program::new(vec![1, 2, 3]);
        let mut memory = program.to_memory();
        memory.write(0, 42).unwrap();
        assert_eq!(program.cells(), &[1, 2, 3]);
    }
}
