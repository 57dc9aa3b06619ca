use crate::virtual_machine::Cell;
use intcode_derive::Error;
use std::num::ParseIntError;

/// Fatal conditions raised while executing a program.
///
/// Every variant means the instruction stream is malformed or the engine was
/// misused; none of them is retried.
#[derive(Debug, Error)]
pub enum VMError {
    /// The low two digits of the cell at `pc` name no known opcode.
    #[error("memory[{pc}]={cell} is not a supported opcode")]
    InvalidOpcode { cell: Cell, pc: Cell },
    /// An operand slot carries an addressing mode digit other than 0, 1 or 2.
    #[error("memory[{pc}]={cell}: {mode} is not a supported parameter mode for operand {slot}")]
    InvalidMode {
        cell: Cell,
        mode: Cell,
        slot: usize,
        pc: Cell,
    },
    /// An instruction asked to write through an immediate-mode operand.
    #[error("memory[{pc}]={cell}: operand {slot} is a write target in immediate mode")]
    ImmediateWrite { cell: Cell, slot: usize, pc: Cell },
    /// A resolved address, or the program counter, went below zero.
    #[error("negative address {address}")]
    NegativeAddress { address: Cell },
    /// `run` was called after the program reached its halt instruction.
    #[error("computer already halted")]
    AlreadyHalted,
    /// `run` was called after an earlier call aborted with a fatal error.
    #[error("computer aborted earlier and cannot resume")]
    Faulted,
}

/// Errors turning program text into cells.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// The program file could not be read.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),
    /// A comma-separated token is not a signed integer.
    #[error("cell {index}: '{token}' is not an integer")]
    InvalidCell {
        index: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },
    /// The text contained no cells at all.
    #[error("program is empty")]
    Empty,
}
