//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_opcode!`](crate::for_each_opcode) macro holds the canonical
//! opcode list and invokes a callback macro for code generation, so the
//! decoder here and the dispatch table in [`vm`](super::vm) are generated from
//! one definition.
//!
//! This module generates:
//! - The [`Opcode`] enum with its numeric values
//! - `TryFrom<Cell>` for decoding opcodes
//! - Per-opcode mnemonic, operand names and operand access kinds
//!
//! # Instruction Format
//!
//! An instruction is one cell followed by its operands:
//! - `x % 100`: opcode
//! - `(x / 100) % 10`: mode of operand 1
//! - `(x / 1000) % 10`: mode of operand 2
//! - `(x / 10000) % 10`: mode of operand 3
//!
//! `Read` operands resolve to a value, `Write` operands to an address.

use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::Mode;

/// Invokes a callback macro with the complete opcode definition list.
#[macro_export]
macro_rules! for_each_opcode {
    ($callback:ident) => {
        $callback! {
            /// ADD a, b, *dst ; dst = a + b
            Add = 1, "ADD" => [lhs: Read, rhs: Read, dst: Write],
            /// MUL a, b, *dst ; dst = a * b
            Mul = 2, "MUL" => [lhs: Read, rhs: Read, dst: Write],
            /// IN *dst ; dst = next queued input, suspends when the queue is empty
            Input = 3, "IN" => [dst: Write],
            /// OUT a ; append a to the output queue
            Output = 4, "OUT" => [value: Read],
            /// JT cond, target ; pc = target if cond != 0
            JumpIfTrue = 5, "JT" => [cond: Read, target: Read],
            /// JF cond, target ; pc = target if cond == 0
            JumpIfFalse = 6, "JF" => [cond: Read, target: Read],
            /// LT a, b, *dst ; dst = (a < b) as 0/1
            LessThan = 7, "LT" => [lhs: Read, rhs: Read, dst: Write],
            /// EQ a, b, *dst ; dst = (a == b) as 0/1
            Equals = 8, "EQ" => [lhs: Read, rhs: Read, dst: Write],
            /// ARB delta ; relative_base += delta
            AdjustRelativeBase = 9, "ARB" => [delta: Read],
            /// HALT ; stop for good
            Halt = 99, "HALT" => [],
        }
    };
}

/// Whether an operand slot is read as a value or used as a store address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    Read,
    Write,
}

/// A value that names no opcode. [`Instruction::decode`] turns it into a
/// located [`VMError::InvalidOpcode`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UnknownOpcode(pub Cell);

/// Maximum operand count of any instruction.
pub const MAX_OPERANDS: usize = 3;

#[macro_export]
macro_rules! define_opcodes {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:expr, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<Cell> for Opcode {
            type Error = UnknownOpcode;

            fn try_from(value: Cell) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(UnknownOpcode(value)),
                }
            }
        }

        impl Opcode {
            /// Returns the mnemonic used in trace output.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns how each operand slot is accessed, in order.
            pub const fn accesses(&self) -> &'static [Access] {
                match self {
                    $( Opcode::$name => &[ $( Access::$kind ),* ], )*
                }
            }

            /// Returns the operand names, in order.
            pub const fn operand_names(&self) -> &'static [&'static str] {
                match self {
                    $( Opcode::$name => &[ $( stringify!($field) ),* ], )*
                }
            }
        }
    };
}

for_each_opcode!(define_opcodes);

impl Opcode {
    /// Number of operand cells following the opcode cell.
    pub const fn arity(&self) -> usize {
        self.accesses().len()
    }

    /// Number of cells the instruction occupies, opcode included.
    pub const fn width(&self) -> Cell {
        self.arity() as Cell + 1
    }
}

/// One decoded instruction cell.
///
/// Modes are validated only for the slots the opcode uses; the remaining
/// slots stay [`Mode::Position`] and are never consulted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [Mode; MAX_OPERANDS],
}

impl Instruction {
    /// Decodes `cell`, found at `pc`, into an opcode and operand modes.
    pub fn decode(cell: Cell, pc: Cell) -> Result<Self, VMError> {
        let opcode =
            Opcode::try_from(cell % 100).map_err(|_| VMError::InvalidOpcode { cell, pc })?;

        let mut modes = [Mode::Position; MAX_OPERANDS];
        let mut divisor = 100;
        for (i, slot) in modes.iter_mut().take(opcode.arity()).enumerate() {
            let digit = (cell / divisor) % 10;
            *slot = Mode::from_digit(digit).ok_or(VMError::InvalidMode {
                cell,
                mode: digit,
                slot: i + 1,
                pc,
            })?;
            divisor *= 10;
        }

        Ok(Self { opcode, modes })
    }
}
