//! Intcode virtual machine.
//!
//! Executes programs stored as a flat array of signed integer cells. The same
//! array holds code and data, so programs may rewrite their own instructions.
//!
//! # Architecture
//!
//! - **Memory**: growable, zero-default cells addressed from 0 ([`memory::Memory`])
//! - **Instruction format**: one cell per opcode, `opcode = x % 100`, followed by
//!   the operand cells; hundreds, thousands and ten-thousands digits select the
//!   addressing mode of operands 1 to 3
//! - **Addressing modes**: position, immediate and relative (offset from a
//!   movable relative base)
//! - **Execution model**: a resumable step function; [`vm::Computer::run`]
//!   returns whenever input runs dry or the program halts, and can be called
//!   again with more input
//!
//! # Modules
//!
//! - [`errors`]: Program loading and execution error types
//! - [`isa`]: Opcode definitions and instruction decoding
//! - [`memory`]: Growable cell storage
//! - [`operand`]: Addressing modes and operand resolution
//! - [`program`]: Program text parsing and patching
//! - [`vm`]: The execution engine

pub mod errors;
pub mod isa;
pub mod memory;
pub mod operand;
pub mod program;
pub mod vm;

/// A single memory slot. Code, data and addresses all share this type.
pub type Cell = i64;
