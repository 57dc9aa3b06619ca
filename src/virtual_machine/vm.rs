//! Core virtual machine implementation.
//!
//! [`Computer`] owns its memory and registers and executes one instruction per
//! [`Computer::step`]. [`Computer::run`] loops over `step` until the program
//! asks for input that has not been queued yet, or halts. Because every
//! register lives in the struct, a suspended computer resumes by calling `run`
//! again. All arithmetic uses wrapping semantics to prevent overflow panics.

use crate::trace;
use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{Instruction, Opcode};
use crate::virtual_machine::memory::Memory;
use crate::virtual_machine::operand::Mode;
use crate::virtual_machine::program::Program;
use std::collections::VecDeque;
use std::fmt::Write as _;

/// Outcome of executing a single instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// The instruction ran and produced nothing visible to the caller.
    Continue,
    /// An `IN` found the input queue empty. The program counter did not move.
    NeedsInput,
    /// An `OUT` produced a value.
    Output(Cell),
    /// The program reached its halt instruction.
    Halted,
}

/// Result of one [`Computer::run`] call.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunOutput {
    /// Values output during this call, oldest first.
    pub output: VecDeque<Cell>,
    /// Whether the call ended at the halt instruction rather than on missing input.
    pub halted: bool,
}

macro_rules! exec_op {
    // Entry point
    (
        vm = $vm:ident,
        input = $input:ident,
        instr = $instr:ident,
        operands = $ops:ident,
        { $( $variant:ident => $handler:ident $args:tt ),* $(,)? }
    ) => {{
        match $instr.opcode {
            $(
                Opcode::$variant => {
                    exec_op!(@call $vm, $input, $ops, Opcode::$variant, $handler, $args)
                }
            )*
        }
    }};

    // Handler that consumes the input queue (semicolon separator)
    (@call $vm:ident, $input:ident, $ops:ident, $op:expr, $handler:ident,
        (input; $( $field:ident : $kind:ident ),* $(,)? )
    ) => {{
        $( let $field = exec_op!(@operand $vm, $ops, $kind)?; )*
        $vm.$handler($op, $input, $( $field ),*)
    }};

    // Handler without input (no semicolon)
    (@call $vm:ident, $input:ident, $ops:ident, $op:expr, $handler:ident,
        ( $( $field:ident : $kind:ident ),* $(,)? )
    ) => {{
        $( let $field = exec_op!(@operand $vm, $ops, $kind)?; )*
        $vm.$handler($op, $( $field ),*)
    }};

    // Resolve the next operand to a value
    (@operand $vm:ident, $ops:ident, Read) => {{
        $ops.read(&$vm.memory, $vm.relative_base)
    }};

    // Resolve the next operand to a store address
    (@operand $vm:ident, $ops:ident, Write) => {{
        $ops.write(&$vm.memory, $vm.relative_base)
    }};
}

/// Operand cursor for the instruction being executed.
///
/// Each call consumes the next operand cell after the opcode, in slot order.
struct Operands {
    instr: Instruction,
    cell: Cell,
    pc: Cell,
    next: usize,
}

impl Operands {
    fn new(instr: Instruction, cell: Cell, pc: Cell) -> Self {
        Self {
            instr,
            cell,
            pc,
            next: 0,
        }
    }

    fn raw(&mut self, memory: &Memory) -> Result<(usize, Cell), VMError> {
        let slot = self.next;
        self.next += 1;
        let raw = memory.read(self.pc.wrapping_add(slot as Cell + 1))?;
        Ok((slot, raw))
    }

    fn read(&mut self, memory: &Memory, relative_base: Cell) -> Result<Cell, VMError> {
        let (slot, raw) = self.raw(memory)?;
        self.instr.modes[slot].read(raw, relative_base, memory)
    }

    fn write(&mut self, memory: &Memory, relative_base: Cell) -> Result<Cell, VMError> {
        let (slot, raw) = self.raw(memory)?;
        self.instr.modes[slot]
            .target(raw, relative_base)
            .ok_or(VMError::ImmediateWrite {
                cell: self.cell,
                slot: slot + 1,
                pc: self.pc,
            })
    }
}

/// Intcode computer.
///
/// Owns one [`Memory`] plus the program counter, relative base, halted latch
/// and fault latch. Cloning produces a fully independent computer.
#[derive(Clone, Debug)]
pub struct Computer {
    memory: Memory,
    pc: Cell,
    relative_base: Cell,
    halted: bool,
    faulted: bool,
}

impl Computer {
    /// Creates a computer over a private copy of `program`.
    pub fn new(program: &Program) -> Self {
        Self::with_memory(program.to_memory())
    }

    /// Creates a computer that executes `memory` from address 0.
    pub fn with_memory(memory: Memory) -> Self {
        Self {
            memory,
            pc: 0,
            relative_base: 0,
            halted: false,
            faulted: false,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn pc(&self) -> Cell {
        self.pc
    }

    pub fn relative_base(&self) -> Cell {
        self.relative_base
    }

    /// Whether the halt instruction has executed. Once true, stays true.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether an instruction aborted with a fatal error. Once true, stays
    /// true and every later `run` or `step` fails with [`VMError::Faulted`].
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    fn check_runnable(&self) -> Result<(), VMError> {
        if self.faulted {
            return Err(VMError::Faulted);
        }
        if self.halted {
            return Err(VMError::AlreadyHalted);
        }
        Ok(())
    }

    /// Executes until `input` runs dry at an `IN` or the program halts.
    ///
    /// Input is consumed from the front of the queue. Whatever is left after a
    /// halt stays in the queue. Returns [`VMError::AlreadyHalted`] without
    /// executing anything if the program halted in an earlier call, and
    /// [`VMError::Faulted`] if an earlier call aborted.
    pub fn run(&mut self, input: &mut VecDeque<Cell>) -> Result<RunOutput, VMError> {
        self.check_runnable()?;

        let mut output = VecDeque::new();
        loop {
            match self.step(input)? {
                Step::Continue => {}
                Step::Output(value) => output.push_back(value),
                Step::NeedsInput => {
                    return Ok(RunOutput {
                        output,
                        halted: false,
                    });
                }
                Step::Halted => {
                    return Ok(RunOutput {
                        output,
                        halted: true,
                    });
                }
            }
        }
    }

    /// Convenience wrapper around [`run`](Self::run) for a one-off input list.
    pub fn run_with<I: IntoIterator<Item = Cell>>(&mut self, input: I) -> Result<RunOutput, VMError> {
        let mut queue = input.into_iter().collect();
        self.run(&mut queue)
    }

    /// Executes the instruction at the program counter. A fatal error
    /// latches the computer as faulted.
    pub fn step(&mut self, input: &mut VecDeque<Cell>) -> Result<Step, VMError> {
        self.check_runnable()?;

        let result = self.execute(input);
        if result.is_err() {
            self.faulted = true;
        }
        result
    }

    fn execute(&mut self, input: &mut VecDeque<Cell>) -> Result<Step, VMError> {
        let pc = self.pc;
        let cell = self.memory.read(pc)?;
        let instr = Instruction::decode(cell, pc)?;
        trace!(
            "executing memory[{}]={:<8} | {}",
            pc,
            cell,
            self.describe(&instr)
        );

        let mut operands = Operands::new(instr, cell, pc);
        exec_op! {
            vm = self,
            input = input,
            instr = instr,
            operands = operands,
            {
                Add => op_add(lhs: Read, rhs: Read, dst: Write),
                Mul => op_mul(lhs: Read, rhs: Read, dst: Write),
                Input => op_input(input; dst: Write),
                Output => op_output(value: Read),
                JumpIfTrue => op_jump_if_true(cond: Read, target: Read),
                JumpIfFalse => op_jump_if_false(cond: Read, target: Read),
                LessThan => op_less_than(lhs: Read, rhs: Read, dst: Write),
                Equals => op_equals(lhs: Read, rhs: Read, dst: Write),
                AdjustRelativeBase => op_adjust_relative_base(delta: Read),
                Halt => op_halt(),
            }
        }
    }

    /// Renders `instr` and its raw operands for the trace, e.g. `ADD lhs=[9] rhs=#3 dst=[rb+2]`.
    fn describe(&self, instr: &Instruction) -> String {
        let mut text = instr.opcode.mnemonic().to_string();
        for (slot, name) in instr.opcode.operand_names().iter().enumerate() {
            let raw = self
                .memory
                .read(self.pc.wrapping_add(slot as Cell + 1))
                .unwrap_or_default();
            let _ = match instr.modes[slot] {
                Mode::Position => write!(text, " {name}=[{raw}]"),
                Mode::Immediate => write!(text, " {name}=#{raw}"),
                Mode::Relative => write!(text, " {name}=[rb{raw:+}]"),
            };
        }
        text
    }

    fn advance(&mut self, op: Opcode) {
        self.pc = self.pc.wrapping_add(op.width());
    }

    fn op_add(&mut self, op: Opcode, lhs: Cell, rhs: Cell, dst: Cell) -> Result<Step, VMError> {
        trace!("    *{dst} = {lhs} + {rhs}");
        self.memory.write(dst, lhs.wrapping_add(rhs))?;
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_mul(&mut self, op: Opcode, lhs: Cell, rhs: Cell, dst: Cell) -> Result<Step, VMError> {
        trace!("    *{dst} = {lhs} * {rhs}");
        self.memory.write(dst, lhs.wrapping_mul(rhs))?;
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_input(
        &mut self,
        op: Opcode,
        input: &mut VecDeque<Cell>,
        dst: Cell,
    ) -> Result<Step, VMError> {
        let Some(value) = input.pop_front() else {
            trace!("    input queue empty, suspending at pc={}", self.pc);
            return Ok(Step::NeedsInput);
        };
        trace!("    *{dst} = {value}");
        self.memory.write(dst, value)?;
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_output(&mut self, op: Opcode, value: Cell) -> Result<Step, VMError> {
        trace!("    print({value})");
        self.advance(op);
        Ok(Step::Output(value))
    }

    fn jump(&mut self, op: Opcode, taken: bool, target: Cell) -> Result<Step, VMError> {
        if taken {
            self.pc = target;
        } else {
            self.advance(op);
        }
        Ok(Step::Continue)
    }

    fn op_jump_if_true(&mut self, op: Opcode, cond: Cell, target: Cell) -> Result<Step, VMError> {
        trace!("    pc = {cond} ? {target} : pc+3");
        self.jump(op, cond != 0, target)
    }

    fn op_jump_if_false(&mut self, op: Opcode, cond: Cell, target: Cell) -> Result<Step, VMError> {
        trace!("    pc = !{cond} ? {target} : pc+3");
        self.jump(op, cond == 0, target)
    }

    fn op_less_than(&mut self, op: Opcode, lhs: Cell, rhs: Cell, dst: Cell) -> Result<Step, VMError> {
        trace!("    *{dst} = {lhs} < {rhs}");
        self.memory.write(dst, Cell::from(lhs < rhs))?;
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_equals(&mut self, op: Opcode, lhs: Cell, rhs: Cell, dst: Cell) -> Result<Step, VMError> {
        trace!("    *{dst} = {lhs} == {rhs}");
        self.memory.write(dst, Cell::from(lhs == rhs))?;
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_adjust_relative_base(&mut self, op: Opcode, delta: Cell) -> Result<Step, VMError> {
        trace!("    rb += {delta}");
        self.relative_base = self.relative_base.wrapping_add(delta);
        self.advance(op);
        Ok(Step::Continue)
    }

    fn op_halt(&mut self, _op: Opcode) -> Result<Step, VMError> {
        trace!("    halt");
        self.halted = true;
        Ok(Step::Halted)
    }
}

#[cfg(test)]
mod tests;
