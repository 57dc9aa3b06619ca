//! Search over programs patched at addresses 1 and 2.
//!
//! The patched cells are the program's "noun" and "verb". The answer a
//! program computes is whatever sits at address 0 once it halts.

use crate::orchestration::errors::SearchError;
use crate::trace;
use crate::virtual_machine::Cell;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::Computer;

/// Upper bound (exclusive) for both noun and verb.
pub const RANGE: Cell = 100;

/// Runs `program` with address 1 set to `noun` and address 2 set to `verb`,
/// without input, and returns address 0 after the halt.
pub fn run_with(program: &Program, noun: Cell, verb: Cell) -> Result<Cell, SearchError> {
    let patched = program.clone().with_patch(1, noun).with_patch(2, verb);
    let mut computer = Computer::new(&patched);
    let result = computer.run_with([])?;
    if !result.halted {
        return Err(SearchError::NeedsInput);
    }
    Ok(computer.memory()[0])
}

/// Finds the first noun/verb pair, scanning nouns then verbs from 0, whose
/// run leaves `target` at address 0, and returns `100 * noun + verb`.
///
/// Pairs whose run aborts or asks for input are skipped.
pub fn find_noun_verb(program: &Program, target: Cell) -> Result<Cell, SearchError> {
    for noun in 0..RANGE {
        for verb in 0..RANGE {
            match run_with(program, noun, verb) {
                Ok(value) if value == target => return Ok(100 * noun + verb),
                Ok(_) => {}
                Err(err) => trace!("noun={noun} verb={verb} skipped: {err}"),
            }
        }
    }
    Err(SearchError::NotFound { target })
}
