//! Line-based driver that lets a person supply a program's input.

use crate::orchestration::errors::InteractiveError;
use crate::virtual_machine::Cell;
use crate::virtual_machine::vm::Computer;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "Awaiting your input: ";

/// Runs `computer` to completion, asking `reader` for one integer per line
/// whenever the program needs input.
///
/// Each output value is written to `writer` as `Writing output: N` as soon as
/// the run that produced it returns. Blank lines are skipped. Returns every
/// output value in order.
pub fn drive<R: BufRead, W: Write>(
    computer: &mut Computer,
    mut reader: R,
    mut writer: W,
) -> Result<Vec<Cell>, InteractiveError> {
    let mut input = VecDeque::new();
    let mut outputs = Vec::new();

    loop {
        let result = computer.run(&mut input)?;
        for value in result.output {
            writeln!(writer, "Writing output: {value}")?;
            outputs.push(value);
        }
        if result.halted {
            writer.flush()?;
            return Ok(outputs);
        }

        input.push_back(prompt(&mut reader, &mut writer)?);
    }
}

fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<Cell, InteractiveError> {
    let mut line = String::new();
    loop {
        write!(writer, "{PROMPT}")?;
        writer.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(InteractiveError::InputClosed);
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        return text
            .parse()
            .map_err(|source| InteractiveError::InvalidInteger {
                line: text.to_string(),
                source,
            });
    }
}
