use crate::virtual_machine::Cell;
use crate::virtual_machine::errors::VMError;
use intcode_derive::Error;
use std::num::ParseIntError;

/// Errors raised while running an amplifier network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A network needs at least one amplifier.
    #[error("no phase settings given")]
    NoPhases,
    /// One amplifier's program aborted.
    #[error("amplifier {stage} aborted: {source}")]
    Amplifier {
        stage: usize,
        #[source]
        source: VMError,
    },
    /// A linear-chain amplifier stopped for input instead of halting.
    #[error("amplifier {stage} is waiting for input in a linear chain")]
    DidNotHalt { stage: usize },
    /// The last amplifier finished without producing a signal.
    #[error("last amplifier produced no signal")]
    NoSignal,
    /// A whole feedback round passed with every running amplifier starved.
    #[error("feedback loop deadlocked: every running amplifier is waiting for input")]
    Deadlock,
}

/// Errors raised by the hull-painting robot.
#[derive(Debug, Error)]
pub enum RobotError {
    /// The robot's program aborted.
    #[error("robot program aborted: {0}")]
    Vm(#[from] VMError),
    /// A run returned something other than one paint/turn pair.
    #[error("expected a paint/turn pair, got {count} output values")]
    MalformedOutput { count: usize },
}

/// Errors raised while driving a computer from a line-based reader.
#[derive(Debug, Error)]
pub enum InteractiveError {
    /// The program aborted.
    #[error("program aborted: {0}")]
    Vm(#[from] VMError),
    /// Reading input or writing the prompt failed.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// Input ended while the program still expected a value.
    #[error("input closed while the program was waiting for a value")]
    InputClosed,
    /// An input line is not an integer.
    #[error("'{line}' is not an integer")]
    InvalidInteger {
        line: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors raised by the noun/verb search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The patched program aborted.
    #[error("program aborted: {0}")]
    Vm(#[from] VMError),
    /// The program asked for input; the search supplies none.
    #[error("program requested input")]
    NeedsInput,
    /// No noun/verb pair produced the target.
    #[error("no noun/verb pair produces {target}")]
    NotFound { target: Cell },
}
