//! Amplifier networks.
//!
//! Every amplifier runs its own [`Computer`] over a private copy of the same
//! program and first receives its phase setting. In a [`Topology::Linear`]
//! chain each amplifier runs to completion once and hands its output to the
//! next. In a [`Topology::Feedback`] loop the last amplifier's output goes
//! back to the first, and the amplifiers take turns until the last one halts.

use crate::orchestration::errors::NetworkError;
use crate::trace;
use crate::virtual_machine::Cell;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::Computer;
use itertools::Itertools;
use std::collections::VecDeque;
use std::fmt;

/// How amplifier outputs are wired to inputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Topology {
    Linear,
    Feedback,
}

impl Topology {
    /// Runs one network of this shape and returns the final signal.
    pub fn run(self, program: &Program, phases: &[Cell]) -> Result<Cell, NetworkError> {
        match self {
            Topology::Linear => run_linear(program, phases),
            Topology::Feedback => run_feedback(program, phases),
        }
    }

    /// Phase settings this topology is searched over.
    pub fn default_phases(self) -> [Cell; 5] {
        match self {
            Topology::Linear => [0, 1, 2, 3, 4],
            Topology::Feedback => [5, 6, 7, 8, 9],
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Linear => write!(f, "linear"),
            Topology::Feedback => write!(f, "feedback"),
        }
    }
}

/// Highest signal found by [`search`] and the phase order that produced it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Best {
    pub signal: Cell,
    pub phases: Vec<Cell>,
}

/// Runs a chain where amplifier `i` gets `[phase_i, outputs of i - 1...]` and
/// the first one gets `[phase_0, 0]`.
///
/// Each amplifier must halt within its single run. The result is the last
/// value the final amplifier output.
pub fn run_linear(program: &Program, phases: &[Cell]) -> Result<Cell, NetworkError> {
    if phases.is_empty() {
        return Err(NetworkError::NoPhases);
    }

    let mut carry = VecDeque::from([0]);
    for (stage, &phase) in phases.iter().enumerate() {
        let mut input = VecDeque::with_capacity(carry.len() + 1);
        input.push_back(phase);
        input.extend(carry.drain(..));

        let mut computer = Computer::new(program);
        let result = computer
            .run(&mut input)
            .map_err(|source| NetworkError::Amplifier { stage, source })?;
        if !result.halted {
            return Err(NetworkError::DidNotHalt { stage });
        }
        trace!("amplifier {stage} (phase {phase}) -> {:?}", result.output);
        carry = result.output;
    }

    carry.back().copied().ok_or(NetworkError::NoSignal)
}

/// Runs a loop where amplifier `i` feeds amplifier `i + 1` and the last
/// feeds the first. The first amplifier starts with `[phase_0, 0]`.
///
/// Amplifiers take turns in order, each running until it needs input or
/// halts. The loop ends when the last amplifier halts, and the result is the
/// last value it output. A round in which no amplifier consumes input,
/// outputs anything or halts is a [`NetworkError::Deadlock`].
pub fn run_feedback(program: &Program, phases: &[Cell]) -> Result<Cell, NetworkError> {
    if phases.is_empty() {
        return Err(NetworkError::NoPhases);
    }

    let count = phases.len();
    let last = count - 1;
    let mut computers: Vec<Computer> = phases.iter().map(|_| Computer::new(program)).collect();
    let mut queues: Vec<VecDeque<Cell>> = phases.iter().map(|&p| VecDeque::from([p])).collect();
    queues[0].push_back(0);

    let mut signal = None;
    let mut round = 0usize;
    loop {
        let mut progressed = false;
        for stage in 0..count {
            if computers[stage].is_halted() {
                continue;
            }

            let queued = queues[stage].len();
            let result = computers[stage]
                .run(&mut queues[stage])
                .map_err(|source| NetworkError::Amplifier { stage, source })?;
            progressed |= result.halted || !result.output.is_empty() || queues[stage].len() != queued;

            if stage == last {
                if let Some(&value) = result.output.back() {
                    signal = Some(value);
                }
            }
            queues[(stage + 1) % count].extend(result.output);

            if stage == last && result.halted {
                trace!("feedback loop settled after {} rounds", round + 1);
                return signal.ok_or(NetworkError::NoSignal);
            }
        }

        if !progressed {
            return Err(NetworkError::Deadlock);
        }
        round += 1;
    }
}

/// Tries every ordering of `phases` and returns the one with the highest signal.
///
/// Orderings are visited in lexicographic order, and ties keep the first one.
/// Repeated phase values yield repeated orderings. Any amplifier failure
/// aborts the whole search.
pub fn search(program: &Program, phases: &[Cell], topology: Topology) -> Result<Best, NetworkError> {
    if phases.is_empty() {
        return Err(NetworkError::NoPhases);
    }

    let mut sorted = phases.to_vec();
    sorted.sort_unstable();

    let mut best: Option<Best> = None;
    for order in sorted.iter().copied().permutations(sorted.len()) {
        let signal = topology.run(program, &order)?;
        trace!("{topology} {order:?} -> {signal}");
        if best.as_ref().is_none_or(|b| signal > b.signal) {
            best = Some(Best {
                signal,
                phases: order,
            });
        }
    }

    best.ok_or(NetworkError::NoPhases)
}
