//! Hull-painting robot.
//!
//! The robot stands on a grid of panels, all black (0) unless painted. Each
//! cycle it feeds the colour under it to its computer and expects two outputs
//! back: the colour to paint, then a turn (0 = left 90°, anything else = right
//! 90°). It then moves forward one panel. The cycle repeats until the program
//! halts; the run that halts must still deliver its pair. `y` grows upward.

use crate::orchestration::errors::RobotError;
use crate::trace;
use crate::virtual_machine::Cell;
use crate::virtual_machine::program::Program;
use crate::virtual_machine::vm::Computer;
use std::collections::{BTreeMap, VecDeque};

/// Grid position `(x, y)`.
pub type Position = (Cell, Cell);

pub const BLACK: Cell = 0;
pub const WHITE: Cell = 1;

/// Direction the robot faces, in clockwise order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    const CLOCKWISE: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

    fn rotate(self, quarter_turns: usize) -> Self {
        Self::CLOCKWISE[(self as usize + quarter_turns) % 4]
    }

    pub fn turn_right(self) -> Self {
        self.rotate(1)
    }

    pub fn turn_left(self) -> Self {
        self.rotate(3)
    }

    /// Unit step `(dx, dy)` in this direction.
    pub fn delta(self) -> Position {
        match self {
            Heading::Up => (0, 1),
            Heading::Right => (1, 0),
            Heading::Down => (0, -1),
            Heading::Left => (-1, 0),
        }
    }
}

/// Sparse map of painted panels.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hull {
    panels: BTreeMap<Position, Cell>,
}

impl Hull {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hull whose origin panel is already painted `colour`.
    pub fn with_start(colour: Cell) -> Self {
        let mut hull = Self::new();
        hull.paint((0, 0), colour);
        hull
    }

    /// Colour of the panel at `position`; unpainted panels are black.
    pub fn colour(&self, position: Position) -> Cell {
        self.panels.get(&position).copied().unwrap_or(BLACK)
    }

    pub fn paint(&mut self, position: Position, colour: Cell) {
        self.panels.insert(position, colour);
    }

    /// Number of panels painted at least once.
    pub fn painted(&self) -> usize {
        self.panels.len()
    }

    /// Draws every painted panel's bounding box, highest row first.
    /// White panels are `#`, everything else a space.
    pub fn render(&self) -> String {
        let Some(((min_x, max_x), (min_y, max_y))) = self.bounds() else {
            return String::new();
        };

        let rows: Vec<String> = (min_y..=max_y)
            .rev()
            .map(|y| {
                (min_x..=max_x)
                    .map(|x| if self.colour((x, y)) == WHITE { '#' } else { ' ' })
                    .collect()
            })
            .collect();
        rows.join("\n")
    }

    /// `((min_x, max_x), (min_y, max_y))` over every painted panel.
    fn bounds(&self) -> Option<((Cell, Cell), (Cell, Cell))> {
        let mut keys = self.panels.keys();
        let &(x, y) = keys.next()?;
        let init = ((x, x), (y, y));
        Some(keys.fold(init, |((lx, hx), (ly, hy)), &(x, y)| {
            ((lx.min(x), hx.max(x)), (ly.min(y), hy.max(y)))
        }))
    }
}

/// Robot driven by an Intcode program.
#[derive(Clone, Debug)]
pub struct Robot {
    computer: Computer,
    hull: Hull,
    position: Position,
    heading: Heading,
    finished: bool,
}

impl Robot {
    /// Places a robot at the origin facing up. The origin starts `start_colour`;
    /// a black start leaves the hull unpainted.
    pub fn new(program: &Program, start_colour: Cell) -> Self {
        let hull = if start_colour == BLACK {
            Hull::new()
        } else {
            Hull::with_start(start_colour)
        };
        Self {
            computer: Computer::new(program),
            hull,
            position: (0, 0),
            heading: Heading::Up,
            finished: false,
        }
    }

    pub fn hull(&self) -> &Hull {
        &self.hull
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Runs one paint/turn/move cycle. Returns whether the program is still running.
    pub fn step(&mut self) -> Result<bool, RobotError> {
        if self.finished {
            return Ok(false);
        }

        let mut input = VecDeque::from([self.hull.colour(self.position)]);
        let result = self.computer.run(&mut input)?;
        if result.output.len() != 2 {
            return Err(RobotError::MalformedOutput {
                count: result.output.len(),
            });
        }
        let (colour, turn) = (result.output[0], result.output[1]);

        self.hull.paint(self.position, colour);
        self.heading = if turn == 0 {
            self.heading.turn_left()
        } else {
            self.heading.turn_right()
        };
        let (dx, dy) = self.heading.delta();
        self.position = (
            self.position.0.wrapping_add(dx),
            self.position.1.wrapping_add(dy),
        );
        trace!(
            "painted {colour}, now at {:?} facing {:?}",
            self.position, self.heading
        );

        self.finished = result.halted;
        Ok(!self.finished)
    }

    /// Cycles until the program halts and returns the painted hull.
    pub fn run(&mut self) -> Result<&Hull, RobotError> {
        while self.step()? {}
        Ok(&self.hull)
    }
}
