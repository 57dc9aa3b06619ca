//! Intcode computer command-line driver.
//!
//! Loads a program file and runs it in one of several modes.
//!
//! # Usage
//! ```text
//! intcode <program> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `program`: Comma-separated Intcode program file
//!
//! # Options
//! - `-m, --mode <mode>`: `run`, `interactive`, `linear`, `feedback`, `robot` or `restore`
//! - `-i, --input <n>`: Queue an input value (repeatable)
//! - `-p, --phases <a,b,..>`: Phase set for amplifier searches
//! - `-s, --start <colour>`: Robot starting panel colour
//! - `-t, --target <n>`: Value the restore search looks for
//! - `--trace`: Log every executed instruction
//!
//! # Environment
//! - `INTCODE_LOG`: Minimum log level (`trace`, `info`, `warn`, `error`)
//! - `INTCODE_LOG_TIMESTAMPS`: Set to `0` to hide the elapsed-time prefix

use intcode::orchestration::interactive;
use intcode::orchestration::network::{self, Topology};
use intcode::orchestration::noun_verb::find_noun_verb;
use intcode::orchestration::robot::Robot;
use intcode::utils::log::{self, Level, SHOW_TIMESTAMP};
use intcode::virtual_machine::Cell;
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::Computer;
use intcode::{error, info, warn};
use std::env;
use std::fmt::Display;
use std::io;
use std::process;
use std::str::FromStr;
use std::sync::atomic::Ordering;

/// Value the gravity-assist program must leave at address 0.
const DEFAULT_TARGET: Cell = 19690720;

const USAGE: &str = "\
Intcode Computer

USAGE:
    {program} <program> [OPTIONS]

ARGS:
    <program>    Comma-separated Intcode program file

OPTIONS:
    -m, --mode <mode>       run | interactive | linear | feedback | robot | restore (default run)
    -i, --input <n>         Queue an input value for run mode (repeatable)
    -p, --phases <a,b,..>   Phase set for linear/feedback (defaults 0,1,2,3,4 / 5,6,7,8,9)
    -s, --start <colour>    Robot starting panel colour (default 0)
    -t, --target <n>        Restore-mode target value (default 19690720)
        --trace             Log every executed instruction
    -h, --help              Print this help message

EXAMPLES:
    # Run with two queued inputs and print the outputs
    {program} program.txt -i 1 -i 5

    # Best feedback-loop signal
    {program} amplifier.txt -m feedback

    # Paint the hull starting on a white panel
    {program} robot.txt -m robot -s 1
";

/// What the binary was asked to do with the loaded program.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    Run,
    Interactive,
    Linear,
    Feedback,
    Robot,
    Restore,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Mode::Run),
            "interactive" => Ok(Mode::Interactive),
            "linear" => Ok(Mode::Linear),
            "feedback" => Ok(Mode::Feedback),
            "robot" => Ok(Mode::Robot),
            "restore" => Ok(Mode::Restore),
            other => Err(format!("Unknown mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Options {
    path: String,
    mode: Mode,
    inputs: Vec<Cell>,
    phases: Option<Vec<Cell>>,
    start: Cell,
    target: Cell,
    trace: bool,
}

#[derive(Debug, PartialEq)]
enum Invocation {
    Help,
    Execute(Options),
}

fn parse_value<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid value for {flag}: '{value}'"))
}

fn parse_phases(value: &str) -> Result<Vec<Cell>, String> {
    value
        .split(',')
        .map(|phase| parse_value("--phases", phase))
        .collect()
}

/// Parses everything after the binary name.
fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let Some(first) = args.first() else {
        return Err("Missing program file".to_string());
    };
    if first == "-h" || first == "--help" {
        return Ok(Invocation::Help);
    }

    let mut options = Options {
        path: first.clone(),
        mode: Mode::Run,
        inputs: Vec::new(),
        phases: None,
        start: 0,
        target: DEFAULT_TARGET,
        trace: false,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .map(String::as_str)
                .ok_or_else(|| format!("{flag} requires an argument"))
        };
        match flag {
            "--mode" | "-m" => {
                options.mode = value()?.parse()?;
                i += 1;
            }
            "--input" | "-i" => {
                options.inputs.push(parse_value(flag, value()?)?);
                i += 1;
            }
            "--phases" | "-p" => {
                options.phases = Some(parse_phases(value()?)?);
                i += 1;
            }
            "--start" | "-s" => {
                options.start = parse_value(flag, value()?)?;
                i += 1;
            }
            "--target" | "-t" => {
                options.target = parse_value(flag, value()?)?;
                i += 1;
            }
            "--trace" => options.trace = true,
            "--help" | "-h" => return Ok(Invocation::Help),
            other => return Err(format!("Unexpected argument: {other}")),
        }
        i += 1;
    }

    Ok(Invocation::Execute(options))
}

fn configure_logging(trace: bool) {
    if let Ok(level) = env::var("INTCODE_LOG") {
        match level.parse::<Level>() {
            Ok(level) => log::set_level(level),
            Err(e) => warn!("Ignoring INTCODE_LOG: {e}"),
        }
    }
    if trace {
        log::set_level(Level::Trace);
    }
    if env::var("INTCODE_LOG_TIMESTAMPS").is_ok_and(|v| v.trim() == "0") {
        SHOW_TIMESTAMP.store(false, Ordering::Relaxed);
    }
}

fn fail(context: &str, err: impl Display) -> ! {
    error!("{context}: {err}");
    process::exit(1);
}

fn run(program: &Program, inputs: &[Cell]) {
    let mut computer = Computer::new(program);
    let result = computer
        .run_with(inputs.iter().copied())
        .unwrap_or_else(|e| fail("Program aborted", e));

    for value in &result.output {
        println!("{value}");
    }
    if result.halted {
        info!("Halted with memory[0] = {}", computer.memory()[0]);
    } else {
        warn!(
            "Program is waiting for more input at pc={} ({} values consumed)",
            computer.pc(),
            inputs.len()
        );
    }
}

fn amplify(program: &Program, topology: Topology, phases: Option<Vec<Cell>>) {
    let phases = phases.unwrap_or_else(|| topology.default_phases().to_vec());
    let best = network::search(program, &phases, topology)
        .unwrap_or_else(|e| fail("Amplifier search failed", e));
    info!("Best {topology} phase order: {:?}", best.phases);
    println!("{}", best.signal);
}

fn paint(program: &Program, start: Cell) {
    let mut robot = Robot::new(program, start);
    let hull = robot
        .run()
        .unwrap_or_else(|e| fail("Robot stopped", e));
    info!("Painted {} panels", hull.painted());
    println!("{}", hull.painted());
    println!("{}", hull.render());
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let binary = args.first().map(String::as_str).unwrap_or("intcode");

    let options = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Invocation::Execute(options)) => options,
        Ok(Invocation::Help) => {
            print_usage(binary);
            process::exit(0);
        }
        Err(e) => {
            error!("{e}\n");
            print_usage(binary);
            process::exit(1);
        }
    };

    configure_logging(options.trace);

    let program =
        Program::load(&options.path).unwrap_or_else(|e| fail(&format!("Cannot load {}", options.path), e));
    info!("Loaded {} ({} cells)", options.path, program.len());

    match options.mode {
        Mode::Run => run(&program, &options.inputs),
        Mode::Interactive => {
            let mut computer = Computer::new(&program);
            if let Err(e) = interactive::drive(&mut computer, io::stdin().lock(), io::stdout().lock()) {
                fail("Interactive session ended", e);
            }
        }
        Mode::Linear => amplify(&program, Topology::Linear, options.phases),
        Mode::Feedback => amplify(&program, Topology::Feedback, options.phases),
        Mode::Robot => paint(&program, options.start),
        Mode::Restore => match find_noun_verb(&program, options.target) {
            Ok(answer) => println!("{answer}"),
            Err(e) => fail("Restore search failed", e),
        },
    }
}

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
