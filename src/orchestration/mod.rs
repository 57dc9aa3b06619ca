//! Drivers that run one or more [`Computer`](crate::virtual_machine::vm::Computer)s.
//!
//! All drivers are single-threaded: computers take turns, and a computer that
//! needs input simply returns from `run` until its driver has some to give it.
//!
//! # Modules
//!
//! - [`errors`]: Driver error types
//! - [`interactive`]: Line-based human input for a single computer
//! - [`network`]: Linear and feedback amplifier networks, phase-permutation search
//! - [`noun_verb`]: Search over programs patched at addresses 1 and 2
//! - [`robot`]: Hull-painting robot driven by a computer

pub mod errors;
pub mod interactive;
pub mod network;
pub mod noun_verb;
pub mod robot;
