//! Intcode library.
//!
//! Provides the Intcode virtual machine, the drivers that wire several machines
//! together, and the logging utilities shared by the command-line front end.

pub mod orchestration;
pub mod utils;
pub mod virtual_machine;
