pub mod commands;
mod runner;

pub use runner::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};
