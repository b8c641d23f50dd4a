//! The command-execution boundary to the external engine.
//!
//! Nothing in the pipeline spawns a process directly; every external
//! invocation goes through the [`traits::CommandRunner`] abstraction. The
//! production implementation lives in [`process`]; tests substitute scripted
//! runners that simulate the engine without touching a real binary.

pub mod process;
pub mod traits;

#[cfg(test)]
pub(crate) mod scripted;
