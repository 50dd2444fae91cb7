//! Command implementations

pub mod cause;
pub mod completions;
pub mod control;
pub mod goal;
pub mod init;
pub mod monitor;
pub mod risk;
pub mod session;
pub mod status;
