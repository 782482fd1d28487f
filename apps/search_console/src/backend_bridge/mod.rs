//! Worker side of the controller: runs queued commands against the search API.

pub mod commands;
pub mod runtime;
