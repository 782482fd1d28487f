//! Types shared by the search client and the console front end.

pub mod domain;
pub mod error;
pub mod protocol;
