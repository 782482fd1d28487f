//! Book search console: an orchestration controller over the search API plus
//! the pieces a terminal front end needs to drive it.

pub mod backend_bridge;
pub mod console;
pub mod controller;
pub mod render;

pub use backend_bridge::runtime::start_controller;
pub use controller::{SearchController, ViewState};
