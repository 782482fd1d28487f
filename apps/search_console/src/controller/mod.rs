//! Controller layer: backend outcomes, slot state transitions, and command orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;

pub use events::{AnchorChange, BackendEvent, Slot, SlotError, SlotErrorCategory};
pub use orchestration::{RequestLimits, SearchController};
pub use reducer::{SlotStatus, ViewState};
