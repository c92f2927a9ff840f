//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `Category`: The listing sections of the registry
//! - `HarvestState`: Per-category pagination progress, accumulated summaries and
//!   failure diagnostics
//! - `HarvestPhase`: The phases a category harvest moves through

mod category;
mod harvest_state;

// Re-export main types
pub use category::Category;
pub use harvest_state::{HarvestFailure, HarvestPhase, HarvestState};
