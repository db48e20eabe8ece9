//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `list.rs` — `--list`: project lookup, update wait, inventory load, JSON output.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*` and `inventory/*`.
//! - Keep behavior and output schema stable.

pub mod list;

pub use list::handle_list;
