//! Service layer containing business logic and side-effect helpers.
//!
//! ## Service map
//! - `projects.rs` — project lookup, update wait, synced path resolution.
//! - `export.rs` — inventory model to `--list` document.
//! - `settings.rs` — config file + environment layering.
//! - `output.rs` — JSON rendering helpers.
//! - `logging.rs` — tracing subscriber setup (stderr only).
//!
//! ## Conventions
//! - Prefer pure helpers where possible.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod export;
pub mod logging;
pub mod output;
pub mod projects;
pub mod settings;
