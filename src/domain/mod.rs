//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep API DTOs, config-file DTOs and the output document in one place.
//! - Make `--list` schema changes explicit and reviewable.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! `InventoryDocument` is consumed by the control plane as-is. Keep it in
//! sync with `docs/contracts/inventory-list.schema.json`.

pub mod models;
