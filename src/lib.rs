//! Purpose: Shared core library crate used by the `modsift` CLI and tests.
//! Exports: `api` (resolver, filters, exclusion configuration, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
mod core;
