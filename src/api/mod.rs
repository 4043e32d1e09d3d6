//! Purpose: Define the stable public Rust API boundary for modsift.
//! Exports: Resolver, filters, exclusion configuration, and error types.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to the core modules.
//! Invariants: Internal modules remain private and are not directly exposed.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::exclusions::{parse_exclusions, ExclusionSet};
pub use crate::core::modlet::{
    filter_modlets, parse_document, Modlet, ModletDocument, ModletFilter, Modlets, Schema, Service,
};
pub use crate::core::providers::{filter_providers, ProviderFilter};
pub use crate::core::resolver::{
    DiscoveryLocations, Resolver, DEFAULT_MODLET_LOCATION, DEFAULT_PROVIDER_LOCATION,
};
pub use crate::core::search::{DirSearch, ResourceSearch};
