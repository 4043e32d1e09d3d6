// Core modules implementing exclusion parsing, filtering, and resolution.
pub mod error;
pub mod exclusions;
pub mod modlet;
pub mod providers;
pub mod resolver;
pub mod search;
