//! Core module - filter resolution

pub mod error;
pub mod filter;

pub use error::{IdentityKind, ResolveError};
pub use filter::{FilterRequest, FilterResolver, ResolvedQuery, SortField, DEFAULT_STATES};
