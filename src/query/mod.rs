//! Query layer: cache keys, the keyed cache, and bindings from stores to reads.

pub mod binding;
pub mod client;
pub mod key;

pub use binding::{ListQuery, ListRequest, ResourceQuery};
pub use client::{QueryClient, QueryState};
pub use key::{EntityKind, QueryKey};
