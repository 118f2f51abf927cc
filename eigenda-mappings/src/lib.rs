//! EigenDA event-to-entity projection mappings.
//!
//! Each handler in this crate is a pure transformation: take one decoded
//! on-chain event or call together with its block/transaction context,
//! derive a deterministic entity identifier, and persist normalized fields
//! through an injected [`store::EntityStore`]. Append-only projectors write
//! immutable records exactly once; reconciliation projectors load, mutate,
//! and save the mutable "current state" entities (operators, aggregate
//! quorum keys, active reservations).
//!
//! Block traversal, RPC transport, and ABI decoding live outside this crate
//! (see `eigenda-indexer`); the boundaries are the [`store::EntityStore`]
//! and [`reader::ContractReader`] traits plus the decoded payload types in
//! [`events`].

pub mod dispatch;
pub mod entities;
pub mod error;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod reader;
pub mod store;

pub use dispatch::{ChainEvent, dispatch};
pub use error::MappingError;
pub use events::EventContext;
pub use store::EntityStore;
