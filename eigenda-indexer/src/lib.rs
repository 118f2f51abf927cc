//! EigenDA event indexer library.
//!
//! Fetches event logs from the EigenDA contract suite (service manager,
//! registry coordinator, BLS APK registry, ejection manager, payment
//! vault) and projects them into JSON entity documents through the
//! `eigenda-mappings` handlers.

pub mod abi;
pub mod chains;
pub mod checkpoint;
pub mod config;
pub mod store;
pub mod sync;
