//! Adapters for the domain ports: storage backends, the broadcast change
//! feed and the offline payment gateway.

pub mod feed;
pub mod in_memory;
pub mod payment;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
