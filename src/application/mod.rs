//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `MarketEngine` which acts as the primary entry
//! point for replaying marketplace events. It owns the storage backends and
//! ensures sequential consistency by awaiting storage operations for each
//! event.

pub mod engine;
