//! Cross-cluster replication event cache.
//!
//! Replication workers in different regions frequently request the same
//! slice of a workflow's history within a short window. This module caches
//! fetched slices so concurrent consumers share one copy instead of
//! refetching from the source of truth.
//!
//! # Layering
//!
//! [`BoundedCache`] is the generic engine wrapper: a typed, byte-weighed,
//! TTL-bounded container. [`XdcCache`] specializes it to history slices
//! keyed by [`XdcCacheKey`] and adds the duplicate-write diagnostics that
//! make inconsistent producers visible without ever failing a write.
//!
//! # Cost accounting
//!
//! The cache is budgeted in bytes, not entries. Every cached value reports
//! its approximate cost through [`CacheWeight`]; the engine charges that
//! weight against the budget and evicts under pressure.

pub mod bounded;
pub mod key;
pub mod xdc;

pub use bounded::{BoundedCache, BoundedCacheOptions, CacheWeight};
pub use key::{XdcCacheKey, XdcCacheValue};
pub use xdc::{XdcCache, XdcCacheConfig, XdcCacheStats};
