//! Bottega: a small, self-hosted commerce backend.
//!
//! The interesting part lives in [`cache`]: a typed derived-view cache with
//! event-driven invalidation fan-out, fronting the catalog, order, and
//! dashboard read surfaces. [`application::statistics`] computes the admin
//! dashboard payloads from concurrent store sub-queries on cache miss.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
