//! The course phase authority service.
//!
//! Owns read access to course phase role mappings and participations and
//! answers the two lookups other services delegate to it. Every request is
//! authenticated again here with the caller's own credential.

pub mod app;
pub mod config;
pub mod service;
pub mod store;
