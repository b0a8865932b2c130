//! OKAMI Core - Shared domain types.
//!
//! This crate provides the types shared by the OKAMI components:
//! - `api` - The action router, order validator and admin session gate
//! - `cli` - Command-line tools for migrations and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, statuses, phone numbers, wilayas and stored credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
