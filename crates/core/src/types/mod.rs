//! Core types for OKAMI.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;
pub mod phone;
pub mod price;
pub mod status;
pub mod wilaya;

pub use credential::StoredCredential;
pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use price::Price;
pub use status::*;
pub use wilaya::{WILAYAS, Wilaya, WilayaError};
