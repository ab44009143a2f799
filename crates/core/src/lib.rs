//! Pocket Mall Core - Shared types library.
//!
//! This crate provides the domain types shared by the storefront service and
//! its tests:
//! - Product and shopper identifiers
//! - Prices in Korean won with display formatting
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
