//! Shared utilities for the facility monitoring backend.
//!
//! This crate provides functionality used across the other crates:
//! - Hashing helpers for the audit hash chain and secret comparison
//! - Session token verification
//! - Field validators
//! - Opaque keyset cursors

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod validation;
