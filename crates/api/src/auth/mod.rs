//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session issue: signed access tokens and rotating refresh tokens.

pub mod jwt;
pub mod password;
