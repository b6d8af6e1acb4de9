//! Authentication and authorization primitives.
//!
//! - [`jwt`] -- signed, expiring identity tokens and refresh-token digests.
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`cookies`] -- reading credentials from, and writing them to, cookies.
//! - [`session`] -- the per-request rotation engine.
//! - [`gate`] -- authorization predicates over the resolved session.

pub mod cookies;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod session;
