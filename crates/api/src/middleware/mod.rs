//! Authentication and authorization middleware and extractors.
//!
//! - [`auth::resolve_session`] -- Resolves cookies into an [`AuthSession`]
//!   on every request and rotates or clears the cookies.
//! - [`auth::ClientFingerprint`] -- The requester's fingerprint.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`rbac::RequireFreshAuth`] -- Requires a still-valid access token.
//! - [`rbac::RequireAdmin`] -- Requires the admin flag.
//!
//! [`AuthSession`]: crate::auth::session::AuthSession

pub mod auth;
pub mod rbac;
