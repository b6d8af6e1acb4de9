//! Static-method repositories. Each takes a `&PgPool` and returns raw
//! `sqlx::Error`; [`crate::store::PgStore`] maps those into store errors.

pub mod session_repo;
pub mod user_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
