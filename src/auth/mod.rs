//! Session-based authentication for the API.

pub mod db;
pub mod middleware;

pub use middleware::{AuthContext, SESSION_COOKIE_NAME};
