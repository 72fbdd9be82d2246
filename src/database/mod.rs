pub mod auth;
pub mod cache;
pub mod guide;
pub mod redis_connection;
pub mod schedule;

pub use cache::*;
pub use redis_connection::*;
