//! HTTP inbound adapter exposing REST endpoints.

pub mod diagnostics;
pub mod error;
pub mod health;
pub mod state;
pub mod users;

pub use error::ApiResult;
