//! Domain primitives, ports, and services.
//!
//! Purpose: define the user resource model and its use-cases independently of
//! HTTP and of the document store. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User / UserId / UserDraft / UserPatch: the user resource.
//! - UserService: implementation of the user driving ports.

pub mod error;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::user::{User, UserDraft, UserId, UserPatch, UserValidationError};
pub use self::user_service::{USER_NOT_FOUND_MESSAGE, UserService};

/// Response header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";
