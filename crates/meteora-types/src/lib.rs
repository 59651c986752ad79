pub mod models;
pub mod wire;

pub use models::{Content, Message, Page};

/// Page size used when a request does not carry a usable `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Offset used when a request does not carry a usable `offset`.
pub const DEFAULT_OFFSET: i64 = 0;
