//! HTTP protocol layer.
//!
//! Protocol-level building blocks, decoupled from request routing:
//! Range parsing, MIME inference, response builders, and the bounded
//! transfer engine with its body plumbing.

pub mod body;
pub mod mime;
pub mod range;
pub mod response;
pub mod transfer;

// Re-export the types the handler layer touches constantly.
pub use body::Body;
pub use range::{parse_range, ByteRange, RangeError};
