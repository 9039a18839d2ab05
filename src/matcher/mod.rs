//! Pattern matching for base58 addresses.
//!
//! A pattern constrains the start and/or the end of the address, either
//! exactly or ignoring case.

mod pattern;

pub use pattern::{is_match, SearchPattern};
