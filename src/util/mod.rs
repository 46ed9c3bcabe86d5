//! Utility functions for common operations.
//!
//! - **URL validation**: scheme and host checks before a feed is requested
//! - **Text processing**: character-count truncation for article summaries
//! - **Clock**: the time source used to stamp results

mod clock;
mod text;
mod url_validator;

pub use clock::{Clock, SystemClock};
pub use text::truncate_chars;
pub use url_validator::{validate_feed_url, UrlValidationError};
