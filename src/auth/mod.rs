//! Authentication and cookie management.
//!
//! Provides cookie loading from Netscape-format cookie files (exported from
//! browsers or browser extensions) and from loose `name=value` files, and
//! turns them into a request-header value for authenticated provider calls.

mod cookies;

pub use cookies::{
    CookieError, CookiePair, cookie_header_from_file, parse_cookie_pairs, to_cookie_header,
};
