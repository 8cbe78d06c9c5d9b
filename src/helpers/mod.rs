//! Helper functions for templates
//!
//! Date formatting in the site's locale and timezone, and URL generation
//! relative to the configured root.

mod date;
mod url;

pub use date::*;
pub use url::*;
