//! Application-level helpers shared by the CLI and the library entry points.

mod url;

pub use url::validate_and_normalize_url;
