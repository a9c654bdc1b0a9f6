//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP query parameters.

use serde::Deserialize;

/// Query string of the lookup endpoint (GET /api?key=...)
///
/// A missing `key` deserializes to the empty string, which the group rejects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiQuery {
    /// The key to look up
    #[serde(default)]
    pub key: String,
}
