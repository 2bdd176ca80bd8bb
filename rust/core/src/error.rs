// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for core operations.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter set failed validation.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Parameters could not be parsed.
    #[error("parameter parse error: {0}")]
    Parse(String),
}
