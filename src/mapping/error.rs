//! Error definitions for the mapping module

use thiserror::Error;

/// Errors raised while parsing physical input mappings from their textual form
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The mapping does not consist of `framework/index/kind/key`
    #[error("Malformed input mapping '{0}': expected <framework>/<index>/<kind>/<key>")]
    Malformed(String),

    /// The framework segment names no known input framework
    #[error("Unknown device framework: {0}")]
    UnknownFramework(String),

    /// The kind segment names no known device kind
    #[error("Unknown device kind: {0}")]
    UnknownDeviceKind(String),

    /// The index segment is not a device number
    #[error("Invalid device index '{0}'")]
    InvalidIndex(String),

    /// The name is not one of the console's virtual inputs
    #[error("Unknown virtual target: {0}")]
    UnknownTarget(String),
}
