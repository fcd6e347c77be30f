//! Error kinds surfaced by the bundling pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Generic result type used across the crate.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors raised while assembling or compiling a bundle.
///
/// Every error aborts the current `compile` call; the target file is only
/// written after the full pipeline succeeds.
#[derive(Debug, Error)]
pub enum BundleError {
    /// The compile target's extension maps to no known compressor.
    #[error(
        "target extension is invalid, it must end with one of the following extensions (css|js): `{}`",
        .path.display()
    )]
    InvalidTargetExtension {
        /// Target path that was rejected.
        path: PathBuf,
    },

    /// A referenced asset could not be read, enumerated, or fetched.
    #[error("failed to resolve asset `{asset}`")]
    AssetResolution {
        /// Path or URL of the asset that failed.
        asset: String,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// An external transform or compressor process failed.
    #[error("filter `{filter}` failed")]
    FilterExecution {
        /// Name of the filter that failed.
        filter: String,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// The compiled bundle could not be written to the target path.
    #[error("failed to write bundle to `{}`", .path.display())]
    WriteFailed {
        /// Target path of the attempted write.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },
}
