use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all podlock operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PodlockError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (Podfile.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Podfile.toml for syntax errors"))]
    Manifest { message: String },

    /// Invalid or malformed registry spec for a package.
    #[error("Spec error for {package}: {message}")]
    Spec { package: String, message: String },

    /// Invalid or unreadable lockfile (Podfile.lock.toml).
    #[error("Lockfile error: {message}")]
    #[diagnostic(help("Delete Podfile.lock.toml and run `podlock lock` to regenerate it"))]
    Lockfile { message: String },

    /// A requirement names a package the registry does not carry.
    #[error("Unknown package {package} (required by {requested_by})")]
    UnknownPackage {
        package: String,
        requested_by: String,
    },

    /// No registry version satisfies all requirements on a package.
    #[error("No version of {package} satisfies all requirements:\n{requirements}")]
    #[diagnostic(help("Loosen one of the listed requirements or publish a satisfying version"))]
    Unsatisfiable {
        package: String,
        requirements: String,
    },

    /// A locked checksum does not match the recomputed spec content.
    #[error("Checksum mismatch for {package}: expected {expected}, got {actual}")]
    #[diagnostic(help(
        "The registry content changed since the lockfile was written. \
         Re-run `podlock lock` if this is intentional."
    ))]
    ChecksumMismatch {
        package: String,
        expected: String,
        actual: String,
    },

    /// Invalid project configuration (dependency cycles, non-convergence).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type PodlockResult<T> = miette::Result<T>;
