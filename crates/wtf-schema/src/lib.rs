//! Shared types and wire formats for wtf.
//!
//! Everything in this crate is a plain value: versions, constraints, the
//! host platform, digests and the documents served by the release host.
//! Nothing here touches the filesystem or the network.

pub mod checksums;
pub mod constraint;
pub mod hash;
pub mod index;
pub mod platform;
pub mod version;

// Re-exports
pub use checksums::ChecksumManifest;
pub use constraint::{Constraint, ConstraintError, Operator};
pub use hash::Sha256Digest;
pub use index::{Build, ReleaseEntry, ReleaseIndex};
pub use platform::Platform;
pub use version::{Version, VersionError};

/// Name of the tool whose versions are managed.
pub const TOOL_NAME: &str = "terraform";

/// Default location of the upstream release host for [`TOOL_NAME`].
pub const DEFAULT_RELEASE_URL: &str = "https://releases.hashicorp.com/terraform";
