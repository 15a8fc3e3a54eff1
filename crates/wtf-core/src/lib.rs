//! Core library for wtf.
//!
//! The pipeline is synchronous and runs in a fixed order:
//!
//! ```text
//! VersionStore::load ─► find_latest ─► (Installer::download_version) ─► Executor::run
//!                                           │                              │
//!                                     ReleaseCatalog                    Wrapper
//! ```
//!
//! Side effects live in [`io`] (network and archives), [`store`] (the
//! version directory), [`wrapper`] (temporary scripts) and [`exec`] (the
//! child process). [`resolve`] is pure.

pub mod catalog;
pub mod exec;
pub mod install;
pub mod io;
pub mod reporter;
pub mod resolve;
pub mod store;
pub mod wrapper;

pub use catalog::{ReleaseCatalog, ReleaseSource};
pub use exec::{ExecError, Executor, exit_code};
pub use install::{BatchError, InstallError, InstallFailure, InstallReport, Installer};
pub use io::fetch::FetchError;
pub use reporter::{NullReporter, Reporter};
pub use store::{StoreError, VersionStore};
pub use wrapper::{Invocation, Wrapper, WrapperError};

/// User Agent string for requests to the release host
pub const USER_AGENT: &str = concat!("wtf/", env!("CARGO_PKG_VERSION"));

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Wrapper(#[from] WrapperError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}
