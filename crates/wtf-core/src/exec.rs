//! Run the resolved binary as a child process.

use std::io;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use wtf_schema::{TOOL_NAME, Version};

use crate::store::VersionStore;
use crate::wrapper::{Wrapper, WrapperError};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Wrap(WrapperError),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to clean up after run: {0}")]
    Cleanup(#[source] WrapperError),
}

#[derive(Debug, Clone)]
pub struct Executor {
    program_name: String,
    verbose: bool,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Executor {
    pub fn new(verbose: bool) -> Self {
        Self {
            program_name: TOOL_NAME.to_string(),
            verbose,
        }
    }

    /// Run `version` from `store` with `args`, inheriting stdio and the
    /// working directory, and wait for it.
    ///
    /// The wrapper is always cleaned up before returning. A non-zero exit is
    /// not an error; inspect the returned status.
    pub fn run(
        &self,
        store: &VersionStore,
        version: &Version,
        args: &[String],
        wrapper: &mut Wrapper,
    ) -> Result<ExitStatus, ExecError> {
        let outcome = self.spawn_and_wait(store, version, args, wrapper);
        let cleanup = wrapper.cleanup();

        let status = outcome?;
        cleanup.map_err(ExecError::Cleanup)?;
        Ok(status)
    }

    fn spawn_and_wait(
        &self,
        store: &VersionStore,
        version: &Version,
        args: &[String],
        wrapper: &mut Wrapper,
    ) -> Result<ExitStatus, ExecError> {
        let binary = store.binary_path(version);
        let invocation = wrapper
            .wrap(binary, args.to_vec(), self.verbose)
            .map_err(ExecError::Wrap)?;
        let program = invocation.program.display().to_string();
        tracing::debug!("running {program} {:?}", invocation.args);

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(&self.program_name);
        }

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;
        let status = child
            .wait()
            .map_err(|source| ExecError::Wait { program, source })?;

        tracing::debug!("{} exited with {status}", self.program_name);
        Ok(status)
    }
}

/// The exit code a parent process should report for `status`.
///
/// Signal-terminated children map to `128 + signal` on Unix, as shells do.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
