use crate::error::{Error, Result};

use std::{
	ffi::OsStr,
	path::{Path, PathBuf},
	process::{Output, Stdio},
	time::Duration,
};

use tokio::{process::Command, time::timeout};
use tracing::{instrument, trace};

/// An external binary (transcoder, probe, office engine) invoked with a bounded run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
	program: PathBuf,
	timeout: Duration,
}

impl ExternalTool {
	pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
		Self {
			program: program.into(),
			timeout,
		}
	}

	#[must_use]
	pub fn program(&self) -> &Path {
		&self.program
	}

	#[must_use]
	pub const fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Runs the tool to completion and returns its stdout.
	///
	/// The child is killed if it outlives the timeout or if the returned future is
	/// dropped before it finishes.
	#[instrument(skip_all, fields(program = %self.program.display()))]
	pub async fn run<I, S>(&self, args: I) -> Result<Vec<u8>>
	where
		I: IntoIterator<Item = S> + Send,
		S: AsRef<OsStr>,
	{
		let mut command = Command::new(&self.program);
		command
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true);

		trace!(?command, "Spawning external tool");

		let child = command.spawn().map_err(|e| {
			Error::external_tool(
				&self.program,
				format!("failed to spawn (is it installed?): {e}"),
			)
		})?;

		let Output {
			status,
			stdout,
			stderr,
		} = timeout(self.timeout, child.wait_with_output())
			.await
			.map_err(|_| Error::ExternalToolTimeout {
				tool: self.program.display().to_string(),
				timeout: self.timeout,
			})?
			.map_err(|e| Error::external_tool(&self.program, format!("failed to wait: {e}")))?;

		if !status.success() {
			return Err(Error::external_tool(
				&self.program,
				format!(
					"exited with {status}: {}",
					String::from_utf8_lossy(&stderr).trim()
				),
			));
		}

		Ok(stdout)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::error::ErrorKind;

	#[tokio::test]
	async fn missing_binary_is_an_external_tool_error() {
		let tool = ExternalTool::new("/definitely/not/here/ffmpeg", Duration::from_secs(1));

		let err = tool.run(["-version"]).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ExternalTool);
		assert!(err.to_string().contains("/definitely/not/here/ffmpeg"));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn failing_exit_status_carries_stderr() {
		let tool = ExternalTool::new("sh", Duration::from_secs(5));

		let err = tool
			.run(["-c", "echo 'no such stream' >&2; exit 3"])
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ExternalTool);
		assert!(err.to_string().contains("no such stream"));
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn slow_tools_are_cut_off() {
		let tool = ExternalTool::new("sh", Duration::from_millis(100));

		let err = tool.run(["-c", "sleep 5"]).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ExternalToolTimeout);
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn stdout_is_returned() {
		let tool = ExternalTool::new("sh", Duration::from_secs(5));

		assert_eq!(tool.run(["-c", "printf 42"]).await.unwrap(), b"42");
	}
}
