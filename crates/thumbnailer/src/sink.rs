use crate::{
	error::{FileIOError, Result},
	media::Thumbnail,
};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

/// Destination for finished thumbnails.
#[async_trait]
pub trait ThumbnailSink: Send {
	async fn store(&mut self, thumbnail: Thumbnail) -> Result<()>;
}

/// Writes the PNG to a path, creating missing parent directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
	path: PathBuf,
}

impl FileSink {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}
}

#[async_trait]
impl ThumbnailSink for FileSink {
	async fn store(&mut self, thumbnail: Thumbnail) -> Result<()> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| FileIOError::from((parent, e, "creating thumbnail directory")))?;
		}

		fs::write(&self.path, thumbnail.into_png())
			.await
			.map_err(|e| FileIOError::from((&self.path, e, "writing thumbnail")).into())
	}
}

/// Keeps the PNG bytes in memory, replacing anything stored before.
#[async_trait]
impl ThumbnailSink for Vec<u8> {
	async fn store(&mut self, thumbnail: Thumbnail) -> Result<()> {
		*self = thumbnail.into_png();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::media::ThumbnailSpec;

	#[tokio::test]
	async fn file_sink_creates_parent_directories() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("a").join("b").join("thumb.png");

		let mut sink = FileSink::new(&path);
		sink.store(Thumbnail::new(vec![1, 2, 3], ThumbnailSpec::default()))
			.await
			.unwrap();

		assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
	}

	#[tokio::test]
	async fn memory_sink_keeps_the_latest_payload() {
		let mut sink = vec![9_u8; 4];
		sink.store(Thumbnail::new(vec![1], ThumbnailSpec::default()))
			.await
			.unwrap();

		assert_eq!(sink, [1]);
	}
}
