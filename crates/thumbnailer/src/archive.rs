use crate::{
	config::ThumbnailerConfig,
	consts::EMBEDDED_THUMBNAIL_ENTRY,
	diagnostics::Diagnostics,
	error::{ArchiveFault, Error, FileIOError, Result},
	handler::{Thumbnailer, ThumbnailerBase},
	media::{MediaAsset, RasterFrame},
	media_type::{MediaCategory, MediaType},
};

use std::{
	fs::File,
	io::{Read, Seek},
	path::Path,
	sync::Arc,
};

use async_trait::async_trait;
use tokio::task::spawn_blocking;
use tracing::{instrument, trace};
use zip::{result::ZipError, ZipArchive};

/// Pulls the preview that OpenDocument and StarOffice packages carry inside their zip
/// container. Nothing is ever rendered, documents without a preview simply fail.
#[derive(Debug)]
pub struct ArchiveThumbnailer {
	base: ThumbnailerBase,
	accepted: Vec<String>,
	maximum_size: u64,
}

impl ArchiveThumbnailer {
	pub fn new(config: &ThumbnailerConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			base: ThumbnailerBase::new(diagnostics),
			accepted: MediaType::of_category(MediaCategory::OpenDocument)
				.chain(MediaType::of_category(MediaCategory::Archive))
				.map(|media_type| media_type.as_str().to_string())
				.collect(),
			maximum_size: config.max_source_size,
		}
	}
}

/// Only the preview entry is read, so the size limit applies to it and not to the package.
fn extract_embedded_thumbnail(package: impl Read + Seek, maximum_size: u64) -> Result<Vec<u8>> {
	let mut archive = ZipArchive::new(package).map_err(|e| {
		trace!(?e, "Source is not a zip");
		Error::ArchiveFormat(ArchiveFault::NotAZip)
	})?;

	let mut entry = archive
		.by_name(EMBEDDED_THUMBNAIL_ENTRY)
		.map_err(|e| match e {
			ZipError::FileNotFound => Error::ArchiveFormat(ArchiveFault::MissingThumbnailEntry),
			e => Error::decode("embedded thumbnail", e.to_string()),
		})?;

	if entry.size() > maximum_size {
		return Err(Error::TooLarge {
			size: entry.size(),
			maximum: maximum_size,
		});
	}

	// The declared size can't be trusted, so we never inflate more than one byte past the limit
	let mut data = Vec::new();
	entry
		.by_ref()
		.take(maximum_size.saturating_add(1))
		.read_to_end(&mut data)
		.map_err(|e| Error::decode("embedded thumbnail", e.to_string()))?;

	let read = u64::try_from(data.len()).unwrap_or(u64::MAX);
	if read > maximum_size {
		return Err(Error::TooLarge {
			size: read,
			maximum: maximum_size,
		});
	}

	Ok(data)
}

fn thumbnail_from_package(path: &Path, maximum_size: u64) -> Result<RasterFrame> {
	let package = File::open(path).map_err(|e| FileIOError::from((path, e, "opening package")))?;

	let thumbnail = extract_embedded_thumbnail(package, maximum_size)?;

	RasterFrame::decode(&thumbnail).map_err(|e| match e {
		Error::Image(e) => Error::decode("embedded thumbnail", e.to_string()),
		other => other,
	})
}

#[async_trait]
impl Thumbnailer for ArchiveThumbnailer {
	fn name(&self) -> &'static str {
		"archive"
	}

	fn base(&self) -> &ThumbnailerBase {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ThumbnailerBase {
		&mut self.base
	}

	fn accepted_mime_types(&self) -> &[String] {
		&self.accepted
	}

	#[instrument(skip_all, fields(path = %asset.path().display()))]
	async fn generate(&self, asset: &MediaAsset) -> Result<RasterFrame> {
		let path = asset.path().to_path_buf();
		let maximum_size = self.maximum_size;

		spawn_blocking(move || thumbnail_from_package(&path, maximum_size)).await?
	}
}
