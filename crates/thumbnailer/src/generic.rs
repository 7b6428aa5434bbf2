use crate::{
	consts::GENERIC_MAXIMUM_FILE_SIZE,
	diagnostics::Diagnostics,
	error::{Error, Result},
	handler::{Thumbnailer, ThumbnailerBase},
	media::{MediaAsset, RasterFrame},
};

use std::sync::Arc;

use async_trait::async_trait;
use image::ImageFormat;
use tokio::task::spawn_blocking;
use tracing::instrument;

const UNTYPED_BINARY: &str = "application/octet-stream";

/// Decodes raster images directly with the `image` crate.
#[derive(Debug)]
pub struct GenericThumbnailer {
	base: ThumbnailerBase,
	accepted: Vec<String>,
	maximum_size: u64,
}

impl GenericThumbnailer {
	pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			base: ThumbnailerBase::new(diagnostics),
			accepted: readable_mime_types(),
			maximum_size: GENERIC_MAXIMUM_FILE_SIZE,
		}
	}

	#[must_use]
	pub const fn with_maximum_size(mut self, maximum_size: u64) -> Self {
		self.maximum_size = maximum_size;
		self
	}
}

/// MIME types of every format the `image` crate was built with a decoder for.
fn readable_mime_types() -> Vec<String> {
	let mut mime_types = Vec::new();
	for format in ImageFormat::all().filter(ImageFormat::reading_enabled) {
		let mime = format.to_mime_type();
		// Formats without a registered type (farbfeld) report the generic binary one
		if mime == UNTYPED_BINARY {
			continue;
		}
		if !mime_types.iter().any(|known| known == mime) {
			mime_types.push(mime.to_string());
		}
	}
	mime_types
}

#[async_trait]
impl Thumbnailer for GenericThumbnailer {
	fn name(&self) -> &'static str {
		"generic-image"
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
		// this also makes sure the file isn't above the maximum size
		let data = asset.read_bytes(self.maximum_size).await?;

		spawn_blocking(move || {
			RasterFrame::decode(&data).map_err(|e| match e {
				Error::Image(e) => Error::decode("image", e.to_string()),
				other => other,
			})
		})
		.await?
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::{diagnostics::TracingDiagnostics, error::ErrorKind};

	use std::io::Cursor;

	use image::{DynamicImage, Rgba, RgbaImage};

	fn thumbnailer() -> GenericThumbnailer {
		GenericThumbnailer::new(Arc::new(TracingDiagnostics))
	}

	#[test]
	fn accepted_types_come_from_the_codec_registry() {
		let thumbnailer = thumbnailer();
		let accepted = thumbnailer.accepted_mime_types();

		assert!(accepted.iter().any(|mime| mime == "image/png"));
		assert!(accepted.iter().any(|mime| mime == "image/jpeg"));
		assert!(!accepted.iter().any(|mime| mime == "application/zip"));
		assert!(!accepted.iter().any(|mime| mime == UNTYPED_BINARY));

		let mut deduped = accepted.to_vec();
		deduped.dedup();
		assert_eq!(deduped.len(), accepted.len());
	}

	#[tokio::test]
	async fn decodes_png_sources() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("source.png");

		let mut png = Vec::new();
		DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 7, Rgba([9, 9, 9, 255])))
			.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
			.unwrap();
		std::fs::write(&path, png).unwrap();

		let frame = thumbnailer()
			.generate(&MediaAsset::new(&path, Some("image/png")))
			.await
			.unwrap();
		assert_eq!(frame.dimensions(), (12, 7));
	}

	#[tokio::test]
	async fn garbage_is_a_decode_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("source.png");
		std::fs::write(&path, b"definitely not a png").unwrap();

		let err = thumbnailer()
			.generate(&MediaAsset::new(&path, Some("image/png")))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Decode);
		assert!(err.to_string().contains("could not be interpreted as image"));
	}

	#[tokio::test]
	async fn size_limit_is_enforced() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("source.png");
		std::fs::write(&path, [0_u8; 128]).unwrap();

		let err = thumbnailer()
			.with_maximum_size(64)
			.generate(&MediaAsset::without_mime_type(&path))
			.await
			.unwrap_err();
		assert!(matches!(err, Error::TooLarge { .. }));
	}
}
