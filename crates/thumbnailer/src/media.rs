use crate::{
	consts::{THUMBNAIL_DEFAULT_HEIGHT, THUMBNAIL_DEFAULT_WIDTH},
	error::{Error, FileIOError, Result},
};

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// A source file together with the MIME type it was declared with.
///
/// The declared type is only a routing hint, nothing checks it against the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
	path: PathBuf,
	mime_type: Option<String>,
}

impl MediaAsset {
	/// Empty or whitespace-only MIME types are treated as unknown.
	pub fn new(path: impl Into<PathBuf>, mime_type: Option<&str>) -> Self {
		Self {
			path: path.into(),
			mime_type: mime_type
				.filter(|mime| !mime.trim().is_empty())
				.map(ToString::to_string),
		}
	}

	pub fn without_mime_type(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			mime_type: None,
		}
	}

	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	#[must_use]
	pub fn mime_type(&self) -> Option<&str> {
		self.mime_type.as_deref()
	}

	/// Reads the whole source, refusing anything above `maximum_size` bytes.
	pub async fn read_bytes(&self, maximum_size: u64) -> Result<Vec<u8>> {
		let size = fs::metadata(&self.path)
			.await
			.map_err(|e| FileIOError::from((&self.path, e, "reading source metadata")))?
			.len();

		if size > maximum_size {
			return Err(Error::TooLarge {
				size,
				maximum: maximum_size,
			});
		}

		fs::read(&self.path)
			.await
			.map_err(|e| FileIOError::from((&self.path, e, "reading source")).into())
	}
}

/// Target dimensions of the generated thumbnail, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpec", into = "RawSpec")]
pub struct ThumbnailSpec {
	width: u32,
	height: u32,
}

#[derive(Serialize, Deserialize)]
struct RawSpec {
	width: u32,
	height: u32,
}

impl TryFrom<RawSpec> for ThumbnailSpec {
	type Error = Error;

	fn try_from(RawSpec { width, height }: RawSpec) -> Result<Self> {
		Self::new(width, height)
	}
}

impl From<ThumbnailSpec> for RawSpec {
	fn from(ThumbnailSpec { width, height }: ThumbnailSpec) -> Self {
		Self { width, height }
	}
}

impl Default for ThumbnailSpec {
	fn default() -> Self {
		Self {
			width: THUMBNAIL_DEFAULT_WIDTH,
			height: THUMBNAIL_DEFAULT_HEIGHT,
		}
	}
}

impl ThumbnailSpec {
	pub fn new(width: u32, height: u32) -> Result<Self> {
		if width == 0 || height == 0 {
			return Err(Error::InvalidTargetSize { width, height });
		}
		Ok(Self { width, height })
	}

	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	#[must_use]
	pub const fn dimensions(&self) -> (u32, u32) {
		(self.width, self.height)
	}
}

/// A decoded bitmap, the common intermediate every thumbnailer produces.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterFrame {
	pixels: RgbaImage,
}

impl RasterFrame {
	pub fn new(pixels: RgbaImage) -> Result<Self> {
		let (width, height) = pixels.dimensions();
		if width == 0 || height == 0 {
			return Err(Error::EmptyFrame { width, height });
		}
		Ok(Self { pixels })
	}

	pub fn from_image(image: DynamicImage) -> Result<Self> {
		Self::new(image.into_rgba8())
	}

	/// Decodes an encoded image, guessing the format from its content.
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		Self::from_image(image::load_from_memory(bytes)?)
	}

	#[must_use]
	pub fn width(&self) -> u32 {
		self.pixels.width()
	}

	#[must_use]
	pub fn height(&self) -> u32 {
		self.pixels.height()
	}

	#[must_use]
	pub fn dimensions(&self) -> (u32, u32) {
		self.pixels.dimensions()
	}

	#[must_use]
	pub const fn pixels(&self) -> &RgbaImage {
		&self.pixels
	}

	#[must_use]
	pub fn into_pixels(self) -> RgbaImage {
		self.pixels
	}
}

/// The final PNG payload, exactly as large as the [`ThumbnailSpec`] it was generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
	png: Vec<u8>,
	spec: ThumbnailSpec,
}

impl Thumbnail {
	pub(crate) const fn new(png: Vec<u8>, spec: ThumbnailSpec) -> Self {
		Self { png, spec }
	}

	#[must_use]
	pub fn as_png(&self) -> &[u8] {
		&self.png
	}

	#[must_use]
	pub fn into_png(self) -> Vec<u8> {
		self.png
	}

	#[must_use]
	pub const fn spec(&self) -> ThumbnailSpec {
		self.spec
	}
}
