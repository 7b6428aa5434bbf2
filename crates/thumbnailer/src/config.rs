use crate::{
	consts::{
		DEFAULT_FFMPEG_PATH, DEFAULT_FFPROBE_PATH, DEFAULT_SOFFICE_PATH, EXTERNAL_TOOL_TIMEOUT,
		GENERIC_MAXIMUM_FILE_SIZE, PDF_RENDER_DPI, THUMBNAIL_DEFAULT_HEIGHT,
		THUMBNAIL_DEFAULT_WIDTH, VIDEO_SEEK_OFFSET,
	},
	error::{Error, Result},
	media::ThumbnailSpec,
};

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// Everything the default set of thumbnailers needs to know about its environment.
///
/// Every field has a default, so a partial (or empty) JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailerConfig {
	pub width: u32,
	pub height: u32,
	pub ffmpeg_path: PathBuf,
	pub ffprobe_path: PathBuf,
	pub soffice_path: PathBuf,
	/// Directory holding the pdfium shared library, the system library is used when unset.
	pub pdfium_library_dir: Option<PathBuf>,
	pub video_seek_offset_secs: f64,
	pub pdf_render_dpi: u16,
	pub tool_timeout_secs: u64,
	pub max_source_size: u64,
	/// Where temporary files go, defaults to the system temporary directory.
	pub scratch_dir: Option<PathBuf>,
}

impl Default for ThumbnailerConfig {
	fn default() -> Self {
		Self {
			width: THUMBNAIL_DEFAULT_WIDTH,
			height: THUMBNAIL_DEFAULT_HEIGHT,
			ffmpeg_path: DEFAULT_FFMPEG_PATH.into(),
			ffprobe_path: DEFAULT_FFPROBE_PATH.into(),
			soffice_path: DEFAULT_SOFFICE_PATH.into(),
			pdfium_library_dir: None,
			video_seek_offset_secs: VIDEO_SEEK_OFFSET.as_secs_f64(),
			pdf_render_dpi: PDF_RENDER_DPI,
			tool_timeout_secs: EXTERNAL_TOOL_TIMEOUT.as_secs(),
			max_source_size: GENERIC_MAXIMUM_FILE_SIZE,
			scratch_dir: None,
		}
	}
}

impl ThumbnailerConfig {
	pub fn validate(&self) -> Result<()> {
		self.spec()?;

		if !self.video_seek_offset_secs.is_finite() || self.video_seek_offset_secs < 0.0 {
			return Err(Error::InvalidConfig(format!(
				"video seek offset must be a non negative number of seconds, received {}",
				self.video_seek_offset_secs
			)));
		}

		if self.pdf_render_dpi == 0 {
			return Err(Error::InvalidConfig("pdf render dpi must be positive".into()));
		}

		if self.tool_timeout_secs == 0 {
			return Err(Error::InvalidConfig(
				"external tool timeout must be positive".into(),
			));
		}

		if self.max_source_size == 0 {
			return Err(Error::InvalidConfig(
				"maximum source size must be positive".into(),
			));
		}

		Ok(())
	}

	pub fn spec(&self) -> Result<ThumbnailSpec> {
		ThumbnailSpec::new(self.width, self.height)
	}

	#[must_use]
	pub const fn tool_timeout(&self) -> Duration {
		Duration::from_secs(self.tool_timeout_secs)
	}

	/// Falls back to the default offset for values [`Self::validate`] would reject.
	#[must_use]
	pub fn video_seek_offset(&self) -> Duration {
		Duration::try_from_secs_f64(self.video_seek_offset_secs).unwrap_or(VIDEO_SEEK_OFFSET)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_is_the_default_config() {
		let config: ThumbnailerConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, ThumbnailerConfig::default());
		config.validate().unwrap();

		assert_eq!(config.spec().unwrap().dimensions(), (400, 300));
		assert_eq!(config.tool_timeout(), Duration::from_secs(60));
		assert_eq!(config.video_seek_offset(), Duration::from_secs(3));
		assert_eq!(config.max_source_size, 24 * 1024 * 1024);
	}

	#[test]
	fn partial_documents_keep_other_defaults() {
		let config: ThumbnailerConfig =
			serde_json::from_str(r#"{"width":128,"ffmpeg_path":"/opt/ffmpeg/bin/ffmpeg"}"#)
				.unwrap();

		assert_eq!(config.spec().unwrap().dimensions(), (128, 300));
		assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
		assert_eq!(config.soffice_path, PathBuf::from("soffice"));
	}

	#[test]
	fn nonsense_values_are_rejected() {
		let zero_width = ThumbnailerConfig {
			width: 0,
			..Default::default()
		};
		assert!(matches!(
			zero_width.validate(),
			Err(Error::InvalidTargetSize { .. })
		));

		for broken in [
			ThumbnailerConfig {
				video_seek_offset_secs: -1.0,
				..Default::default()
			},
			ThumbnailerConfig {
				video_seek_offset_secs: f64::NAN,
				..Default::default()
			},
			ThumbnailerConfig {
				pdf_render_dpi: 0,
				..Default::default()
			},
			ThumbnailerConfig {
				tool_timeout_secs: 0,
				..Default::default()
			},
			ThumbnailerConfig {
				max_source_size: 0,
				..Default::default()
			},
		] {
			assert!(matches!(broken.validate(), Err(Error::InvalidConfig(_))));
		}
	}
}
