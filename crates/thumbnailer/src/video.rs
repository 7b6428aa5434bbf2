use crate::{
	config::ThumbnailerConfig,
	diagnostics::{DiagnosticEvent, Diagnostics},
	error::{Error, FileIOError, Result},
	handler::{Thumbnailer, ThumbnailerBase},
	media::{MediaAsset, RasterFrame},
	media_type::{MediaCategory, MediaType},
	process::ExternalTool,
};

use std::{
	ffi::OsString,
	path::{Path, PathBuf},
	sync::Arc,
	time::Duration,
};

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::{Builder, NamedTempFile};
use tokio::{fs, task::spawn_blocking};
use tracing::{instrument, trace};

/// Grabs a single frame from a video with an external transcoder (ffmpeg).
#[derive(Debug)]
pub struct VideoThumbnailer {
	base: ThumbnailerBase,
	accepted: Vec<String>,
	ffmpeg: ExternalTool,
	ffprobe: ExternalTool,
	seek_offset: Duration,
	scratch_dir: Option<PathBuf>,
}

impl VideoThumbnailer {
	pub fn new(config: &ThumbnailerConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			base: ThumbnailerBase::new(diagnostics),
			accepted: MediaType::of_category(MediaCategory::Video)
				.map(|media_type| media_type.as_str().to_string())
				.collect(),
			ffmpeg: ExternalTool::new(&config.ffmpeg_path, config.tool_timeout()),
			ffprobe: ExternalTool::new(&config.ffprobe_path, config.tool_timeout()),
			seek_offset: config.video_seek_offset(),
			scratch_dir: config.scratch_dir.clone(),
		}
	}

	/// Where the frame is taken from: the configured offset, or the middle of the
	/// video when it is shorter than that.
	async fn seek_position(&self, path: &Path) -> Duration {
		match self.probe_duration(path).await {
			Ok(duration) => seek_position(duration, self.seek_offset),
			Err(e) => {
				self.base.diagnostics().record(DiagnosticEvent::Notice {
					thumbnailer: self.name(),
					message: &format!(
						"could not probe video duration, seeking to {:?}: {e}",
						self.seek_offset
					),
				});
				self.seek_offset
			}
		}
	}

	async fn probe_duration(&self, path: &Path) -> Result<Duration> {
		let mut args = ["-v", "error", "-print_format", "json", "-show_format"]
			.into_iter()
			.map(OsString::from)
			.collect::<Vec<_>>();
		args.push(path.into());

		parse_probe_duration(&self.ffprobe.run(args).await?)
	}

	fn snapshot_file(&self) -> Result<NamedTempFile> {
		let mut builder = Builder::new();
		builder.prefix("sd-video-frame-").suffix(".png");

		match &self.scratch_dir {
			Some(dir) => builder
				.tempfile_in(dir)
				.map_err(|e| FileIOError::from((dir, e, "creating video frame file")).into()),
			None => builder.tempfile().map_err(|e| {
				FileIOError::from((std::env::temp_dir(), e, "creating video frame file")).into()
			}),
		}
	}
}

fn seek_position(duration: Duration, offset: Duration) -> Duration {
	if duration < offset {
		duration / 2
	} else {
		offset
	}
}

fn parse_probe_duration(output: &[u8]) -> Result<Duration> {
	#[derive(Deserialize)]
	struct ProbeFormat {
		duration: Option<String>,
	}
	#[derive(Deserialize)]
	struct ProbeOut {
		format: Option<ProbeFormat>,
	}

	let parsed: ProbeOut = serde_json::from_slice(output)
		.map_err(|e| Error::decode("ffprobe output", e.to_string()))?;

	parsed
		.format
		.and_then(|format| format.duration)
		.and_then(|duration| duration.trim().parse::<f64>().ok())
		.and_then(|secs| Duration::try_from_secs_f64(secs).ok())
		.ok_or_else(|| Error::decode("ffprobe output", "missing container duration"))
}

#[async_trait]
impl Thumbnailer for VideoThumbnailer {
	fn name(&self) -> &'static str {
		"video"
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
		let position = self.seek_position(asset.path()).await;

		// Removed when dropped, whatever happens below
		let snapshot = self.snapshot_file()?;

		let mut args: Vec<OsString> = vec![
			"-y".into(),
			"-v".into(),
			"error".into(),
			"-ss".into(),
			format!("{:.3}", position.as_secs_f64()).into(),
			"-i".into(),
		];
		args.push(asset.path().into());
		args.extend(["-frames:v".into(), "1".into()]);
		args.push(snapshot.path().into());

		trace!(?position, "Extracting video frame");
		self.ffmpeg.run(args).await?;

		let data = fs::read(snapshot.path())
			.await
			.map_err(|e| FileIOError::from((snapshot.path(), e, "reading extracted video frame")))?;

		if data.is_empty() {
			return Err(Error::external_tool(
				self.ffmpeg.program(),
				"no frame was extracted",
			));
		}

		spawn_blocking(move || {
			RasterFrame::decode(&data).map_err(|e| match e {
				Error::Image(e) => Error::decode("video frame", e.to_string()),
				other => other,
			})
		})
		.await?
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::error::ErrorKind;

	#[test]
	fn short_videos_are_sampled_in_the_middle() {
		let offset = Duration::from_secs(3);

		assert_eq!(seek_position(Duration::from_secs(60), offset), offset);
		assert_eq!(seek_position(Duration::from_secs(3), offset), offset);
		assert_eq!(
			seek_position(Duration::from_millis(1500), offset),
			Duration::from_millis(750)
		);
		assert_eq!(seek_position(Duration::ZERO, offset), Duration::ZERO);
	}

	#[test]
	fn probe_output_duration_is_read_from_the_format() {
		let output = br#"{"streams":[],"format":{"filename":"a.mp4","duration":"12.500000"}}"#;
		assert_eq!(
			parse_probe_duration(output).unwrap(),
			Duration::from_millis(12_500)
		);

		let err = parse_probe_duration(br#"{"format":{}}"#).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Decode);
		assert!(parse_probe_duration(br#"{"format":{"duration":"N/A"}}"#).is_err());
		assert!(parse_probe_duration(b"not json").is_err());
	}

	#[test]
	fn accepts_the_video_family_only() {
		let thumbnailer = VideoThumbnailer::new(
			&ThumbnailerConfig::default(),
			Arc::new(crate::diagnostics::TracingDiagnostics),
		);

		assert_eq!(thumbnailer.accepted_mime_types().len(), 11);
		assert!(thumbnailer.accepts(Some("video/mp4")));
		assert!(thumbnailer.accepts(Some("application/ffmpeg")));
		assert!(!thumbnailer.accepts(Some("application/pdf")));
	}
}
