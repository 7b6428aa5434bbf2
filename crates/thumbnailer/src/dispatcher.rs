use crate::{
	archive::ArchiveThumbnailer,
	canvas,
	config::ThumbnailerConfig,
	diagnostics::{DiagnosticEvent, Diagnostics},
	error::{Error, Result},
	generic::GenericThumbnailer,
	handler::Thumbnailer,
	media::{MediaAsset, Thumbnail, ThumbnailSpec},
	office::OfficeThumbnailer,
	pdf::PdfThumbnailer,
	sink::ThumbnailSink,
	video::VideoThumbnailer,
};

use std::{fmt, sync::Arc, time::Instant};

use tokio::task::spawn_blocking;
use tracing::instrument;

/// Routes each asset to the first registered thumbnailer accepting its declared MIME
/// type, then fits whatever frame it produced onto the target canvas.
pub struct Dispatcher {
	thumbnailers: Vec<Box<dyn Thumbnailer>>,
	diagnostics: Arc<dyn Diagnostics>,
}

impl fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field(
				"thumbnailers",
				&self
					.thumbnailers
					.iter()
					.map(|thumbnailer| thumbnailer.name())
					.collect::<Vec<_>>(),
			)
			.field("diagnostics", &self.diagnostics)
			.finish()
	}
}

impl Dispatcher {
	/// The default lineup: native images, videos, PDFs, office documents and finally
	/// packages with an embedded preview.
	pub fn new(config: &ThumbnailerConfig, diagnostics: Arc<dyn Diagnostics>) -> Result<Self> {
		config.validate()?;

		let mut dispatcher = Self::with_diagnostics(Arc::clone(&diagnostics));
		dispatcher.register(
			GenericThumbnailer::new(Arc::clone(&diagnostics))
				.with_maximum_size(config.max_source_size),
		);
		dispatcher.register(VideoThumbnailer::new(config, Arc::clone(&diagnostics)));
		dispatcher.register(PdfThumbnailer::new(config, Arc::clone(&diagnostics)));
		dispatcher.register(OfficeThumbnailer::new(config, Arc::clone(&diagnostics)));
		dispatcher.register(ArchiveThumbnailer::new(config, diagnostics));
		dispatcher.set_target_size(config.spec()?);

		Ok(dispatcher)
	}

	/// A dispatcher without any thumbnailer, see [`Self::register`].
	pub fn with_diagnostics(diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			thumbnailers: Vec::new(),
			diagnostics,
		}
	}

	/// Appends a thumbnailer, it only gets the MIME types no earlier one claimed.
	pub fn register(&mut self, thumbnailer: impl Thumbnailer + 'static) {
		self.register_boxed(Box::new(thumbnailer));
	}

	pub fn register_boxed(&mut self, thumbnailer: Box<dyn Thumbnailer>) {
		self.diagnostics.record(DiagnosticEvent::Registered {
			thumbnailer: thumbnailer.name(),
			mime_types: thumbnailer.accepted_mime_types(),
		});
		self.thumbnailers.push(thumbnailer);
	}

	pub fn thumbnailers(&self) -> impl Iterator<Item = &dyn Thumbnailer> + '_ {
		self.thumbnailers.iter().map(AsRef::as_ref)
	}

	/// First thumbnailer, in registration order, accepting `mime_type` verbatim.
	#[must_use]
	pub fn select(&self, mime_type: Option<&str>) -> Option<&dyn Thumbnailer> {
		self.thumbnailers()
			.find(|thumbnailer| thumbnailer.accepts(mime_type))
	}

	/// Every accepted MIME type of every thumbnailer, duplicates included.
	#[must_use]
	pub fn accepted_mime_types(&self) -> Vec<&str> {
		self.thumbnailers
			.iter()
			.flat_map(|thumbnailer| thumbnailer.accepted_mime_types())
			.map(String::as_str)
			.collect()
	}

	pub fn set_target_size(&mut self, spec: ThumbnailSpec) {
		for thumbnailer in &mut self.thumbnailers {
			thumbnailer.set_target_size(spec);
		}
	}

	#[instrument(skip_all, fields(path = %asset.path().display(), mime_type = ?asset.mime_type()))]
	pub async fn generate(&self, asset: &MediaAsset) -> Result<Thumbnail> {
		let Some(thumbnailer) = self.select(asset.mime_type()) else {
			self.diagnostics.record(DiagnosticEvent::Unsupported {
				mime_type: asset.mime_type(),
			});
			return Err(Error::UnsupportedMimeType(
				asset.mime_type().map(ToString::to_string),
			));
		};

		self.diagnostics.record(DiagnosticEvent::Selected {
			thumbnailer: thumbnailer.name(),
			mime_type: asset.mime_type(),
		});

		let start = Instant::now();
		// Snapshot, so the whole conversion uses the size it started with
		let spec = thumbnailer.target_size();

		let res: Result<Thumbnail> = async {
			let frame = thumbnailer.generate(asset).await?;
			spawn_blocking(move || canvas::fit(frame, spec)).await?
		}
		.await;

		match res {
			Ok(thumbnail) => {
				self.diagnostics.record(DiagnosticEvent::Generated {
					thumbnailer: thumbnailer.name(),
					width: spec.width(),
					height: spec.height(),
					elapsed: start.elapsed(),
				});
				Ok(thumbnail)
			}
			Err(e) => {
				let e = e.with_adapter(thumbnailer.name());
				self.diagnostics.record(DiagnosticEvent::GenerationFailed {
					thumbnailer: thumbnailer.name(),
					error: &e,
				});
				Err(e)
			}
		}
	}

	/// Generates the thumbnail and hands it over to `sink`. Nothing reaches the sink on failure.
	pub async fn generate_into<S>(&self, asset: &MediaAsset, sink: &mut S) -> Result<ThumbnailSpec>
	where
		S: ThumbnailSink + ?Sized,
	{
		let thumbnail = self.generate(asset).await?;
		let spec = thumbnail.spec();
		sink.store(thumbnail).await?;
		Ok(spec)
	}

	/// Releases every thumbnailer, failures are only reported to diagnostics.
	pub fn release(&self) {
		for thumbnailer in &self.thumbnailers {
			if let Err(e) = thumbnailer.release() {
				self.diagnostics.record(DiagnosticEvent::ReleaseFailed {
					thumbnailer: thumbnailer.name(),
					error: &e,
				});
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::diagnostics::TracingDiagnostics;

	#[test]
	fn default_lineup_order() {
		let dispatcher =
			Dispatcher::new(&ThumbnailerConfig::default(), Arc::new(TracingDiagnostics)).unwrap();

		assert_eq!(
			dispatcher
				.thumbnailers()
				.map(|thumbnailer| thumbnailer.name())
				.collect::<Vec<_>>(),
			["generic-image", "video", "pdf", "office", "archive"]
		);

		let pick = |mime| dispatcher.select(Some(mime)).map(|t| t.name());
		assert_eq!(pick("image/png"), Some("generic-image"));
		assert_eq!(pick("video/mp4"), Some("video"));
		assert_eq!(pick("application/pdf"), Some("pdf"));
		assert_eq!(pick("application/msword"), Some("office"));
		assert_eq!(pick("application/vnd.oasis.opendocument.text"), Some("archive"));
		assert_eq!(pick("application/zip"), Some("archive"));
		assert_eq!(pick("application/octet-stream"), None);
		assert!(dispatcher.select(None).is_none());
	}

	#[test]
	fn configured_size_reaches_every_thumbnailer() {
		let config = ThumbnailerConfig {
			width: 128,
			height: 96,
			..Default::default()
		};
		let dispatcher = Dispatcher::new(&config, Arc::new(TracingDiagnostics)).unwrap();

		assert!(dispatcher
			.thumbnailers()
			.all(|thumbnailer| thumbnailer.target_size().dimensions() == (128, 96)));
	}

	#[test]
	fn invalid_config_is_refused() {
		let config = ThumbnailerConfig {
			tool_timeout_secs: 0,
			..Default::default()
		};
		assert!(Dispatcher::new(&config, Arc::new(TracingDiagnostics)).is_err());
	}
}
