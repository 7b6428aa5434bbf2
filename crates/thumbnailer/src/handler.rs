use crate::{
	diagnostics::{DiagnosticEvent, Diagnostics},
	error::{Error, Result},
	media::{MediaAsset, RasterFrame, ThumbnailSpec},
};

use std::{
	fmt,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use async_trait::async_trait;

/// State every thumbnailer carries: its target size, its diagnostics sink and
/// whether it was already released.
pub struct ThumbnailerBase {
	spec: ThumbnailSpec,
	diagnostics: Arc<dyn Diagnostics>,
	released: AtomicBool,
}

impl fmt::Debug for ThumbnailerBase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ThumbnailerBase")
			.field("spec", &self.spec)
			.field("released", &self.is_released())
			.finish_non_exhaustive()
	}
}

impl ThumbnailerBase {
	/// Starts out with the default 400x300 target size.
	pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
		Self {
			spec: ThumbnailSpec::default(),
			diagnostics,
			released: AtomicBool::new(false),
		}
	}

	#[must_use]
	pub fn with_spec(mut self, spec: ThumbnailSpec) -> Self {
		self.spec = spec;
		self
	}

	#[must_use]
	pub const fn spec(&self) -> ThumbnailSpec {
		self.spec
	}

	pub fn set_spec(&mut self, spec: ThumbnailSpec) {
		self.spec = spec;
	}

	#[must_use]
	pub fn diagnostics(&self) -> &dyn Diagnostics {
		self.diagnostics.as_ref()
	}

	/// Marks this thumbnailer as released, returns `true` only for the first call.
	pub fn mark_released(&self) -> bool {
		!self.released.swap(true, Ordering::AcqRel)
	}

	#[must_use]
	pub fn is_released(&self) -> bool {
		self.released.load(Ordering::Acquire)
	}
}

/// A strategy turning one family of media types into a [`RasterFrame`].
///
/// Implementors only need to hand out their [`ThumbnailerBase`] and their accepted
/// MIME types, everything else has a default: target size bookkeeping, a no-op
/// release, and [`Error::NotSupported`] for `generate`.
#[async_trait]
pub trait Thumbnailer: Send + Sync {
	/// Identity reported in diagnostics and attached to errors.
	fn name(&self) -> &'static str;

	fn base(&self) -> &ThumbnailerBase;

	fn base_mut(&mut self) -> &mut ThumbnailerBase;

	/// MIME types this thumbnailer handles, in registration order.
	///
	/// An empty list means "anything", such a thumbnailer only makes sense as the
	/// last one registered.
	fn accepted_mime_types(&self) -> &[String];

	async fn generate(&self, _asset: &MediaAsset) -> Result<RasterFrame> {
		Err(Error::NotSupported {
			operation: "generate",
		})
	}

	/// Target size used by all following `generate` calls.
	fn set_target_size(&mut self, spec: ThumbnailSpec) {
		self.base_mut().set_spec(spec);
	}

	fn target_size(&self) -> ThumbnailSpec {
		self.base().spec()
	}

	/// Releases whatever this thumbnailer holds on to. Calling it again is a no-op.
	fn release(&self) -> Result<()> {
		if self.base().mark_released() {
			self.base()
				.diagnostics()
				.record(DiagnosticEvent::Released {
					thumbnailer: self.name(),
				});
		}
		Ok(())
	}

	/// Whether this thumbnailer would be picked for `mime_type`.
	fn accepts(&self, mime_type: Option<&str>) -> bool {
		let accepted = self.accepted_mime_types();
		accepted.is_empty()
			|| mime_type.is_some_and(|mime| accepted.iter().any(|candidate| candidate == mime))
	}
}
