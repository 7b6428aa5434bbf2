use std::{
	fmt::{self, Display},
	path::Path,
	time::Duration,
};

use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("no thumbnailer accepts the mime type {}", display_mime(.0.as_deref()))]
	UnsupportedMimeType(Option<String>),
	#[error("file format could not be interpreted as {expected}: {reason}")]
	Decode {
		expected: &'static str,
		reason: String,
	},
	#[error("error while loading the image (via the `image` crate): {0}")]
	Image(#[from] image::ImageError),
	#[error("error while rendering the document (via pdfium): {0}")]
	Pdfium(#[from] pdfium_render::prelude::PdfiumError),
	#[error("the decoded frame has no pixels ({width}x{height})")]
	EmptyFrame { width: u32, height: u32 },
	#[error("archive format error: {0}")]
	ArchiveFormat(ArchiveFault),
	#[error("external tool `{tool}` failed: {reason}")]
	ExternalTool { tool: String, reason: String },
	#[error("external tool `{tool}` did not finish within {timeout:?}")]
	ExternalToolTimeout { tool: String, timeout: Duration },
	#[error("the document renderer could not be loaded")]
	RendererUnavailable,
	#[error("failed to release resources: {0}")]
	ResourceRelease(String),
	#[error("`{operation}` is not supported by this thumbnailer")]
	NotSupported { operation: &'static str },
	#[error("thumbnail size must be positive, received {width}x{height}")]
	InvalidTargetSize { width: u32, height: u32 },
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
	#[error("the source is too large ({size} bytes, maximum is {maximum} bytes)")]
	TooLarge { size: u64, maximum: u64 },
	#[error("failed to encode the thumbnail as png: {0}")]
	Encode(#[source] image::ImageError),
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("background task failed: {0}")]
	BackgroundTaskFailed(#[from] JoinError),
	#[error("{adapter}: {source}")]
	Adapter {
		adapter: &'static str,
		#[source]
		source: Box<Error>,
	},
}

/// The flat failure category of an [`Error`], stable across adapter annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	UnsupportedMimeType,
	Decode,
	ArchiveFormat,
	ExternalTool,
	ExternalToolTimeout,
	ResourceRelease,
	NotSupported,
	InvalidInput,
	Io,
	Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFault {
	NotAZip,
	MissingThumbnailEntry,
}

impl Display for ArchiveFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotAZip => write!(f, "not a zip"),
			Self::MissingThumbnailEntry => write!(f, "missing embedded thumbnail entry"),
		}
	}
}

impl Error {
	pub fn decode(expected: &'static str, reason: impl Into<String>) -> Self {
		Self::Decode {
			expected,
			reason: reason.into(),
		}
	}

	pub fn external_tool(tool: impl AsRef<Path>, reason: impl Into<String>) -> Self {
		Self::ExternalTool {
			tool: tool.as_ref().display().to_string(),
			reason: reason.into(),
		}
	}

	#[must_use]
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::UnsupportedMimeType(_) => ErrorKind::UnsupportedMimeType,
			Self::Decode { .. } | Self::Image(_) | Self::Pdfium(_) | Self::EmptyFrame { .. } => {
				ErrorKind::Decode
			}
			Self::ArchiveFormat(_) => ErrorKind::ArchiveFormat,
			Self::ExternalTool { .. } | Self::RendererUnavailable => ErrorKind::ExternalTool,
			Self::ExternalToolTimeout { .. } => ErrorKind::ExternalToolTimeout,
			Self::ResourceRelease(_) => ErrorKind::ResourceRelease,
			Self::NotSupported { .. } => ErrorKind::NotSupported,
			Self::InvalidTargetSize { .. } | Self::InvalidConfig(_) | Self::TooLarge { .. } => {
				ErrorKind::InvalidInput
			}
			Self::FileIO(_) => ErrorKind::Io,
			Self::Encode(_) | Self::BackgroundTaskFailed(_) => ErrorKind::Internal,
			Self::Adapter { source, .. } => source.kind(),
		}
	}

	/// Name of the thumbnailer responsible for this failure, if it was attached.
	#[must_use]
	pub fn adapter(&self) -> Option<&'static str> {
		match self {
			Self::Adapter { adapter, .. } => Some(adapter),
			_ => None,
		}
	}

	/// Attaches the identity of the thumbnailer that produced this error.
	///
	/// An error that already carries an identity is returned untouched.
	#[must_use]
	pub fn with_adapter(self, adapter: &'static str) -> Self {
		match self {
			already @ Self::Adapter { .. } => already,
			other => Self::Adapter {
				adapter,
				source: Box::new(other),
			},
		}
	}
}

fn display_mime(mime_type: Option<&str>) -> String {
	mime_type.map_or_else(|| "<unknown>".to_string(), |mime| format!("'{mime}'"))
}

/// File I/O error that includes the path that caused the error
#[derive(thiserror::Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub maybe_context: Option<&'static str>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error)> for FileIOError {
	fn from((path, source): (P, std::io::Error)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error, &'static str)> for FileIOError {
	fn from((path, source, context): (P, std::io::Error, &'static str)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}
