#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	clippy::expect_used,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::as_conversions,
	clippy::dbg_macro
)]
#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

//! Fixed-canvas PNG thumbnails for images, videos, PDFs and office documents.
//!
//! A [`Dispatcher`] picks a [`Thumbnailer`] by the declared MIME type of a
//! [`MediaAsset`], lets it produce a [`RasterFrame`] and fits that frame onto a
//! white canvas of the configured [`ThumbnailSpec`] with [`canvas::fit`].

mod archive;
pub mod canvas;
mod config;
mod consts;
mod diagnostics;
mod dispatcher;
mod error;
mod generic;
mod handler;
mod media;
mod media_type;
mod office;
mod pdf;
mod process;
mod sink;
mod video;

pub use archive::ArchiveThumbnailer;
pub use config::ThumbnailerConfig;
pub use consts::{
	EMBEDDED_THUMBNAIL_ENTRY, GENERIC_MAXIMUM_FILE_SIZE, THUMBNAIL_DEFAULT_HEIGHT,
	THUMBNAIL_DEFAULT_WIDTH,
};
pub use diagnostics::{DiagnosticEvent, Diagnostics, TracingDiagnostics};
pub use dispatcher::Dispatcher;
pub use error::{ArchiveFault, Error, ErrorKind, FileIOError, Result};
pub use generic::GenericThumbnailer;
pub use handler::{Thumbnailer, ThumbnailerBase};
pub use media::{MediaAsset, RasterFrame, Thumbnail, ThumbnailSpec};
pub use media_type::{MediaCategory, MediaType, UnknownMediaType};
pub use office::{OfficeConverter, OfficeThumbnailer};
pub use pdf::PdfThumbnailer;
pub use process::ExternalTool;
pub use sink::{FileSink, ThumbnailSink};
pub use video::VideoThumbnailer;

pub use async_trait::async_trait;
