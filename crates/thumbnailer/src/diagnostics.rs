use crate::error::Error;

use std::{fmt, time::Duration};

use tracing::{debug, error, trace, warn};

/// Everything worth reporting while thumbnails are generated.
#[derive(Debug)]
pub enum DiagnosticEvent<'a> {
	Registered {
		thumbnailer: &'static str,
		mime_types: &'a [String],
	},
	Selected {
		thumbnailer: &'static str,
		mime_type: Option<&'a str>,
	},
	Generated {
		thumbnailer: &'static str,
		width: u32,
		height: u32,
		elapsed: Duration,
	},
	GenerationFailed {
		thumbnailer: &'static str,
		error: &'a Error,
	},
	Unsupported {
		mime_type: Option<&'a str>,
	},
	Notice {
		thumbnailer: &'static str,
		message: &'a str,
	},
	Released {
		thumbnailer: &'static str,
	},
	ReleaseFailed {
		thumbnailer: &'static str,
		error: &'a Error,
	},
}

/// Sink for [`DiagnosticEvent`]s, handed to the dispatcher and every thumbnailer.
pub trait Diagnostics: Send + Sync + fmt::Debug {
	fn record(&self, event: DiagnosticEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
	fn record(&self, event: DiagnosticEvent<'_>) {
		match event {
			DiagnosticEvent::Registered {
				thumbnailer,
				mime_types,
			} => trace!(%thumbnailer, ?mime_types, "Registered thumbnailer"),
			DiagnosticEvent::Selected {
				thumbnailer,
				mime_type,
			} => debug!(%thumbnailer, ?mime_type, "Selected thumbnailer"),
			DiagnosticEvent::Generated {
				thumbnailer,
				width,
				height,
				elapsed,
			} => debug!(%thumbnailer, width, height, ?elapsed, "Generated thumbnail"),
			DiagnosticEvent::GenerationFailed { thumbnailer, error } => {
				warn!(%thumbnailer, ?error, "Failed to generate thumbnail;");
			}
			DiagnosticEvent::Unsupported { mime_type } => {
				warn!(?mime_type, "No thumbnailer accepts this mime type");
			}
			DiagnosticEvent::Notice {
				thumbnailer,
				message,
			} => debug!(%thumbnailer, "{message}"),
			DiagnosticEvent::Released { thumbnailer } => trace!(%thumbnailer, "Released"),
			DiagnosticEvent::ReleaseFailed { thumbnailer, error } => {
				error!(%thumbnailer, ?error, "Could not release thumbnailer;");
			}
		}
	}
}
