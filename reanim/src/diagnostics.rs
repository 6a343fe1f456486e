//! Structured reports for recoverable content anomalies.
//!
//! Authored content comes from outside the engine and must never crash a running game, so
//! problems found while resolving it are turned into [`Diagnostic`] values and handed to a
//! [`DiagnosticSink`] instead of being returned as errors.

use crate::{CommandId, EntityId};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// No clean definition track matched; a track with image or transform data was used instead.
    AmbiguousDefinitionTrack { animation: String, track: String },
    /// A track produced no image reference within the controlling window.
    MissingImage {
        track: String,
        animation: String,
        frame: usize,
    },
    /// The image atlas has no handle for an image path.
    UnresolvedImage { track: String, image: String },
    /// A configured track name does not exist in the bound definition.
    MissingTrack { skeleton: String, track: String },
    /// A parent binding loops back onto itself.
    ParentCycle { track: String },
    /// A queued command failed; it has still been marked processed.
    CommandFailed {
        command: CommandId,
        entity: EntityId,
        message: String,
    },
}

impl Diagnostic {
    /// Whether the report points at broken content rather than a tolerated quirk.
    pub fn is_warning(&self) -> bool {
        !matches!(
            self,
            Diagnostic::AmbiguousDefinitionTrack { .. } | Diagnostic::MissingImage { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousDefinitionTrack { animation, track } => write!(
                f,
                "animation '{animation}' has no clean definition track; using '{track}'"
            ),
            Diagnostic::MissingImage {
                track,
                animation,
                frame,
            } => write!(
                f,
                "track '{track}' has no image at frame {frame} of animation '{animation}'"
            ),
            Diagnostic::UnresolvedImage { track, image } => {
                write!(f, "image '{image}' for track '{track}' is not in the atlas")
            }
            Diagnostic::MissingTrack { skeleton, track } => {
                write!(f, "skeleton '{skeleton}' has no track '{track}'")
            }
            Diagnostic::ParentCycle { track } => {
                write!(f, "parent binding for track '{track}' forms a cycle")
            }
            Diagnostic::CommandFailed {
                command,
                entity,
                message,
            } => write!(f, "{command} for entity {entity} failed: {message}"),
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F: FnMut(Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_warning() {
            log::warn!("{diagnostic}");
        } else {
            log::debug!("{diagnostic}");
        }
    }
}

/// Collects diagnostics in memory, e.g. for tooling or tests.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticLog {
    pub entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}
