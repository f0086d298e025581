//! # Thumbnail Error Handling
//!
//! Error taxonomy for the thumbnail optimizer. Every variant carries an
//! [`ErrorContext`] with a timestamp, the failing operation, a severity and
//! free-form metadata, so fallback decisions can be logged with detail.
//!
//! ## Error Kinds
//!
//! - `Decode`: the payload is not an image the decoder understands
//! - `EncoderUnavailable`: no canvas or encoder could be produced
//! - `SizeConstraintUnsatisfiable`: even the quality floor is too large
//! - `Config`: an [`OptimizerConfig`](crate::config::OptimizerConfig) field is invalid
//!
//! The first three are recovered inside [`optimize`](crate::optimize) by
//! returning the original payload. `Config` only reaches callers that build a
//! custom optimizer.
//!
//! ## Usage
//!
//! ```rust
//! use omnishare_thumbnail::error::{Recoverable, ThumbnailError};
//!
//! let error = ThumbnailError::size_unsatisfiable(2_097_152, 2_500_000, 6)
//!     .with_operation("encode_jpeg")
//!     .with_metadata("source", "4000x3000");
//!
//! assert_eq!(error.category(), "size_constraint_unsatisfiable");
//! assert!(error.is_recoverable());
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational errors
    Info,
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that affect operation but can be recovered from
    Error,
    /// Fatal errors that cannot be recovered from
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            severity: ErrorSeverity::Error,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set severity level
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }
}

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// Base error type for thumbnail optimization
#[derive(Debug)]
pub enum ThumbnailError {
    /// Input cannot be interpreted as an image
    Decode {
        reason: String,
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
    /// Canvas allocation, scaling or encoding failed
    EncoderUnavailable {
        stage: String,
        reason: String,
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
    /// Every quality level down to the floor exceeded the byte limit
    SizeConstraintUnsatisfiable {
        max_bytes: u64,
        smallest_bytes: u64,
        attempts: usize,
        context: ErrorContext,
    },
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
}

impl ThumbnailError {
    /// Create a decode error
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
            source: None,
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a decode error wrapping the decoder's own error
    pub fn decode_from(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Decode {
            reason: source.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create an encoder/canvas error for the given pipeline stage
    pub fn encoder_unavailable(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EncoderUnavailable {
            stage: stage.into(),
            reason: reason.into(),
            source: None,
            context: ErrorContext::new(),
        }
    }

    /// Create an encoder/canvas error wrapping the underlying error
    pub fn encoder_from(
        stage: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::EncoderUnavailable {
            stage: stage.into(),
            reason: source.to_string(),
            source: Some(Box::new(source)),
            context: ErrorContext::new(),
        }
    }

    /// Create a size-constraint error
    pub fn size_unsatisfiable(max_bytes: u64, smallest_bytes: u64, attempts: usize) -> Self {
        Self::SizeConstraintUnsatisfiable {
            max_bytes,
            smallest_bytes,
            attempts,
            context: ErrorContext::new().with_severity(ErrorSeverity::Warning),
        }
    }

    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::new().with_severity(ErrorSeverity::Fatal),
        }
    }

    /// Add context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Decode { context, .. } => context,
            Self::EncoderUnavailable { context, .. } => context,
            Self::SizeConstraintUnsatisfiable { context, .. } => context,
            Self::Config { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Decode { context, .. } => context,
            Self::EncoderUnavailable { context, .. } => context,
            Self::SizeConstraintUnsatisfiable { context, .. } => context,
            Self::Config { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::EncoderUnavailable { .. } => "encoder_unavailable",
            Self::SizeConstraintUnsatisfiable { .. } => "size_constraint_unsatisfiable",
            Self::Config { .. } => "config",
        }
    }
}

impl fmt::Display for ThumbnailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThumbnailError::Decode { reason, .. } => {
                write!(f, "Failed to decode image: {}", reason)
            }
            ThumbnailError::EncoderUnavailable { stage, reason, .. } => {
                write!(f, "Encoder unavailable during {}: {}", stage, reason)
            }
            ThumbnailError::SizeConstraintUnsatisfiable {
                max_bytes,
                smallest_bytes,
                attempts,
                ..
            } => {
                write!(
                    f,
                    "No quality level fits {} bytes after {} attempts (smallest was {} bytes)",
                    max_bytes, attempts, smallest_bytes
                )
            }
            ThumbnailError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
        }
    }
}

impl StdError for ThumbnailError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Decode {
                source: Some(source),
                ..
            }
            | Self::EncoderUnavailable {
                source: Some(source),
                ..
            } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<thumb_scale::cpu::ScaleError> for ThumbnailError {
    fn from(error: thumb_scale::cpu::ScaleError) -> Self {
        Self::encoder_from("letterbox", error)
    }
}

/// Result type alias using our custom error type
pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

/// Trait for errors that the optimizer folds into a fallback
pub trait Recoverable {
    /// True when returning the original payload is an acceptable outcome
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for ThumbnailError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for ThumbnailError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}
