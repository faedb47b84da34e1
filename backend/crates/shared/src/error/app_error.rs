//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Per-field validation messages, keyed by input field name.
///
/// Errors that are not tied to one field go under [`NON_FIELD_ERRORS`].
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key used for validation errors that concern the whole payload
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Application-wide error type.
///
/// Carries a classification, a client-facing message and, for validation
/// failures, the per-field messages. The source error is kept for logs only
/// and never rendered.
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::bad_request("Login or password invalid.");
/// assert_eq!(err.kind(), ErrorKind::BadRequest);
///
/// let err = AppError::validation("login", "This field is required.");
/// assert_eq!(err.field_errors()["login"], vec!["This field is required."]);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    field_errors: FieldErrors,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// `Result<T, AppError>`
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            field_errors: FieldErrors::new(),
            source: None,
        }
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// 400 with a single field error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        Self::from_field_errors(errors)
    }

    /// 400 carrying every collected field error
    pub fn from_field_errors(field_errors: FieldErrors) -> Self {
        Self {
            field_errors,
            ..Self::bad_request("Invalid input.")
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Attach the underlying error (logged, never rendered)
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    #[inline]
    pub fn is_validation(&self) -> bool {
        !self.field_errors.is_empty()
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    /// JSON body sent to clients.
    ///
    /// `{"detail": "..."}` for ordinary errors, `{"field": ["..."]}` for
    /// validation errors.
    pub fn to_body(&self) -> serde_json::Value {
        if self.is_validation() {
            serde_json::to_value(&self.field_errors)
                .unwrap_or_else(|_| serde_json::json!({ "detail": self.message() }))
        } else {
            serde_json::json!({ "detail": self.message() })
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if !self.field_errors.is_empty() {
            builder.field("field_errors", &self.field_errors);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        for (field, messages) in &self.field_errors {
            write!(f, " {}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}
