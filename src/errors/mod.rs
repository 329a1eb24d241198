//! # Error Handling
//!
//! Operation-level errors for the credential lifecycle, built with `thiserror`.
//!
//! Failures reported by the remote store travel as [`StoreError`] sources, so a
//! caller can still tell a vanished credential apart from a broken connection
//! after the operation context has been attached.

use crate::store::StoreError;

/// Custom result type for credential lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shape every import identifier must follow.
pub const IMPORT_ID_FORMAT: &str = "[<folder>/]<domain>/<name>";

/// Main error type for credential lifecycle operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Malformed composite identifier
    #[error("{message}")]
    Format { input: String, message: String },

    /// Target folder is absent from the store
    #[error("invalid folder name '{folder}' specified: {source}")]
    FolderNotFound {
        folder: String,
        #[source]
        source: StoreError,
    },

    /// Any store failure that is not an expected absence
    #[error("{operation}: {source}")]
    Remote {
        operation: String,
        #[source]
        source: StoreError,
    },

    /// Declared fields rejected before talking to the store
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

impl Error {
    /// Create a format error for a malformed import identifier
    pub fn format<S: Into<String>>(input: S) -> Self {
        Self::Format {
            input: input.into(),
            message: format!(
                "import ID was improperly formatted. Imports need to be in the format \"{}\"",
                IMPORT_ID_FORMAT
            ),
        }
    }

    /// Create a folder-not-found error wrapping the store's answer
    pub fn folder_not_found<S: Into<String>>(folder: S, source: StoreError) -> Self {
        Self::FolderNotFound { folder: folder.into(), source }
    }

    /// Create a remote operation error with a short operation-context prefix
    pub fn remote<S: Into<String>>(operation: S, source: StoreError) -> Self {
        Self::Remote { operation: operation.into(), source }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// True when the store reported the credential as absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Remote { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// The underlying store error, if this failure came from the store.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Error::Remote { source, .. } | Error::FolderNotFound { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_errors("", &errors, &mut fields);
        fields.sort();

        let message = fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages))
            .collect::<Vec<_>>()
            .join("; ");

        match fields.as_slice() {
            [(field, _)] => Self::validation_field(message, field.clone()),
            _ => Self::validation(message),
        }
    }
}

/// Flatten nested validator output into `(dotted.field, messages)` pairs.
fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<(String, String)>,
) {
    use validator::ValidationErrorsKind;

    for (name, kind) in errors.errors() {
        let path =
            if prefix.is_empty() { name.to_string() } else { format!("{}.{}", prefix, name) };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                out.push((path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
