use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Hl7Error {
    #[error("{name} does not exist in the group {group}")]
    NotFound { name: String, group: String },

    #[error("Can't create repetition #{rep} of {name} - this structure is non-repeating")]
    NonRepeatingViolation { name: String, rep: usize },

    #[error(
        "Can't get repetition {requested} from {name} - there are currently only {available} reps"
    )]
    RepetitionGap {
        name: String,
        requested: usize,
        available: usize,
    },

    #[error("Can't instantiate {type_name}: {source}")]
    Instantiation {
        type_name: String,
        #[source]
        source: Box<Hl7Error>,
    },

    #[error("Need message version to {operation}; the message has no version")]
    MissingVersion { operation: String },

    #[error("The version {version} is not recognized")]
    UnsupportedVersion { version: String },

    #[error("Required field missing: {message}")]
    RequiredFieldMissing { message: String },

    #[error("Application internal error: {message}")]
    ApplicationInternal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Data type error: {message}")]
    DataType { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Hl7Error {
    pub fn not_found(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            group: group.into(),
        }
    }

    pub fn data_type(message: impl Into<String>) -> Self {
        Self::DataType {
            message: message.into(),
        }
    }

    pub fn application_internal(message: impl Into<String>) -> Self {
        Self::ApplicationInternal {
            message: message.into(),
            source: None,
        }
    }

    pub fn application_internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ApplicationInternal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap `cause` as a construction failure of `type_name`.
    /// Instantiation failures of nested structures pass through unchanged.
    pub fn instantiation(type_name: impl Into<String>, cause: Hl7Error) -> Self {
        match cause {
            err @ Hl7Error::Instantiation { .. } => err,
            other => Self::Instantiation {
                type_name: type_name.into(),
                source: Box::new(other),
            },
        }
    }

    pub fn missing_version(operation: impl Into<String>) -> Self {
        Self::MissingVersion {
            operation: operation.into(),
        }
    }

    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
        }
    }

    /// HL7 table 0357 code reported for this error in an acknowledgement.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Hl7Error::DataType { .. } => ErrorCode::DataTypeError,
            Hl7Error::RequiredFieldMissing { .. } => ErrorCode::RequiredFieldMissing,
            Hl7Error::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersionId,
            _ => ErrorCode::ApplicationInternalError,
        }
    }
}

/// Message error condition codes (HL7 table 0357).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    MessageAccepted,
    SegmentSequenceError,
    RequiredFieldMissing,
    DataTypeError,
    TableValueNotFound,
    UnsupportedMessageType,
    UnsupportedEventCode,
    UnsupportedProcessingId,
    UnsupportedVersionId,
    UnknownKeyIdentifier,
    DuplicateKeyIdentifier,
    ApplicationRecordLocked,
    ApplicationInternalError,
}

impl ErrorCode {
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::MessageAccepted => 0,
            ErrorCode::SegmentSequenceError => 100,
            ErrorCode::RequiredFieldMissing => 101,
            ErrorCode::DataTypeError => 102,
            ErrorCode::TableValueNotFound => 103,
            ErrorCode::UnsupportedMessageType => 200,
            ErrorCode::UnsupportedEventCode => 201,
            ErrorCode::UnsupportedProcessingId => 202,
            ErrorCode::UnsupportedVersionId => 203,
            ErrorCode::UnknownKeyIdentifier => 204,
            ErrorCode::DuplicateKeyIdentifier => 205,
            ErrorCode::ApplicationRecordLocked => 206,
            ErrorCode::ApplicationInternalError => 207,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::MessageAccepted => "Message accepted",
            ErrorCode::SegmentSequenceError => "Segment sequence error",
            ErrorCode::RequiredFieldMissing => "Required field missing",
            ErrorCode::DataTypeError => "Data type error",
            ErrorCode::TableValueNotFound => "Table value not found",
            ErrorCode::UnsupportedMessageType => "Unsupported message type",
            ErrorCode::UnsupportedEventCode => "Unsupported event code",
            ErrorCode::UnsupportedProcessingId => "Unsupported processing id",
            ErrorCode::UnsupportedVersionId => "Unsupported version id",
            ErrorCode::UnknownKeyIdentifier => "Unknown key identifier",
            ErrorCode::DuplicateKeyIdentifier => "Duplicate key identifier",
            ErrorCode::ApplicationRecordLocked => "Application record locked",
            ErrorCode::ApplicationInternalError => "Application internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

pub type Result<T> = std::result::Result<T, Hl7Error>;
