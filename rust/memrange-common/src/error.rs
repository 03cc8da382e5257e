use thiserror::Error;

use crate::state::State;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn null_reference(op: &'static str, name: &'static str) -> Error {
        ErrorKind::NullReference { op, name }.into()
    }

    pub fn invalid_range(op: &'static str, state: State) -> Error {
        ErrorKind::InvalidRange { op, state }.into()
    }

    pub fn out_of_range(op: &'static str, offset: usize, size: usize) -> Error {
        ErrorKind::OutOfRange { op, offset, size }.into()
    }

    pub fn invalid_alignment(op: &'static str, alignment: usize) -> Error {
        ErrorKind::InvalidAlignment { op, alignment }.into()
    }

    pub fn different_element_size(op: &'static str, lhs: usize, rhs: usize) -> Error {
        ErrorKind::DifferentElementSize { op, lhs, rhs }.into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn out_of_memory(size: usize, alignment: usize) -> Error {
        ErrorKind::OutOfMemory { size, alignment }.into()
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{op}: required pointer '{name}' is null")]
    NullReference {
        op: &'static str,
        name: &'static str,
    },

    #[error("{op}: range is not valid (state {state})")]
    InvalidRange { op: &'static str, state: State },

    #[error("{op}: offset {offset} is out of range for size {size}")]
    OutOfRange {
        op: &'static str,
        offset: usize,
        size: usize,
    },

    #[error("{op}: alignment {alignment} is not a power of two")]
    InvalidAlignment { op: &'static str, alignment: usize },

    #[error("{op}: element size mismatch ({lhs} vs {rhs})")]
    DifferentElementSize {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("failed to allocate {size} bytes with alignment {alignment}")]
    OutOfMemory { size: usize, alignment: usize },
}

impl ErrorKind {
    /// Name of the operation that raised the error, when one was recorded.
    pub fn op(&self) -> Option<&'static str> {
        match self {
            ErrorKind::NullReference { op, .. }
            | ErrorKind::InvalidRange { op, .. }
            | ErrorKind::OutOfRange { op, .. }
            | ErrorKind::InvalidAlignment { op, .. }
            | ErrorKind::DifferentElementSize { op, .. } => Some(op),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
