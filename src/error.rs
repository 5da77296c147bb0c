//! Error types
//!
//! All readers and decoders report failures through [`PcapError`]. Each variant belongs to one
//! [`ErrorKind`]: a *bounds* error means that not enough bytes were present for a declared or
//! required field, a *format* error means that a value was present but invalid. Anything else
//! (errors raised by external decoders, broken decoder contracts) is of kind `Other`.

use std::error::Error as StdError;

use nom::error::{ErrorKind as NomErrorKind, ParseError};
use thiserror::Error;

/// Coarse classification of a [`PcapError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Not enough bytes for a declared or required field
    Bounds,
    /// A present but invalid value (bad magic, length mismatch, bad label type, ...)
    Format,
    /// Any other failure
    Other,
}

#[derive(Debug, Error)]
pub enum PcapError {
    /// Input ended before a required field
    #[error("{context}: truncated input, {missing} more byte(s) needed ({available} available)")]
    Truncated {
        context: String,
        available: usize,
        missing: usize,
    },

    /// Unknown magic number or byte-order magic
    #[error("header not recognized (magic {magic:#010x})")]
    HeaderNotRecognized { magic: u32 },

    #[error("block at offset {offset}: total length {length} is below the 12-byte minimum")]
    BlockTooShort { offset: usize, length: u32 },

    #[error("block at offset {offset}: total length {length} is not a multiple of 4")]
    Misaligned { offset: usize, length: u32 },

    /// Leading and trailing block lengths differ
    #[error(
        "block length mismatch: leading length {leading} at offset {leading_offset}, \
         trailing length {trailing} at offset {trailing_offset}"
    )]
    BlockLengthMismatch {
        leading: u32,
        leading_offset: usize,
        trailing: u32,
        trailing_offset: usize,
    },

    #[error("option {code} declares {length} byte(s), only {available} left in the block")]
    OptionsOverrun {
        code: u16,
        length: u16,
        available: usize,
    },

    #[error("unknown interface id {interface_id} ({known} interface(s) in section)")]
    UnknownInterface { interface_id: u32, known: usize },

    #[error("captured length {captured_len} exceeds the {available} byte(s) left in the block")]
    CapturedLengthOverflow { captured_len: u32, available: usize },

    /// DNS label length byte with the reserved `01` or `10` top bits
    #[error("reserved label type {bits:#04x} at offset {offset}")]
    ReservedLabelType { offset: usize, bits: u8 },

    /// DNS compression pointers nested deeper than `max_depth`, or pointing forward
    #[error("compression loop detected at offset {offset} (max depth {max_depth})")]
    CompressionLoop { offset: usize, max_depth: u8 },

    #[error("name {name:?} starting at offset {offset} is {length} octets long (max 255)")]
    NameTooLong {
        name: String,
        offset: usize,
        length: usize,
    },

    #[error("{protocol}: invalid {field}: {reason}")]
    InvalidField {
        protocol: &'static str,
        field: &'static str,
        reason: String,
    },

    /// A decoder returned a header length that does not shrink its input
    #[error("decoder {protocol} returned header length {header_length} for a {input_len}-byte buffer")]
    DecoderContract {
        protocol: &'static str,
        header_length: usize,
        input_len: usize,
    },

    #[error("parser error: {0:?}")]
    Nom(NomErrorKind),

    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl PcapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PcapError::Truncated { .. } => ErrorKind::Bounds,
            PcapError::Other(_) | PcapError::DecoderContract { .. } => ErrorKind::Other,
            _ => ErrorKind::Format,
        }
    }

    /// True for the bounds and format errors raised by this crate's own parsers
    #[inline]
    pub fn is_structural(&self) -> bool {
        self.kind() != ErrorKind::Other
    }

    /// Wrap any error raised by an external decoder
    pub fn other<E>(err: E) -> PcapError
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        PcapError::Other(err.into())
    }

    /// Prefix the context of a `Truncated` error; other variants are returned unchanged
    pub(crate) fn with_context<F>(self, f: F) -> PcapError
    where
        F: FnOnce() -> String,
    {
        match self {
            PcapError::Truncated {
                context,
                available,
                missing,
            } => PcapError::Truncated {
                context: format!("{}: {}", f(), context),
                available,
                missing,
            },
            e => e,
        }
    }
}

impl<'a> ParseError<&'a [u8]> for PcapError {
    fn from_error_kind(_input: &'a [u8], kind: NomErrorKind) -> Self {
        PcapError::Nom(kind)
    }
    fn append(_input: &'a [u8], _kind: NomErrorKind, other: Self) -> Self {
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds() {
        let e = PcapError::Truncated {
            context: "x".to_owned(),
            available: 1,
            missing: 2,
        };
        assert_eq!(e.kind(), ErrorKind::Bounds);
        assert!(e.is_structural());
        let e = PcapError::CompressionLoop {
            offset: 12,
            max_depth: 10,
        };
        assert_eq!(e.kind(), ErrorKind::Format);
        let e = PcapError::other("boom");
        assert_eq!(e.kind(), ErrorKind::Other);
        assert!(!e.is_structural());
    }

    #[test]
    fn context_is_prefixed() {
        let e = PcapError::Truncated {
            context: "record header".to_owned(),
            available: 3,
            missing: 1,
        }
        .with_context(|| "answers[2]".to_owned());
        assert_eq!(
            e.to_string(),
            "answers[2]: record header: truncated input, 1 more byte(s) needed (3 available)"
        );
    }
}
