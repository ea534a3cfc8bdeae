//! Error types for the engine.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecFault;

/// The two operations the engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

impl Operation {
    /// Name used in argument error messages.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Compress => "compress",
            Operation::Decompress => "decompress",
        }
    }

    fn usage(self) -> &'static str {
        match self {
            Operation::Compress => {
                "compress(uncompressed, output) or compress(uncompressed, src_offset, src_len, output, out_offset)"
            }
            Operation::Decompress => {
                "decompress(compressed, output) or decompress(compressed, src_offset, src_len, output, out_offset)"
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A call was shaped wrong. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("two or five arguments should be provided to {operation}, got {got}: {}", .operation.usage())]
    Arity { operation: Operation, got: usize },

    #[error("argument {position} should be a buffer")]
    NotABuffer { position: usize },

    #[error("argument {position} should be an integer")]
    NotAnInteger { position: usize },

    #[error("argument {position} ({name} = {value}) is out of range, limit is {limit}")]
    OutOfRange {
        position: usize,
        name: &'static str,
        value: i64,
        limit: usize,
    },
}

/// Errors surfaced by the compression and decompression engines.
///
/// `OutputOverrun` and `InputNotFullyConsumed` are never returned directly
/// by a decompress call; they are reported as [`crate::Decompressed`]
/// outcomes and only become errors through
/// [`crate::Decompressed::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),

    #[error("{codec} cannot initialize ({fault}); this usually indicates a build or platform problem")]
    EngineInitFailed {
        codec: &'static str,
        fault: CodecFault,
    },

    #[error("compression failed: output capacity of {capacity} bytes is too small")]
    CompressionFailed { capacity: usize },

    #[error("output overrun: decompressed data exceeds capacity ({consumed} bytes consumed, {produced} produced)")]
    OutputOverrun { consumed: usize, produced: usize },

    #[error("input not fully consumed: stream ended after {consumed} bytes ({produced} bytes produced)")]
    InputNotFullyConsumed { consumed: usize, produced: usize },

    #[error("codec error: {0}")]
    CodecError(CodecFault),
}

impl EngineError {
    /// Whether retrying the same call with a larger output buffer can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::CompressionFailed { .. } | EngineError::OutputOverrun { .. }
        )
    }
}
