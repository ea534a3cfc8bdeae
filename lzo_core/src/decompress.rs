use crate::codec::DecodeStatus;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::resolve::{resolve, CallShape};

/// Outcome of a decompress call that did not hit a fatal error.
///
/// Both non-complete variants are recoverable: `OutputOverrun` can be
/// retried with a larger output buffer, while `InputNotFullyConsumed` means
/// the stream ended before the declared input did. In that case the output
/// up to `produced` is still the fully decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decompressed {
    Complete { consumed: usize, produced: usize },
    OutputOverrun { consumed: usize, produced: usize },
    InputNotFullyConsumed { consumed: usize, produced: usize },
}

impl Decompressed {
    /// Compressed bytes read.
    pub fn consumed(&self) -> usize {
        match *self {
            Decompressed::Complete { consumed, .. }
            | Decompressed::OutputOverrun { consumed, .. }
            | Decompressed::InputNotFullyConsumed { consumed, .. } => consumed,
        }
    }

    /// Decompressed bytes written after the output offset.
    pub fn produced(&self) -> usize {
        match *self {
            Decompressed::Complete { produced, .. }
            | Decompressed::OutputOverrun { produced, .. }
            | Decompressed::InputNotFullyConsumed { produced, .. } => produced,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Decompressed::Complete { .. })
    }

    /// `(consumed, produced)` for a complete stream, an error otherwise.
    pub fn into_result(self) -> Result<(usize, usize), EngineError> {
        match self {
            Decompressed::Complete { consumed, produced } => Ok((consumed, produced)),
            Decompressed::OutputOverrun { consumed, produced } => {
                Err(EngineError::OutputOverrun { consumed, produced })
            }
            Decompressed::InputNotFullyConsumed { consumed, produced } => {
                Err(EngineError::InputNotFullyConsumed { consumed, produced })
            }
        }
    }
}

impl Engine {
    /// Decompress all of `input` into `output`.
    pub fn decompress(&self, input: &[u8], output: &mut [u8]) -> Result<Decompressed, EngineError> {
        self.decompress_with(input, output, CallShape::Whole)
    }

    /// Decompress `input[src_offset..src_offset + src_len]` into
    /// `output[out_offset..]`.
    pub fn decompress_at(
        &self,
        input: &[u8],
        src_offset: usize,
        src_len: usize,
        output: &mut [u8],
        out_offset: usize,
    ) -> Result<Decompressed, EngineError> {
        let shape = CallShape::Sliced {
            src_offset,
            src_len,
            out_offset,
        };
        self.decompress_with(input, output, shape)
    }

    /// Decompress using an explicit call shape.
    ///
    /// Capacity and consumption problems come back as [`Decompressed`]
    /// outcomes. Only argument, initialization and codec faults are errors.
    pub fn decompress_with(
        &self,
        input: &[u8],
        output: &mut [u8],
        shape: CallShape,
    ) -> Result<Decompressed, EngineError> {
        let views = resolve(input, output, shape)?;
        self.scratch.ensure_ready(self.codec.as_ref())?;

        let capacity = views.capacity();
        let report = self.codec.decompress(views.input, views.output);
        let (consumed, produced) = (report.consumed, report.produced);

        let outcome = match report.status {
            DecodeStatus::Complete => Decompressed::Complete { consumed, produced },
            DecodeStatus::OutputOverrun => {
                tracing::warn!(
                    consumed,
                    produced,
                    out_offset = views.out_offset,
                    capacity,
                    "decompress output overrun"
                );
                Decompressed::OutputOverrun { consumed, produced }
            }
            DecodeStatus::InputNotFullyConsumed => {
                tracing::warn!(
                    consumed,
                    input_len = views.input.len(),
                    produced,
                    "decompress input not fully consumed"
                );
                Decompressed::InputNotFullyConsumed { consumed, produced }
            }
            DecodeStatus::Fault(fault) => {
                tracing::debug!(consumed, produced, %fault, "decompress codec fault");
                return Err(EngineError::CodecError(fault));
            }
        };

        tracing::debug!(
            codec = self.codec.name(),
            ?shape,
            input_len = views.input.len(),
            out_offset = views.out_offset,
            capacity,
            consumed,
            produced,
            "decompressed"
        );
        Ok(outcome)
    }
}
