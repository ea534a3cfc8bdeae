use crate::codec::{CodecFault, CompressFault};
use crate::engine::Engine;
use crate::error::EngineError;
use crate::resolve::{resolve, CallShape};

impl Engine {
    /// Compress all of `input` into `output`, returning the bytes written.
    pub fn compress(&self, input: &[u8], output: &mut [u8]) -> Result<usize, EngineError> {
        self.compress_with(input, output, CallShape::Whole)
    }

    /// Compress `input[src_offset..src_offset + src_len]` into
    /// `output[out_offset..]`, returning the bytes written after
    /// `out_offset`.
    pub fn compress_at(
        &self,
        input: &[u8],
        src_offset: usize,
        src_len: usize,
        output: &mut [u8],
        out_offset: usize,
    ) -> Result<usize, EngineError> {
        let shape = CallShape::Sliced {
            src_offset,
            src_len,
            out_offset,
        };
        self.compress_with(input, output, shape)
    }

    /// Compress using an explicit call shape.
    ///
    /// Any codec failure is fatal to the call: running out of capacity is
    /// `CompressionFailed`, anything else is `CodecError`. A codec that
    /// reports more bytes than the output holds is a `CodecError` too.
    pub fn compress_with(
        &self,
        input: &[u8],
        output: &mut [u8],
        shape: CallShape,
    ) -> Result<usize, EngineError> {
        let views = resolve(input, output, shape)?;
        self.scratch.ensure_ready(self.codec.as_ref())?;

        let capacity = views.capacity();
        let written = {
            let mut lease = self.scratch.lease();
            self.codec.compress(views.input, views.output, &mut lease)
        };

        match written {
            Ok(written) if written <= capacity => {
                tracing::debug!(
                    codec = self.codec.name(),
                    ?shape,
                    input_len = views.input.len(),
                    out_offset = views.out_offset,
                    capacity,
                    written,
                    "compressed"
                );
                Ok(written)
            }
            Ok(written) => {
                tracing::error!(
                    codec = self.codec.name(),
                    written,
                    capacity,
                    "codec reported more bytes than capacity"
                );
                Err(EngineError::CodecError(CodecFault::OverReported { written, capacity }))
            }
            Err(CompressFault::OutputTooSmall) => {
                tracing::debug!(
                    input_len = views.input.len(),
                    out_offset = views.out_offset,
                    capacity,
                    "compress output too small"
                );
                Err(EngineError::CompressionFailed { capacity })
            }
            Err(CompressFault::Codec(fault)) => {
                tracing::debug!(input_len = views.input.len(), capacity, %fault, "compress codec fault");
                Err(EngineError::CodecError(fault))
            }
        }
    }
}
