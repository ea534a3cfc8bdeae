//! Buffer addressing: turns a call shape into bounded input/output views.

use crate::error::{ArgumentError, EngineError};

/// Which of the two supported call shapes a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// The whole input buffer is the source and the whole output buffer is
    /// available for writing.
    Whole,
    /// `src_len` bytes starting at `src_offset` are the source; output is
    /// written starting at `out_offset`.
    Sliced {
        src_offset: usize,
        src_len: usize,
        out_offset: usize,
    },
}

/// Canonical views for one engine call.
///
/// `output` already starts at the requested output offset, so its length
/// is the capacity available to the codec. `out_offset` is only reported
/// in engine logs.
#[derive(Debug)]
pub struct Views<'i, 'o> {
    pub input: &'i [u8],
    pub output: &'o mut [u8],
    pub out_offset: usize,
}

impl Views<'_, '_> {
    /// Bytes the codec may write.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.output.len()
    }
}

/// Resolve `shape` against the caller's buffers.
///
/// In the sliced shape `src_offset + src_len` must lie within `input` and
/// `out_offset` within `output`. Argument positions in errors follow the
/// five-argument call: `src_offset` is 2, `src_len` is 3, `out_offset` is 5.
/// Nothing is read or written here.
pub fn resolve<'i, 'o>(
    input: &'i [u8],
    output: &'o mut [u8],
    shape: CallShape,
) -> Result<Views<'i, 'o>, EngineError> {
    match shape {
        CallShape::Whole => Ok(Views {
            input,
            output,
            out_offset: 0,
        }),
        CallShape::Sliced {
            src_offset,
            src_len,
            out_offset,
        } => {
            if src_offset > input.len() {
                return Err(out_of_range(2, "src_offset", src_offset, input.len()));
            }
            let src_end = src_offset
                .checked_add(src_len)
                .filter(|&end| end <= input.len())
                .ok_or_else(|| out_of_range(3, "src_len", src_len, input.len() - src_offset))?;
            if out_offset > output.len() {
                return Err(out_of_range(5, "out_offset", out_offset, output.len()));
            }
            Ok(Views {
                input: &input[src_offset..src_end],
                output: &mut output[out_offset..],
                out_offset,
            })
        }
    }
}

fn out_of_range(position: usize, name: &'static str, value: usize, limit: usize) -> EngineError {
    ArgumentError::OutOfRange {
        position,
        name,
        value: i64::try_from(value).unwrap_or(i64::MAX),
        limit,
    }
    .into()
}
