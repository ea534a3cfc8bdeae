use lzo_core::codec::{Codec, CodecFault, CompressFault, DecodeReport, DecodeStatus};

use crate::lzo1x::{self, CompressError, Status, LZO1X_1_MEM_COMPRESS};

/// Fixed input for the init self-test: short enough to stay a literal run,
/// then long enough to exercise matches.
const SELF_TEST: &[u8] = b"lzo1x-1 self test: abcabcabcabcabcabcabcabcabcabcabcabcabcabc 0123456789 0123456789";

/// LZO1X-1 block codec.
///
/// Fast single-pass compression with a 32 KB dictionary as work memory and
/// no memory needed to decompress. Ratio is modest; throughput is the point.
///
/// Best for: log shipping, IPC framing, cache payloads.
pub struct Lzo1x1Codec;

impl Codec for Lzo1x1Codec {
    fn name(&self) -> &'static str {
        "lzo1x-1"
    }

    fn init(&self) -> Result<(), CodecFault> {
        let mut packed = vec![0u8; lzo1x::compress_bound(SELF_TEST.len())];
        let mut wrkmem = vec![0u8; LZO1X_1_MEM_COMPRESS];
        let written = lzo1x::compress(SELF_TEST, &mut packed, &mut wrkmem)
            .map_err(|e| CodecFault::SelfTest(format!("compress returned {:?}", e)))?;

        let mut unpacked = vec![0u8; SELF_TEST.len()];
        let decoded = lzo1x::decompress(&packed[..written], &mut unpacked);
        if decoded.status != Status::Ok || unpacked != SELF_TEST {
            return Err(CodecFault::SelfTest(format!(
                "round trip failed with {:?} after {} bytes",
                decoded.status, decoded.produced
            )));
        }
        Ok(())
    }

    fn scratch_size(&self) -> usize {
        LZO1X_1_MEM_COMPRESS
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        lzo1x::compress_bound(input_len)
    }

    fn compress(
        &self,
        input: &[u8],
        output: &mut [u8],
        scratch: &mut [u8],
    ) -> Result<usize, CompressFault> {
        let provided = scratch.len();
        lzo1x::compress(input, output, scratch).map_err(|e| match e {
            CompressError::OutputTooSmall => CompressFault::OutputTooSmall,
            CompressError::ScratchTooSmall => CompressFault::Codec(CodecFault::ScratchTooSmall {
                required: LZO1X_1_MEM_COMPRESS,
                provided,
            }),
            // Only reachable on a malformed literal sequence; treat like a
            // failed self-check rather than panicking.
            CompressError::Internal => {
                CompressFault::Codec(CodecFault::SelfTest("literal run without a preceding match".into()))
            }
        })
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> DecodeReport {
        let decoded = lzo1x::decompress(input, output);
        let status = match decoded.status {
            Status::Ok => DecodeStatus::Complete,
            Status::InputNotConsumed => DecodeStatus::InputNotFullyConsumed,
            Status::OutputOverrun => DecodeStatus::OutputOverrun,
            Status::InputOverrun => DecodeStatus::Fault(CodecFault::InputOverrun),
            Status::LookbehindOverrun => DecodeStatus::Fault(CodecFault::LookbehindOverrun),
        };
        DecodeReport {
            status,
            consumed: decoded.consumed,
            produced: decoded.produced,
        }
    }
}
