use thiserror::Error;

/// Faults a codec can raise that are not capacity or consumption outcomes.
///
/// These are always fatal to the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecFault {
    /// The compressed stream ended before its end-of-stream marker.
    #[error("input overrun: compressed stream is truncated")]
    InputOverrun,
    /// A back-reference pointed before the start of the output.
    #[error("lookbehind overrun: back-reference precedes the output start")]
    LookbehindOverrun,
    /// The caller handed the compressor less work memory than it needs.
    #[error("scratch memory too small: {provided} bytes provided, {required} required")]
    ScratchTooSmall { required: usize, provided: usize },
    /// The codec claimed to write more bytes than the output could hold.
    #[error("codec reported {written} bytes written into {capacity} bytes of output")]
    OverReported { written: usize, capacity: usize },
    /// The one-time environment self-check failed.
    #[error("self-test failed: {0}")]
    SelfTest(String),
}

/// Why a compress call did not produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressFault {
    #[error("output capacity exhausted")]
    OutputTooSmall,
    #[error(transparent)]
    Codec(#[from] CodecFault),
}

/// How a decompress call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The end-of-stream marker was reached exactly at the end of the input.
    Complete,
    /// The decoded data does not fit in the output capacity.
    OutputOverrun,
    /// The end-of-stream marker was reached with input bytes left over.
    InputNotFullyConsumed,
    Fault(CodecFault),
}

/// Result of a single decompress call.
///
/// `consumed` and `produced` are reported for every status, including
/// failures, so callers can see how far the decoder got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    pub status: DecodeStatus,
    pub consumed: usize,
    pub produced: usize,
}

/// Core compression abstraction.
///
/// Each `Codec` implementation:
/// - Is a pure transform over caller-provided slices. It never allocates the
///   input, output or scratch memory it works on.
/// - Never writes past the end of `output`, on success or on failure.
/// - Treats the length of `output` purely as a capacity bound and never
///   reads its prior contents.
pub trait Codec: Send + Sync {
    /// Human-readable codec name for logs and CLI display.
    fn name(&self) -> &'static str;

    /// One-time environment check, run before the first call.
    ///
    /// The engine caches the outcome; a failure here is permanent for the
    /// lifetime of the engine.
    fn init(&self) -> Result<(), CodecFault>;

    /// Bytes of work memory `compress` needs.
    fn scratch_size(&self) -> usize;

    /// Worst-case compressed size for `input_len` bytes of input.
    fn compress_bound(&self, input_len: usize) -> usize;

    /// Compress `input` into `output`, returning the number of bytes written.
    ///
    /// `scratch` holds at least `scratch_size()` bytes. Its contents on entry
    /// are unspecified.
    fn compress(
        &self,
        input: &[u8],
        output: &mut [u8],
        scratch: &mut [u8],
    ) -> Result<usize, CompressFault>;

    /// Decompress `input` into `output`.
    fn decompress(&self, input: &[u8], output: &mut [u8]) -> DecodeReport;
}
