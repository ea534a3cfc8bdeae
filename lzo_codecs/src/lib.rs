pub mod lzo1x;
mod lzo1x_codec;

pub use lzo1x::compress_bound;
pub use lzo1x_codec::Lzo1x1Codec;

use std::sync::OnceLock;

use lzo_core::{Decompressed, Engine, EngineConfig, EngineError};

/// Build a fresh LZO1X-1 engine with `config`.
pub fn lzo1x_engine(config: EngineConfig) -> Engine {
    Engine::with_config(Box::new(Lzo1x1Codec), config)
}

/// The process-wide LZO1X-1 engine behind the module-level functions.
///
/// It uses one shared scratch region, so concurrent [`compress`] calls
/// through it run one at a time. Build a dedicated engine with
/// [`lzo1x_engine`] and `ScratchPolicy::PerCall` for parallel compression.
pub fn default_engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(|| lzo1x_engine(EngineConfig::default()))
}

/// Compress all of `input` into `output` with the default engine.
pub fn compress(input: &[u8], output: &mut [u8]) -> Result<usize, EngineError> {
    default_engine().compress(input, output)
}

/// Compress `input[src_offset..src_offset + src_len]` into
/// `output[out_offset..]` with the default engine.
pub fn compress_at(
    input: &[u8],
    src_offset: usize,
    src_len: usize,
    output: &mut [u8],
    out_offset: usize,
) -> Result<usize, EngineError> {
    default_engine().compress_at(input, src_offset, src_len, output, out_offset)
}

/// Decompress all of `input` into `output` with the default engine.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<Decompressed, EngineError> {
    default_engine().decompress(input, output)
}

/// Decompress `input[src_offset..src_offset + src_len]` into
/// `output[out_offset..]` with the default engine.
pub fn decompress_at(
    input: &[u8],
    src_offset: usize,
    src_len: usize,
    output: &mut [u8],
    out_offset: usize,
) -> Result<Decompressed, EngineError> {
    default_engine().decompress_at(input, src_offset, src_len, output, out_offset)
}
