use crate::codec::Codec;
use crate::config::EngineConfig;
use crate::scratch::ScratchManager;

/// Safe compression engine around a [`Codec`].
///
/// # Call contract
/// Every call borrows the caller's buffers for its own duration only and
/// never allocates them. Arguments are validated before the codec runs, so
/// a rejected call leaves the output buffer untouched. The codec only ever
/// sees the resolved views, which bounds every write to
/// `output[out_offset..]`.
///
/// # Concurrency
/// `Engine` is `Send + Sync`. Compression needs work memory from the
/// [`ScratchManager`]; under the default shared policy concurrent compress
/// calls on one engine run one at a time. Decompression takes no lock.
///
/// The compress path lives in `compress.rs`, the decompress path in
/// `decompress.rs` and host-argument dispatch in `args.rs`.
pub struct Engine {
    pub(crate) codec: Box<dyn Codec>,
    pub(crate) scratch: ScratchManager,
}

impl Engine {
    /// Build an engine with the default configuration (shared scratch).
    pub fn new(codec: Box<dyn Codec>) -> Self {
        Self::with_config(codec, EngineConfig::default())
    }

    pub fn with_config(codec: Box<dyn Codec>, config: EngineConfig) -> Self {
        let scratch = ScratchManager::new(codec.scratch_size(), config.scratch_policy);
        tracing::debug!(
            codec = codec.name(),
            scratch_bytes = scratch.size(),
            policy = %config.scratch_policy,
            "engine created"
        );
        Self { codec, scratch }
    }

    #[inline]
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    #[inline]
    pub fn scratch(&self) -> &ScratchManager {
        &self.scratch
    }

    /// Worst-case compressed size for `input_len` bytes, per the codec.
    #[inline]
    pub fn compress_bound(&self, input_len: usize) -> usize {
        self.codec.compress_bound(input_len)
    }
}
