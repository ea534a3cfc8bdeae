//! Compression work memory and the one-time codec initialization gate.

use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;

use parking_lot::{Mutex, MutexGuard};

use crate::codec::{Codec, CodecFault};
use crate::config::ScratchPolicy;
use crate::error::EngineError;

/// Owns the scratch region for one engine and remembers whether the codec
/// initialized.
///
/// Decompression never leases scratch memory; it only passes through
/// [`ScratchManager::ensure_ready`].
pub struct ScratchManager {
    size: usize,
    policy: ScratchPolicy,
    shared: Option<Mutex<Box<[u8]>>>,
    init: OnceLock<Result<(), CodecFault>>,
}

impl ScratchManager {
    /// `size` is the codec's declared minimum work memory.
    pub fn new(size: usize, policy: ScratchPolicy) -> Self {
        let shared = match policy {
            ScratchPolicy::Shared => Some(Mutex::new(vec![0u8; size].into_boxed_slice())),
            ScratchPolicy::PerCall => None,
        };
        Self {
            size,
            policy,
            shared,
            init: OnceLock::new(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn policy(&self) -> ScratchPolicy {
        self.policy
    }

    /// Run `codec.init()` on first use and report its cached outcome after.
    ///
    /// A failed initialization is sticky: every later call gets the same
    /// `EngineInitFailed` without the codec being asked again.
    pub fn ensure_ready(&self, codec: &dyn Codec) -> Result<(), EngineError> {
        let outcome = self.init.get_or_init(|| {
            let outcome = codec.init();
            match &outcome {
                Ok(()) => tracing::debug!(codec = codec.name(), "codec initialized"),
                Err(fault) => tracing::error!(codec = codec.name(), %fault, "codec initialization failed"),
            }
            outcome
        });
        outcome.clone().map_err(|fault| EngineError::EngineInitFailed {
            codec: codec.name(),
            fault,
        })
    }

    /// Acquire work memory for one compress call.
    ///
    /// With [`ScratchPolicy::Shared`] this blocks until no other compress
    /// call holds the region.
    pub fn lease(&self) -> ScratchLease<'_> {
        match &self.shared {
            Some(region) => ScratchLease::Shared(region.lock()),
            None => ScratchLease::Owned(vec![0u8; self.size].into_boxed_slice()),
        }
    }
}

/// Scratch memory held for the duration of one compress call.
///
/// Dropping the lease releases the shared region.
pub enum ScratchLease<'a> {
    Shared(MutexGuard<'a, Box<[u8]>>),
    Owned(Box<[u8]>),
}

impl Deref for ScratchLease<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            ScratchLease::Shared(guard) => guard,
            ScratchLease::Owned(region) => region,
        }
    }
}

impl DerefMut for ScratchLease<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            ScratchLease::Shared(guard) => guard,
            ScratchLease::Owned(region) => region,
        }
    }
}
