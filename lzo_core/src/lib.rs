pub mod args;
pub mod codec;
pub mod config;
pub mod error;
pub mod resolve;
pub mod scratch;

mod compress;
mod decompress;
mod engine;

pub use args::Arg;
pub use codec::{Codec, CodecFault, CompressFault, DecodeReport, DecodeStatus};
pub use config::{EngineConfig, ScratchPolicy, UnknownScratchPolicy};
pub use decompress::Decompressed;
pub use engine::Engine;
pub use error::{ArgumentError, EngineError, Operation};
pub use resolve::{resolve, CallShape, Views};
pub use scratch::{ScratchLease, ScratchManager};
