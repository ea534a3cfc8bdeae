/// Integration tests: the engine contract around the bundled LZO1X-1 codec.
///
/// Covers both call shapes, capacity safety, the recoverable decompress
/// outcomes, argument-shape validation, sticky initialization failure, and
/// concurrent compression under both scratch policies.
use std::sync::atomic::{AtomicUsize, Ordering};

use lzo_codecs::{lzo1x_engine, Lzo1x1Codec};
use lzo_core::{
    Arg, ArgumentError, Codec, CodecFault, CompressFault, DecodeReport, DecodeStatus, Decompressed,
    Engine, EngineConfig, EngineError, ScratchPolicy,
};

/// Generate `len` deterministic bytes using a simple LCG.
fn pseudo_random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = seed;
    (0..len)
        .map(|_| {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (rng >> 56) as u8
        })
        .collect()
}

/// Generate `len` highly compressible bytes (repeating pattern).
fn compressible_bytes(len: usize) -> Vec<u8> {
    let pattern = b"the quick brown fox jumps over the lazy dog. ";
    (0..len).map(|i| pattern[i % pattern.len()]).collect()
}

fn engine() -> Engine {
    lzo1x_engine(EngineConfig::default())
}

// ── round trips ────────────────────────────────────────────────────────────

#[test]
fn test_roundtrip_whole_buffers() {
    let engine = engine();
    for data in [
        Vec::new(),
        b"x".to_vec(),
        compressible_bytes(100_000),
        pseudo_random_bytes(70_000, 0xDEAD_BEEF),
    ] {
        let mut packed = vec![0u8; engine.compress_bound(data.len())];
        let written = engine.compress(&data, &mut packed).unwrap();

        let mut unpacked = vec![0u8; data.len()];
        let outcome = engine.decompress(&packed[..written], &mut unpacked).unwrap();
        assert_eq!(
            outcome,
            Decompressed::Complete {
                consumed: written,
                produced: data.len()
            }
        );
        assert_eq!(unpacked, data);
    }
}

#[test]
fn test_roundtrip_sliced_buffers() {
    let engine = engine();
    let data = compressible_bytes(5000);
    let mut input = vec![0xEEu8; 7];
    input.extend_from_slice(&data);
    input.extend_from_slice(&[0xEE; 9]);

    let mut packed = vec![0u8; 11 + engine.compress_bound(data.len())];
    let written = engine
        .compress_at(&input, 7, data.len(), &mut packed, 11)
        .unwrap();

    let mut unpacked = vec![0u8; 4 + data.len()];
    let outcome = engine
        .decompress_at(&packed, 11, written, &mut unpacked, 4)
        .unwrap();
    assert_eq!(outcome.into_result().unwrap(), (written, data.len()));
    assert_eq!(&unpacked[4..], data.as_slice());
}

/// "AAAAAAAAAA" into a 32-byte buffer, then back into exactly 10 bytes.
#[test]
fn test_ten_byte_scenario() {
    let data = b"AAAAAAAAAA";
    let mut packed = [0u8; 32];
    let written = lzo_codecs::compress(data, &mut packed).unwrap();
    assert!(written <= lzo_codecs::compress_bound(data.len()));

    let mut unpacked = [0u8; 10];
    let outcome = lzo_codecs::decompress(&packed[..written], &mut unpacked).unwrap();
    assert_eq!(outcome.consumed(), written);
    assert_eq!(outcome.produced(), 10);
    assert!(outcome.is_complete());
    assert_eq!(&unpacked, data);
}

#[test]
fn test_module_level_sliced_roundtrip() {
    let mut input = vec![0xEEu8; 7];
    input.extend_from_slice(b"AAAAAAAAAA");
    input.extend_from_slice(&[0xEE; 5]);

    let mut packed = [0x5Au8; 40];
    let written = lzo_codecs::compress_at(&input, 7, 10, &mut packed, 4).unwrap();
    assert!(packed[..4].iter().all(|&b| b == 0x5A));
    assert_eq!(&packed[4 + written - 3..4 + written], &[0x11, 0, 0]);

    let mut unpacked = [0x5Au8; 12];
    let outcome = lzo_codecs::decompress_at(&packed, 4, written, &mut unpacked, 2).unwrap();
    assert_eq!(
        outcome,
        Decompressed::Complete {
            consumed: written,
            produced: 10
        }
    );
    assert_eq!(&unpacked[..2], &[0x5A, 0x5A]);
    assert_eq!(&unpacked[2..], b"AAAAAAAAAA");
}

// ── capacity and offsets ───────────────────────────────────────────────────

#[test]
fn test_offset_call_reads_and_writes_only_its_window() {
    let engine = engine();
    let input: Vec<u8> = (0u8..32).collect();
    let mut output = [0x5Au8; 64];

    let written = engine.compress_at(&input, 10, 5, &mut output, 3).unwrap();
    assert!(written > 0);
    assert!(output[..3].iter().all(|&b| b == 0x5A), "bytes before offset changed");
    assert!(
        output[3 + written..].iter().all(|&b| b == 0x5A),
        "bytes after the written range changed"
    );

    let mut unpacked = [0u8; 5];
    let outcome = engine
        .decompress(&output[3..3 + written], &mut unpacked)
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(unpacked, [10, 11, 12, 13, 14]);
}

#[test]
fn test_compress_into_small_output_fails_within_capacity() {
    let engine = engine();
    let data = pseudo_random_bytes(4096, 7);
    let mut output = vec![0x77u8; 1000];

    let err = engine.compress_at(&data, 0, data.len(), &mut output, 900).unwrap_err();
    assert_eq!(err, EngineError::CompressionFailed { capacity: 100 });
    assert!(err.is_retryable());
    assert!(output[..900].iter().all(|&b| b == 0x77));
}

#[test]
fn test_decompress_into_small_output_reports_overrun() {
    let engine = engine();
    let data = compressible_bytes(10_000);
    let mut packed = vec![0u8; engine.compress_bound(data.len())];
    let written = engine.compress(&data, &mut packed).unwrap();

    let mut unpacked = vec![0u8; data.len() - 1];
    let outcome = engine.decompress(&packed[..written], &mut unpacked).unwrap();
    assert!(matches!(outcome, Decompressed::OutputOverrun { .. }));
    assert!(outcome.produced() < data.len());
    assert!(outcome.into_result().unwrap_err().is_retryable());

    // Retrying with the true size succeeds.
    let mut unpacked = vec![0u8; data.len()];
    let outcome = engine.decompress(&packed[..written], &mut unpacked).unwrap();
    assert!(outcome.is_complete());
    assert_eq!(unpacked, data);
}

/// Trailing garbage after a stream still yields the full decoded payload.
#[test]
fn test_trailing_bytes_report_input_not_fully_consumed() {
    let data = b"hello world; hello world; hello world;";
    let mut output = [0u8; 100];
    let written = lzo_codecs::compress(data, &mut output).unwrap();

    let mut input = output[..written].to_vec();
    input.extend_from_slice(b"hello");
    let mut output = [0u8; 100];
    let outcome = lzo_codecs::decompress(&input, &mut output).unwrap();

    assert_eq!(
        outcome,
        Decompressed::InputNotFullyConsumed {
            consumed: written,
            produced: data.len()
        }
    );
    assert_eq!(&output[..outcome.produced()], data);
    assert!(matches!(
        outcome.into_result(),
        Err(EngineError::InputNotFullyConsumed { .. })
    ));
}

#[test]
fn test_truncated_stream_is_a_codec_error() {
    let engine = engine();
    let data = pseudo_random_bytes(300, 3);
    let mut packed = vec![0u8; engine.compress_bound(data.len())];
    let written = engine.compress(&data, &mut packed).unwrap();

    let mut unpacked = vec![0u8; data.len()];
    let err = engine
        .decompress(&packed[..written / 2], &mut unpacked)
        .unwrap_err();
    assert_eq!(err, EngineError::CodecError(CodecFault::InputOverrun));
    assert!(!err.is_retryable());
}

#[test]
fn test_out_of_range_slices_are_rejected_before_writing() {
    let engine = engine();
    let input = [1u8; 16];
    let mut output = [0x11u8; 16];

    let err = engine.compress_at(&input, 10, 7, &mut output, 0).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidArgument(ArgumentError::OutOfRange { position: 3, .. })
    ));
    let err = engine.decompress_at(&input, 0, 4, &mut output, 17).unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidArgument(ArgumentError::OutOfRange { position: 5, .. })
    ));
    assert!(output.iter().all(|&b| b == 0x11));
}

// ── host argument dispatch ─────────────────────────────────────────────────

#[test]
fn test_argument_dispatch_roundtrip() {
    let engine = engine();
    let mut data = compressible_bytes(2000);
    let mut packed = vec![0u8; 8 + engine.compress_bound(data.len())];

    let written = {
        let len = data.len() as i64;
        let mut args = [
            Arg::Buffer(&mut data),
            Arg::Integer(0),
            Arg::Integer(len),
            Arg::Buffer(&mut packed),
            Arg::Integer(8),
        ];
        engine.compress_args(&mut args).unwrap()
    };

    let mut input = packed[8..8 + written].to_vec();
    let mut unpacked = vec![0u8; data.len()];
    let outcome = {
        let mut args = [Arg::Buffer(&mut input), Arg::Buffer(&mut unpacked)];
        engine.decompress_args(&mut args).unwrap()
    };
    assert!(outcome.is_complete());
    assert_eq!(unpacked, data);
}

#[test]
fn test_argument_dispatch_rejects_bad_shapes() {
    let engine = engine();
    let mut a = [0u8; 8];
    let mut b = [0u8; 8];
    let mut c = [0u8; 8];
    let mut d = [0u8; 8];

    let mut args = [
        Arg::Buffer(&mut a),
        Arg::Buffer(&mut b),
        Arg::Buffer(&mut c),
        Arg::Buffer(&mut d),
    ];
    for n in [0, 1, 3, 4] {
        let err = engine.compress_args(&mut args[..n]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidArgument(ArgumentError::Arity { got, .. }) if got == n
        ));
        let err = engine.decompress_args(&mut args[..n]).unwrap_err();
        assert!(err.to_string().contains("decompress(compressed, output)"));
    }

    let mut args = [Arg::Buffer(&mut a), Arg::Integer(3)];
    let err = engine.compress_args(&mut args).unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidArgument(ArgumentError::NotABuffer { position: 2 })
    );
    assert!(err.to_string().contains("argument 2 should be a buffer"));
}

// ── initialization ─────────────────────────────────────────────────────────

/// A codec whose environment check always fails.
struct BrokenCodec {
    init_calls: AtomicUsize,
}

impl Codec for BrokenCodec {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn init(&self) -> Result<(), CodecFault> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        Err(CodecFault::SelfTest("unsupported platform".into()))
    }

    fn scratch_size(&self) -> usize {
        Lzo1x1Codec.scratch_size()
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        Lzo1x1Codec.compress_bound(input_len)
    }

    fn compress(
        &self,
        input: &[u8],
        output: &mut [u8],
        scratch: &mut [u8],
    ) -> Result<usize, CompressFault> {
        Lzo1x1Codec.compress(input, output, scratch)
    }

    fn decompress(&self, input: &[u8], output: &mut [u8]) -> DecodeReport {
        Lzo1x1Codec.decompress(input, output)
    }
}

#[test]
fn test_init_failure_is_sticky_for_both_operations() {
    let engine = Engine::new(Box::new(BrokenCodec {
        init_calls: AtomicUsize::new(0),
    }));
    let mut output = [0u8; 64];

    for _ in 0..3 {
        let err = engine.compress(b"payload", &mut output).unwrap_err();
        assert!(matches!(err, EngineError::EngineInitFailed { codec: "broken", .. }));
        let err = engine.decompress(&[0x11, 0, 0], &mut output).unwrap_err();
        assert!(matches!(err, EngineError::EngineInitFailed { .. }));
    }
    assert!(output.iter().all(|&b| b == 0), "nothing may be written");
}

/// A codec that claims five more bytes than the output can hold.
struct OverReportingCodec;

impl Codec for OverReportingCodec {
    fn name(&self) -> &'static str {
        "over-reporting"
    }

    fn init(&self) -> Result<(), CodecFault> {
        Ok(())
    }

    fn scratch_size(&self) -> usize {
        0
    }

    fn compress_bound(&self, input_len: usize) -> usize {
        input_len
    }

    fn compress(
        &self,
        _input: &[u8],
        output: &mut [u8],
        _scratch: &mut [u8],
    ) -> Result<usize, CompressFault> {
        Ok(output.len() + 5)
    }

    fn decompress(&self, _input: &[u8], _output: &mut [u8]) -> DecodeReport {
        DecodeReport {
            status: DecodeStatus::Complete,
            consumed: 0,
            produced: 0,
        }
    }
}

#[test]
fn test_over_reported_length_is_a_codec_error() {
    let engine = Engine::new(Box::new(OverReportingCodec));
    let mut output = [0u8; 16];

    let err = engine.compress(b"payload", &mut output).unwrap_err();
    assert_eq!(
        err,
        EngineError::CodecError(CodecFault::OverReported {
            written: 21,
            capacity: 16
        })
    );
    assert!(!err.is_retryable());

    let err = engine.compress_at(b"payload", 0, 7, &mut output, 10).unwrap_err();
    assert_eq!(
        err,
        EngineError::CodecError(CodecFault::OverReported {
            written: 11,
            capacity: 6
        })
    );
}

#[test]
fn test_repeated_calls_after_init_succeed() {
    let engine = engine();
    let mut output = [0u8; 64];
    for i in 0..10u8 {
        let written = engine.compress(&[i; 30], &mut output).unwrap();
        assert!(written > 0);
    }
}

// ── concurrency ────────────────────────────────────────────────────────────

fn compress_in_parallel(policy: ScratchPolicy) {
    let engine = lzo1x_engine(EngineConfig::default().with_scratch_policy(policy));
    let inputs: Vec<Vec<u8>> = (0..8)
        .map(|i| {
            let mut data = compressible_bytes(20_000 + i * 997);
            data.extend(pseudo_random_bytes(3000, i as u64));
            data
        })
        .collect();

    let expected: Vec<Vec<u8>> = inputs
        .iter()
        .map(|data| {
            let mut packed = vec![0u8; engine.compress_bound(data.len())];
            let n = engine.compress(data, &mut packed).unwrap();
            packed.truncate(n);
            packed
        })
        .collect();

    std::thread::scope(|s| {
        for (data, expected) in inputs.iter().zip(&expected) {
            let engine = &engine;
            s.spawn(move || {
                for _ in 0..4 {
                    let mut packed = vec![0u8; engine.compress_bound(data.len())];
                    let n = engine.compress(data, &mut packed).unwrap();
                    assert_eq!(&packed[..n], expected.as_slice());

                    let mut unpacked = vec![0u8; data.len()];
                    let outcome = engine.decompress(&packed[..n], &mut unpacked).unwrap();
                    assert!(outcome.is_complete());
                    assert_eq!(&unpacked, data);
                }
            });
        }
    });
}

#[test]
fn test_concurrent_compress_shared_scratch() {
    compress_in_parallel(ScratchPolicy::Shared);
}

#[test]
fn test_concurrent_compress_per_call_scratch() {
    compress_in_parallel(ScratchPolicy::PerCall);
}
