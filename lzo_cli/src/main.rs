mod frame;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use xxhash_rust::xxh3::xxh3_64;

use lzo_codecs::lzo1x_engine;
use lzo_core::{Decompressed, Engine, EngineConfig, ScratchPolicy};

use frame::{FrameHeader, FLAG_HAS_CHECKSUM, HEADER_SIZE, VERSION};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "lzo",
    about = "LZO1X-1 compression: compress, decompress, and inspect single-frame files",
    version
)]
struct Cli {
    /// Scratch memory policy for compression: shared | per-call
    #[arg(long, global = true, env = "LZO_SCRATCH", default_value_t = ScratchPolicy::Shared)]
    scratch: ScratchPolicy,

    /// Log engine calls (debug level); RUST_LOG overrides
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into one LZO1X-1 frame
    Compress {
        /// Source file to compress ("-" reads stdin)
        input: PathBuf,
        /// Destination frame file
        output: PathBuf,
    },
    /// Decompress a frame back to raw bytes
    Decompress {
        /// Source frame file
        input: PathBuf,
        /// Destination file ("-" writes to stdout)
        output: PathBuf,
    },
    /// Print frame header fields
    Inspect {
        /// Frame file to inspect
        file: PathBuf,
    },
    /// Measure compress and decompress throughput on a raw file
    Bench {
        /// Raw input file
        file: PathBuf,
        /// Number of compress/decompress rounds
        #[arg(short, long, default_value_t = 20)]
        iterations: u32,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn throughput(bytes: u64, secs: f64) -> String {
    if secs <= 0.0 {
        return "-".to_string();
    }
    format!("{}/s", human_bytes((bytes as f64 / secs) as u64))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    if path.to_str() == Some("-") {
        io::stdin().lock().read_to_end(&mut data)?;
    } else {
        File::open(path)
            .with_context(|| format!("opening input file {:?}", path))?
            .read_to_end(&mut data)?;
    }
    Ok(data)
}

fn read_frame(path: &Path) -> anyhow::Result<(FrameHeader, Vec<u8>)> {
    let bytes = std::fs::read(path).with_context(|| format!("reading frame {:?}", path))?;
    let header = FrameHeader::from_bytes(&bytes)?;
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() as u64 != header.payload_len {
        anyhow::bail!(
            "frame payload is {} bytes but header says {}",
            payload.len(),
            header.payload_len
        );
    }
    Ok((header, payload.to_vec()))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(engine: &Engine, input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let raw = read_input(&input)?;
    let mut payload = vec![0u8; engine.compress_bound(raw.len())];

    let t0 = Instant::now();
    let written = engine
        .compress(&raw, &mut payload)
        .with_context(|| format!("compressing {:?}", input))?;
    let elapsed = t0.elapsed();
    payload.truncate(written);

    let header = FrameHeader {
        version: VERSION,
        flags: FLAG_HAS_CHECKSUM,
        raw_len: raw.len() as u64,
        payload_len: written as u64,
        checksum: xxh3_64(&raw),
    };
    let mut dst = File::create(&output).with_context(|| format!("creating output file {:?}", output))?;
    dst.write_all(&header.to_bytes())?;
    dst.write_all(&payload)?;
    dst.flush()?;
    tracing::debug!(output = ?output, raw = raw.len(), payload = written, "frame written");

    eprintln!("  codec       : {}", engine.codec().name());
    eprintln!("  raw size    : {}", human_bytes(header.raw_len));
    eprintln!("  compressed  : {}", human_bytes(header.payload_len));
    eprintln!("  ratio       : {:.2}x", header.ratio());
    eprintln!("  throughput  : {}", throughput(header.raw_len, elapsed.as_secs_f64()));
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(engine: &Engine, input: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let (header, payload) = read_frame(&input)?;
    let raw_len = usize::try_from(header.raw_len).context("raw length does not fit in memory")?;
    let mut raw = vec![0u8; raw_len];

    let t0 = Instant::now();
    let outcome = engine
        .decompress(&payload, &mut raw)
        .with_context(|| format!("decompressing {:?}", input))?;
    let elapsed = t0.elapsed();

    match outcome {
        Decompressed::Complete { produced, .. } if produced == raw_len => {}
        other => anyhow::bail!(
            "frame {:?} is corrupt: {}",
            input,
            match other.into_result() {
                Err(e) => e.to_string(),
                Ok((_, produced)) => format!("decoded {} bytes, header says {}", produced, raw_len),
            }
        ),
    }

    if header.has_flag(FLAG_HAS_CHECKSUM) {
        let computed = xxh3_64(&raw);
        if computed != header.checksum {
            anyhow::bail!(
                "checksum mismatch: expected {:016x}, got {:016x}",
                header.checksum,
                computed
            );
        }
    }

    if output.to_str() == Some("-") {
        io::stdout().lock().write_all(&raw)?;
    } else {
        std::fs::write(&output, &raw).with_context(|| format!("writing output file {:?}", output))?;
    }

    eprintln!("  raw size    : {}", human_bytes(header.raw_len));
    eprintln!("  throughput  : {}", throughput(header.raw_len, elapsed.as_secs_f64()));
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_inspect(file: PathBuf) -> anyhow::Result<()> {
    let (header, _) = read_frame(&file)?;
    let file_size = std::fs::metadata(&file)?.len();

    println!("=== LZO1X frame: {:?} ===", file);
    println!();
    println!("  frame version  : {}", header.version);
    println!("  raw size       : {}", human_bytes(header.raw_len));
    println!("  payload        : {}", human_bytes(header.payload_len));
    println!("  file on disk   : {}", human_bytes(file_size));
    println!("  ratio          : {:.2}x", header.ratio());
    println!("  flags          : 0x{:04x}", header.flags);
    if header.has_flag(FLAG_HAS_CHECKSUM) {
        println!("  xxh3 checksum  : {:016x}", header.checksum);
    }
    Ok(())
}

fn run_bench(engine: &Engine, file: PathBuf, iterations: u32) -> anyhow::Result<()> {
    if iterations == 0 {
        anyhow::bail!("iterations must be at least 1");
    }
    let raw = read_input(&file)?;
    let mut payload = vec![0u8; engine.compress_bound(raw.len())];
    let mut unpacked = vec![0u8; raw.len()];

    let t0 = Instant::now();
    let mut written = 0;
    for _ in 0..iterations {
        written = engine.compress(&raw, &mut payload)?;
    }
    let compress_secs = t0.elapsed().as_secs_f64();

    let t0 = Instant::now();
    for _ in 0..iterations {
        engine.decompress(&payload[..written], &mut unpacked)?.into_result()?;
    }
    let decompress_secs = t0.elapsed().as_secs_f64();

    if unpacked != raw {
        anyhow::bail!("round trip mismatch on {:?}", file);
    }

    let total = raw.len() as u64 * iterations as u64;
    println!();
    println!("=== LZO1X-1 Benchmark ===");
    println!("  input       : {}", human_bytes(raw.len() as u64));
    println!("  compressed  : {}", human_bytes(written as u64));
    println!("  iterations  : {}", iterations);
    println!("  scratch     : {}", engine.scratch().policy());
    println!("  compress    : {}", throughput(total, compress_secs));
    println!("  decompress  : {}", throughput(total, decompress_secs));
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = lzo1x_engine(EngineConfig::default().with_scratch_policy(cli.scratch));
    match cli.command {
        Commands::Compress { input, output } => run_compress(&engine, input, output),
        Commands::Decompress { input, output } => run_decompress(&engine, input, output),
        Commands::Inspect { file } => run_inspect(file),
        Commands::Bench { file, iterations } => run_bench(&engine, file, iterations),
    }
}
