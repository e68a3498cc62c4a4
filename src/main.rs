//! sdp - command-line harness untuk SDP wire codec
//!
//! Subcommand:
//! - gen-fixtures: tulis semua reference fixture sebagai `.sdpb`
//! - verify: load fixture (mmap) dan decode dengan setiap strategi
//! - bench: ukur size/encode/decode per strategi
//! - inspect: tampilkan header envelope sebuah file

use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use eyre::{bail, Result, WrapErr};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use sdp::config::{
    DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_STRING_LEN,
    DEFAULT_MAX_TOTAL_ELEMENTS,
};
use sdp::core::{fixture_path, write_fixture, DecodeArena, FixtureFile, Owned, ZeroCopy};
use sdp::fixtures::{registry, FixtureMessage, PluginRegistry, WireStruct};
use sdp::protocol::{
    arena_size, decode, encode_to_vec, parse_envelope, size_struct, MessageHeader, HEADER_SIZE,
};
use sdp::{ArrayMode, DecodeOptions, Limits};

#[derive(Parser)]
#[command(name = "sdp")]
#[command(version, about = "SDP wire codec harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every reference fixture as an envelope file
    GenFixtures {
        /// Output directory
        dir: PathBuf,
    },

    /// Decode fixture files with every strategy and compare against the samples
    Verify {
        /// Directory written by gen-fixtures
        dir: PathBuf,

        #[command(flatten)]
        limits: LimitArgs,
    },

    /// Time size/encode/decode per strategy
    Bench {
        /// Iterations per measurement
        #[arg(short = 'n', long, default_value = "100000")]
        iterations: usize,

        /// Plugins in the benchmark registry
        #[arg(long, default_value = "8")]
        plugins: usize,

        /// Parameters per plugin
        #[arg(long, default_value = "32")]
        params: usize,
    },

    /// Print the envelope header of a file, optionally decoding the payload
    Inspect {
        file: PathBuf,

        /// Decode the payload with the registered schema
        #[arg(long)]
        decode: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct LimitArgs {
    /// Maximum length of a single string
    #[arg(long, default_value_t = DEFAULT_MAX_STRING_LEN)]
    max_string_len: usize,

    /// Maximum count of a single array
    #[arg(long, default_value_t = DEFAULT_MAX_ARRAY_LEN)]
    max_array_len: usize,

    /// Maximum total array elements in one decode
    #[arg(long, default_value_t = DEFAULT_MAX_TOTAL_ELEMENTS)]
    max_total_elements: usize,

    /// Maximum message size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_SIZE)]
    max_message_size: usize,
}

impl LimitArgs {
    fn options(&self) -> DecodeOptions {
        DecodeOptions::with_limits(
            Limits::default()
                .with_max_string_len(self.max_string_len)
                .with_max_array_len(self.max_array_len)
                .with_max_total_elements(self.max_total_elements)
                .with_max_message_size(self.max_message_size),
        )
    }
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::GenFixtures { dir } => gen_fixtures(&dir),
        Commands::Verify { dir, limits } => verify(&dir, limits.options()),
        Commands::Bench {
            iterations,
            plugins,
            params,
        } => {
            bench(iterations.max(1), plugins, params);
            Ok(())
        }
        Commands::Inspect {
            file,
            decode,
            limits,
        } => inspect(&file, decode, limits.options()),
    }
}

fn gen_fixtures(dir: &Path) -> Result<()> {
    println!("📦 Writing fixtures to {}", dir.display());
    for (name, sample) in FixtureMessage::samples() {
        let path = fixture_path(dir, name);
        let bytes = sample.to_message()?;
        write_fixture(&path, &bytes).wrap_err_with(|| format!("writing {}", path.display()))?;
        println!(
            "  {:<28} type {:>2} {:<20} {:>6} bytes",
            name,
            sample.type_id(),
            sample.name(),
            bytes.len()
        );
    }
    println!("\n✅ Fixtures written");
    Ok(())
}

fn verify(dir: &Path, opts: DecodeOptions) -> Result<()> {
    println!("🔍 Verifying fixtures in {}", dir.display());
    let registry = registry().wrap_err("building fixture registry")?;
    let mut arena = DecodeArena::default();
    let mut failures = 0usize;

    for (name, sample) in FixtureMessage::samples() {
        let path = fixture_path(dir, name);
        let file = FixtureFile::open(&path).wrap_err_with(|| format!("opening {}", path.display()))?;
        let bytes = file.as_bytes();
        let expected = sample.to_value();

        let mut mismatches = Vec::new();
        if sample.to_message()? != bytes {
            mismatches.push("re-encode");
        }
        if FixtureMessage::from_message_with(bytes, opts)? != sample {
            mismatches.push("typed");
        }
        if registry.decode_message(bytes, opts, &mut ZeroCopy)?.value != expected {
            mismatches.push("zero-copy");
        }
        if registry.decode_message(bytes, opts, &mut Owned)?.value != expected {
            mismatches.push("owned");
        }
        {
            let mut storage = &arena;
            if registry.decode_message(bytes, opts, &mut storage)?.value != expected {
                mismatches.push("arena");
            }
        }
        debug!(name, arena_used = arena.used(), "fixture decoded");
        arena.reset();

        if mismatches.is_empty() {
            println!("  ✅ {:<28} {:>6} bytes", name, bytes.len());
        } else {
            failures += 1;
            println!("  ❌ {:<28} mismatch: {}", name, mismatches.join(", "));
        }
    }

    if failures > 0 {
        bail!("{failures} fixture(s) failed verification");
    }
    println!("\n✅ All fixtures verified");
    Ok(())
}

fn inspect(file: &Path, decode_payload: bool, opts: DecodeOptions) -> Result<()> {
    let fixture = FixtureFile::open(file).wrap_err_with(|| format!("opening {}", file.display()))?;
    let bytes = fixture.as_bytes();
    let header = MessageHeader::parse(bytes, opts.limits)
        .wrap_err_with(|| format!("reading header of {}", file.display()))?;
    let registry = registry().wrap_err("building fixture registry")?;
    let schema_name = registry.get(header.type_id).map_or("<unregistered>", |s| s.name());

    println!("📄 {}", file.display());
    println!("  Magic:        SDP");
    println!("  Version:      {}", header.version as char);
    println!("  Type id:      {} ({})", header.type_id, schema_name);
    println!("  Payload:      {} bytes", header.payload_len);
    println!("  File size:    {} bytes", bytes.len());
    if bytes.len() > header.total_size() {
        println!("  Trailing:     {} bytes", bytes.len() - header.total_size());
    }

    if decode_payload {
        let msg = registry.decode_message(bytes, opts, &mut ZeroCopy)?;
        println!("\n{:#?}", msg.value);
    }
    Ok(())
}

fn report(label: &str, iterations: usize, bytes_per_op: usize, elapsed: Duration) {
    let ns = elapsed.as_nanos() as f64 / iterations as f64;
    println!(
        "  {:<22} {:>10.2} ns/op ({:.3} μs/op) {:>10.2} MB/sec",
        label,
        ns,
        ns / 1000.0,
        (iterations * bytes_per_op) as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}

fn time<F: FnMut()>(iterations: usize, mut op: F) -> Duration {
    // Warm up
    for _ in 0..iterations.min(1000) {
        op();
    }
    let start = Instant::now();
    for _ in 0..iterations {
        op();
    }
    start.elapsed()
}

fn bench(iterations: usize, plugins: usize, params: usize) {
    println!("🚀 SDP Wire Codec Benchmark");
    println!("===========================\n");

    let sample = PluginRegistry::sample(plugins, params);
    let value = sample.to_value();
    let schema = PluginRegistry::schema();
    let size = size_struct(&value);
    info!(plugins, params, size, "benchmark payload ready");

    println!("📊 Payload: PluginRegistry");
    println!("  Plugins: {} × {} parameters", plugins, params);
    println!("  Encoded size: {} bytes", size);
    println!("  Iterations: {}\n", iterations);

    println!("📊 Encode");
    let elapsed = time(iterations, || {
        black_box(size_struct(black_box(&value)));
    });
    report("size only", iterations, size, elapsed);

    let elapsed = time(iterations, || {
        black_box(encode_to_vec(black_box(&value)).ok());
    });
    report("generic", iterations, size, elapsed);

    for (label, mode) in [("flattened bulk", ArrayMode::Bulk), ("flattened loop", ArrayMode::PerElement)] {
        let elapsed = time(iterations, || {
            black_box(sample.to_bytes_with(mode).ok());
        });
        report(label, iterations, size, elapsed);
    }

    let bytes = match sample.to_bytes() {
        Ok(bytes) => bytes,
        Err(err) => {
            println!("  ❌ encode failed: {err}");
            return;
        }
    };
    let opts = DecodeOptions::default();

    println!("\n📊 Decode");
    let elapsed = time(iterations, || {
        black_box(decode(&schema, black_box(&bytes), opts, &mut ZeroCopy).ok());
    });
    report("zero-copy", iterations, size, elapsed);

    let mut arena = DecodeArena::new(arena_size(&value));
    let elapsed = time(iterations, || {
        {
            let mut storage = &arena;
            black_box(decode(&schema, black_box(&bytes), opts, &mut storage).ok());
        }
        arena.reset();
    });
    report("arena", iterations, size, elapsed);

    let elapsed = time(iterations, || {
        black_box(decode(&schema, black_box(&bytes), opts, &mut Owned).ok());
    });
    report("owned", iterations, size, elapsed);

    let elapsed = time(iterations, || {
        black_box(PluginRegistry::from_bytes(black_box(&bytes)).ok());
    });
    report("typed", iterations, size, elapsed);

    println!("\n📊 Envelope");
    let message = match FixtureMessage::from(sample.clone()).to_message() {
        Ok(message) => message,
        Err(err) => {
            println!("  ❌ encode failed: {err}");
            return;
        }
    };
    let elapsed = time(iterations, || {
        black_box(parse_envelope(black_box(&message), opts.limits).ok());
    });
    report("header parse", iterations, HEADER_SIZE, elapsed);

    let elapsed = time(iterations, || {
        black_box(FixtureMessage::from_message(black_box(&message)).ok());
    });
    report("typed dispatch", iterations, message.len(), elapsed);

    println!("\n✅ Benchmark complete");
}
