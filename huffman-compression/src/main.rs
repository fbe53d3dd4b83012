use std::{fs::File, path::PathBuf, time::Instant};

use anyhow::Context;
use clap::{ArgGroup, Parser};
use huffman_compression::{decode_with, encode_with, reader::DEFAULT_BUFFER_SIZE, Config};
use log::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress"])))]
struct Args {
    /// Compress INPUT into OUTPUT
    #[arg(short)]
    compress: bool,
    /// Decompress INPUT into OUTPUT
    #[arg(short)]
    decompress: bool,
    input: PathBuf,
    output: PathBuf,
    /// Read and write buffer size in bytes
    #[arg(short, long, default_value_t = DEFAULT_BUFFER_SIZE, value_parser = parse_buffer_size)]
    buffer_size: usize,
}

fn parse_buffer_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("buffer size must be at least 1".to_owned()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = Config {
        buffer_size: args.buffer_size,
    };

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let start = Instant::now();
    let (mode, summary) = if args.compress {
        let summary = encode_with(input, output, &config).context("compression failed")?;
        ("compressed", summary)
    } else {
        let summary = decode_with(input, output, &config).context("decompression failed")?;
        ("decompressed", summary)
    };

    let ratio = if summary.bytes_read == 0 {
        0.0
    } else {
        summary.bytes_written as f64 / summary.bytes_read as f64
    };
    info!(
        "{mode} {} ({} bytes) into {} ({} bytes, ratio {ratio:.3}) in {:.3}s",
        args.input.display(),
        summary.bytes_read,
        args.output.display(),
        summary.bytes_written,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
