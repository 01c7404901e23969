//! Screen-to-Camera Receiver CLI
//!
//! Drives the receive pipeline from either a synthetic loopback
//! transmitter or a file of raw luminance frames. Camera and video
//! demuxing stay outside the core; this binary is the demo collaborator.

use std::path::PathBuf;
use std::thread;

use clap::{Parser, Subcommand};
use screenbeam::{
    capture::{BarcodeConfig, FrameQueue, MockTransmitter},
    pipeline::{sha1_hex, LogProgress, PipelineDriver},
    Frame,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "screenbeam")]
#[command(about = "Screen-to-camera data transmission receiver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the barcode configuration JSON
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a loopback self-test with synthetic barcode frames
    Mock {
        /// Payload size in bytes
        #[arg(short = 'n', long, default_value = "300")]
        bytes: usize,
        /// Repair packets generated per source block
        #[arg(long, default_value = "4")]
        repair: u32,
    },
    /// Decode a file of raw 8-bit luminance frames
    Decode {
        /// Input file of concatenated width*height gray frames
        #[arg(short, long)]
        input: PathBuf,
        /// Frame width in pixels
        #[arg(long)]
        width: u32,
        /// Frame height in pixels
        #[arg(long)]
        height: u32,
        /// Output file for the reconstructed bytes
        #[arg(short, long, default_value = "received.bin")]
        output: PathBuf,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Mock { bytes, repair } => run_mock(&config, bytes, repair),
        Commands::Decode {
            input,
            width,
            height,
            output,
        } => run_decode(&config, &input, width, height, &output),
    }
}

fn load_config(path: Option<&std::path::Path>) -> BarcodeConfig {
    match path {
        None => BarcodeConfig::default(),
        Some(path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Failed to read config file: {e}");
                std::process::exit(1);
            });
            BarcodeConfig::from_json(&text).unwrap_or_else(|e| {
                eprintln!("Invalid config: {e}");
                std::process::exit(1);
            })
        }
    }
}

fn run_mock(config: &BarcodeConfig, bytes: usize, repair: u32) {
    info!("screenbeam v{}", screenbeam::VERSION);
    info!("Running loopback self-test ({bytes} payload bytes)");

    let geometry = config.geometry().unwrap_or_else(|e| {
        eprintln!("Invalid config: {e}");
        std::process::exit(1);
    });

    let payload: Vec<u8> = (0..bytes).map(|i| (i * 31 + 7) as u8).collect();
    let expected = sha1_hex(&payload);

    let mut transmitter = MockTransmitter::new(&payload, geometry, repair).unwrap_or_else(|e| {
        eprintln!("Failed to build mock transmitter: {e}");
        std::process::exit(1);
    });
    info!(
        packets = transmitter.frame_count(),
        "mock transmitter ready"
    );

    let queue = FrameQueue::new(64);
    let producer = {
        let queue = queue.clone();
        let count = transmitter.frame_count() * 2;
        thread::spawn(move || {
            for _ in 0..count {
                if !queue.push(transmitter.next_frame()) {
                    break;
                }
            }
            queue.close();
        })
    };

    let driver = PipelineDriver::new(geometry, "loopback");
    let mut received = Vec::new();
    let summary = driver
        .run(&queue, &mut LogProgress, |data, _| received = data.to_vec())
        .unwrap_or_else(|e| {
            eprintln!("Self-test failed: {e}");
            std::process::exit(1);
        });
    producer.join().ok();

    info!(
        frames = summary.frames_processed,
        packets = summary.packets_accepted,
        "self-test complete"
    );
    if received == payload && summary.sha1_hex == expected {
        println!("OK {} bytes, SHA-1 {}", summary.byte_len, summary.sha1_hex);
    } else {
        eprintln!("MISMATCH: decoded bytes differ from the payload");
        std::process::exit(1);
    }
}

fn run_decode(
    config: &BarcodeConfig,
    input: &std::path::Path,
    width: u32,
    height: u32,
    output: &std::path::Path,
) {
    info!("screenbeam v{}", screenbeam::VERSION);

    let geometry = config.geometry().unwrap_or_else(|e| {
        eprintln!("Invalid config: {e}");
        std::process::exit(1);
    });

    let raw = std::fs::read(input).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", input.display());
        std::process::exit(1);
    });
    let frame_bytes = (width * height) as usize;
    if frame_bytes == 0 || raw.len() < frame_bytes {
        eprintln!(
            "Input holds no complete {width}x{height} frame ({} bytes)",
            raw.len()
        );
        std::process::exit(1);
    }
    info!(frames = raw.len() / frame_bytes, "demuxing raw frames");

    let queue = FrameQueue::new(64);
    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            for (index, chunk) in raw.chunks_exact(frame_bytes).enumerate() {
                let frame = Frame::new(chunk.to_vec(), width, height, index as u64 + 1);
                if !queue.push(frame) {
                    break;
                }
            }
            queue.close();
        })
    };

    let output_name = output.display().to_string();
    let driver = PipelineDriver::new(geometry, output_name);
    let result = driver.run(&queue, &mut LogProgress, |data, name| {
        if let Err(e) = std::fs::write(name, data) {
            eprintln!("Failed to write {name}: {e}");
            std::process::exit(1);
        }
    });
    producer.join().ok();

    match result {
        Ok(summary) => {
            println!(
                "OK {} bytes -> {}, SHA-1 {}",
                summary.byte_len,
                output.display(),
                summary.sha1_hex
            );
        }
        Err(e) => {
            eprintln!("Decode incomplete: {e}");
            eprintln!("\nTroubleshooting:");
            eprintln!("  - Verify --width/--height match the recording");
            eprintln!("  - Ensure the barcode fills the central frame region");
            eprintln!("  - Capture more frames; any subset of packets suffices");
            std::process::exit(1);
        }
    }
}
