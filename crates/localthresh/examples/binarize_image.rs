//! Example: binarize an image file with a local adaptive threshold.
//!
//! Loads any image the `image` crate can decode, converts it to 8-bit luma,
//! runs the Sauvola pipeline and writes a 0/255 PNG next to the input.
//!
//! Run from the workspace root:
//!   cargo run -p localthresh --example binarize_image -- --help
//!   RUST_LOG=debug cargo run -p localthresh --example binarize_image -- --input page.jpg

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::{GrayImage, ImageReader};
use localthresh::{Image, SauvolaParams, binarize_u8};

#[derive(Parser, Debug)]
#[command(about = "Binarize an image with a Sauvola local adaptive threshold")]
struct Args {
    /// Input image (any format supported by the `image` crate)
    #[arg(long)]
    input: PathBuf,

    /// Disk window radius in pixels
    #[arg(long, default_value_t = 5)]
    radius: i64,

    /// Sensitivity; 0.2..=0.5 is the usual range
    #[arg(long, default_value_t = 0.2)]
    k: f64,

    /// Output PNG (default: <input stem>_binary.png next to input)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let params = SauvolaParams::new(args.radius, args.k).context("validating radius and k")?;

    let luma = ImageReader::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .decode()
        .with_context(|| format!("decoding {}", args.input.display()))?
        .to_luma8();
    let (w, h) = luma.dimensions();
    let gray = Image::from_vec(w as usize, h as usize, luma.into_raw())
        .context("wrapping decoded luma buffer")?;

    let t0 = Instant::now();
    let binary = binarize_u8(&gray.as_view(), &params).context("binarizing")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let out = args.out.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_owned());
        args.input.with_file_name(format!("{stem}_binary.png"))
    });

    GrayImage::from_raw(w, h, binary.into_vec())
        .context("constructing output GrayImage")?
        .save(&out)
        .with_context(|| format!("saving {}", out.display()))?;

    println!(
        "{}x{} r={} k={} -> {} ({elapsed_ms:.1} ms)",
        w,
        h,
        params.radius,
        params.k,
        out.display()
    );
    Ok(())
}
