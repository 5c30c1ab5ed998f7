//! jfif-encode - convert a BMP image to a baseline JPEG/JFIF file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use jfif_encoder::{BmpImage, Encoder, HuffmanMode, PixelDensity, Subsampling};

/// Baseline JPEG encoder for BMP images.
#[derive(Parser, Debug)]
#[command(name = "jfif-encode")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    jfif-encode photo.bmp                        Writes photo.jfif at quality 50
    jfif-encode photo.bmp -o photo.jpg -q 85     Higher quality
    jfif-encode photo.bmp --subsampling 420      Halve chroma resolution
    jfif-encode scan.bmp --grayscale --dpi 300   Grayscale print scan

Set RUST_LOG=jfif_encoder=debug to see per-stage details.")]
struct Args {
    /// Input bitmap (8, 24 or 32 bits per pixel)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file [default: INPUT with a .jfif extension]
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Quality (1-100)
    #[arg(short, long, default_value = "50", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,

    /// Use the Annex K Huffman tables instead of optimized ones
    #[arg(long, default_value_t = false)]
    standard_tables: bool,

    /// Chroma subsampling
    #[arg(long, value_enum, default_value = "444")]
    subsampling: SubsamplingArg,

    /// Encode only luminance
    #[arg(long, default_value_t = false)]
    grayscale: bool,

    /// Pixel density in dots per inch
    #[arg(long, default_value_t = 72)]
    dpi: u16,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SubsamplingArg {
    /// 4:4:4 - No subsampling (best quality)
    #[value(name = "444")]
    S444,
    /// 4:2:0 - 2x2 chroma downsample (smaller file)
    #[value(name = "420")]
    S420,
}

impl From<SubsamplingArg> for Subsampling {
    fn from(arg: SubsamplingArg) -> Self {
        match arg {
            SubsamplingArg::S444 => Subsampling::S444,
            SubsamplingArg::S420 => Subsampling::S420,
        }
    }
}

fn main() -> Result<()> {
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let args = Args::parse();
    let output = output_path(&args);

    let start = Instant::now();
    let written = run(&args, &output)?;

    info!(elapsed = ?start.elapsed(), "done");
    println!("{} -> {} ({} bytes)", args.input.display(), output.display(), written);
    Ok(())
}

fn output_path(args: &Args) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("jfif"))
}

/// Encode `args.input` and write it to `output`.
///
/// The output file is only created once the encoded bytes are in hand.
fn run(args: &Args, output: &Path) -> Result<usize> {
    let image = BmpImage::open(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let huffman_mode = if args.standard_tables {
        HuffmanMode::Standard
    } else {
        HuffmanMode::Optimized
    };
    let jpeg = Encoder::new()
        .quality(args.quality)
        .huffman_mode(huffman_mode)
        .subsampling(args.subsampling.into())
        .grayscale(args.grayscale)
        .pixel_density(PixelDensity::dpi(args.dpi, args.dpi))
        .encode(&image)
        .with_context(|| format!("Failed to encode {}", args.input.display()))?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&jpeg)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(jpeg.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};
    use std::ffi::OsStr;

    /// Bottom-up 24-bit BMP filled with one color.
    fn solid_bmp(width: u32, height: u32, bgr: [u8; 3]) -> Vec<u8> {
        let row = (width as usize * 3).div_ceil(4) * 4;
        let size = row * height as usize;
        let mut out = Vec::with_capacity(54 + size);
        out.extend_from_slice(b"BM");
        out.write_u32::<LittleEndian>(54 + size as u32).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(54).unwrap();
        out.write_u32::<LittleEndian>(40).unwrap();
        out.write_i32::<LittleEndian>(width as i32).unwrap();
        out.write_i32::<LittleEndian>(height as i32).unwrap();
        out.write_u16::<LittleEndian>(1).unwrap();
        out.write_u16::<LittleEndian>(24).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(size as u32).unwrap();
        out.write_i32::<LittleEndian>(2835).unwrap();
        out.write_i32::<LittleEndian>(2835).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        for _ in 0..height {
            let start = out.len();
            for _ in 0..width {
                out.extend_from_slice(&bgr);
            }
            out.resize(start + row, 0);
        }
        out
    }

    fn args_for(input: PathBuf) -> Args {
        Args::parse_from([OsStr::new("jfif-encode"), input.as_os_str()])
    }

    #[test]
    fn test_encodes_bmp_to_file() {
        let dir = std::env::temp_dir().join("jfif_encode_test_ok");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("small.bmp");
        std::fs::write(&input, solid_bmp(9, 5, [30, 120, 200])).unwrap();

        let args = args_for(input);
        let output = output_path(&args);
        assert_eq!(output, dir.join("small.jfif"));

        let written = run(&args, &output).unwrap();
        let data = std::fs::read(&output).unwrap();
        assert_eq!(data.len(), written);
        assert!(data.starts_with(&[0xFF, 0xD8]));
        assert!(data.ends_with(&[0xFF, 0xD9]));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_encode_leaves_no_file() {
        let dir = std::env::temp_dir().join("jfif_encode_test_too_wide");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("wide.bmp");
        // Decodes fine but exceeds the 65535-pixel frame limit
        std::fs::write(&input, solid_bmp(70_000, 1, [0, 0, 0])).unwrap();
        let output = dir.join("wide.jfif");
        std::fs::remove_file(&output).ok();

        let err = run(&args_for(input), &output).unwrap_err();
        assert!(err.to_string().starts_with("Failed to encode"));
        assert!(!output.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
