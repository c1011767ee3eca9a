use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use reel::{
    decode_video_with, encode_file_with, DecodeOptions, EncodeOptions, Ffmpeg, ZbarScanner,
    DEFAULT_CHUNK_SIZE, DEFAULT_FPS, DEFAULT_PACK_FLAGS, DEFAULT_SYMBOL_SIZE,
};

#[derive(Parser)]
#[command(name = "reel")]
#[command(author, version, about = "Pack files into QR-code videos and back", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file into a video of QR-code frames
    Encode {
        /// Input file to encode
        input: PathBuf,

        /// Output video path
        #[arg(short, long)]
        output: PathBuf,

        /// Bytes carried per QR frame
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Minimum edge length of each QR frame, in pixels
        #[arg(long, default_value_t = DEFAULT_SYMBOL_SIZE)]
        qr_size: u32,

        /// Frame rate of the packed video
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// File with ffmpeg output flags, replacing the built-in set
        #[arg(long)]
        ffmpeg_flags: Option<PathBuf>,

        /// Scratch directory for the intermediate frames
        #[arg(long, default_value = "./qr")]
        work_dir: PathBuf,
    },

    /// Decode a QR-code video back into the original byte stream
    Decode {
        /// Input video to decode
        input: PathBuf,

        /// Output file path
        #[arg(short, long, default_value = "returned-data.txt")]
        output: PathBuf,

        /// Frame rate the video was packed at
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// Chunk size the video was encoded with
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Scratch directory for the extracted frames
        #[arg(long, default_value = "./returned")]
        work_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            chunk_size,
            qr_size,
            fps,
            ffmpeg_flags,
            work_dir,
        } => {
            if !input.exists() {
                anyhow::bail!("Input path does not exist: {}", input.display());
            }

            let flags = match ffmpeg_flags {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading ffmpeg flags from {}", path.display()))?,
                None => DEFAULT_PACK_FLAGS.to_string(),
            };
            let transcoder = Ffmpeg::new(fps, &flags);

            println!("Encoding file: {}", input.display());

            let options = EncodeOptions {
                chunk_size,
                symbol_size: qr_size,
                work_dir,
            };
            let result = encode_file_with(&input, &output, &transcoder, options)?;

            println!();
            println!(
                "Packed {} byte(s) into {} frame(s)",
                result.bytes, result.frames
            );
            println!("SHA-256: {}", result.sha256);
            println!("Output video: {}", result.video.display());
        }

        Commands::Decode {
            input,
            output,
            fps,
            chunk_size,
            work_dir,
        } => {
            if !input.exists() {
                anyhow::bail!("Input path does not exist: {}", input.display());
            }

            println!("Decoding video: {}", input.display());

            let transcoder = Ffmpeg::new(fps, DEFAULT_PACK_FLAGS);
            let scanner = ZbarScanner::default();
            let options = DecodeOptions {
                chunk_size,
                work_dir,
            };
            let result = decode_video_with(&input, &output, &transcoder, &scanner, options)?;

            println!();
            println!(
                "Recovered {} byte(s) from {} of {} frame(s)",
                result.bytes, result.decoded, result.frames
            );
            if !result.skipped.is_empty() {
                println!("Skipped frames:");
                for skip in &result.skipped {
                    println!("  - frame {}: {}", skip.index, skip.reason);
                }
            }
            println!("SHA-256: {}", result.sha256);
            println!("Output file: {}", result.output.display());
        }
    }

    Ok(())
}
