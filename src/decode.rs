use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::chunk::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::error::PipelineError;
use crate::frames::{list_extracted_frames, ExtractedFrame};
use crate::scan::{SymbolScanner, ZbarScanner};
use crate::scratch::ScratchDir;
use crate::video::{Ffmpeg, Transcoder};

pub const DECODE_SCRATCH_DIR: &str = "./returned";
pub const DEFAULT_OUTPUT: &str = "returned-data.txt";

pub struct DecodeOptions {
    pub chunk_size: usize,
    pub work_dir: PathBuf,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            work_dir: PathBuf::from(DECODE_SCRATCH_DIR),
        }
    }
}

/// A frame whose payload never made it into the recovered stream. The
/// stream was shortened at this frame's position.
#[derive(Debug)]
pub struct SkippedFrame {
    pub index: u64,
    pub reason: String,
}

#[derive(Debug)]
pub struct DecodeResult {
    pub frames: u64,
    pub decoded: u64,
    pub skipped: Vec<SkippedFrame>,
    pub bytes: u64,
    pub sha256: String,
    pub output: PathBuf,
}

/// Scans every frame in index order and appends each payload to the
/// recovered stream. A frame that cannot be read or holds no symbol is
/// reported and skipped; the stream simply continues without it.
fn reassemble_frames(
    frames: &[ExtractedFrame],
    scanner: &dyn SymbolScanner,
    chunk_size: usize,
) -> (Vec<u8>, Vec<SkippedFrame>) {
    let mut buffer = Vec::with_capacity(frames.len().saturating_mul(chunk_size));
    let mut skipped = Vec::new();

    for frame in frames {
        let payload = fs::read(&frame.path)
            .map_err(|e| PipelineError::io(&frame.path, e))
            .and_then(|image| scanner.scan(&image));

        match payload {
            Ok(bytes) => buffer.extend_from_slice(&bytes),
            Err(e) => {
                eprintln!("can't recover frame {}: {}", frame.index, e);
                skipped.push(SkippedFrame {
                    index: frame.index,
                    reason: e.to_string(),
                });
            }
        }
    }

    (buffer, skipped)
}

/// Decodes a QR-code video back into its byte stream using the real ffmpeg
/// and zbarimg.
pub fn decode_video(input: &Path, output: &Path, options: DecodeOptions) -> Result<DecodeResult> {
    decode_video_with(
        input,
        output,
        &Ffmpeg::default(),
        &ZbarScanner::default(),
        options,
    )
}

pub fn decode_video_with(
    input: &Path,
    output: &Path,
    transcoder: &dyn Transcoder,
    scanner: &dyn SymbolScanner,
    options: DecodeOptions,
) -> Result<DecodeResult> {
    if options.chunk_size == 0 || options.chunk_size > MAX_CHUNK_SIZE {
        bail!(
            "chunk size must be between 1 and {} bytes, got {}",
            MAX_CHUNK_SIZE,
            options.chunk_size
        );
    }

    let scratch =
        ScratchDir::create(&options.work_dir).context("preparing the scratch directory")?;

    transcoder
        .unpack(input, scratch.path())
        .context("video sampling")?;

    let frames = list_extracted_frames(scratch.path()).context("frame list")?;

    let (buffer, skipped) = reassemble_frames(&frames, scanner, options.chunk_size);

    fs::write(output, &buffer)
        .map_err(|e| PipelineError::io(output, e))
        .context("final write")?;

    let decoded = frames.len() as u64 - skipped.len() as u64;
    Ok(DecodeResult {
        frames: frames.len() as u64,
        decoded,
        skipped,
        bytes: buffer.len() as u64,
        sha256: hex::encode(Sha256::digest(&buffer)),
        output: output.to_path_buf(),
    })
}
