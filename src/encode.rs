use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::chunk::{ChunkReader, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::error::PipelineError;
use crate::frames::encode_frame_name;
use crate::qr::{write_symbol, DEFAULT_SYMBOL_SIZE};
use crate::scratch::ScratchDir;
use crate::video::{Ffmpeg, Transcoder};

pub const ENCODE_SCRATCH_DIR: &str = "./qr";

pub struct EncodeOptions {
    pub chunk_size: usize,
    pub symbol_size: u32,
    pub work_dir: PathBuf,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            chunk_size: DEFAULT_CHUNK_SIZE,
            symbol_size: DEFAULT_SYMBOL_SIZE,
            work_dir: PathBuf::from(ENCODE_SCRATCH_DIR),
        }
    }
}

#[derive(Debug)]
pub struct EncodeResult {
    pub frames: u64,
    pub bytes: u64,
    pub sha256: String,
    pub video: PathBuf,
}

struct FrameBatch {
    frames: u64,
    bytes: u64,
    sha256: String,
}

/// Streams the input into one symbol frame per chunk, named file-1.png
/// upward. An empty input still yields one empty frame so the packer has
/// something to consume.
fn write_symbol_frames(
    input: &Path,
    dir: &Path,
    options: &EncodeOptions,
) -> Result<FrameBatch, PipelineError> {
    let file = File::open(input).map_err(|e| PipelineError::io(input, e))?;
    let mut reader = ChunkReader::new(BufReader::new(file), options.chunk_size);

    for chunk in reader.by_ref() {
        let chunk = chunk.map_err(|e| PipelineError::io(input, e))?;
        let dest = dir.join(encode_frame_name(chunk.index));
        write_symbol(&chunk.data, options.symbol_size, &dest)?;
    }

    let mut frames = reader.chunks_read();
    if frames == 0 {
        write_symbol(&[], options.symbol_size, &dir.join(encode_frame_name(1)))?;
        frames = 1;
    }

    Ok(FrameBatch {
        frames,
        bytes: reader.bytes_read(),
        sha256: reader.digest_hex(),
    })
}

/// Encodes `input` into a QR-code video at `output` using the real ffmpeg.
pub fn encode_file(input: &Path, output: &Path, options: EncodeOptions) -> Result<EncodeResult> {
    encode_file_with(input, output, &Ffmpeg::default(), options)
}

pub fn encode_file_with(
    input: &Path,
    output: &Path,
    transcoder: &dyn Transcoder,
    options: EncodeOptions,
) -> Result<EncodeResult> {
    if options.chunk_size == 0 || options.chunk_size > MAX_CHUNK_SIZE {
        bail!(
            "chunk size must be between 1 and {} bytes, got {}",
            MAX_CHUNK_SIZE,
            options.chunk_size
        );
    }

    let scratch =
        ScratchDir::create(&options.work_dir).context("preparing the scratch directory")?;

    let batch = write_symbol_frames(input, scratch.path(), &options).context("chunk generation")?;

    transcoder
        .pack(scratch.path(), output)
        .context("video packing")?;

    Ok(EncodeResult {
        frames: batch.frames,
        bytes: batch.bytes,
        sha256: batch.sha256,
        video: output.to_path_buf(),
    })
}
