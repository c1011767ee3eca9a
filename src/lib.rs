pub mod chunk;
pub mod decode;
pub mod encode;
pub mod error;
pub mod frames;
pub mod qr;
pub mod scan;
pub mod scratch;
pub mod video;

mod proc;

pub use chunk::{Chunk, ChunkReader, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use decode::{
    decode_video, decode_video_with, DecodeOptions, DecodeResult, SkippedFrame,
    DECODE_SCRATCH_DIR, DEFAULT_OUTPUT,
};
pub use encode::{encode_file, encode_file_with, EncodeOptions, EncodeResult, ENCODE_SCRATCH_DIR};
pub use error::PipelineError;
pub use frames::{
    encode_frame_name, list_extracted_frames, parse_extracted_index, ExtractedFrame,
};
pub use qr::{render_symbol, write_symbol, DEFAULT_SYMBOL_SIZE};
pub use scan::{SymbolScanner, ZbarScanner, SCAN_TIMEOUT};
pub use scratch::ScratchDir;
pub use video::{Ffmpeg, Transcoder, DEFAULT_FPS, DEFAULT_PACK_FLAGS, TRANSCODE_TIMEOUT};
