use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

// Naming pattern of the symbol frames written during encode; the packer
// consumes them through this same pattern.
pub const ENCODE_FRAME_PATTERN: &str = "file-%d.png";
// Naming pattern imposed by the video sampler on extracted frames.
pub const EXTRACTED_FRAME_PATTERN: &str = "%d.png";

pub fn encode_frame_name(index: u64) -> String {
    format!("file-{}.png", index)
}

/// Parses the numeric index out of a sampler-produced frame name
/// (`17.png` -> 17). Anything else is not a frame.
pub fn parse_extracted_index(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".png")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

#[derive(Debug, Clone)]
pub struct ExtractedFrame {
    pub index: u64,
    pub path: PathBuf,
}

/// Lists a sampler output directory in frame order. Directory listing order
/// is meaningless here; ordering comes only from the index embedded in each
/// name. Subdirectories and stray entries are skipped.
pub fn list_extracted_frames(dir: &Path) -> Result<Vec<ExtractedFrame>, PipelineError> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let name = entry.file_name();
        match name.to_str().and_then(parse_extracted_index) {
            Some(index) => frames.push(ExtractedFrame { index, path }),
            None => eprintln!("ignoring stray entry {}", path.display()),
        }
    }

    frames.sort_by_key(|f| f.index);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_encode_names_are_one_based() {
        assert_eq!(encode_frame_name(1), "file-1.png");
        assert_eq!(encode_frame_name(42), "file-42.png");
    }

    #[test]
    fn test_parse_extracted_index() {
        assert_eq!(parse_extracted_index("1.png"), Some(1));
        assert_eq!(parse_extracted_index("204.png"), Some(204));
        assert_eq!(parse_extracted_index("007.png"), Some(7));

        assert_eq!(parse_extracted_index(".png"), None);
        assert_eq!(parse_extracted_index("file-1.png"), None);
        assert_eq!(parse_extracted_index("12.PNG"), None);
        assert_eq!(parse_extracted_index("12.jpg"), None);
        assert_eq!(parse_extracted_index("12a.png"), None);
    }

    #[test]
    fn test_listing_sorts_numerically_not_lexically() {
        let dir = TempDir::new().expect("Failed to create temp dir");

        // Deliberately created out of order; 10 sorts before 2 lexically.
        for name in ["10.png", "2.png", "1.png", "11.png"] {
            fs::write(dir.path().join(name), b"x").expect("Failed to write frame");
        }
        fs::create_dir(dir.path().join("5.png")).expect("Failed to create subdir");
        fs::write(dir.path().join("notes.txt"), b"x").expect("Failed to write stray");

        let frames = list_extracted_frames(dir.path()).expect("Listing failed");
        let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();

        assert_eq!(indices, vec![1, 2, 10, 11]);
    }
}
