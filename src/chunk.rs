use sha2::{Digest, Sha256};
use std::io::Read;

// One chunk becomes one QR symbol, so chunk size is bounded by what a single
// symbol can carry.
//
// Symbol capacity reference (binary mode, M error correction):
//   version 10 ->  213 bytes
//   version 20 ->  858 bytes
//   version 30 -> 1732 bytes
//   version 40 -> 2331 bytes (the ceiling)
pub const DEFAULT_CHUNK_SIZE: usize = 2048;
pub const MAX_CHUNK_SIZE: usize = 2331;

/// One contiguous piece of the input stream. Indices start at 1 and have no
/// gaps; concatenating chunks in index order reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: u64,
    pub data: Vec<u8>,
}

/// Streams a reader as fixed-size chunks, keeping a running byte count and
/// SHA-256 of everything consumed. The last chunk may be short; an input
/// whose length is an exact multiple of the chunk size produces no empty
/// trailing chunk.
pub struct ChunkReader<R> {
    source: R,
    chunk_size: usize,
    next_index: u64,
    bytes_read: u64,
    hasher: Sha256,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(source: R, chunk_size: usize) -> Self {
        ChunkReader {
            source,
            chunk_size,
            next_index: 1,
            bytes_read: 0,
            hasher: Sha256::new(),
            done: false,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn chunks_read(&self) -> u64 {
        self.next_index - 1
    }

    /// Hex digest of the bytes consumed so far.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = std::io::Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut data = Vec::with_capacity(self.chunk_size);
        match (&mut self.source)
            .take(self.chunk_size as u64)
            .read_to_end(&mut data)
        {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                self.bytes_read += n as u64;
                self.hasher.update(&data);
                let chunk = Chunk {
                    index: self.next_index,
                    data,
                };
                self.next_index += 1;
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pseudo_random(len: usize) -> Vec<u8> {
        let mut x: u64 = 12345;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
                (x >> 56) as u8
            })
            .collect()
    }

    #[test]
    fn test_chunks_cover_input_in_order() {
        let data = pseudo_random(5000);
        let reader = ChunkReader::new(Cursor::new(data.clone()), 2048);

        let chunks: Vec<Chunk> = reader.map(|c| c.unwrap()).collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].index, 1);
        assert_eq!(chunks[1].index, 2);
        assert_eq!(chunks[2].index, 3);
        assert_eq!(chunks[0].data.len(), 2048);
        assert_eq!(chunks[1].data.len(), 2048);
        assert_eq!(chunks[2].data.len(), 904);

        let rebuilt: Vec<u8> = chunks.into_iter().flat_map(|c| c.data).collect();
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let data = pseudo_random(4096);
        let chunks: Vec<Chunk> = ChunkReader::new(Cursor::new(data), 2048)
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].data.len(), 2048);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let mut reader = ChunkReader::new(Cursor::new(Vec::new()), 2048);
        assert!(reader.next().is_none());
        assert_eq!(reader.chunks_read(), 0);
        assert_eq!(reader.bytes_read(), 0);
    }

    #[test]
    fn test_running_digest_matches_input() {
        let data = pseudo_random(3000);
        let mut reader = ChunkReader::new(Cursor::new(data.clone()), 512);
        for chunk in reader.by_ref() {
            chunk.unwrap();
        }

        assert_eq!(reader.bytes_read(), 3000);
        assert_eq!(reader.chunks_read(), 6);
        assert_eq!(reader.digest_hex(), hex::encode(Sha256::digest(&data)));
    }
}
