//! BLTE (Block Table Entry) Compression/Decompression Library
//!
//! BLTE is Blizzard's compression and encryption format used throughout
//! their content distribution system. This crate provides parsing and
//! decompression capabilities for all BLTE modes.

mod chunk;
mod error;
mod header;
mod read;

pub use chunk::{ChunkEncodingHeader, EncryptedChunkHeader};
pub use error::{Error, Result};
pub use header::{BLTEHeader, ChunkInfo};
pub use read::{BLTEFile, ChunkEncodingInfo};

use md5::{Digest, Md5 as Md5Hasher};
use ngdp_crypto::KeyService;
use std::io::{Cursor, Read, Seek};

/// BLTE magic bytes
pub const BLTE_MAGIC: [u8; 4] = *b"BLTE";

const MD5_LENGTH: usize = 16;
pub type Md5 = [u8; MD5_LENGTH];

/// A fully decoded BLTE payload, readable as a plain byte stream.
///
/// Currently materializes the whole decoded payload in memory; callers that
/// only need a [`Read`] impl are unaffected if this later becomes lazy.
pub type BlteReader = Cursor<Vec<u8>>;

/// Decode a complete BLTE-encoded blob.
///
/// `reader` must yield the entire encoded stream (it needs to be seekable to
/// follow the chunk table). When `expected_ekey` is given, the raw encoded
/// bytes are hashed and checked against it before any chunk is decoded.
pub fn decode<R: Read + Seek>(
    mut reader: R,
    length: u64,
    expected_ekey: Option<&Md5>,
    key_service: Option<&KeyService>,
) -> Result<BlteReader> {
    if let Some(expected) = expected_ekey {
        reader.seek(std::io::SeekFrom::Start(0))?;
        let mut hasher = Md5Hasher::new();
        let mut remaining = length;
        let mut buf = [0u8; 8192];
        while remaining > 0 {
            let want = remaining.min(buf.len() as u64) as usize;
            reader.read_exact(&mut buf[..want])?;
            hasher.update(&buf[..want]);
            remaining -= want as u64;
        }
        let actual = hasher.finalize();
        if actual.as_slice() != expected.as_slice() {
            return Err(Error::ChecksumMismatch {
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            });
        }
        reader.seek(std::io::SeekFrom::Start(0))?;
    }

    let mut bounded = std::io::BufReader::new(reader);
    let mut blte = BLTEFile::new(&mut bounded, 0, length)?;
    let decoded = blte.write_to_file(Vec::new(), key_service)?;
    Ok(Cursor::new(decoded))
}

/// One chunk's encoding plan for [`encode`]: the mode to write it under, and
/// its decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodePlan {
    /// Mode `'N'` — stored raw.
    None(Vec<u8>),
    /// Mode `'Z'` — zlib-deflated.
    ZLib(Vec<u8>),
}

/// Encode a sequence of chunk plans into a well-formed BLTE blob.
///
/// Returns the blob and its header MD5 (the blob's own encoded key).
pub fn encode(plans: &[EncodePlan]) -> Result<(Vec<u8>, Md5)> {
    if plans.is_empty() {
        return Err(Error::DecompressionFailed("no chunks to encode".into()));
    }

    let blob = if plans.len() == 1 {
        let mut blob = Vec::new();
        blob.extend_from_slice(&BLTE_MAGIC);
        blob.extend_from_slice(&0u32.to_be_bytes());
        blob.extend_from_slice(&encode_chunk_payload(&plans[0])?);
        blob
    } else {
        let mut payloads = Vec::with_capacity(plans.len());
        let mut table = Vec::with_capacity(plans.len());
        for plan in plans {
            let payload = encode_chunk_payload(plan)?;
            let decompressed_len = match plan {
                EncodePlan::None(data) | EncodePlan::ZLib(data) => data.len(),
            };
            table.push((payload.len() as u32, decompressed_len as u32, md5_of(&payload)));
            payloads.push(payload);
        }

        let header_size = 8 + 4 + 24 * plans.len();
        let mut blob = Vec::with_capacity(header_size + payloads.iter().map(Vec::len).sum::<usize>());
        blob.extend_from_slice(&BLTE_MAGIC);
        blob.extend_from_slice(&(header_size as u32).to_be_bytes());
        blob.push(0x0F);
        let count = plans.len() as u32;
        blob.push((count >> 16) as u8);
        blob.push((count >> 8) as u8);
        blob.push(count as u8);
        for (compressed_size, decompressed_size, checksum) in &table {
            blob.extend_from_slice(&compressed_size.to_be_bytes());
            blob.extend_from_slice(&decompressed_size.to_be_bytes());
            blob.extend_from_slice(checksum);
        }
        for payload in &payloads {
            blob.extend_from_slice(payload);
        }
        blob
    };

    let ekey = md5_of(&blob);
    Ok((blob, ekey))
}

fn encode_chunk_payload(plan: &EncodePlan) -> Result<Vec<u8>> {
    use std::io::Write;

    match plan {
        EncodePlan::None(data) => {
            let mut out = Vec::with_capacity(1 + data.len());
            out.push(b'N');
            out.extend_from_slice(data);
            Ok(out)
        }
        EncodePlan::ZLib(data) => {
            let mut encoder =
                flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            let compressed = encoder.finish()?;
            let mut out = Vec::with_capacity(1 + compressed.len());
            out.push(b'Z');
            out.extend_from_slice(&compressed);
            Ok(out)
        }
    }
}

/// Truncate a blob with extraneous trailing bytes down to the exact length
/// declared by its chunk table.
///
/// Single-chunk streams have no chunk table to declare a length against, so
/// they pass through unchanged.
pub fn fix(mut data: Vec<u8>) -> Result<Vec<u8>> {
    let header = BLTEHeader::parse(&mut Cursor::new(&data))?;
    let Some(last) = header.chunks().last() else {
        return Ok(data);
    };

    let declared_total = (last.compressed_offset + u64::from(last.compressed_size)) as usize;
    if declared_total > data.len() {
        return Err(Error::TruncatedData {
            expected: declared_total,
            actual: data.len(),
        });
    }

    data.truncate(declared_total);
    Ok(data)
}

fn md5_of(data: &[u8]) -> Md5 {
    let mut hasher = Md5Hasher::new();
    hasher.update(data);
    hasher.finalize().into()
}
