use crate::{BLTEHeader, ChunkEncodingHeader, ChunkInfo, Error, Result};
use md5::{Digest, Md5 as Md5Hasher};
use ngdp_crypto::KeyService;
use ngdp_crypto::arc4::decrypt_arc4;
use ngdp_crypto::salsa20::decrypt_salsa20;
use std::io::{BufRead, Cursor, Read, Seek, SeekFrom, Write};
use tracing::{error, trace, warn};

/// Information about a compressed block's encoding
#[derive(Debug, PartialEq)]
pub struct ChunkEncodingInfo {
    /// How the block is encoded.
    pub encoding: ChunkEncodingHeader,

    /// Where the chunk is located within the file.
    pub info: ChunkInfo,
}

/// BLTE payload parser.
pub struct BLTEFile<T> {
    /// File handle.
    f: T,

    /// Offset of the start of the BLTE stream within `f`.
    offset: u64,

    /// Length of the BLTE stream.
    length: u64,

    /// BLTE stream header.
    header: BLTEHeader,
}

const EXTRACTOR_BUFFER_SIZE: usize = 8192;
const BUF_SIZE_U32: u32 = EXTRACTOR_BUFFER_SIZE as u32;
const BUF_SIZE_U64: u64 = EXTRACTOR_BUFFER_SIZE as u64;

impl<T> BLTEFile<T> {
    /// The header of the BLTE stream.
    pub fn header(&self) -> &BLTEHeader {
        &self.header
    }

    /// Returns `true` if the BLTE stream has chunk-level checksums, which can
    /// be verified with [`BlteExtractor::verify_compressed_checksum`].
    ///
    /// Single-chunk streams (no chunk table) never carry a checksum.
    pub fn has_chunk_level_checksums(&self) -> bool {
        !self.header.chunks().is_empty()
    }

    /// Get the number of chunks in the stream.
    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.header.chunk_count()
    }
}

impl<T: BufRead + Seek> BLTEFile<T> {
    /// Parse a BLTE stream at `offset`.
    ///
    /// This is designed to work directly with complete `/tpr/{product}/data/`
    /// blobs (where there are multiple BLTE streams in a single file), but can
    /// also work on a file with a single BLTE stream.
    ///
    /// # Arguments
    ///
    /// * `offset`: byte offset of the start of the BLTE stream within `f`.
    ///
    ///   If `f` contains a single BLTE stream at the start of the file, set
    ///   this to `0`.
    ///
    /// * `size`: length of the BLTE stream within `f`.
    pub fn new(mut f: T, offset: u64, length: u64) -> Result<Self> {
        f.seek(SeekFrom::Start(offset))?;
        let header = BLTEHeader::parse(&mut f)?;

        Ok(Self {
            f,
            header,
            offset,
            length,
        })
    }

    /// Reads the chunk encoding header, and leaves the file's position at the
    /// first byte of the payload.
    pub fn read_chunk_header(&mut self, chunk: usize) -> Result<ChunkEncodingInfo> {
        let info = if self.header.chunks().is_empty() {
            // Single-chunk stream: the whole remainder of the BLTE stream is
            // the one chunk, with no entry in the (absent) chunk table.
            if chunk != 0 {
                return Err(Error::ChunkIndexOutOfRange(chunk, 1));
            }
            let header_len = self.header.chunk_data_offset(0).unwrap_or_default();
            ChunkInfo {
                compressed_size: (self.length - header_len) as u32,
                decompressed_size: 0,
                compressed_hash: [0; crate::MD5_LENGTH],
                decompressed_hash: None,
                compressed_offset: header_len,
                decompressed_offset: 0,
            }
        } else {
            let Some(info) = self.header.get_chunk(chunk).cloned() else {
                return Err(Error::ChunkIndexOutOfRange(chunk, self.header.chunks().len()));
            };
            info
        };

        if info.compressed_offset + info.compressed_size > self.length {
            // This is also checked by `BLTEHeader`
            error!(
                "Block {chunk} is out of range: {} + {} > {}",
                info.compressed_offset, info.compressed_size, self.length,
            );
            return Err(Error::TruncatedData {
                expected: info.compressed_offset + info.compressed_size,
                actual: self.length,
            });
        }

        self.f
            .seek(SeekFrom::Start(self.offset + info.compressed_offset))?;
        let encoding = ChunkEncodingHeader::parse(&mut self.f)?;
        Ok(ChunkEncodingInfo { encoding, info })
    }

    /// Extracts chunks to a file.
    ///
    /// Chunk data may be encrypted or compressed. An uncompressed size _may_
    /// be available in [`BlteHeader::total_decompressed_size()`].
    ///
    /// Compressed data will be automatically decompressed.
    ///
    /// This does not verify checksums during extraction. Those can be verified
    /// with [`BlteExtractor::verify_compressed_checksum`].
    ///
    /// To extract data to RAM, pass a [`std::io::Cursor`][] to this function.
    pub fn write_to_file<W: Write>(&mut self, file: W, key_service: Option<&KeyService>) -> Result<W> {
        let mut buf = [0; EXTRACTOR_BUFFER_SIZE];
        let mut file = file;

        for block in 0..self.header.chunk_count() {
            let header = self.read_chunk_header(block)?;

            // Position in the block, skip the headers
            let p = header.encoding.len() as u64;

            match header.encoding {
                ChunkEncodingHeader::None => {
                    let mut p = p;
                    while p < header.info.compressed_size {
                        let read_size = (header.info.compressed_size - p).min(BUF_SIZE_U64);

                        self.f.read_exact(&mut buf[0..read_size as usize])?;
                        file.write_all(&buf[0..read_size as usize])?;
                        p += read_size;
                    }
                }
                ChunkEncodingHeader::ZLib => {
                    let mut p = p;
                    let mut decompressor = flate2::write::ZlibDecoder::new(file);
                    while p < header.info.compressed_size {
                        let read_size = (header.info.compressed_size - p).min(BUF_SIZE_U64);
                        self.f.read_exact(&mut buf[0..read_size as usize])?;
                        decompressor.write_all(&buf[0..read_size as usize])?;
                        p += read_size;
                    }

                    file = decompressor.finish()?;
                }
                ChunkEncodingHeader::Lz4hc | ChunkEncodingHeader::Encrypted(_) | ChunkEncodingHeader::Frame => {
                    let payload_len = (header.info.compressed_size - p) as usize;
                    let mut payload = vec![0u8; payload_len];
                    self.f.read_exact(&mut payload)?;

                    let decoded = decode_payload(&header.encoding, payload, block as u32, key_service)?;
                    file.write_all(&decoded)?;
                }
            }
        }

        Ok(file)
    }

    /// Verify the checksum of compressed data.
    ///
    /// Returns [`Error::ChecksumMismatch`][] on checksum failures.
    ///
    /// Returns `Ok(())` if block-level checksums are valid **OR** there are no
    /// block-level checksums. [`BlteExtractor::has_block_level_checksums`] will
    /// return `false` for streams without block-level checksums.
    pub fn verify_compressed_checksum(&mut self) -> Result<()> {
        let mut buf = [0; EXTRACTOR_BUFFER_SIZE];
        for header in self.header.chunks() {
            let expected = &header.compressed_hash;

            let mut hasher = Md5Hasher::new();
            self.f
                .seek(SeekFrom::Start(self.offset + header.compressed_offset))?;
            let mut p = 0u64;

            while p < header.compressed_size {
                let read_size = (header.compressed_size - p).min(BUF_SIZE_U64);
                self.f.read_exact(&mut buf[0..read_size as usize])?;
                hasher.update(&buf[0..read_size as usize]);
                p += read_size;
            }

            let result = hasher.finalize();
            if result.as_slice() != expected.as_slice() {
                warn!(
                    "MD5 mismatch: {} != {}",
                    hex::encode(result),
                    hex::encode(expected),
                );
                return Err(Error::ChecksumMismatch {
                    expected: hex::encode(expected),
                    actual: hex::encode(result),
                });
            }
        }

        Ok(())
    }
}

/// Decode a single chunk's payload (everything after its encoding header byte(s))
/// according to `encoding`, recursing for frames and decrypted-then-compressed data.
fn decode_payload(
    encoding: &ChunkEncodingHeader,
    payload: Vec<u8>,
    block_index: u32,
    key_service: Option<&KeyService>,
) -> Result<Vec<u8>> {
    match encoding {
        ChunkEncodingHeader::None => Ok(payload),
        ChunkEncodingHeader::ZLib => {
            let mut result = Vec::new();
            flate2::read::ZlibDecoder::new(Cursor::new(payload)).read_to_end(&mut result)?;
            Ok(result)
        }
        ChunkEncodingHeader::Lz4hc => {
            if payload.len() < 8 {
                return Err(Error::TruncatedData {
                    expected: 8,
                    actual: payload.len(),
                });
            }
            let decompressed_size = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;
            let compressed_size = u32::from_le_bytes(payload[4..8].try_into().unwrap()) as usize;
            if compressed_size + 8 != payload.len() {
                return Err(Error::DecompressionFailed(format!(
                    "LZ4 size mismatch: expected {} bytes, got {}",
                    compressed_size + 8,
                    payload.len(),
                )));
            }
            lz4_flex::decompress(&payload[8..], decompressed_size)
                .map_err(|e| Error::DecompressionFailed(format!("LZ4 decompression failed: {e}")))
        }
        ChunkEncodingHeader::Frame => {
            // The payload is itself a complete, nested BLTE stream.
            let len = payload.len() as u64;
            let mut nested = BLTEFile::new(Cursor::new(payload), 0, len)?;
            nested.write_to_file(Vec::new(), key_service)
        }
        ChunkEncodingHeader::Encrypted(enc) => {
            let key_service = key_service.ok_or_else(|| {
                Error::DecompressionFailed("key service required for encrypted chunk".to_string())
            })?;
            let key_name = enc.key_name_as_u64();
            let key = key_service
                .get_key(key_name)
                .ok_or(Error::KeyNotFound(key_name))?;

            let mut iv = [0u8; 4];
            let n = enc.iv().len().min(4);
            iv[..n].copy_from_slice(&enc.iv()[..n]);

            let mut decrypted = payload;
            match enc.encryption_type() {
                0x53 => decrypt_salsa20(&mut decrypted, key, &iv, block_index)?,
                0x41 => {
                    #[allow(deprecated)]
                    decrypt_arc4(&mut decrypted, key, &iv, block_index)?;
                }
                other => return Err(Error::UnsupportedEncryptionType(other)),
            }

            if decrypted.is_empty() {
                return Ok(decrypted);
            }

            trace!("recursively decoding decrypted chunk payload");
            let mut cursor = Cursor::new(&decrypted[..]);
            let inner_encoding = ChunkEncodingHeader::parse(&mut cursor)?;
            let inner_payload = decrypted[cursor.position() as usize..].to_vec();
            decode_payload(&inner_encoding, inner_payload, block_index, Some(key_service))
        }
    }
}
