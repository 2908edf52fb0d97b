//! Salsa20 stream cipher implementation for BLTE encryption.

use cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;

use crate::Result;

/// Create BLTE Salsa20 stream cipher.
///
/// This implements the specific Salsa20 variant used by BLTE:
/// - 16-byte key is extended to 32 bytes by duplication
/// - 4-byte IV is extended to 8 bytes by duplication  
/// - Block index is XORed with first 4 bytes of IV
pub fn init_salsa20(key: &[u8; 16], iv: &[u8; 4], block_index: u32) -> Salsa20 {
    // Extend 16-byte key to 32 bytes by duplication
    let mut extended_key = [0u8; 32];
    extended_key[..16].copy_from_slice(key);
    extended_key[16..].copy_from_slice(key);

    // Extend 4-byte IV to 8 bytes
    let mut extended_iv = [0u8; 8];
    extended_iv[..4].copy_from_slice(iv);
    extended_iv[4..].copy_from_slice(iv);

    // XOR block index with first 4 bytes
    let block_bytes = block_index.to_le_bytes();
    for i in 0..block_bytes.len() {
        extended_iv[i] ^= block_bytes[i];
    }

    // Create cipher and decrypt
    Salsa20::new(&extended_key.into(), &extended_iv.into())
}

/// Decrypt an in-memory BLTE Salsa20 buffer in-place.
///
/// This is a convenience method for small buffers, which requires the entire
/// stream loaded in memory. Use [`init_salsa20()`] instead.
pub fn decrypt_salsa20(
    data: &mut [u8],
    key: &[u8; 16],
    iv: &[u8; 4],
    block_index: u32,
) -> Result<()> {
    let mut cipher = init_salsa20(key, iv, block_index);
    cipher.try_apply_keystream(data)?;

    Ok(())
}

/// Encrypt an in-memory buffer using BLTE Salsa20, in-place.
///
/// Uses the same algorithm as [decrypt][decrypt_salsa20] (stream ciphers are
/// symmetric).
///
/// This is a convenience method for small buffers, which requires the entire
/// stream loaded in memory. Use [`init_salsa20()`] instead.
pub fn encrypt_salsa20(
    data: &mut [u8],
    key: &[u8; 16],
    iv: &[u8; 4],
    block_index: u32,
) -> Result<()> {
    // Salsa20 is symmetric - encryption and decryption are the same
    decrypt_salsa20(data, key, iv, block_index)
}
