use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{EngineError, Result};
use crate::keystream::Key;

/// Matches libsodium's `crypto_pwhash_SALTBYTES`; fixed at all-zero.
const SALT_LEN: usize = 16;
/// Matches libsodium's "moderate" memlimit (256 MiB, expressed in KiB for Argon2's `m_cost`).
const MODERATE_MEM_KIB: u32 = 262_144;
/// Matches libsodium's "moderate" opslimit.
const MODERATE_OPS: u32 = 3;
const LANES: u32 = 1;
/// KDF's native output length; the first half becomes the ChaCha20 key.
const OUTPUT_LEN: usize = 64;

/// Stretches a passphrase into a 256-bit key via Argon2id with a
/// moderate ops/mem profile and an all-zero salt. The zero salt is
/// intentional: the passphrase-to-keystream mapping must reproduce
/// across hosts and runs, which a random salt would defeat.
pub fn derive_key(passphrase: &[u8]) -> Result<Key> {
    let params =
        Params::new(MODERATE_MEM_KIB, MODERATE_OPS, LANES, Some(OUTPUT_LEN)).map_err(|_| EngineError::Kdf)?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt = [0u8; SALT_LEN];
    let mut output = [0u8; OUTPUT_LEN];
    argon2
        .hash_password_into(passphrase, &salt, &mut output)
        .map_err(|_| EngineError::Kdf)?;

    let mut key_bytes = [0u8; 32];
    key_bytes.copy_from_slice(&output[..32]);
    Ok(Key::from_bytes(key_bytes))
}
