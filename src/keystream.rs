use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;

/// 256-bit symmetric key. Immutable once constructed, never printed or
/// serialized. The low-level bytes are only ever handed to [`ChaCha20`].
#[derive(Clone)]
pub struct Key([u8; 32]);

impl Key {
    pub fn from_bytes(bytes: [u8; 32]) -> Key {
        Key(bytes)
    }
}

/// Deterministic, seekable-by-construction keystream. Holds a single
/// live `ChaCha20` instance keyed by `K` with an all-zero nonce; every
/// call to [`fill`](Keystream::fill) advances the cipher's internal
/// block counter, so the concatenation of all delivered buffers is
/// exactly the `ChaCha20(K, 0)` prefix of that total length.
///
/// Nonce is fixed at twelve zero bytes. No other nonce is permitted:
/// changing it would break determinism across runs.
pub struct Keystream {
    cipher: ChaCha20,
    offset: u64,
}

impl Keystream {
    pub fn new(key: &Key) -> Keystream {
        let nonce = [0u8; 12];
        Keystream {
            cipher: ChaCha20::new(key.0.as_ref().into(), nonce.as_ref().into()),
            offset: 0,
        }
    }

    /// Overwrite the first `n` bytes of `dst` with the next `n` bytes of
    /// the keystream. `dst` must be at least `n` bytes long.
    pub fn fill(&mut self, dst: &mut [u8], n: usize) {
        let buf = &mut dst[..n];
        buf.iter_mut().for_each(|b| *b = 0);
        self.cipher.apply_keystream(buf);
        self.offset += n as u64;
    }

    /// Total number of keystream bytes delivered so far. Exposed for
    /// diagnostics and tests; never consulted for correctness.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
