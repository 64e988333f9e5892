//! # Secrets
//!
//! `Secret` is the one container private key material and passwords are
//! allowed to live in. It owns its buffer, remembers whether the bytes are
//! binary or text, and wipes itself when dropped.
//!
//! ## Rules of the road
//!
//! - Copies happen through `clone()` and nowhere else. No `Copy`, no
//!   `Deref<Target = Vec<u8>>`, no accidental `to_vec()` on a borrowed view
//!   that then outlives the secret.
//! - Every mutator either succeeds or leaves the buffer exactly as it was.
//!   The one exception is `clear()`, which always succeeds.
//! - `Debug` never prints content. Not even a prefix.
//!
//! A `Secret` is `Send` but clearing is destructive, so sharing one across
//! threads without cloning it first is asking for a very confusing bug.

use rand::RngCore;
use std::fmt;
use std::ops::{Deref, DerefMut};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::MAX_SECRET_LENGTH;

/// Errors from secret mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("requested size {requested} exceeds the {MAX_SECRET_LENGTH} byte limit")]
    TooLarge { requested: usize },

    #[error("cannot randomize zero bytes")]
    EmptyRandomize,

    #[error("read of {width} bytes at offset {position} exceeds secret length {len}")]
    OutOfBounds {
        position: usize,
        width: usize,
        len: usize,
    },
}

/// What kind of content a secret holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretMode {
    /// Raw bytes: keys, seeds, chain codes.
    #[default]
    Mem,
    /// UTF-8 text: passwords and passphrases.
    Text,
}

/// Fixed-width integers that can be read out of a secret, big-endian.
pub trait Extract: Sized {
    const WIDTH: usize;

    fn from_be_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_extract {
    ($($t:ty),*) => {
        $(
            impl Extract for $t {
                const WIDTH: usize = std::mem::size_of::<$t>();

                fn from_be_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_be_bytes(buf)
                }
            }
        )*
    };
}

impl_extract!(u8, u16, u32, u64);

/// A secure byte container, zeroed on drop.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct Secret {
    data: Vec<u8>,
    #[zeroize(skip)]
    mode: SecretMode,
}

impl Secret {
    /// An empty binary secret.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `bytes` into a new binary secret.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            mode: SecretMode::Mem,
        }
    }

    /// Copies `text` into a new text secret.
    pub fn from_text(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
            mode: SecretMode::Text,
        }
    }

    /// `n` bytes from the OS RNG.
    pub fn random(n: usize) -> Result<Self, SecretError> {
        let mut secret = Self::new();
        secret.randomize(n)?;
        Ok(secret)
    }

    pub fn mode(&self) -> SecretMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow the content. Keep the borrow short.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the content as text. `None` for binary secrets or invalid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self.mode {
            SecretMode::Text => std::str::from_utf8(&self.data).ok(),
            SecretMode::Mem => None,
        }
    }

    /// Replace the content with `n` random bytes.
    pub fn randomize(&mut self, n: usize) -> Result<(), SecretError> {
        if n == 0 {
            return Err(SecretError::EmptyRandomize);
        }
        check_size(n)?;
        let mut fresh = vec![0u8; n];
        rand::rngs::OsRng.fill_bytes(&mut fresh);
        self.replace(fresh, SecretMode::Mem);
        Ok(())
    }

    /// Replace the content with a copy of `bytes`.
    pub fn assign(&mut self, bytes: &[u8]) -> Result<(), SecretError> {
        check_size(bytes.len())?;
        self.replace(bytes.to_vec(), SecretMode::Mem);
        Ok(())
    }

    /// Replace the content with a copy of `text`.
    pub fn assign_text(&mut self, text: &str) -> Result<(), SecretError> {
        check_size(text.len())?;
        self.replace(text.as_bytes().to_vec(), SecretMode::Text);
        Ok(())
    }

    /// Append `bytes`. The mode is unchanged.
    pub fn concatenate(&mut self, bytes: &[u8]) -> Result<(), SecretError> {
        let total = self.data.len().saturating_add(bytes.len());
        check_size(total)?;
        let mut joined = Vec::with_capacity(total);
        joined.extend_from_slice(&self.data);
        joined.extend_from_slice(bytes);
        let mode = self.mode;
        self.replace(joined, mode);
        Ok(())
    }

    /// Read a big-endian integer at byte offset `position`.
    ///
    /// ```
    /// use nym_identity::crypto::Secret;
    ///
    /// let secret = Secret::from_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]);
    /// assert_eq!(secret.extract::<u32>(1).unwrap(), 0x01020304);
    /// assert!(secret.extract::<u64>(0).is_err());
    /// ```
    pub fn extract<T: Extract>(&self, position: usize) -> Result<T, SecretError> {
        let out_of_bounds = SecretError::OutOfBounds {
            position,
            width: T::WIDTH,
            len: self.data.len(),
        };
        let end = position.checked_add(T::WIDTH).ok_or(out_of_bounds)?;
        match self.data.get(position..end) {
            Some(slice) => Ok(T::from_be_slice(slice)),
            None => Err(SecretError::OutOfBounds {
                position,
                width: T::WIDTH,
                len: self.data.len(),
            }),
        }
    }

    /// Grow (zero-filled) or shrink to exactly `size` bytes.
    pub fn resize(&mut self, size: usize) -> Result<(), SecretError> {
        check_size(size)?;
        let mut resized = vec![0u8; size];
        let keep = size.min(self.data.len());
        resized[..keep].copy_from_slice(&self.data[..keep]);
        let mode = self.mode;
        self.replace(resized, mode);
        Ok(())
    }

    /// Wipe the secret, then hand out a zeroed `size`-byte buffer to fill.
    ///
    /// The writer borrows the secret mutably, so nothing else can observe
    /// the half-written state.
    pub fn write_into(
        &mut self,
        mode: SecretMode,
        size: usize,
    ) -> Result<SecretWriter<'_>, SecretError> {
        check_size(size)?;
        self.replace(vec![0u8; size], mode);
        Ok(SecretWriter {
            buffer: &mut self.data,
        })
    }

    /// Zero and empty the buffer. Always succeeds, safe to call twice.
    pub fn clear(&mut self) {
        self.data.zeroize();
        self.data = Vec::new();
        self.mode = SecretMode::Mem;
    }

    fn replace(&mut self, data: Vec<u8>, mode: SecretMode) {
        // Zero the old allocation before it goes back to the allocator.
        self.data.zeroize();
        self.data = data;
        self.mode = mode;
    }
}

fn check_size(size: usize) -> Result<(), SecretError> {
    if size > MAX_SECRET_LENGTH {
        return Err(SecretError::TooLarge { requested: size });
    }
    Ok(())
}

impl Clone for Secret {
    /// Every clone is one more buffer to wipe. Clone on purpose.
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            mode: self.mode,
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({:?}, {} bytes)", self.mode, self.data.len())
    }
}

/// Scoped write access to a secret's buffer. See [`Secret::write_into`].
pub struct SecretWriter<'a> {
    buffer: &'a mut [u8],
}

impl Deref for SecretWriter<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer
    }
}

impl DerefMut for SecretWriter<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buffer
    }
}
