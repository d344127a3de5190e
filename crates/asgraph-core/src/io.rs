//! Little-endian binary reader/writer used by every on-disk format.
//!
//! Values are written with `to_le_bytes` and read back with `from_le_bytes`
//! through the [`LeBytes`] trait, so each codec can call `w.write(x)` and
//! `r.read::<u32>()` without caring about byte order.

use crate::error::{CodecError, Result};
use std::io::{Read, Write};

/// Numeric types that have a fixed little-endian encoding.
pub trait LeBytes: Sized {
    /// Byte array holding the encoded value.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_le_bytes {
    ($($ty:ty => $size:expr),* $(,)?) => {
        $(
            impl LeBytes for $ty {
                type Bytes = [u8; $size];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_le_bytes!(u8 => 1, u16 => 2, u32 => 4, u64 => 8, i32 => 4, f32 => 4);

/// Writes little-endian values to any [`Write`] sink, counting bytes.
pub struct BinaryWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        BinaryWriter { inner, written: 0 }
    }

    pub fn write<T: LeBytes>(&mut self, value: T) -> Result<()> {
        let bytes = value.to_le_bytes();
        self.write_bytes(bytes.as_ref())
    }

    /// Booleans take one byte, `0` or `1`.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(u8::from(value))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Reads little-endian values from any [`Read`] source.
///
/// A source that ends early yields [`CodecError::Io`] with
/// `UnexpectedEof`, never a partially decoded value.
pub struct BinaryReader<R: Read> {
    inner: R,
    consumed: u64,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        BinaryReader { inner, consumed: 0 }
    }

    pub fn read<T: LeBytes>(&mut self) -> Result<T> {
        let mut bytes = T::Bytes::default();
        self.inner.read_exact(bytes.as_mut())?;
        self.consumed += bytes.as_ref().len() as u64;
        Ok(T::from_le_bytes(bytes))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read::<u8>()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!("invalid bool byte {other}"))),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes)?;
        self.consumed += len as u64;
        Ok(bytes)
    }

    /// Reads `expected.len()` bytes and fails with `BadMagic` on mismatch.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let found = self.read_bytes(expected.len())?;
        if found != expected {
            return Err(CodecError::BadMagic {
                expected: expected.to_vec(),
                found,
            });
        }
        Ok(())
    }

    /// Number of bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}
