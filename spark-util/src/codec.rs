// Copyright 2019-2022 Manta Network.
// This file is part of spark-rs.
//
// spark-rs is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// spark-rs is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with spark-rs.  If not, see <http://www.gnu.org/licenses/>.

//! Parity SCALE + Arkworks Codec System
//!
//! Records are written to SCALE [`Output`]s and read from SCALE [`Input`]s. Integers and byte
//! arrays use their SCALE encodings, sequences carry a fixed-width `u32` length prefix that is
//! bounded on decode, and arkworks values are bridged through [`ScaleCodecReader`] and
//! [`ScaleCodecWriter`].

use alloc::vec::Vec;
use ark_std::io::{self, ErrorKind};
use core::fmt;

pub use ark_std::io::{Read, Write};
pub use scale_codec::{
    Decode as ScaleDecode, Encode as ScaleEncode, Error as ScaleCodecError, Input, Output,
};

/// Decoding Error
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecodeError {
    /// Unexpected End of Input
    UnexpectedEnd,

    /// Trailing Bytes
    ///
    /// The record was decoded but the input was not fully consumed.
    TrailingBytes,

    /// Length Bound Exceeded
    ///
    /// A length prefix was larger than the bound allowed for the field.
    LengthBound {
        /// Declared Length
        length: usize,

        /// Maximum Allowed Length
        bound: usize,
    },

    /// Invalid Field
    ///
    /// The bytes were well-sized but do not represent a valid value of the named field.
    InvalidField(&'static str),
}

impl fmt::Display for DecodeError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::TrailingBytes => write!(f, "trailing bytes after record"),
            Self::LengthBound { length, bound } => {
                write!(f, "length {} exceeds bound {}", length, bound)
            }
            Self::InvalidField(field) => write!(f, "invalid encoding for field `{}`", field),
        }
    }
}

impl From<ScaleCodecError> for DecodeError {
    #[inline]
    fn from(_: ScaleCodecError) -> Self {
        // NOTE: Every SCALE value read by this codec is fixed-width.
        Self::UnexpectedEnd
    }
}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for DecodeError {}

/// Scale-Codec Input as Reader Wrapper
#[derive(Debug, Eq, Hash, PartialEq)]
pub struct ScaleCodecReader<'i, I>(pub &'i mut I)
where
    I: Input;

impl<I> Read for ScaleCodecReader<'_, I>
where
    I: Input,
{
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        let len = buf.len();
        self.read_exact(buf).map(|_| len)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), io::Error> {
        Input::read(self.0, buf).map_err(|_| ErrorKind::Other.into())
    }
}

/// Scale-Codec Output as Writer Wrapper
#[derive(Debug, Eq, Hash, PartialEq)]
pub struct ScaleCodecWriter<'o, O>(pub &'o mut O)
where
    O: Output + ?Sized;

impl<O> Write for ScaleCodecWriter<'_, O>
where
    O: Output + ?Sized,
{
    #[inline]
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        Output::write(self.0, buf);
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

/// Decodes a value of type `T` from `reader` using the SCALE codec.
#[inline]
pub fn scale_decode<T, I>(reader: &mut I) -> Result<T, DecodeError>
where
    T: ScaleDecode,
    I: Input,
{
    Ok(T::decode(reader)?)
}

/// Encodes `value` to `writer` using the SCALE codec.
#[inline]
pub fn scale_encode<T, O>(value: &T, writer: &mut O)
where
    T: ScaleEncode + ?Sized,
    O: Output + ?Sized,
{
    value.encode_to(writer)
}

/// Writes a `u32` length prefix.
///
/// # Panics
///
/// Lengths are bounded by the protocol parameters well below `u32::MAX`, so a larger length
/// indicates a broken caller.
#[inline]
pub fn write_length<O>(writer: &mut O, length: usize)
where
    O: Output + ?Sized,
{
    let length = u32::try_from(length).expect("Lengths are bounded well below `u32::MAX`.");
    scale_encode(&length, writer)
}

/// Reads a `u32` length prefix and checks it against `bound`.
#[inline]
pub fn read_length<I>(reader: &mut I, bound: usize) -> Result<usize, DecodeError>
where
    I: Input,
{
    let length = scale_decode::<u32, _>(reader)? as usize;
    if length > bound {
        return Err(DecodeError::LengthBound { length, bound });
    }
    Ok(length)
}

/// Writes a length-prefixed byte string.
#[inline]
pub fn write_bytes<O>(writer: &mut O, bytes: &[u8])
where
    O: Output + ?Sized,
{
    write_length(writer, bytes.len());
    Output::write(writer, bytes)
}

/// Reads a length-prefixed byte string of at most `bound` bytes.
#[inline]
pub fn read_bytes<I>(reader: &mut I, bound: usize) -> Result<Vec<u8>, DecodeError>
where
    I: Input,
{
    let length = read_length(reader, bound)?;
    let mut buffer = alloc::vec![0; length];
    Input::read(reader, &mut buffer)?;
    Ok(buffer)
}

/// Encoding
pub trait Encode {
    /// Appends the encoding of `self` to the `writer`.
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized;

    /// Encodes `self` into a new byte vector.
    #[inline]
    fn to_vec(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.encode(&mut buffer);
        buffer
    }
}

/// Decoding
pub trait Decode: Sized {
    /// Context needed to bound the decoded lengths.
    type Context: ?Sized;

    /// Decodes a value of type `Self` from the front of `reader`.
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input;

    /// Decodes a value of type `Self` from `bytes`, requiring that all bytes are consumed.
    #[inline]
    fn from_bytes(mut bytes: &[u8], context: &Self::Context) -> Result<Self, DecodeError> {
        let value = Self::decode(&mut bytes, context)?;
        if !bytes.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(value)
    }
}

/// Encodes `items` with a `u32` count prefix.
#[inline]
pub fn encode_sequence<T, O>(items: &[T], writer: &mut O)
where
    T: Encode,
    O: Output + ?Sized,
{
    write_length(writer, items.len());
    for item in items {
        item.encode(writer);
    }
}

/// Decodes a `u32` count prefixed sequence of at most `bound` items.
#[inline]
pub fn decode_sequence<T, I>(
    reader: &mut I,
    bound: usize,
    context: &T::Context,
) -> Result<Vec<T>, DecodeError>
where
    T: Decode,
    I: Input,
{
    let length = read_length(reader, bound)?;
    let mut items = Vec::with_capacity(length);
    for _ in 0..length {
        items.push(T::decode(reader, context)?);
    }
    Ok(items)
}
