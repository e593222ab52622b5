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

//! Key Hierarchy
//!
//! A [`SpendKey`] derives a [`FullViewKey`], which derives an [`IncomingViewKey`], which derives
//! any number of unlinkable [`Address`]es. Every derivation is deterministic.

use crate::{
    config::{Group, Scalar, GROUP_SIZE},
    error::{StateError, ValidationError},
    hash,
    params::{Network, Params},
};
use alloc::{string::String, vec::Vec};
use spark_crypto::{
    arkworks::{read_point, read_scalar, scalar_mul, write_point, write_scalar},
    encryption::DiversifierCipher,
    rand::{sample_scalar, CryptoRng, RngCore, Sample, Standard},
};
use spark_util::codec::{scale_decode, scale_encode, Decode, DecodeError, Encode, Input, Output};

/// Diversifier Size
pub const DIVERSIFIER_SIZE: usize = 16;

/// Diversifier
pub type Diversifier = [u8; DIVERSIFIER_SIZE];

/// Spend Key
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct SpendKey {
    /// Root Secret
    #[derivative(Debug = "ignore")]
    r: Scalar,

    /// First Derived Secret
    #[derivative(Debug = "ignore")]
    s1: Scalar,

    /// Second Derived Secret
    #[derivative(Debug = "ignore")]
    s2: Scalar,
}

impl SpendKey {
    /// Builds the [`SpendKey`] with root secret `r`.
    #[inline]
    pub fn from_seed(r: Scalar) -> Self {
        Self {
            s1: hash::spend_key_s1(&r),
            s2: hash::spend_key_s2(&r),
            r,
        }
    }

    /// Returns the root secret.
    #[inline]
    pub(crate) fn r(&self) -> &Scalar {
        &self.r
    }

    /// Derives the [`FullViewKey`].
    #[inline]
    pub fn full_view_key(&self, params: &Params) -> FullViewKey {
        let d = scalar_mul(&params.g, &self.r);
        FullViewKey {
            s1: self.s1,
            s2: self.s2,
            d,
            p2: scalar_mul(&params.f, &self.s2) + d,
        }
    }

    /// Derives the [`IncomingViewKey`] through the [`FullViewKey`].
    #[inline]
    pub fn incoming_view_key(&self, params: &Params) -> IncomingViewKey {
        self.full_view_key(params).incoming_view_key()
    }

    /// Derives the address with diversifier index `i` through the full key hierarchy.
    #[inline]
    pub fn address(&self, params: &Params, i: u64) -> Address {
        self.incoming_view_key(params).address(params, i)
    }
}

impl Sample for SpendKey {
    #[inline]
    fn sample<R>(distribution: Standard, rng: &mut R) -> Self
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let _ = distribution;
        Self::from_seed(sample_scalar(rng))
    }
}

impl Encode for SpendKey {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_scalar(&self.r, writer)
    }
}

impl Decode for SpendKey {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let _ = context;
        Ok(Self::from_seed(read_scalar(reader)?))
    }
}

/// Full View Key
///
/// Detects incoming coins and recovers their serial numbers and linking tags, but cannot spend.
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct FullViewKey {
    /// First Derived Secret
    #[derivative(Debug = "ignore")]
    pub(crate) s1: Scalar,

    /// Second Derived Secret
    #[derivative(Debug = "ignore")]
    pub(crate) s2: Scalar,

    /// Spend Key Commitment `G * r`
    pub(crate) d: Group,

    /// Public Address Base `F * s2 + D`
    pub(crate) p2: Group,
}

impl FullViewKey {
    /// Derives the [`IncomingViewKey`].
    #[inline]
    pub fn incoming_view_key(&self) -> IncomingViewKey {
        IncomingViewKey::new(self.s1, self.p2)
    }
}

impl Encode for FullViewKey {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_scalar(&self.s1, writer);
        write_scalar(&self.s2, writer);
        write_point(&self.d, writer);
        write_point(&self.p2, writer)
    }
}

impl Decode for FullViewKey {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let _ = context;
        Ok(Self {
            s1: read_scalar(reader)?,
            s2: read_scalar(reader)?,
            d: read_point(reader)?,
            p2: read_point(reader)?,
        })
    }
}

/// Incoming View Key
///
/// Detects incoming coins and decrypts their values and memos.
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug)]
pub struct IncomingViewKey {
    /// First Derived Secret
    #[derivative(Debug = "ignore")]
    pub(crate) s1: Scalar,

    /// Public Address Base
    pub(crate) p2: Group,

    /// Diversifier Cipher
    #[derivative(Debug = "ignore")]
    cipher: DiversifierCipher,
}

impl IncomingViewKey {
    /// Builds a new [`IncomingViewKey`] from `s1` and `p2`.
    #[inline]
    fn new(s1: Scalar, p2: Group) -> Self {
        Self {
            cipher: DiversifierCipher::new(&hash::diversifier_key(&s1)),
            s1,
            p2,
        }
    }

    /// Computes the diversifier for index `i`.
    #[inline]
    pub fn diversify(&self, i: u64) -> Diversifier {
        let mut block = [0; DIVERSIFIER_SIZE];
        block[..8].copy_from_slice(&i.to_le_bytes());
        self.cipher.encrypt(block)
    }

    /// Recovers the diversifier index from `d`, returning `None` if `d` was not produced by
    /// this key.
    #[inline]
    pub fn diversifier(&self, d: &Diversifier) -> Option<u64> {
        let block = self.cipher.decrypt(*d);
        if block[8..].iter().any(|b| *b != 0) {
            return None;
        }
        let mut index = [0; 8];
        index.copy_from_slice(&block[..8]);
        Some(u64::from_le_bytes(index))
    }

    /// Derives the address with diversifier index `i`.
    #[inline]
    pub fn address(&self, params: &Params, i: u64) -> Address {
        let d = self.diversify(i);
        Address {
            d,
            q1: scalar_mul(&hash::diversifier_point(&d), &self.s1),
            q2: self.address_base(params, i),
        }
    }

    /// Computes `Q2 = F * hash_Q2(s1, i) + P2` for diversifier index `i`.
    #[inline]
    pub(crate) fn address_base(&self, params: &Params, i: u64) -> Group {
        scalar_mul(&params.f, &hash::address_scalar(&self.s1, i)) + self.p2
    }
}

impl PartialEq for IncomingViewKey {
    #[inline]
    fn eq(&self, rhs: &Self) -> bool {
        self.s1 == rhs.s1 && self.p2 == rhs.p2
    }
}

impl Eq for IncomingViewKey {}

impl Encode for IncomingViewKey {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_scalar(&self.s1, writer);
        write_point(&self.p2, writer)
    }
}

impl Decode for IncomingViewKey {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let _ = context;
        let s1 = read_scalar(reader)?;
        Ok(Self::new(s1, read_point(reader)?))
    }
}

/// Address
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Address {
    /// Diversifier
    pub d: Diversifier,

    /// Diversified Key Agreement Base `hash_div(d) * s1`
    pub q1: Group,

    /// Diversified Public Key
    pub q2: Group,
}

impl Address {
    /// Checksum Size
    pub const CHECKSUM_SIZE: usize = 4;

    /// Encoded Address Size
    pub const SIZE: usize = DIVERSIFIER_SIZE + 2 * GROUP_SIZE;

    /// Encodes `self` as a base58 string for `network`.
    #[inline]
    pub fn to_address_string(&self, network: Network) -> String {
        let mut bytes = Vec::with_capacity(1 + Self::SIZE + Self::CHECKSUM_SIZE);
        bytes.push(network.config().address_prefix);
        bytes.extend_from_slice(&self.to_vec());
        let checksum = hash::address_checksum(&bytes);
        bytes.extend_from_slice(&checksum);
        bs58::encode(bytes).into_string()
    }

    /// Decodes an address string for `network`, checking its prefix, checksum and points.
    #[inline]
    pub fn from_address_string(string: &str, network: Network) -> Result<Self, ValidationError> {
        let bytes = bs58::decode(string)
            .into_vec()
            .map_err(|_| ValidationError::Address)?;
        if bytes.len() != 1 + Self::SIZE + Self::CHECKSUM_SIZE
            || bytes[0] != network.config().address_prefix
        {
            return Err(ValidationError::Address);
        }
        let (body, checksum) = bytes.split_at(1 + Self::SIZE);
        if hash::address_checksum(body) != checksum {
            return Err(ValidationError::Address);
        }
        Self::from_bytes(&body[1..], &()).map_err(|_| ValidationError::Address)
    }
}

impl Encode for Address {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        scale_encode(&self.d, writer);
        write_point(&self.q1, writer);
        write_point(&self.q2, writer)
    }
}

impl Decode for Address {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let _ = context;
        Ok(Self {
            d: scale_decode(reader)?,
            q1: read_point(reader)?,
            q2: read_point(reader)?,
        })
    }
}

/// Key Material
///
/// A stored key of any level of the hierarchy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyMaterial {
    /// Spend Key
    Spend(SpendKey),

    /// Full View Key
    FullView(FullViewKey),

    /// Incoming View Key
    IncomingView(IncomingViewKey),
}

impl KeyMaterial {
    /// Returns the [`SpendKey`] if it is stored.
    #[inline]
    pub fn spend_key(&self) -> Result<&SpendKey, StateError> {
        match self {
            Self::Spend(key) => Ok(key),
            _ => Err(StateError::KeyLevel),
        }
    }

    /// Returns the [`FullViewKey`], deriving it if a [`SpendKey`] is stored.
    #[inline]
    pub fn full_view_key(&self, params: &Params) -> Result<FullViewKey, StateError> {
        match self {
            Self::Spend(key) => Ok(key.full_view_key(params)),
            Self::FullView(key) => Ok(key.clone()),
            Self::IncomingView(_) => Err(StateError::KeyLevel),
        }
    }

    /// Returns the [`IncomingViewKey`], deriving it if needed.
    #[inline]
    pub fn incoming_view_key(&self, params: &Params) -> IncomingViewKey {
        match self {
            Self::Spend(key) => key.incoming_view_key(params),
            Self::FullView(key) => key.incoming_view_key(),
            Self::IncomingView(key) => key.clone(),
        }
    }

    /// Derives the address with diversifier index `i`.
    #[inline]
    pub fn address(&self, params: &Params, i: u64) -> Address {
        self.incoming_view_key(params).address(params, i)
    }
}

impl Encode for KeyMaterial {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        match self {
            Self::Spend(key) => {
                scale_encode(&0u8, writer);
                key.encode(writer)
            }
            Self::FullView(key) => {
                scale_encode(&1u8, writer);
                key.encode(writer)
            }
            Self::IncomingView(key) => {
                scale_encode(&2u8, writer);
                key.encode(writer)
            }
        }
    }
}

impl Decode for KeyMaterial {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        match scale_decode::<u8, _>(reader)? {
            0 => Ok(Self::Spend(SpendKey::decode(reader, context)?)),
            1 => Ok(Self::FullView(FullViewKey::decode(reader, context)?)),
            2 => Ok(Self::IncomingView(IncomingViewKey::decode(reader, context)?)),
            _ => Err(DecodeError::InvalidField("key level")),
        }
    }
}
