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

//! Coins
//!
//! A coin commits to a value and a serial number for one recipient address and carries the
//! opening encrypted to that recipient.

use crate::{
    config::{Group, Scalar, SCALAR_SIZE},
    error::{Error, StateError, ValidationError},
    hash,
    keys::{Address, Diversifier, FullViewKey, IncomingViewKey, DIVERSIFIER_SIZE},
    params::Params,
};
use alloc::vec::Vec;
use spark_crypto::{
    arkworks::{read_point, read_scalar, scalar_mul, write_point, write_scalar, Field},
    encryption::{ciphertext_size, FixedNonceAesGcm},
    rand::{sample_scalar, CryptoRng, RngCore},
    CommitmentScheme,
};
use spark_util::codec::{
    read_bytes, scale_decode, scale_encode, write_bytes, Decode, DecodeError, Encode, Input,
    Output,
};

/// Maximum Serial Context Size
pub const MAX_SERIAL_CONTEXT_SIZE: usize = 64;

/// Coin Type
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CoinType {
    /// Minted Coin with Public Value
    Mint = 0,

    /// Spend Output with Hidden Value
    Spend = 1,
}

impl CoinType {
    /// Returns the coin type with the wire tag `tag`.
    #[inline]
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Mint),
            1 => Some(Self::Spend),
            _ => None,
        }
    }

    /// Returns the associated data label of the encrypted payload.
    #[inline]
    fn label(self) -> &'static [u8] {
        match self {
            Self::Mint => b"Spark/mint-coin",
            Self::Spend => b"Spark/spend-coin",
        }
    }

    /// Returns the size of the payload plaintext with memos of `memo_bytes`.
    #[inline]
    pub fn plaintext_size(self, memo_bytes: usize) -> usize {
        let value = match self {
            Self::Mint => 0,
            Self::Spend => 8,
        };
        DIVERSIFIER_SIZE + value + SCALAR_SIZE + 4 + memo_bytes
    }

    /// Returns the size of the payload ciphertext with memos of `memo_bytes`.
    #[inline]
    pub fn ciphertext_size(self, memo_bytes: usize) -> usize {
        ciphertext_size(self.plaintext_size(memo_bytes))
    }
}

/// Output Coin Data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputCoinData {
    /// Recipient Address
    pub address: Address,

    /// Value
    pub value: u64,

    /// Memo
    pub memo: Vec<u8>,
}

impl OutputCoinData {
    /// Builds a new [`OutputCoinData`].
    #[inline]
    pub fn new(address: Address, value: u64, memo: Vec<u8>) -> Self {
        Self {
            address,
            value,
            memo,
        }
    }
}

/// Coin Payload
///
/// The plaintext encrypted to the recipient.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Payload {
    /// Diversifier
    d: Diversifier,

    /// Value, only present in spend outputs
    value: Option<u64>,

    /// Nonce
    k: Scalar,

    /// Memo
    memo: Vec<u8>,

    /// Padded Memo Size
    memo_bytes: usize,
}

impl Encode for Payload {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        scale_encode(&self.d, writer);
        if let Some(value) = self.value {
            scale_encode(&value, writer);
        }
        write_scalar(&self.k, writer);
        write_bytes(writer, &self.memo);
        writer.write(&alloc::vec![0; self.memo_bytes - self.memo.len()]);
    }
}

impl Decode for Payload {
    type Context = (CoinType, usize);

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let (coin_type, memo_bytes) = *context;
        let d = scale_decode::<Diversifier, _>(reader)?;
        let value = match coin_type {
            CoinType::Mint => None,
            CoinType::Spend => Some(scale_decode::<u64, _>(reader)?),
        };
        let k = read_scalar(reader)?;
        let memo = read_bytes(reader, memo_bytes)?;
        let mut padding = alloc::vec![0; memo_bytes - memo.len()];
        reader.read(&mut padding)?;
        if padding.iter().any(|b| *b != 0) {
            return Err(DecodeError::InvalidField("memo padding"));
        }
        Ok(Self {
            d,
            value,
            k,
            memo,
            memo_bytes,
        })
    }
}

/// Identified Coin Data
///
/// The opening of a coin recovered with an [`IncomingViewKey`].
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct IdentifiedCoinData {
    /// Diversifier Index
    pub i: u64,

    /// Diversifier
    pub d: Diversifier,

    /// Value
    pub value: u64,

    /// Nonce
    #[derivative(Debug = "ignore")]
    pub k: Scalar,

    /// Memo
    pub memo: Vec<u8>,
}

/// Recovered Coin Data
///
/// The spend secrets of a coin recovered with a [`FullViewKey`].
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct RecoveredCoinData {
    /// Serial Number
    #[derivative(Debug = "ignore")]
    pub s: Scalar,

    /// Linking Tag `T = s^{-1} * (U - D)`
    pub tag: Group,
}

/// Coin
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coin {
    /// Coin Type
    pub coin_type: CoinType,

    /// Serial Commitment `S`
    pub serial_commitment: Group,

    /// Recovery Key `K`
    pub recovery_key: Group,

    /// Value Commitment `C`
    pub value_commitment: Group,

    /// Public Value of a Mint Coin
    pub value: Option<u64>,

    /// Encrypted Payload
    pub ciphertext: Vec<u8>,

    /// Serial Context
    pub serial_context: Vec<u8>,
}

impl Coin {
    /// Builds the coin of `coin_type` with nonce `k` paying `output` under `serial_context`.
    #[inline]
    pub fn new(
        params: &Params,
        coin_type: CoinType,
        k: &Scalar,
        output: &OutputCoinData,
        serial_context: &[u8],
    ) -> Result<Self, Error> {
        if !params.value_in_range(output.value) {
            return Err(ValidationError::ValueOutOfRange.into());
        }
        if output.memo.len() > params.memo_bytes() {
            return Err(ValidationError::MemoTooLong {
                length: output.memo.len(),
                bound: params.memo_bytes(),
            }
            .into());
        }
        if serial_context.len() > MAX_SERIAL_CONTEXT_SIZE {
            return Err(ValidationError::SerialContext.into());
        }
        let address = &output.address;
        let payload = Payload {
            d: address.d,
            value: match coin_type {
                CoinType::Mint => None,
                CoinType::Spend => Some(output.value),
            },
            k: *k,
            memo: output.memo.clone(),
            memo_bytes: params.memo_bytes(),
        };
        let key = hash::payload_key(&scalar_mul(&address.q1, k));
        Ok(Self {
            coin_type,
            serial_commitment: scalar_mul(&params.f, &hash::serial_scalar(k, serial_context))
                + address.q2,
            recovery_key: scalar_mul(&hash::diversifier_point(&address.d), k),
            value_commitment: params
                .value_commitment()
                .commit(&Scalar::from(output.value), &hash::value_blinding(k)),
            value: match coin_type {
                CoinType::Mint => Some(output.value),
                CoinType::Spend => None,
            },
            ciphertext: FixedNonceAesGcm::encrypt(&key, coin_type.label(), &payload.to_vec()),
            serial_context: serial_context.to_vec(),
        })
    }

    /// Mints a coin of `coin_type` paying `output` with a fresh nonce sampled from `rng`.
    #[inline]
    pub fn mint<R>(
        params: &Params,
        coin_type: CoinType,
        output: &OutputCoinData,
        serial_context: &[u8],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        Self::new(params, coin_type, &sample_scalar(rng), output, serial_context)
    }

    /// Tries to identify `self` as addressed to `ivk`, returning `None` if it is not.
    #[inline]
    pub fn identify(&self, params: &Params, ivk: &IncomingViewKey) -> Option<IdentifiedCoinData> {
        let key = hash::payload_key(&scalar_mul(&self.recovery_key, &ivk.s1));
        let plaintext = FixedNonceAesGcm::decrypt(&key, self.coin_type.label(), &self.ciphertext)?;
        let payload =
            Payload::from_bytes(&plaintext, &(self.coin_type, params.memo_bytes())).ok()?;
        let value = match self.coin_type {
            CoinType::Mint => self.value?,
            CoinType::Spend => payload.value?,
        };
        let i = ivk.diversifier(&payload.d)?;
        if self.recovery_key != scalar_mul(&hash::diversifier_point(&payload.d), &payload.k) {
            return None;
        }
        if self.serial_commitment
            != scalar_mul(
                &params.f,
                &hash::serial_scalar(&payload.k, &self.serial_context),
            ) + ivk.address_base(params, i)
        {
            return None;
        }
        if self.value_commitment
            != params
                .value_commitment()
                .commit(&Scalar::from(value), &hash::value_blinding(&payload.k))
        {
            return None;
        }
        Some(IdentifiedCoinData {
            i,
            d: payload.d,
            value,
            k: payload.k,
            memo: payload.memo,
        })
    }

    /// Recovers the serial number and linking tag of `self` with `fvk`.
    #[inline]
    pub fn recover(
        &self,
        params: &Params,
        fvk: &FullViewKey,
        identified: &IdentifiedCoinData,
    ) -> Result<RecoveredCoinData, StateError> {
        let s = hash::serial_scalar(&identified.k, &self.serial_context)
            + hash::address_scalar(&fvk.s1, identified.i)
            + fvk.s2;
        if self.serial_commitment != scalar_mul(&params.f, &s) + fvk.d {
            return Err(StateError::ViewKeyMismatch);
        }
        let s_inverse = s.inverse().ok_or(StateError::ViewKeyMismatch)?;
        Ok(RecoveredCoinData {
            s,
            tag: scalar_mul(&(params.u - fvk.d), &s_inverse),
        })
    }
}

impl Encode for Coin {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        scale_encode(&(self.coin_type as u8), writer);
        write_point(&self.serial_commitment, writer);
        write_point(&self.recovery_key, writer);
        write_point(&self.value_commitment, writer);
        match (self.coin_type, self.value) {
            (CoinType::Mint, Some(value)) => scale_encode(&value, writer),
            (CoinType::Spend, None) => {}
            _ => unreachable!("Coins carry a public value exactly when they are minted."),
        }
        write_bytes(writer, &self.ciphertext);
        write_bytes(writer, &self.serial_context);
    }
}

impl Decode for Coin {
    type Context = Params;

    #[inline]
    fn decode<I>(reader: &mut I, params: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let coin_type = CoinType::from_tag(scale_decode(reader)?)
            .ok_or(DecodeError::InvalidField("coin type"))?;
        let serial_commitment = read_point(reader)?;
        let recovery_key = read_point(reader)?;
        let value_commitment = read_point(reader)?;
        let value = match coin_type {
            CoinType::Mint => Some(scale_decode::<u64, _>(reader)?),
            CoinType::Spend => None,
        };
        let expected = coin_type.ciphertext_size(params.memo_bytes());
        let ciphertext = read_bytes(reader, expected)?;
        if ciphertext.len() != expected {
            return Err(DecodeError::InvalidField("coin ciphertext"));
        }
        Ok(Self {
            coin_type,
            serial_commitment,
            recovery_key,
            value_commitment,
            value,
            ciphertext,
            serial_context: read_bytes(reader, MAX_SERIAL_CONTEXT_SIZE)?,
        })
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::GROUP_SIZE, keys::SpendKey, params::Network};
    use spark_crypto::rand::{OsRng, Sample};

    /// Checks that the owner identifies and recovers a coin and that the coin round-trips.
    #[test]
    fn identify_and_recover() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let spend_key = SpendKey::gen(&mut rng);
        let fvk = spend_key.full_view_key(&params);
        let ivk = fvk.incoming_view_key();
        for coin_type in [CoinType::Mint, CoinType::Spend] {
            let output = OutputCoinData::new(ivk.address(&params, 5), 1234, b"memo".to_vec());
            let coin = Coin::mint(&params, coin_type, &output, b"context", &mut rng)
                .expect("Minting a valid output should succeed.");
            let identified = coin
                .identify(&params, &ivk)
                .expect("The owner should identify the coin.");
            assert_eq!(identified.i, 5);
            assert_eq!(identified.value, 1234);
            assert_eq!(identified.memo, b"memo");
            let recovered = coin
                .recover(&params, &fvk, &identified)
                .expect("The owner should recover the coin.");
            assert_eq!(
                recovered.tag,
                scalar_mul(&(params.u - fvk.d), &recovered.s.inverse().expect("Non-zero.")),
            );
            assert_eq!(
                Coin::from_bytes(&coin.to_vec(), &params),
                Ok(coin),
                "Coins must round-trip through their encoding."
            );
        }
    }

    /// Checks that foreign keys neither identify nor recover a coin.
    #[test]
    fn foreign_keys_fail() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let owner = SpendKey::gen(&mut rng).full_view_key(&params);
        let other = SpendKey::gen(&mut rng).full_view_key(&params);
        let output = OutputCoinData::new(owner.incoming_view_key().address(&params, 0), 9, Vec::new());
        let coin = Coin::mint(&params, CoinType::Spend, &output, b"", &mut rng)
            .expect("Minting a valid output should succeed.");
        assert_eq!(coin.identify(&params, &other.incoming_view_key()), None);
        let identified = coin
            .identify(&params, &owner.incoming_view_key())
            .expect("The owner should identify the coin.");
        assert_eq!(
            coin.recover(&params, &other, &identified),
            Err(StateError::ViewKeyMismatch)
        );
    }

    /// Checks that out-of-bound values and memos are rejected when minting.
    #[test]
    fn mint_rejects_invalid_outputs() {
        let mut rng = OsRng;
        let mut config = Network::Regtest.config();
        config.value_bits = 8;
        let params = Params::with_shape(config).expect("The shape is valid.");
        let address = SpendKey::gen(&mut rng).address(&params, 0);
        assert_eq!(
            Coin::mint(
                &params,
                CoinType::Spend,
                &OutputCoinData::new(address, 256, Vec::new()),
                b"",
                &mut rng
            ),
            Err(ValidationError::ValueOutOfRange.into())
        );
        assert_eq!(
            Coin::mint(
                &params,
                CoinType::Spend,
                &OutputCoinData::new(address, 255, alloc::vec![1; 33]),
                b"",
                &mut rng
            ),
            Err(ValidationError::MemoTooLong {
                length: 33,
                bound: 32
            }
            .into())
        );
    }

    /// Checks that the public value is written right after the commitments of minted coins and
    /// is absent from spend outputs.
    #[test]
    fn public_value_follows_coin_type() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let address = SpendKey::gen(&mut rng).address(&params, 0);
        let output = OutputCoinData::new(address, 0x0102_0304, Vec::new());
        let offset = 1 + 3 * GROUP_SIZE;
        let mint = Coin::mint(&params, CoinType::Mint, &output, b"", &mut rng)
            .expect("Minting a valid output should succeed.")
            .to_vec();
        assert_eq!(mint[0], CoinType::Mint as u8);
        assert_eq!(&mint[offset..offset + 8], &0x0102_0304u64.to_le_bytes());
        let spend = Coin::mint(&params, CoinType::Spend, &output, b"", &mut rng)
            .expect("Minting a valid output should succeed.")
            .to_vec();
        assert_eq!(spend[0], CoinType::Spend as u8);
        let ciphertext_length = u32::from_le_bytes(
            spend[offset..offset + 4]
                .try_into()
                .expect("The slice has four bytes."),
        );
        assert_eq!(
            ciphertext_length as usize,
            CoinType::Spend.ciphertext_size(params.memo_bytes()),
            "Spend outputs should go straight from the commitments to the ciphertext."
        );
    }

    /// Checks that changing the nonce changes the linking tag.
    #[test]
    fn tags_are_per_coin() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let spend_key = SpendKey::gen(&mut rng);
        let fvk = spend_key.full_view_key(&params);
        let output = OutputCoinData::new(spend_key.address(&params, 1), 1, Vec::new());
        let tag = |k: &Scalar| {
            let coin = Coin::new(&params, CoinType::Mint, k, &output, b"")
                .expect("Minting a valid output should succeed.");
            let identified = coin
                .identify(&params, &fvk.incoming_view_key())
                .expect("The owner should identify the coin.");
            coin.recover(&params, &fvk, &identified)
                .expect("The owner should recover the coin.")
                .tag
        };
        let k = sample_scalar::<Scalar, _>(&mut rng);
        assert_eq!(tag(&k), tag(&k), "Tags must be deterministic.");
        assert_ne!(tag(&k), tag(&sample_scalar(&mut rng)), "Tags must differ across coins.");
    }
}
