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

//! Mint Transactions

use crate::{
    coin::{Coin, CoinType, OutputCoinData},
    config::{Group, Scalar},
    error::{Error, ProofError, ValidationError},
    hash,
    params::Params,
    proof::schnorr::SchnorrProof,
    transaction::{append_outputs, transcript, VERSION},
};
use alloc::vec::Vec;
use spark_crypto::{
    arkworks::scalar_mul,
    rand::{sample_scalar, CryptoRng, RngCore},
};
use spark_util::codec::{
    decode_sequence, encode_sequence, scale_decode, scale_encode, Decode, DecodeError, Encode,
    Input, Output,
};
use tracing::{debug, trace};

/// Mint Transaction
///
/// Creates coins with public values. The value proof shows that every value commitment opens to
/// its public value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintTransaction {
    /// Record Version
    pub version: u8,

    /// Output Coins
    pub outputs: Vec<Coin>,

    /// Value Proof
    pub proof: SchnorrProof,
}

/// Returns the value proof statements `C - G * v` for mint `outputs`.
#[inline]
fn statements(params: &Params, outputs: &[Coin]) -> Option<Vec<Group>> {
    outputs
        .iter()
        .map(|coin| {
            coin.value
                .map(|value| coin.value_commitment - scalar_mul(&params.g, &Scalar::from(value)))
        })
        .collect()
}

impl MintTransaction {
    /// Generates a transaction minting `outputs` under `serial_context`.
    #[inline]
    pub fn generate<R>(
        params: &Params,
        outputs: &[OutputCoinData],
        serial_context: &[u8],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        if outputs.is_empty() {
            return Err(ValidationError::NoOutputs.into());
        }
        if outputs.len() > params.max_outputs() {
            return Err(ValidationError::TooManyOutputs.into());
        }
        let nonces = outputs
            .iter()
            .map(|_| sample_scalar::<Scalar, _>(rng))
            .collect::<Vec<_>>();
        let coins = outputs
            .iter()
            .zip(&nonces)
            .map(|(output, k)| Coin::new(params, CoinType::Mint, k, output, serial_context))
            .collect::<Result<Vec<_>, _>>()?;
        let statements = statements(params, &coins)
            .expect("Mint coins always carry their public value, so this is not allowed to fail.");
        let witnesses = nonces.iter().map(hash::value_blinding).collect::<Vec<_>>();
        let mut transcript = transcript(params, b"Spark/mint");
        append_outputs(&mut transcript, &coins);
        let proof = SchnorrProof::prove(&mut transcript, &params.h, &statements, &witnesses, rng);
        trace!("Built mint transaction with {} outputs.", coins.len());
        Ok(Self {
            version: VERSION,
            outputs: coins,
            proof,
        })
    }

    /// Returns the transaction identifier.
    #[inline]
    pub fn id(&self) -> [u8; 32] {
        hash::record_id(b"Spark/mint-id", &self.to_vec())
    }

    /// Checks `self`, returning the reason for the first failed check.
    #[inline]
    pub fn check(&self, params: &Params) -> Result<(), Error> {
        if self.version != VERSION {
            return Err(ValidationError::Version(self.version).into());
        }
        if self.outputs.is_empty() {
            return Err(ValidationError::NoOutputs.into());
        }
        if self.outputs.len() > params.max_outputs() {
            return Err(ValidationError::TooManyOutputs.into());
        }
        for coin in &self.outputs {
            if coin.coin_type != CoinType::Mint {
                return Err(ValidationError::CoinType.into());
            }
            match coin.value {
                Some(value) if params.value_in_range(value) => {}
                _ => return Err(ValidationError::ValueOutOfRange.into()),
            }
        }
        let statements = statements(params, &self.outputs).ok_or(ValidationError::ValueOutOfRange)?;
        let mut transcript = transcript(params, b"Spark/mint");
        append_outputs(&mut transcript, &self.outputs);
        if !self.proof.verify(&mut transcript, &params.h, &statements) {
            return Err(ProofError::Balance.into());
        }
        Ok(())
    }

    /// Verifies `self`.
    #[inline]
    pub fn verify(&self, params: &Params) -> bool {
        match self.check(params) {
            Ok(()) => true,
            Err(err) => {
                debug!("Rejected mint transaction: {}", err);
                false
            }
        }
    }
}

impl Encode for MintTransaction {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        scale_encode(&self.version, writer);
        encode_sequence(&self.outputs, writer);
        self.proof.encode(writer)
    }
}

impl Decode for MintTransaction {
    type Context = Params;

    #[inline]
    fn decode<I>(reader: &mut I, params: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let version = scale_decode::<u8, _>(reader)?;
        if version != VERSION {
            return Err(DecodeError::InvalidField("version"));
        }
        Ok(Self {
            version,
            outputs: decode_sequence(reader, params.max_outputs(), params)?,
            proof: SchnorrProof::decode(reader, &())?,
        })
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use crate::{keys::SpendKey, params::Network};
    use spark_crypto::rand::{OsRng, Sample};

    /// Checks that a mint transaction verifies and that its owner identifies every output.
    #[test]
    fn mint_verifies() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let ivk = SpendKey::gen(&mut rng).incoming_view_key(&params);
        let outputs = (0..3)
            .map(|i| OutputCoinData::new(ivk.address(&params, i), 100 * (i + 1), Vec::new()))
            .collect::<Vec<_>>();
        let transaction = MintTransaction::generate(&params, &outputs, b"block", &mut rng)
            .expect("Generating a valid mint transaction is not allowed to fail.");
        assert!(transaction.verify(&params), "The mint transaction should verify.");
        for (i, coin) in transaction.outputs.iter().enumerate() {
            let identified = coin
                .identify(&params, &ivk)
                .expect("The owner should identify every minted coin.");
            assert_eq!(identified.i, i as u64, "The diversifier index should be recovered.");
            assert_eq!(identified.value, 100 * (i as u64 + 1), "The value should be recovered.");
        }
        let decoded = MintTransaction::from_bytes(&transaction.to_vec(), &params)
            .expect("Decoding an encoded mint transaction is not allowed to fail.");
        assert_eq!(decoded, transaction, "The mint transaction should round-trip.");
        assert_eq!(decoded.id(), transaction.id(), "Equal transactions should share an id.");
    }

    /// Checks that changing a public value invalidates the value proof.
    #[test]
    fn tampered_value_is_rejected() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let address = SpendKey::gen(&mut rng).address(&params, 0);
        let outputs = [OutputCoinData::new(address, 10, Vec::new())];
        let mut transaction = MintTransaction::generate(&params, &outputs, b"block", &mut rng)
            .expect("Generating a valid mint transaction is not allowed to fail.");
        transaction.outputs[0].value = Some(11);
        assert_eq!(
            transaction.check(&params),
            Err(ProofError::Balance.into()),
            "A changed public value should fail the value proof."
        );
    }

    /// Checks that empty and oversized mints are rejected before any coin is built.
    #[test]
    fn output_count_is_bounded() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        assert_eq!(
            MintTransaction::generate(&params, &[], b"block", &mut rng),
            Err(ValidationError::NoOutputs.into())
        );
        let address = SpendKey::gen(&mut rng).address(&params, 0);
        let outputs = alloc::vec![OutputCoinData::new(address, 1, Vec::new()); params.max_outputs() + 1];
        assert_eq!(
            MintTransaction::generate(&params, &outputs, b"block", &mut rng),
            Err(ValidationError::TooManyOutputs.into())
        );
    }
}
