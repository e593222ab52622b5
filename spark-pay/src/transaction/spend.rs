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

//! Spend Transactions

use crate::{
    coin::{Coin, CoinType, IdentifiedCoinData, OutputCoinData, RecoveredCoinData},
    config::{Group, Scalar},
    error::{BalanceError, Error, ProofError, StateError, ValidationError},
    hash,
    keys::{FullViewKey, SpendKey},
    params::Params,
    proof::{
        bulletproof::{self, RangeProof},
        chaum::{ChaumProof, ChaumWitness},
        grootle::{GrootleProof, GrootleWitness},
        schnorr::SchnorrProof,
    },
    transaction::{append_outputs, transcript, CoverSet, SetRoot, VERSION},
};
use alloc::{collections::BTreeSet, vec::Vec};
use spark_crypto::{
    arkworks::{point_to_bytes, read_point, read_points, scalar_mul, write_points, Zero},
    rand::{sample_scalar, CryptoRng, RngCore},
    transcript::Transcript,
    CommitmentScheme,
};
use spark_util::codec::{
    decode_sequence, encode_sequence, read_length, scale_decode, scale_encode, write_length,
    Decode, DecodeError, Encode, Input, Output,
};
use tracing::{debug, trace};

/// Input Coin Data
///
/// Everything the spender knows about one coin being spent.
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct InputCoinData {
    /// Index of the Coin in its Anonymity Set
    pub index: usize,

    /// Coin Nonce
    #[derivative(Debug = "ignore")]
    pub k: Scalar,

    /// Serial Number
    #[derivative(Debug = "ignore")]
    pub s: Scalar,

    /// Linking Tag
    pub tag: Group,

    /// Value
    pub value: u64,
}

impl InputCoinData {
    /// Builds the input data for the coin at `index` from its identified and recovered data.
    #[inline]
    pub fn new(index: usize, identified: &IdentifiedCoinData, recovered: &RecoveredCoinData) -> Self {
        Self {
            index,
            k: identified.k,
            s: recovered.s,
            tag: recovered.tag,
            value: identified.value,
        }
    }
}

/// Spend Proof
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendProof {
    /// Serial Commitment Offsets `S1`
    pub serial_offsets: Vec<Group>,

    /// Value Commitment Offsets `C1`
    pub value_offsets: Vec<Group>,

    /// Membership Proofs, one per Input
    pub grootle: Vec<GrootleProof>,

    /// Ownership Proof
    pub chaum: ChaumProof,

    /// Balance Proof
    pub balance: SchnorrProof,

    /// Output Range Proof
    pub range: RangeProof,
}

impl SpendProof {
    /// Returns `true` if the vector lengths of `self` match a transaction with `inputs` inputs
    /// and `outputs` outputs.
    #[inline]
    fn has_shape(&self, params: &Params, inputs: usize, outputs: usize) -> bool {
        let rounds = bulletproof::rounds(params, outputs);
        self.serial_offsets.len() == inputs
            && self.value_offsets.len() == inputs
            && self.grootle.len() == inputs
            && self.grootle.iter().all(|proof| proof.has_shape(params))
            && self.chaum.has_shape(inputs)
            && self.range.l.len() == rounds
            && self.range.r.len() == rounds
    }

    /// Decodes a proof for a transaction with `inputs` inputs and `outputs` outputs.
    #[inline]
    fn decode_shaped<I>(
        reader: &mut I,
        params: &Params,
        inputs: usize,
        outputs: usize,
    ) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let serial_offsets = read_points(reader, inputs)?;
        let value_offsets = read_points(reader, inputs)?;
        let grootle: Vec<GrootleProof> = decode_sequence(reader, inputs, params)?;
        if grootle.len() != inputs {
            return Err(DecodeError::InvalidField("membership proof count"));
        }
        Ok(Self {
            serial_offsets,
            value_offsets,
            grootle,
            chaum: ChaumProof::decode(reader, &inputs)?,
            balance: SchnorrProof::decode(reader, &())?,
            range: RangeProof::decode(reader, &bulletproof::rounds(params, outputs))?,
        })
    }
}

impl Encode for SpendProof {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_points(&self.serial_offsets, writer);
        write_points(&self.value_offsets, writer);
        encode_sequence(&self.grootle, writer);
        self.chaum.encode(writer);
        self.balance.encode(writer);
        self.range.encode(writer)
    }
}

/// Spend Transaction
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendTransaction {
    /// Record Version
    pub version: u8,

    /// Fee
    pub fee: u64,

    /// Linking Tags, one per Input
    pub tags: Vec<Group>,

    /// Anonymity Set Roots, one per Input
    pub roots: Vec<SetRoot>,

    /// Output Coins
    pub outputs: Vec<Coin>,

    /// Proof
    pub proof: SpendProof,
}

/// Returns the serial context every output of a transaction with linking `tags` is minted under.
#[inline]
fn serial_context(tags: &[Group]) -> [u8; 64] {
    let mut encoded = Vec::new();
    write_points(tags, &mut encoded);
    hash::spend_serial_context(&encoded)
}

/// Checks that `tags` are neither the identity nor repeated.
#[inline]
fn check_tags(tags: &[Group]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for tag in tags {
        if tag.is_zero() {
            return Err(ValidationError::IdentityTag);
        }
        if !seen.insert(point_to_bytes(tag)) {
            return Err(ValidationError::DuplicateTag);
        }
    }
    Ok(())
}

/// Returns the anonymity set for `root`, checking its size.
#[inline]
fn resolve<'c, C>(params: &Params, cover_set: &'c C, root: &SetRoot) -> Result<&'c [Coin], ValidationError>
where
    C: CoverSet + ?Sized,
{
    let coins = cover_set.coins(root).ok_or(ValidationError::UnknownRoot)?;
    if coins.is_empty() || coins.len() > params.set_size() {
        return Err(ValidationError::CoverSet);
    }
    Ok(coins)
}

/// Splits an anonymity set into its serial and value commitments.
#[inline]
fn commitments(coins: &[Coin]) -> (Vec<Group>, Vec<Group>) {
    coins
        .iter()
        .map(|coin| (coin.serial_commitment, coin.value_commitment))
        .unzip()
}

/// Computes the balance statement `sum(C1) - sum(C) - G * fee`.
#[inline]
fn balance_statement(params: &Params, value_offsets: &[Group], outputs: &[Coin], fee: u64) -> Group {
    let inputs = value_offsets.iter().fold(Group::zero(), |sum, c| sum + c);
    let outputs = outputs
        .iter()
        .fold(Group::zero(), |sum, coin| sum + coin.value_commitment);
    inputs - outputs - scalar_mul(&params.g, &Scalar::from(fee))
}

impl SpendTransaction {
    /// Appends the public data of a transaction to `transcript`.
    #[inline]
    fn append_public(
        transcript: &mut Transcript,
        fee: u64,
        tags: &[Group],
        roots: &[SetRoot],
        outputs: &[Coin],
        serial_offsets: &[Group],
        value_offsets: &[Group],
    ) {
        transcript.append_u64(b"fee", fee);
        append_outputs(transcript, outputs);
        transcript.append_u64(b"root-count", roots.len() as u64);
        for root in roots {
            transcript.append_message(b"root", root);
        }
        transcript.append_points(b"tags", tags);
        transcript.append_points(b"serial-offsets", serial_offsets);
        transcript.append_points(b"value-offsets", value_offsets);
    }

    /// Generates a transaction spending `inputs`, where `inputs[i]` is a member of the anonymity
    /// set described by `roots[i]`, paying `outputs` and `fee`.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn generate<C, R>(
        params: &Params,
        fvk: &FullViewKey,
        spend_key: &SpendKey,
        cover_set: &C,
        roots: &[SetRoot],
        inputs: &[InputCoinData],
        fee: u64,
        outputs: &[OutputCoinData],
        rng: &mut R,
    ) -> Result<Self, Error>
    where
        C: CoverSet + ?Sized,
        R: CryptoRng + RngCore + ?Sized,
    {
        if inputs.is_empty() {
            return Err(ValidationError::NoInputs.into());
        }
        if inputs.len() > params.max_inputs() {
            return Err(ValidationError::TooManyInputs.into());
        }
        if roots.len() != inputs.len() {
            return Err(ValidationError::RootCount.into());
        }
        if outputs.len() > params.max_outputs() {
            return Err(ValidationError::TooManyOutputs.into());
        }
        let input_sum = inputs
            .iter()
            .try_fold(0u128, |sum, input| sum.checked_add(input.value as u128))
            .ok_or(BalanceError::Overflow)?;
        let output_sum = outputs
            .iter()
            .try_fold(fee as u128, |sum, output| sum.checked_add(output.value as u128))
            .ok_or(BalanceError::Overflow)?;
        if input_sum != output_sum {
            return Err(BalanceError::Mismatch {
                inputs: input_sum,
                outputs: output_sum,
            }
            .into());
        }
        if scalar_mul(&params.g, spend_key.r()) != fvk.d {
            return Err(StateError::ViewKeyMismatch.into());
        }
        let tags = inputs.iter().map(|input| input.tag).collect::<Vec<_>>();
        check_tags(&tags)?;
        let scheme = params.value_commitment();
        let mut sets = Vec::with_capacity(inputs.len());
        let mut serial_offsets = Vec::with_capacity(inputs.len());
        let mut value_offsets = Vec::with_capacity(inputs.len());
        let mut serial_blindings = Vec::with_capacity(inputs.len());
        let mut value_blindings = Vec::with_capacity(inputs.len());
        for (input, root) in inputs.iter().zip(roots) {
            let coins = resolve(params, cover_set, root)?;
            let coin = coins.get(input.index).ok_or(ValidationError::InputIndex)?;
            let serial = scalar_mul(&params.f, &input.s) + fvk.d;
            if coin.serial_commitment != serial
                || scalar_mul(&input.tag, &input.s) + fvk.d != params.u
                || coin.value_commitment
                    != scheme.commit(&Scalar::from(input.value), &hash::value_blinding(&input.k))
            {
                return Err(StateError::InputMismatch.into());
            }
            let serial_blinding = hash::serial_offset(&input.s, &fvk.d);
            let value_blinding = hash::value_offset(&input.s, &fvk.d);
            serial_offsets.push(serial - scalar_mul(&params.h, &serial_blinding));
            value_offsets.push(scheme.commit(&Scalar::from(input.value), &value_blinding));
            serial_blindings.push(serial_blinding);
            value_blindings.push(value_blinding);
            sets.push(commitments(coins));
        }
        let context = serial_context(&tags);
        let nonces = outputs
            .iter()
            .map(|_| sample_scalar::<Scalar, _>(rng))
            .collect::<Vec<_>>();
        let output_coins = outputs
            .iter()
            .zip(&nonces)
            .map(|(output, k)| Coin::new(params, CoinType::Spend, k, output, &context))
            .collect::<Result<Vec<_>, _>>()?;
        trace!("Built {} spend outputs.", output_coins.len());
        let mut transcript = transcript(params, b"Spark/spend");
        Self::append_public(
            &mut transcript,
            fee,
            &tags,
            roots,
            &output_coins,
            &serial_offsets,
            &value_offsets,
        );
        let output_blindings = nonces
            .iter()
            .map(hash::value_blinding)
            .collect::<Vec<_>>();
        let values = outputs.iter().map(|output| output.value).collect::<Vec<_>>();
        let range = RangeProof::prove(params, &mut transcript, &values, &output_blindings, rng)?;
        let balance_witness = value_blindings.iter().fold(Scalar::zero(), |sum, b| sum + b)
            - output_blindings
                .iter()
                .fold(Scalar::zero(), |sum, b| sum + b);
        let balance = SchnorrProof::prove(
            &mut transcript,
            &params.h,
            &[balance_statement(params, &value_offsets, &output_coins, fee)],
            &[balance_witness],
            rng,
        );
        let mut grootle = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.iter().enumerate() {
            let (serials, values) = &sets[i];
            grootle.push(GrootleProof::prove(
                params,
                &mut transcript,
                serials,
                values,
                &serial_offsets[i],
                &value_offsets[i],
                &GrootleWitness {
                    index: input.index,
                    s: serial_blindings[i],
                    v: hash::value_blinding(&input.k) - value_blindings[i],
                },
                rng,
            )?);
        }
        trace!("Built {} membership proofs.", grootle.len());
        let witnesses = inputs
            .iter()
            .zip(&serial_blindings)
            .map(|(input, blinding)| ChaumWitness {
                x: input.s,
                y: *spend_key.r(),
                z: -*blinding,
            })
            .collect::<Vec<_>>();
        let chaum = ChaumProof::prove(
            params,
            &mut transcript,
            &serial_offsets,
            &tags,
            &witnesses,
            rng,
        );
        Ok(Self {
            version: VERSION,
            fee,
            tags,
            roots: roots.to_vec(),
            outputs: output_coins,
            proof: SpendProof {
                serial_offsets,
                value_offsets,
                grootle,
                chaum,
                balance,
                range,
            },
        })
    }

    /// Returns the linking tags the caller checks against its spent set.
    #[inline]
    pub fn linking_tags(&self) -> &[Group] {
        &self.tags
    }

    /// Returns the transaction identifier.
    #[inline]
    pub fn id(&self) -> [u8; 32] {
        hash::record_id(b"Spark/spend-id", &self.to_vec())
    }

    /// Checks `self` against the anonymity sets in `cover_set`, returning the reason for the
    /// first failed check.
    #[inline]
    pub fn check<C>(&self, params: &Params, cover_set: &C) -> Result<(), Error>
    where
        C: CoverSet + ?Sized,
    {
        if self.version != VERSION {
            return Err(ValidationError::Version(self.version).into());
        }
        let inputs = self.tags.len();
        if inputs == 0 {
            return Err(ValidationError::NoInputs.into());
        }
        if inputs > params.max_inputs() {
            return Err(ValidationError::TooManyInputs.into());
        }
        if self.roots.len() != inputs {
            return Err(ValidationError::RootCount.into());
        }
        if self.outputs.len() > params.max_outputs() {
            return Err(ValidationError::TooManyOutputs.into());
        }
        if !self.proof.has_shape(params, inputs, self.outputs.len()) {
            return Err(ValidationError::ProofShape.into());
        }
        check_tags(&self.tags)?;
        let context = serial_context(&self.tags);
        for coin in &self.outputs {
            if coin.coin_type != CoinType::Spend {
                return Err(ValidationError::CoinType.into());
            }
            if coin.serial_context != context {
                return Err(ValidationError::SerialContext.into());
            }
        }
        let proof = &self.proof;
        let mut transcript = transcript(params, b"Spark/spend");
        Self::append_public(
            &mut transcript,
            self.fee,
            &self.tags,
            &self.roots,
            &self.outputs,
            &proof.serial_offsets,
            &proof.value_offsets,
        );
        let output_commitments = self
            .outputs
            .iter()
            .map(|coin| coin.value_commitment)
            .collect::<Vec<_>>();
        if !proof.range.verify(params, &mut transcript, &output_commitments) {
            return Err(Error::Range);
        }
        if !proof.balance.verify(
            &mut transcript,
            &params.h,
            &[balance_statement(params, &proof.value_offsets, &self.outputs, self.fee)],
        ) {
            return Err(ProofError::Balance.into());
        }
        for (i, root) in self.roots.iter().enumerate() {
            let (serials, values) = commitments(resolve(params, cover_set, root)?);
            if !proof.grootle[i].verify(
                params,
                &mut transcript,
                &serials,
                &values,
                &proof.serial_offsets[i],
                &proof.value_offsets[i],
            ) {
                return Err(ProofError::Membership.into());
            }
        }
        if !proof
            .chaum
            .verify(params, &mut transcript, &proof.serial_offsets, &self.tags)
        {
            return Err(ProofError::Ownership.into());
        }
        Ok(())
    }

    /// Verifies `self` against the anonymity sets in `cover_set`.
    ///
    /// Does not consult any spent set: the caller rejects transactions whose
    /// [`linking_tags`](Self::linking_tags) it has seen before.
    #[inline]
    pub fn verify<C>(&self, params: &Params, cover_set: &C) -> bool
    where
        C: CoverSet + ?Sized,
    {
        match self.check(params, cover_set) {
            Ok(()) => true,
            Err(err) => {
                debug!("Rejected spend transaction: {}", err);
                false
            }
        }
    }

    /// Decodes and verifies an untrusted serialized transaction.
    #[inline]
    pub fn verify_bytes<C>(params: &Params, bytes: &[u8], cover_set: &C) -> bool
    where
        C: CoverSet + ?Sized,
    {
        match Self::from_bytes(bytes, params) {
            Ok(transaction) => transaction.verify(params, cover_set),
            Err(err) => {
                debug!("Rejected malformed spend transaction: {}", err);
                false
            }
        }
    }
}

impl Encode for SpendTransaction {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        scale_encode(&self.version, writer);
        scale_encode(&self.fee, writer);
        write_points(&self.tags, writer);
        write_length(writer, self.roots.len());
        for root in &self.roots {
            scale_encode(root, writer);
        }
        encode_sequence(&self.outputs, writer);
        self.proof.encode(writer)
    }
}

impl Decode for SpendTransaction {
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
        let fee = scale_decode::<u64, _>(reader)?;
        let inputs = read_length(reader, params.max_inputs())?;
        let tags = (0..inputs)
            .map(|_| read_point::<Group, _>(reader))
            .collect::<Result<Vec<_>, _>>()?;
        if read_length(reader, inputs)? != inputs {
            return Err(DecodeError::InvalidField("set root count"));
        }
        let roots = (0..inputs)
            .map(|_| scale_decode::<SetRoot, _>(reader))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs: Vec<Coin> = decode_sequence(reader, params.max_outputs(), params)?;
        let proof = SpendProof::decode_shaped(reader, params, inputs, outputs.len())?;
        Ok(Self {
            version,
            fee,
            tags,
            roots,
            outputs,
            proof,
        })
    }
}
