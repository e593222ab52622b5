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

//! Chaum Ownership Proofs
//!
//! For every input, proves knowledge of `(x, y, z)` with `S1 = F * x + G * y + H * z` and
//! `U = T * x + G * y`. The shared `x` and `y` bind the linking tag `T` to the serial commitment
//! offset `S1` used in the membership proof, and knowing `y` requires the spend key.

use crate::{
    config::{Group, Scalar},
    params::Params,
};
use alloc::vec::Vec;
use spark_crypto::{
    arkworks::{read_points, read_scalars, scalar_mul, write_points, write_scalars},
    rand::{CryptoRng, Rand, RngCore},
    transcript::Transcript,
};
use spark_util::codec::{Decode, DecodeError, Encode, Input, Output};

/// Chaum Witness
#[derive(derivative::Derivative)]
#[derivative(Clone, Copy, Debug)]
pub struct ChaumWitness {
    /// Serial Number
    #[derivative(Debug = "ignore")]
    pub x: Scalar,

    /// Spend Key Root Secret
    #[derivative(Debug = "ignore")]
    pub y: Scalar,

    /// Serial Commitment Offset Blinding
    #[derivative(Debug = "ignore")]
    pub z: Scalar,
}

/// Chaum Proof
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChaumProof {
    /// Serial Commitment Nonces
    pub a1: Vec<Group>,

    /// Linking Tag Nonces
    pub a2: Vec<Group>,

    /// Serial Number Responses
    pub t1: Vec<Scalar>,

    /// Spend Key Responses
    pub t2: Vec<Scalar>,

    /// Offset Blinding Responses
    pub t3: Vec<Scalar>,
}

/// Appends the statements and nonces of a Chaum proof to `transcript`.
#[inline]
fn append(transcript: &mut Transcript, offsets: &[Group], tags: &[Group], a1: &[Group], a2: &[Group]) {
    transcript.append_points(b"chaum-S1", offsets);
    transcript.append_points(b"chaum-T", tags);
    transcript.append_points(b"chaum-A1", a1);
    transcript.append_points(b"chaum-A2", a2);
}

impl ChaumProof {
    /// Proves ownership of every input with serial commitment offset `offsets[i]` and linking
    /// tag `tags[i]`.
    ///
    /// # Panics
    ///
    /// There must be one offset and one witness per tag.
    #[inline]
    pub fn prove<R>(
        params: &Params,
        transcript: &mut Transcript,
        offsets: &[Group],
        tags: &[Group],
        witnesses: &[ChaumWitness],
        rng: &mut R,
    ) -> Self
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        assert!(
            offsets.len() == tags.len() && witnesses.len() == tags.len(),
            "Every linking tag needs an offset and a witness."
        );
        let nonces = witnesses
            .iter()
            .map(|_| {
                (
                    rng.gen_scalar::<Scalar>(),
                    rng.gen_scalar::<Scalar>(),
                    rng.gen_scalar::<Scalar>(),
                )
            })
            .collect::<Vec<_>>();
        let mut a1 = Vec::with_capacity(tags.len());
        let mut a2 = Vec::with_capacity(tags.len());
        for ((r, s, t), tag) in nonces.iter().zip(tags) {
            let g_s = scalar_mul(&params.g, s);
            a1.push(scalar_mul(&params.f, r) + g_s + scalar_mul(&params.h, t));
            a2.push(scalar_mul(tag, r) + g_s);
        }
        append(transcript, offsets, tags, &a1, &a2);
        let c = transcript.challenge_scalar::<Scalar>(b"chaum-c");
        let mut t1 = Vec::with_capacity(tags.len());
        let mut t2 = Vec::with_capacity(tags.len());
        let mut t3 = Vec::with_capacity(tags.len());
        for ((r, s, t), witness) in nonces.iter().zip(witnesses) {
            t1.push(*r + c * witness.x);
            t2.push(*s + c * witness.y);
            t3.push(*t + c * witness.z);
        }
        Self { a1, a2, t1, t2, t3 }
    }

    /// Returns `true` if every vector of `self` has one entry per input for `inputs` inputs.
    #[inline]
    pub fn has_shape(&self, inputs: usize) -> bool {
        self.a1.len() == inputs
            && self.a2.len() == inputs
            && self.t1.len() == inputs
            && self.t2.len() == inputs
            && self.t3.len() == inputs
    }

    /// Verifies `self` against the serial commitment `offsets` and linking `tags`.
    #[inline]
    pub fn verify(
        &self,
        params: &Params,
        transcript: &mut Transcript,
        offsets: &[Group],
        tags: &[Group],
    ) -> bool {
        if offsets.len() != tags.len() || !self.has_shape(tags.len()) {
            return false;
        }
        append(transcript, offsets, tags, &self.a1, &self.a2);
        let c = transcript.challenge_scalar::<Scalar>(b"chaum-c");
        (0..tags.len()).all(|i| {
            let g_t2 = scalar_mul(&params.g, &self.t2[i]);
            scalar_mul(&params.f, &self.t1[i]) + g_t2 + scalar_mul(&params.h, &self.t3[i])
                == self.a1[i] + scalar_mul(&offsets[i], &c)
                && scalar_mul(&tags[i], &self.t1[i]) + g_t2
                    == self.a2[i] + scalar_mul(&params.u, &c)
        })
    }
}

impl Encode for ChaumProof {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_points(&self.a1, writer);
        write_points(&self.a2, writer);
        write_scalars(&self.t1, writer);
        write_scalars(&self.t2, writer);
        write_scalars(&self.t3, writer)
    }
}

impl Decode for ChaumProof {
    /// Number of Inputs
    type Context = usize;

    #[inline]
    fn decode<I>(reader: &mut I, inputs: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        Ok(Self {
            a1: read_points(reader, *inputs)?,
            a2: read_points(reader, *inputs)?,
            t1: read_scalars(reader, *inputs)?,
            t2: read_scalars(reader, *inputs)?,
            t3: read_scalars(reader, *inputs)?,
        })
    }
}
