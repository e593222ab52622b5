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

//! Schnorr Proofs
//!
//! Aggregated proof of knowledge of discrete logarithms `y_i` of statements `Y_i = generator *
//! y_i` with respect to one generator.

use crate::config::{Group, Scalar};
use alloc::vec::Vec;
use spark_crypto::{
    arkworks::{multi_scalar_mul, read_point, read_scalar, scalar_mul, write_point, write_scalar},
    rand::{CryptoRng, Rand, RngCore},
    transcript::Transcript,
};
use spark_util::codec::{Decode, DecodeError, Encode, Input, Output};

/// Schnorr Proof
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchnorrProof {
    /// Nonce Commitment
    pub a: Group,

    /// Response
    pub t: Scalar,
}

/// Returns the statement weights `c, c^2, ..., c^k`.
#[inline]
fn weights(c: Scalar, k: usize) -> Vec<Scalar> {
    let mut weights = Vec::with_capacity(k);
    let mut next = c;
    for _ in 0..k {
        weights.push(next);
        next *= c;
    }
    weights
}

impl SchnorrProof {
    /// Proves knowledge of `witnesses` with `statements[i] = generator * witnesses[i]`.
    ///
    /// # Panics
    ///
    /// There must be one witness per statement.
    #[inline]
    pub fn prove<R>(
        transcript: &mut Transcript,
        generator: &Group,
        statements: &[Group],
        witnesses: &[Scalar],
        rng: &mut R,
    ) -> Self
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        assert_eq!(
            statements.len(),
            witnesses.len(),
            "Every Schnorr statement needs a witness."
        );
        let r = rng.gen_scalar::<Scalar>();
        let a = scalar_mul(generator, &r);
        transcript.append_points(b"schnorr-Y", statements);
        transcript.append_point(b"schnorr-A", &a);
        let c = transcript.challenge_scalar::<Scalar>(b"schnorr-c");
        let t = weights(c, witnesses.len())
            .iter()
            .zip(witnesses)
            .fold(r, |t, (w, y)| t + *w * y);
        Self { a, t }
    }

    /// Verifies `self` against `statements`.
    #[inline]
    pub fn verify(&self, transcript: &mut Transcript, generator: &Group, statements: &[Group]) -> bool {
        transcript.append_points(b"schnorr-Y", statements);
        transcript.append_point(b"schnorr-A", &self.a);
        let c = transcript.challenge_scalar::<Scalar>(b"schnorr-c");
        scalar_mul(generator, &self.t)
            == self.a + multi_scalar_mul(statements, &weights(c, statements.len()))
    }
}

impl Encode for SchnorrProof {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_point(&self.a, writer);
        write_scalar(&self.t, writer)
    }
}

impl Decode for SchnorrProof {
    type Context = ();

    #[inline]
    fn decode<I>(reader: &mut I, context: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let _ = context;
        Ok(Self {
            a: read_point(reader)?,
            t: read_scalar(reader)?,
        })
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use spark_crypto::{arkworks::UniformRand, rand::OsRng};

    /// Checks that honest aggregated proofs verify and false statements do not.
    #[test]
    fn aggregated_proofs() {
        let mut rng = OsRng;
        let generator = Group::rand(&mut rng);
        let witnesses = (0..3).map(|_| rng.gen_scalar::<Scalar>()).collect::<Vec<_>>();
        let mut statements = witnesses
            .iter()
            .map(|y| scalar_mul(&generator, y))
            .collect::<Vec<_>>();
        let proof = SchnorrProof::prove(
            &mut Transcript::new(b"test"),
            &generator,
            &statements,
            &witnesses,
            &mut rng,
        );
        assert!(proof.verify(&mut Transcript::new(b"test"), &generator, &statements));
        assert!(
            !proof.verify(&mut Transcript::new(b"other"), &generator, &statements),
            "Proofs must be bound to their transcript."
        );
        statements[1] += generator;
        assert!(
            !proof.verify(&mut Transcript::new(b"test"), &generator, &statements),
            "Proofs must not verify for a different statement."
        );
    }
}
