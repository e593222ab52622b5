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

//! Grootle Membership Proofs
//!
//! One-of-many proof over an anonymity set of `N = n^m` coins. The prover shows that for some
//! secret index `l`, both `S[l] - S1` and `V[l] - V1` are multiples of the blinding generator
//! `H`, with known discrete logarithms, without revealing `l`. The index is committed digit by
//! digit in base `n`, so the proof holds `m(n - 1)` scalar responses and `2m` polynomial
//! coefficient commitments.

use crate::{
    config::{Group, Scalar},
    error::ValidationError,
    params::Params,
};
use alloc::{vec, vec::Vec};
use spark_crypto::{
    arkworks::{
        multi_scalar_mul, powers, read_point, read_points, read_scalar, read_scalars, scalar_mul,
        write_point, write_points, write_scalar, write_scalars, One, Zero,
    },
    rand::{CryptoRng, Rand, RngCore},
    transcript::Transcript,
    CommitmentScheme,
};
use spark_util::{
    codec::{Decode, DecodeError, Encode, Input, Output},
    num::base_digits,
};

/// Pads `set` to exactly `size` elements by repeating its last element.
///
/// Returns `None` if `set` is empty or larger than `size`.
#[inline]
pub fn pad_set<T>(set: &[T], size: usize) -> Option<Vec<T>>
where
    T: Clone,
{
    let last = set.last()?;
    if set.len() > size {
        return None;
    }
    let mut padded = Vec::with_capacity(size);
    padded.extend_from_slice(set);
    padded.resize(size, last.clone());
    Some(padded)
}

/// Returns the base-`n` digits of `index`, least significant first.
///
/// Callers only pass indices into a padded set, so `index < n^m` always holds.
#[inline]
fn digits(index: usize, n: usize, m: usize) -> Vec<usize> {
    let mut digits = vec![0; m];
    let fits = base_digits(index, n, &mut digits);
    debug_assert!(fits, "Index {} does not fit into {} base-{} digits.", index, m, n);
    digits
}

/// Grootle Witness
#[derive(derivative::Derivative)]
#[derivative(Clone, Copy, Debug)]
pub struct GrootleWitness {
    /// Index of the Spent Coin in the Anonymity Set
    pub index: usize,

    /// Discrete Logarithm of `S[index] - S1`
    #[derivative(Debug = "ignore")]
    pub s: Scalar,

    /// Discrete Logarithm of `V[index] - V1`
    #[derivative(Debug = "ignore")]
    pub v: Scalar,
}

/// Grootle Proof
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrootleProof {
    /// Nonce Matrix Commitment
    pub a: Group,

    /// Index Matrix Commitment
    pub b: Group,

    /// Cross Term Commitment
    pub c: Group,

    /// Square Term Commitment
    pub d: Group,

    /// Serial Polynomial Coefficient Commitments
    pub x_s: Vec<Group>,

    /// Value Polynomial Coefficient Commitments
    pub x_v: Vec<Group>,

    /// Matrix Responses Without the First Column
    pub f: Vec<Scalar>,

    /// Response for `A` and `B`
    pub z_a: Scalar,

    /// Response for `C` and `D`
    pub z_c: Scalar,

    /// Serial Response
    pub z_s: Scalar,

    /// Value Response
    pub z_v: Scalar,
}

impl GrootleProof {
    /// Appends the statement and first-round commitments to `transcript`.
    #[inline]
    fn append(&self, transcript: &mut Transcript, s1: &Group, v1: &Group) {
        transcript.append_point(b"grootle-S1", s1);
        transcript.append_point(b"grootle-V1", v1);
        transcript.append_point(b"grootle-A", &self.a);
        transcript.append_point(b"grootle-B", &self.b);
        transcript.append_point(b"grootle-C", &self.c);
        transcript.append_point(b"grootle-D", &self.d);
        transcript.append_points(b"grootle-X", &self.x_s);
        transcript.append_points(b"grootle-X1", &self.x_v);
    }

    /// Proves that `(serials[l] - s1, values[l] - v1)` open to `(H * s, H * v)` for the
    /// witness index `l`.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn prove<R>(
        params: &Params,
        transcript: &mut Transcript,
        serials: &[Group],
        values: &[Group],
        s1: &Group,
        v1: &Group,
        witness: &GrootleWitness,
        rng: &mut R,
    ) -> Result<Self, ValidationError>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let (n, m, size) = (params.n(), params.m(), params.set_size());
        if serials.len() != values.len() {
            return Err(ValidationError::CoverSet);
        }
        if witness.index >= serials.len() {
            return Err(ValidationError::InputIndex);
        }
        let serials = pad_set(serials, size).ok_or(ValidationError::CoverSet)?;
        let values = pad_set(values, size).ok_or(ValidationError::CoverSet)?;
        let commitment = params.grootle_commitment();
        let index_digits = digits(witness.index, n, m);
        let mut sigma = vec![Scalar::zero(); n * m];
        let mut a = vec![Scalar::zero(); n * m];
        for j in 0..m {
            sigma[j * n + index_digits[j]] = Scalar::one();
            let mut first = Scalar::zero();
            for i in 1..n {
                let nonce = rng.gen_scalar::<Scalar>();
                first -= nonce;
                a[j * n + i] = nonce;
            }
            a[j * n] = first;
        }
        let two = Scalar::from(2u64);
        let cross = a
            .iter()
            .zip(&sigma)
            .map(|(a, sigma)| *a * (Scalar::one() - two * sigma))
            .collect::<Vec<_>>();
        let square = a.iter().map(|a| -(*a * a)).collect::<Vec<_>>();
        let (r_a, r_b, r_c, r_d) = (
            rng.gen_scalar::<Scalar>(),
            rng.gen_scalar::<Scalar>(),
            rng.gen_scalar::<Scalar>(),
            rng.gen_scalar::<Scalar>(),
        );
        let mut coefficients = vec![vec![Scalar::zero(); size]; m + 1];
        for k in 0..size {
            let mut polynomial = vec![Scalar::one()];
            for (j, digit) in digits(k, n, m).into_iter().enumerate() {
                let (constant, linear) = (a[j * n + digit], sigma[j * n + digit]);
                let mut next = vec![Scalar::zero(); polynomial.len() + 1];
                for (t, coefficient) in polynomial.iter().enumerate() {
                    next[t] += *coefficient * constant;
                    next[t + 1] += *coefficient * linear;
                }
                polynomial = next;
            }
            for (t, coefficient) in polynomial.into_iter().enumerate() {
                coefficients[t][k] = coefficient;
            }
        }
        let rho_s = (0..m).map(|_| rng.gen_scalar::<Scalar>()).collect::<Vec<_>>();
        let rho_v = (0..m).map(|_| rng.gen_scalar::<Scalar>()).collect::<Vec<_>>();
        let offset_commitments = |set: &[Group], offset: &Group, rho: &[Scalar]| {
            (0..m)
                .map(|t| {
                    let sum = coefficients[t].iter().fold(Scalar::zero(), |s, c| s + c);
                    multi_scalar_mul(set, &coefficients[t]) - scalar_mul(offset, &sum)
                        + scalar_mul(&params.h, &rho[t])
                })
                .collect::<Vec<_>>()
        };
        let mut proof = Self {
            a: commitment.commit(&a, &r_a),
            b: commitment.commit(&sigma, &r_b),
            c: commitment.commit(&cross, &r_c),
            d: commitment.commit(&square, &r_d),
            x_s: offset_commitments(&serials, s1, &rho_s),
            x_v: offset_commitments(&values, v1, &rho_v),
            f: Vec::with_capacity(m * (n - 1)),
            z_a: Scalar::zero(),
            z_c: Scalar::zero(),
            z_s: Scalar::zero(),
            z_v: Scalar::zero(),
        };
        proof.append(transcript, s1, v1);
        let x = transcript.challenge_scalar::<Scalar>(b"grootle-x");
        for j in 0..m {
            for i in 1..n {
                proof.f.push(sigma[j * n + i] * x + a[j * n + i]);
            }
        }
        let x_powers = powers(x, m + 1);
        let blinding = |rho: &[Scalar]| {
            rho.iter()
                .zip(&x_powers)
                .fold(Scalar::zero(), |sum, (r, p)| sum + *r * p)
        };
        proof.z_a = r_b * x + r_a;
        proof.z_c = r_c * x + r_d;
        proof.z_s = witness.s * x_powers[m] - blinding(&rho_s);
        proof.z_v = witness.v * x_powers[m] - blinding(&rho_v);
        Ok(proof)
    }

    /// Returns `true` if the vector lengths of `self` match the proof shape of `params`.
    #[inline]
    pub fn has_shape(&self, params: &Params) -> bool {
        let (n, m) = (params.n(), params.m());
        self.x_s.len() == m && self.x_v.len() == m && self.f.len() == m * (n - 1)
    }

    /// Verifies `self` against the anonymity set `(serials, values)` and offsets `(s1, v1)`.
    #[inline]
    pub fn verify(
        &self,
        params: &Params,
        transcript: &mut Transcript,
        serials: &[Group],
        values: &[Group],
        s1: &Group,
        v1: &Group,
    ) -> bool {
        let (n, m, size) = (params.n(), params.m(), params.set_size());
        if !self.has_shape(params) || serials.len() != values.len() {
            return false;
        }
        let (serials, values) = match (pad_set(serials, size), pad_set(values, size)) {
            (Some(serials), Some(values)) => (serials, values),
            _ => return false,
        };
        self.append(transcript, s1, v1);
        let x = transcript.challenge_scalar::<Scalar>(b"grootle-x");
        let mut f = Vec::with_capacity(n * m);
        for row in self.f.chunks(n - 1) {
            f.push(row.iter().fold(x, |first, f| first - f));
            f.extend_from_slice(row);
        }
        let commitment = params.grootle_commitment();
        if self.a + scalar_mul(&self.b, &x) != commitment.commit(&f, &self.z_a) {
            return false;
        }
        let cross = f.iter().map(|f| *f * (x - f)).collect::<Vec<_>>();
        if scalar_mul(&self.c, &x) + self.d != commitment.commit(&cross, &self.z_c) {
            return false;
        }
        let p = (0..size)
            .map(|k| {
                digits(k, n, m)
                    .into_iter()
                    .enumerate()
                    .fold(Scalar::one(), |p, (j, digit)| p * f[j * n + digit])
            })
            .collect::<Vec<_>>();
        let sum = p.iter().fold(Scalar::zero(), |s, p| s + p);
        let x_powers = powers(x, m);
        let check = |set: &[Group], offset: &Group, commitments: &[Group], z: &Scalar| {
            multi_scalar_mul(set, &p)
                - scalar_mul(offset, &sum)
                - multi_scalar_mul(commitments, &x_powers)
                == scalar_mul(&params.h, z)
        };
        check(&serials, s1, &self.x_s, &self.z_s) && check(&values, v1, &self.x_v, &self.z_v)
    }
}

impl Encode for GrootleProof {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_point(&self.a, writer);
        write_point(&self.b, writer);
        write_point(&self.c, writer);
        write_point(&self.d, writer);
        write_points(&self.x_s, writer);
        write_points(&self.x_v, writer);
        write_scalars(&self.f, writer);
        write_scalar(&self.z_a, writer);
        write_scalar(&self.z_c, writer);
        write_scalar(&self.z_s, writer);
        write_scalar(&self.z_v, writer)
    }
}

impl Decode for GrootleProof {
    type Context = Params;

    #[inline]
    fn decode<I>(reader: &mut I, params: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        let (n, m) = (params.n(), params.m());
        Ok(Self {
            a: read_point(reader)?,
            b: read_point(reader)?,
            c: read_point(reader)?,
            d: read_point(reader)?,
            x_s: read_points(reader, m)?,
            x_v: read_points(reader, m)?,
            f: read_scalars(reader, m * (n - 1))?,
            z_a: read_scalar(reader)?,
            z_c: read_scalar(reader)?,
            z_s: read_scalar(reader)?,
            z_v: read_scalar(reader)?,
        })
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use crate::params::Network;
    use spark_crypto::{arkworks::UniformRand, rand::OsRng};

    /// Random anonymity set with known openings at `index`.
    struct Statement {
        serials: Vec<Group>,
        values: Vec<Group>,
        s1: Group,
        v1: Group,
        witness: GrootleWitness,
    }

    impl Statement {
        /// Samples an anonymity set of `len` elements hiding a known opening at `index`.
        fn sample(params: &Params, len: usize, index: usize, rng: &mut OsRng) -> Self {
            let mut serials = (0..len).map(|_| Group::rand(rng)).collect::<Vec<_>>();
            let mut values = (0..len).map(|_| Group::rand(rng)).collect::<Vec<_>>();
            let witness = GrootleWitness {
                index,
                s: rng.gen_scalar(),
                v: rng.gen_scalar(),
            };
            let s1 = Group::rand(rng);
            let v1 = Group::rand(rng);
            serials[index] = s1 + scalar_mul(&params.h, &witness.s);
            values[index] = v1 + scalar_mul(&params.h, &witness.v);
            Self {
                serials,
                values,
                s1,
                v1,
                witness,
            }
        }

        /// Proves the statement.
        fn prove(&self, params: &Params, rng: &mut OsRng) -> GrootleProof {
            GrootleProof::prove(
                params,
                &mut Transcript::new(b"test"),
                &self.serials,
                &self.values,
                &self.s1,
                &self.v1,
                &self.witness,
                rng,
            )
            .expect("Proving a valid statement should succeed.")
        }

        /// Verifies `proof` against the statement.
        fn verify(&self, params: &Params, proof: &GrootleProof) -> bool {
            proof.verify(
                params,
                &mut Transcript::new(b"test"),
                &self.serials,
                &self.values,
                &self.s1,
                &self.v1,
            )
        }
    }

    /// Checks that honest proofs verify for every index of a full set.
    #[test]
    fn honest_proofs_verify() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        for index in [0, 5, 15] {
            let statement = Statement::sample(&params, params.set_size(), index, &mut rng);
            let proof = statement.prove(&params, &mut rng);
            assert!(statement.verify(&params, &proof), "Honest proofs must verify.");
            assert_eq!(GrootleProof::from_bytes(&proof.to_vec(), &params), Ok(proof));
        }
    }

    /// Checks that short sets are padded identically on both sides.
    #[test]
    fn short_sets_are_padded() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let statement = Statement::sample(&params, 5, 4, &mut rng);
        let proof = statement.prove(&params, &mut rng);
        assert!(statement.verify(&params, &proof));
        assert_eq!(pad_set(&[1, 2], 4), Some(vec![1, 2, 2, 2]));
        assert_eq!(pad_set::<u8>(&[], 4), None);
        assert_eq!(pad_set(&[1, 2, 3], 2), None);
    }

    /// Checks that proofs fail for a wrong opening or a modified set.
    #[test]
    fn invalid_proofs_fail() {
        let mut rng = OsRng;
        let params = Params::new(Network::Regtest);
        let mut statement = Statement::sample(&params, params.set_size(), 3, &mut rng);
        statement.witness.v += Scalar::one();
        let proof = statement.prove(&params, &mut rng);
        assert!(
            !statement.verify(&params, &proof),
            "Proofs with a wrong value opening must fail."
        );
        let mut statement = Statement::sample(&params, params.set_size(), 3, &mut rng);
        let proof = statement.prove(&params, &mut rng);
        statement.serials[3] += params.g;
        assert!(
            !statement.verify(&params, &proof),
            "Proofs must fail once the spent element changes."
        );
        let oversized = Statement::sample(&params, params.set_size() + 1, 0, &mut rng);
        assert_eq!(
            GrootleProof::prove(
                &params,
                &mut Transcript::new(b"test"),
                &oversized.serials,
                &oversized.values,
                &oversized.s1,
                &oversized.v1,
                &oversized.witness,
                &mut rng,
            ),
            Err(ValidationError::CoverSet)
        );
    }

    /// Checks the digit decomposition of set indices.
    #[test]
    fn index_digits_are_least_significant_first() {
        assert_eq!(digits(11, 4, 2), vec![3, 2]);
        assert_eq!(digits(15, 2, 4), vec![1, 1, 1, 1]);
    }

    /// Checks that an index outside of the padded set is caught in debug builds.
    #[cfg(debug_assertions)]
    #[should_panic]
    #[test]
    fn oversized_index_is_caught() {
        let _ = digits(16, 4, 2);
    }
}
