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

//! Bulletproof Range Proofs
//!
//! Aggregated logarithmic-size proof that every committed value `V_j = G * v_j + H * gamma_j`
//! lies in `[0, 2^value_bits)`. The number of aggregated commitments is padded to a power of two
//! with commitments to zero under zero blinding, which are the identity and therefore never need
//! to be transmitted.

use crate::{
    config::{Group, Scalar},
    error::ValidationError,
    params::Params,
};
use alloc::{vec, vec::Vec};
use spark_crypto::{
    arkworks::{
        inner_product, multi_scalar_mul, powers, read_point, read_points, read_scalar,
        scalar_mul, write_point, write_points, write_scalar, Field, One, Zero,
    },
    rand::{CryptoRng, Rand, RngCore},
    transcript::Transcript,
    CommitmentScheme,
};
use spark_util::codec::{Decode, DecodeError, Encode, Input, Output};

/// Returns the padded aggregation size for `count` commitments.
#[inline]
pub fn aggregation_size(count: usize) -> usize {
    count.max(1).next_power_of_two()
}

/// Returns the total number of bits proven for `count` commitments.
#[inline]
fn bit_length(params: &Params, count: usize) -> usize {
    params.value_bits() * aggregation_size(count)
}

/// Returns the number of inner product rounds for `count` commitments.
#[inline]
pub fn rounds(params: &Params, count: usize) -> usize {
    bit_length(params, count).trailing_zeros() as usize
}

/// Returns `x^{-1}` for a transcript challenge.
#[inline]
fn invert(x: &Scalar) -> Scalar {
    x.inverse()
        .expect("Transcript challenges are non-zero and therefore invertible.")
}

/// Returns the vector `z^{2 + j} * 2^i` at position `j * bits + i`.
#[inline]
fn z_powers_of_two(z: Scalar, bits: usize, count: usize) -> Vec<Scalar> {
    let two_powers = powers(Scalar::from(2u64), bits);
    let mut weight = z * z;
    let mut vector = Vec::with_capacity(bits * count);
    for _ in 0..count {
        vector.extend(two_powers.iter().map(|p| weight * p));
        weight *= z;
    }
    vector
}

/// Folds two halves of a point vector.
#[inline]
fn fold_points(lo: &[Group], hi: &[Group], lo_scalar: &Scalar, hi_scalar: &Scalar) -> Vec<Group> {
    lo.iter()
        .zip(hi)
        .map(|(l, h)| scalar_mul(l, lo_scalar) + scalar_mul(h, hi_scalar))
        .collect()
}

/// Folds two halves of a scalar vector.
#[inline]
fn fold_scalars(lo: &[Scalar], hi: &[Scalar], lo_scalar: &Scalar, hi_scalar: &Scalar) -> Vec<Scalar> {
    lo.iter()
        .zip(hi)
        .map(|(l, h)| *l * lo_scalar + *h * hi_scalar)
        .collect()
}

/// Range Proof
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeProof {
    /// Bit Vector Commitment
    pub a: Group,

    /// Blinding Vector Commitment
    pub s: Group,

    /// Linear Coefficient Commitment
    pub t1: Group,

    /// Quadratic Coefficient Commitment
    pub t2: Group,

    /// Polynomial Evaluation Blinding
    pub tau_x: Scalar,

    /// Vector Commitment Blinding
    pub mu: Scalar,

    /// Polynomial Evaluation
    pub t_hat: Scalar,

    /// Inner Product Left Commitments
    pub l: Vec<Group>,

    /// Inner Product Right Commitments
    pub r: Vec<Group>,

    /// Final Left Scalar
    pub a_final: Scalar,

    /// Final Right Scalar
    pub b_final: Scalar,
}

impl RangeProof {
    /// Proves that every value in `values` is in range, where `values[j]` is committed with
    /// blinding `blindings[j]`.
    ///
    /// # Panics
    ///
    /// There must be one blinding per value.
    #[inline]
    pub fn prove<R>(
        params: &Params,
        transcript: &mut Transcript,
        values: &[u64],
        blindings: &[Scalar],
        rng: &mut R,
    ) -> Result<Self, ValidationError>
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        assert_eq!(
            values.len(),
            blindings.len(),
            "Every range proof value needs a blinding."
        );
        if values.len() > params.max_outputs() {
            return Err(ValidationError::TooManyOutputs);
        }
        if !values.iter().all(|v| params.value_in_range(*v)) {
            return Err(ValidationError::ValueOutOfRange);
        }
        let bits = params.value_bits();
        let count = aggregation_size(values.len());
        let total = bits * count;
        let scheme = params.value_commitment();
        let commitments = values
            .iter()
            .zip(blindings)
            .map(|(v, gamma)| scheme.commit(&Scalar::from(*v), gamma))
            .collect::<Vec<_>>();
        transcript.append_points(b"range-V", &commitments);
        let g = &params.range_g[..total];
        let h = &params.range_h[..total];
        let mut a_l = Vec::with_capacity(total);
        for j in 0..count {
            let value = values.get(j).copied().unwrap_or_default();
            for i in 0..bits {
                a_l.push(if (value >> i) & 1 == 1 {
                    Scalar::one()
                } else {
                    Scalar::zero()
                });
            }
        }
        let a_r = a_l.iter().map(|a| *a - Scalar::one()).collect::<Vec<_>>();
        let s_l = (0..total).map(|_| rng.gen_scalar()).collect::<Vec<Scalar>>();
        let s_r = (0..total).map(|_| rng.gen_scalar()).collect::<Vec<Scalar>>();
        let alpha = rng.gen_scalar::<Scalar>();
        let rho = rng.gen_scalar::<Scalar>();
        let a = scalar_mul(&params.h, &alpha) + multi_scalar_mul(g, &a_l) + multi_scalar_mul(h, &a_r);
        let s = scalar_mul(&params.h, &rho) + multi_scalar_mul(g, &s_l) + multi_scalar_mul(h, &s_r);
        transcript.append_point(b"range-A", &a);
        transcript.append_point(b"range-S", &s);
        let y = transcript.challenge_scalar::<Scalar>(b"range-y");
        let z = transcript.challenge_scalar::<Scalar>(b"range-z");
        let y_powers = powers(y, total);
        let z_two = z_powers_of_two(z, bits, count);
        let l0 = a_l.iter().map(|a| *a - z).collect::<Vec<_>>();
        let r0 = (0..total)
            .map(|i| y_powers[i] * (a_r[i] + z) + z_two[i])
            .collect::<Vec<_>>();
        let r1 = (0..total).map(|i| y_powers[i] * s_r[i]).collect::<Vec<_>>();
        let t1 = inner_product(&l0, &r1) + inner_product(&s_l, &r0);
        let t2 = inner_product(&s_l, &r1);
        let tau1 = rng.gen_scalar::<Scalar>();
        let tau2 = rng.gen_scalar::<Scalar>();
        let t1_commitment = scheme.commit(&t1, &tau1);
        let t2_commitment = scheme.commit(&t2, &tau2);
        transcript.append_point(b"range-T1", &t1_commitment);
        transcript.append_point(b"range-T2", &t2_commitment);
        let x = transcript.challenge_scalar::<Scalar>(b"range-x");
        let mut z_weight = z * z;
        let mut tau_x = tau2 * x * x + tau1 * x;
        for gamma in blindings {
            tau_x += z_weight * gamma;
            z_weight *= z;
        }
        let mu = alpha + rho * x;
        let mut l_vector = (0..total).map(|i| l0[i] + s_l[i] * x).collect::<Vec<_>>();
        let mut r_vector = (0..total).map(|i| r0[i] + r1[i] * x).collect::<Vec<_>>();
        let t_hat = inner_product(&l_vector, &r_vector);
        transcript.append_scalar(b"range-tau", &tau_x);
        transcript.append_scalar(b"range-mu", &mu);
        transcript.append_scalar(b"range-t", &t_hat);
        let w = transcript.challenge_scalar::<Scalar>(b"range-w");
        let q = scalar_mul(&params.range_u, &w);
        let mut g_vector = g.to_vec();
        let y_inverse = invert(&y);
        let mut h_vector = h
            .iter()
            .zip(powers(y_inverse, total))
            .map(|(h, y)| scalar_mul(h, &y))
            .collect::<Vec<_>>();
        let mut l_commitments = Vec::new();
        let mut r_commitments = Vec::new();
        while l_vector.len() > 1 {
            let half = l_vector.len() / 2;
            let (a_lo, a_hi) = l_vector.split_at(half);
            let (b_lo, b_hi) = r_vector.split_at(half);
            let (g_lo, g_hi) = g_vector.split_at(half);
            let (h_lo, h_hi) = h_vector.split_at(half);
            let c_l = inner_product(a_lo, b_hi);
            let c_r = inner_product(a_hi, b_lo);
            let l = multi_scalar_mul(g_hi, a_lo) + multi_scalar_mul(h_lo, b_hi) + scalar_mul(&q, &c_l);
            let r = multi_scalar_mul(g_lo, a_hi) + multi_scalar_mul(h_hi, b_lo) + scalar_mul(&q, &c_r);
            transcript.append_point(b"range-L", &l);
            transcript.append_point(b"range-R", &r);
            let u = transcript.challenge_scalar::<Scalar>(b"range-u");
            let u_inverse = invert(&u);
            let next_a = fold_scalars(a_lo, a_hi, &u, &u_inverse);
            let next_b = fold_scalars(b_lo, b_hi, &u_inverse, &u);
            let next_g = fold_points(g_lo, g_hi, &u_inverse, &u);
            let next_h = fold_points(h_lo, h_hi, &u, &u_inverse);
            l_vector = next_a;
            r_vector = next_b;
            g_vector = next_g;
            h_vector = next_h;
            l_commitments.push(l);
            r_commitments.push(r);
        }
        Ok(Self {
            a,
            s,
            t1: t1_commitment,
            t2: t2_commitment,
            tau_x,
            mu,
            t_hat,
            l: l_commitments,
            r: r_commitments,
            a_final: l_vector[0],
            b_final: r_vector[0],
        })
    }

    /// Verifies `self` against the value `commitments`.
    #[inline]
    pub fn verify(&self, params: &Params, transcript: &mut Transcript, commitments: &[Group]) -> bool {
        if commitments.len() > params.max_outputs() {
            return false;
        }
        let bits = params.value_bits();
        let count = aggregation_size(commitments.len());
        let total = bits * count;
        let rounds = rounds(params, commitments.len());
        if self.l.len() != rounds || self.r.len() != rounds {
            return false;
        }
        transcript.append_points(b"range-V", commitments);
        transcript.append_point(b"range-A", &self.a);
        transcript.append_point(b"range-S", &self.s);
        let y = transcript.challenge_scalar::<Scalar>(b"range-y");
        let z = transcript.challenge_scalar::<Scalar>(b"range-z");
        transcript.append_point(b"range-T1", &self.t1);
        transcript.append_point(b"range-T2", &self.t2);
        let x = transcript.challenge_scalar::<Scalar>(b"range-x");
        transcript.append_scalar(b"range-tau", &self.tau_x);
        transcript.append_scalar(b"range-mu", &self.mu);
        transcript.append_scalar(b"range-t", &self.t_hat);
        let w = transcript.challenge_scalar::<Scalar>(b"range-w");
        let mut challenges = Vec::with_capacity(rounds);
        for (l, r) in self.l.iter().zip(&self.r) {
            transcript.append_point(b"range-L", l);
            transcript.append_point(b"range-R", r);
            let u = transcript.challenge_scalar::<Scalar>(b"range-u");
            challenges.push((u, invert(&u)));
        }
        let y_powers = powers(y, total);
        let z_squared = z * z;
        let sum_y = y_powers.iter().fold(Scalar::zero(), |sum, y| sum + y);
        let sum_two = powers(Scalar::from(2u64), bits)
            .iter()
            .fold(Scalar::zero(), |sum, p| sum + p);
        let mut delta = (z - z_squared) * sum_y;
        let mut z_weight = z_squared * z;
        for _ in 0..count {
            delta -= z_weight * sum_two;
            z_weight *= z;
        }
        let mut z_weights = powers(z, commitments.len() + 2);
        z_weights.drain(..2);
        let scheme = params.value_commitment();
        if scheme.commit(&self.t_hat, &self.tau_x)
            != multi_scalar_mul(commitments, &z_weights)
                + scalar_mul(&params.g, &delta)
                + scalar_mul(&self.t1, &x)
                + scalar_mul(&self.t2, &(x * x))
        {
            return false;
        }
        let mut s = vec![Scalar::one(); total];
        let mut s_inverse = vec![Scalar::one(); total];
        for (j, (u, u_inverse)) in challenges.iter().enumerate() {
            let bit = rounds - 1 - j;
            for i in 0..total {
                if (i >> bit) & 1 == 1 {
                    s[i] *= u;
                    s_inverse[i] *= u_inverse;
                } else {
                    s[i] *= u_inverse;
                    s_inverse[i] *= u;
                }
            }
        }
        let z_two = z_powers_of_two(z, bits, count);
        let y_inverse_powers = powers(invert(&y), total);
        let mut points = Vec::with_capacity(2 * total + 2 * rounds + 4);
        let mut scalars = Vec::with_capacity(2 * total + 2 * rounds + 4);
        for i in 0..total {
            points.push(params.range_g[i]);
            scalars.push(-z - self.a_final * s[i]);
            points.push(params.range_h[i]);
            scalars.push(
                (z * y_powers[i] + z_two[i] - self.b_final * s_inverse[i]) * y_inverse_powers[i],
            );
        }
        for ((l, r), (u, u_inverse)) in self.l.iter().zip(&self.r).zip(&challenges) {
            points.push(*l);
            scalars.push(u.square());
            points.push(*r);
            scalars.push(u_inverse.square());
        }
        points.extend([self.a, self.s, params.h, params.range_u]);
        scalars.extend([
            Scalar::one(),
            x,
            -self.mu,
            w * (self.t_hat - self.a_final * self.b_final),
        ]);
        multi_scalar_mul(&points, &scalars).is_zero()
    }
}

impl Encode for RangeProof {
    #[inline]
    fn encode<O>(&self, writer: &mut O)
    where
        O: Output + ?Sized,
    {
        write_point(&self.a, writer);
        write_point(&self.s, writer);
        write_point(&self.t1, writer);
        write_point(&self.t2, writer);
        write_scalar(&self.tau_x, writer);
        write_scalar(&self.mu, writer);
        write_scalar(&self.t_hat, writer);
        write_points(&self.l, writer);
        write_points(&self.r, writer);
        write_scalar(&self.a_final, writer);
        write_scalar(&self.b_final, writer)
    }
}

impl Decode for RangeProof {
    /// Number of Inner Product Rounds
    type Context = usize;

    #[inline]
    fn decode<I>(reader: &mut I, rounds: &Self::Context) -> Result<Self, DecodeError>
    where
        I: Input,
    {
        Ok(Self {
            a: read_point(reader)?,
            s: read_point(reader)?,
            t1: read_point(reader)?,
            t2: read_point(reader)?,
            tau_x: read_scalar(reader)?,
            mu: read_scalar(reader)?,
            t_hat: read_scalar(reader)?,
            l: read_points(reader, *rounds)?,
            r: read_points(reader, *rounds)?,
            a_final: read_scalar(reader)?,
            b_final: read_scalar(reader)?,
        })
    }
}
