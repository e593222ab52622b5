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

//! Hash Functions
//!
//! Domain-separated BLAKE2b-512 hashing into bytes, symmetric keys, scalars and group elements.
//! Every input is absorbed with a length prefix so that adjacent inputs cannot be re-split.

use crate::arkworks::{point_to_bytes, scalar_to_bytes, AffineCurve, PrimeField, ProjectiveCurve, Zero};
use blake2::{Blake2b512, Digest};

/// Hash Output Size
pub const OUTPUT_SIZE: usize = 64;

/// Absorbs `bytes` into `state` behind a `u64` length prefix.
#[inline]
pub(crate) fn absorb(state: &mut Blake2b512, bytes: &[u8]) {
    state.update((bytes.len() as u64).to_le_bytes());
    state.update(bytes);
}

/// Domain-Separated Hasher
#[derive(Clone, Debug)]
pub struct Hasher {
    /// Hash State
    state: Blake2b512,
}

impl Hasher {
    /// Builds a new [`Hasher`] for the given `domain` separation label.
    #[inline]
    pub fn new(domain: &[u8]) -> Self {
        let mut state = Blake2b512::new();
        absorb(&mut state, b"spark-hash-v1");
        absorb(&mut state, domain);
        Self { state }
    }

    /// Absorbs `bytes`.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        absorb(&mut self.state, bytes);
        self
    }

    /// Absorbs `value` as eight little-endian bytes.
    #[inline]
    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.update(&value.to_le_bytes())
    }

    /// Absorbs the canonical encoding of `point`.
    #[inline]
    pub fn update_point<C>(&mut self, point: &C) -> &mut Self
    where
        C: ProjectiveCurve,
    {
        self.update(&point_to_bytes(point))
    }

    /// Absorbs the canonical encoding of `scalar`.
    #[inline]
    pub fn update_scalar<F>(&mut self, scalar: &F) -> &mut Self
    where
        F: PrimeField,
    {
        self.update(&scalar_to_bytes(scalar))
    }

    /// Returns the full digest.
    #[inline]
    pub fn finalize(&self) -> [u8; OUTPUT_SIZE] {
        let mut output = [0; OUTPUT_SIZE];
        output.copy_from_slice(&self.state.clone().finalize());
        output
    }

    /// Returns a 32-byte symmetric key.
    #[inline]
    pub fn finalize_key(&self) -> [u8; 32] {
        let mut key = [0; 32];
        key.copy_from_slice(&self.finalize()[..32]);
        key
    }

    /// Returns a scalar by wide reduction of the digest.
    #[inline]
    pub fn finalize_scalar<F>(&self) -> F
    where
        F: PrimeField,
    {
        F::from_le_bytes_mod_order(&self.finalize())
    }

    /// Returns a group element of the prime-order subgroup with unknown discrete logarithm
    /// relative to any other output of this function.
    ///
    /// Uses try-and-increment: candidate `x`-coordinates are drawn from the digest extended by a
    /// counter until one lands on the curve, then the cofactor is cleared. The identity is never
    /// returned.
    #[inline]
    pub fn finalize_group<C>(&self) -> C
    where
        C: ProjectiveCurve,
    {
        let mut counter = 0u64;
        loop {
            let mut attempt = self.state.clone();
            absorb(&mut attempt, b"try-and-increment");
            absorb(&mut attempt, &counter.to_le_bytes());
            let digest = attempt.finalize();
            if let Some(point) = C::Affine::from_random_bytes(&digest[..32]) {
                let point = point.mul_by_cofactor_to_projective();
                if !point.is_zero() {
                    return point;
                }
            }
            counter += 1;
        }
    }
}
