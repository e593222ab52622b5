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

//! Fiat-Shamir Transcripts
//!
//! A running BLAKE2b-512 state accumulates labelled, length-prefixed messages. Challenges are
//! derived from a clone of the state and then absorbed back, so every later challenge depends on
//! every earlier one.

use crate::{
    arkworks::{point_to_bytes, scalar_to_bytes, PrimeField, ProjectiveCurve, Zero},
    hash::absorb,
};
use blake2::{Blake2b512, Digest};

/// Fiat-Shamir Transcript
#[derive(Clone, Debug)]
pub struct Transcript {
    /// Running Hash State
    state: Blake2b512,
}

impl Transcript {
    /// Builds a new [`Transcript`] bound to the `domain` separation label.
    #[inline]
    pub fn new(domain: &[u8]) -> Self {
        let mut state = Blake2b512::new();
        absorb(&mut state, b"spark-transcript-v1");
        absorb(&mut state, domain);
        Self { state }
    }

    /// Appends a labelled `message`.
    #[inline]
    pub fn append_message(&mut self, label: &[u8], message: &[u8]) {
        absorb(&mut self.state, label);
        absorb(&mut self.state, message);
    }

    /// Appends a labelled `u64`.
    #[inline]
    pub fn append_u64(&mut self, label: &[u8], value: u64) {
        self.append_message(label, &value.to_le_bytes());
    }

    /// Appends a labelled group element.
    #[inline]
    pub fn append_point<C>(&mut self, label: &[u8], point: &C)
    where
        C: ProjectiveCurve,
    {
        self.append_message(label, &point_to_bytes(point));
    }

    /// Appends a labelled sequence of group elements.
    #[inline]
    pub fn append_points<C>(&mut self, label: &[u8], points: &[C])
    where
        C: ProjectiveCurve,
    {
        self.append_u64(label, points.len() as u64);
        for point in points {
            self.append_point(label, point);
        }
    }

    /// Appends a labelled scalar.
    #[inline]
    pub fn append_scalar<F>(&mut self, label: &[u8], scalar: &F)
    where
        F: PrimeField,
    {
        self.append_message(label, &scalar_to_bytes(scalar));
    }

    /// Derives a non-zero challenge scalar and absorbs it into the transcript.
    #[inline]
    pub fn challenge_scalar<F>(&mut self, label: &[u8]) -> F
    where
        F: PrimeField,
    {
        let mut counter = 0u64;
        loop {
            let mut state = self.state.clone();
            absorb(&mut state, b"challenge");
            absorb(&mut state, label);
            absorb(&mut state, &counter.to_le_bytes());
            let digest = state.finalize();
            let challenge = F::from_le_bytes_mod_order(&digest);
            if !challenge.is_zero() {
                absorb(&mut self.state, b"challenge-output");
                absorb(&mut self.state, &digest);
                return challenge;
            }
            counter += 1;
        }
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use crate::arkworks::ed_on_bls12_381::Fr;

    /// Checks that identical transcripts agree and diverging messages change the challenge.
    #[test]
    fn challenges_depend_on_every_message() {
        let mut lhs = Transcript::new(b"test");
        let mut rhs = Transcript::new(b"test");
        lhs.append_message(b"m", b"hello");
        rhs.append_message(b"m", b"hello");
        assert_eq!(lhs.challenge_scalar::<Fr>(b"c"), rhs.challenge_scalar::<Fr>(b"c"));
        lhs.append_u64(b"n", 1);
        rhs.append_u64(b"n", 2);
        assert_ne!(lhs.challenge_scalar::<Fr>(b"c"), rhs.challenge_scalar::<Fr>(b"c"));
    }

    /// Checks that consecutive challenges under the same label differ.
    #[test]
    fn consecutive_challenges_differ() {
        let mut transcript = Transcript::new(b"test");
        let first = transcript.challenge_scalar::<Fr>(b"c");
        let second = transcript.challenge_scalar::<Fr>(b"c");
        assert_ne!(first, second);
    }
}
