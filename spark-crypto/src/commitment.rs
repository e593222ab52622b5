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

//! Commitment Schemes

use crate::arkworks::{multi_scalar_mul, scalar_mul, ProjectiveCurve, Scalar};
use alloc::vec::Vec;

/// Commitment Scheme
pub trait CommitmentScheme {
    /// Commitment Input Type
    type Input: ?Sized;

    /// Commitment Randomness Parameter Type
    type Randomness;

    /// Commitment Output Type
    type Output;

    /// Commits the `input` with the given `randomness` parameter.
    fn commit(&self, input: &Self::Input, randomness: &Self::Randomness) -> Self::Output;
}

/// Pedersen Commitment
///
/// Commits to a scalar `v` as `v * value + r * blinding`.
#[derive(derivative::Derivative)]
#[derivative(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PedersenCommitment<C>
where
    C: ProjectiveCurve,
{
    /// Value Generator
    pub value: C,

    /// Blinding Generator
    pub blinding: C,
}

impl<C> PedersenCommitment<C>
where
    C: ProjectiveCurve,
{
    /// Builds a new [`PedersenCommitment`] over the `value` and `blinding` generators.
    #[inline]
    pub fn new(value: C, blinding: C) -> Self {
        Self { value, blinding }
    }
}

impl<C> CommitmentScheme for PedersenCommitment<C>
where
    C: ProjectiveCurve,
{
    type Input = Scalar<C>;
    type Randomness = Scalar<C>;
    type Output = C;

    #[inline]
    fn commit(&self, input: &Self::Input, randomness: &Self::Randomness) -> Self::Output {
        scalar_mul(&self.value, input) + scalar_mul(&self.blinding, randomness)
    }
}

/// Vector Pedersen Commitment
///
/// Commits to a scalar vector `a` as `sum(a[i] * generators[i]) + r * blinding`. Inputs shorter
/// than the generator vector are committed against its prefix.
#[derive(derivative::Derivative)]
#[derivative(Clone, Debug, Eq, PartialEq)]
pub struct VectorCommitment<C>
where
    C: ProjectiveCurve,
{
    /// Vector Generators
    pub generators: Vec<C>,

    /// Blinding Generator
    pub blinding: C,
}

impl<C> VectorCommitment<C>
where
    C: ProjectiveCurve,
{
    /// Builds a new [`VectorCommitment`] over `generators` and the `blinding` generator.
    #[inline]
    pub fn new(generators: Vec<C>, blinding: C) -> Self {
        Self {
            generators,
            blinding,
        }
    }

    /// Returns the maximum input length.
    #[inline]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns `true` if this scheme has no vector generators.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl<C> CommitmentScheme for VectorCommitment<C>
where
    C: ProjectiveCurve,
{
    type Input = [Scalar<C>];
    type Randomness = Scalar<C>;
    type Output = C;

    /// # Panics
    ///
    /// Panics if `input` is longer than the generator vector.
    #[inline]
    fn commit(&self, input: &Self::Input, randomness: &Self::Randomness) -> Self::Output {
        assert!(
            input.len() <= self.generators.len(),
            "Input length must not exceed the number of generators."
        );
        multi_scalar_mul(&self.generators[..input.len()], input)
            + scalar_mul(&self.blinding, randomness)
    }
}
