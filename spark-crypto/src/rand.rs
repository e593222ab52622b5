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

//! Random Number Generators

use crate::arkworks::{PrimeField, Zero};

pub use rand_core::{CryptoRng, RngCore, SeedableRng};

#[cfg(feature = "getrandom")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "getrandom")))]
pub use rand_core::OsRng;

/// Standard Distribution
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Standard;

/// Sampling Trait
///
/// Implemented by secret key material which is drawn directly from a cryptographic RNG.
pub trait Sample<D = Standard>: Sized {
    /// Draws a value of type `Self` from `rng` under `distribution`.
    fn sample<R>(distribution: D, rng: &mut R) -> Self
    where
        R: CryptoRng + RngCore + ?Sized;

    /// Draws a value of type `Self` from `rng` under the default distribution.
    #[inline]
    fn gen<R>(rng: &mut R) -> Self
    where
        D: Default,
        R: CryptoRng + RngCore + ?Sized,
    {
        Self::sample(Default::default(), rng)
    }
}

/// Samples a uniformly random non-zero scalar from `rng`.
///
/// Scalars are drawn from 64 random bytes reduced modulo the field order, which keeps the bias
/// negligible for fields of up to 256 bits.
#[inline]
pub fn sample_scalar<F, R>(rng: &mut R) -> F
where
    F: PrimeField,
    R: CryptoRng + RngCore + ?Sized,
{
    let mut bytes = [0; 64];
    loop {
        rng.fill_bytes(&mut bytes);
        let scalar = F::from_le_bytes_mod_order(&bytes);
        if !scalar.is_zero() {
            return scalar;
        }
    }
}

/// Scalar Generator Extension
pub trait Rand: CryptoRng + RngCore {
    /// Returns a random non-zero scalar.
    #[inline]
    fn gen_scalar<F>(&mut self) -> F
    where
        F: PrimeField,
    {
        sample_scalar(self)
    }
}

impl<R> Rand for R where R: CryptoRng + RngCore + ?Sized {}
