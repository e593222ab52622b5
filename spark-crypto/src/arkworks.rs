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

//! Arkworks Backend
//!
//! Group arithmetic and canonical encodings for any arkworks [`ProjectiveCurve`]. Points are
//! encoded in compressed affine form and scalars in little-endian form, both at a fixed width.

use alloc::vec::Vec;
use ark_ec::msm::VariableBaseMSM;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, SerializationError};
use spark_util::codec::{
    read_length, write_length, DecodeError, Input, Output, ScaleCodecReader, ScaleCodecWriter,
};

pub use ark_ec as ec;
pub use ark_ff as ff;
pub use ark_serialize as serialize;

#[cfg(feature = "ark-ed-on-bls12-381")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "ark-ed-on-bls12-381")))]
pub use ark_ed_on_bls12_381 as ed_on_bls12_381;

#[doc(inline)]
pub use ark_ec::{AffineCurve, ProjectiveCurve};

#[doc(inline)]
pub use ark_ff::{Field, One, PrimeField, UniformRand, Zero};

/// Scalar Field Type
pub type Scalar<C> = <C as ProjectiveCurve>::ScalarField;

/// Multiplies `point` by `scalar`.
#[inline]
pub fn scalar_mul<C>(point: &C, scalar: &Scalar<C>) -> C
where
    C: ProjectiveCurve,
{
    point.mul(scalar.into_repr())
}

/// Computes `sum_i scalars[i] * points[i]`.
///
/// # Panics
///
/// The two slices must have the same length.
#[inline]
pub fn multi_scalar_mul<C>(points: &[C], scalars: &[Scalar<C>]) -> C
where
    C: ProjectiveCurve,
{
    assert_eq!(
        points.len(),
        scalars.len(),
        "Multi-scalar multiplication needs one scalar per point."
    );
    if points.is_empty() {
        return C::zero();
    }
    let bases = C::batch_normalization_into_affine(points);
    let scalars = scalars.iter().map(|s| s.into_repr()).collect::<Vec<_>>();
    VariableBaseMSM::multi_scalar_mul(&bases, &scalars)
}

/// Computes the inner product `sum_i lhs[i] * rhs[i]` of two scalar vectors.
#[inline]
pub fn inner_product<F>(lhs: &[F], rhs: &[F]) -> F
where
    F: Field,
{
    lhs.iter().zip(rhs).map(|(l, r)| *l * r).sum()
}

/// Returns `[1, x, x^2, ..., x^(n-1)]`.
#[inline]
pub fn powers<F>(x: F, n: usize) -> Vec<F>
where
    F: Field,
{
    let mut powers = Vec::with_capacity(n);
    let mut next = F::one();
    for _ in 0..n {
        powers.push(next);
        next *= x;
    }
    powers
}

/// Returns the size in bytes of an encoded point of `C`.
#[inline]
pub fn point_size<C>() -> usize
where
    C: ProjectiveCurve,
{
    C::prime_subgroup_generator().into_affine().serialized_size()
}

/// Returns the size in bytes of an encoded scalar of `F`.
#[inline]
pub fn scalar_size<F>() -> usize
where
    F: PrimeField,
{
    F::zero().serialized_size()
}

/// Returns the canonical encoding of `point`.
#[inline]
pub fn point_to_bytes<C>(point: &C) -> Vec<u8>
where
    C: ProjectiveCurve,
{
    let mut buffer = Vec::with_capacity(point_size::<C>());
    write_point(point, &mut buffer);
    buffer
}

/// Returns the canonical encoding of `scalar`.
#[inline]
pub fn scalar_to_bytes<F>(scalar: &F) -> Vec<u8>
where
    F: PrimeField,
{
    let mut buffer = Vec::with_capacity(scalar_size::<F>());
    write_scalar(scalar, &mut buffer);
    buffer
}

/// Maps an arkworks deserialization failure onto the codec error for `field`.
#[inline]
fn decode_error(err: SerializationError, field: &'static str) -> DecodeError {
    match err {
        SerializationError::IoError(_) => DecodeError::UnexpectedEnd,
        _ => DecodeError::InvalidField(field),
    }
}

/// Writes the canonical encoding of `point` to `writer`.
#[inline]
pub fn write_point<C, O>(point: &C, writer: &mut O)
where
    C: ProjectiveCurve,
    O: Output + ?Sized,
{
    point
        .into_affine()
        .serialize(ScaleCodecWriter(writer))
        .expect("Serializing into a SCALE output is not allowed to fail.")
}

/// Writes the canonical encoding of `scalar` to `writer`.
#[inline]
pub fn write_scalar<F, O>(scalar: &F, writer: &mut O)
where
    F: PrimeField,
    O: Output + ?Sized,
{
    scalar
        .serialize(ScaleCodecWriter(writer))
        .expect("Serializing into a SCALE output is not allowed to fail.")
}

/// Reads a point from `reader`, rejecting encodings of points that are off the curve or outside
/// of the prime-order subgroup.
#[inline]
pub fn read_point<C, I>(reader: &mut I) -> Result<C, DecodeError>
where
    C: ProjectiveCurve,
    I: Input,
{
    <C::Affine as CanonicalDeserialize>::deserialize(ScaleCodecReader(reader))
        .map(|point| point.into_projective())
        .map_err(|err| decode_error(err, "group element"))
}

/// Reads a canonical scalar from `reader`, rejecting encodings that are not fully reduced.
#[inline]
pub fn read_scalar<F, I>(reader: &mut I) -> Result<F, DecodeError>
where
    F: PrimeField,
    I: Input,
{
    F::deserialize(ScaleCodecReader(reader)).map_err(|err| decode_error(err, "scalar"))
}

/// Writes `points` with a `u32` count prefix.
#[inline]
pub fn write_points<C, O>(points: &[C], writer: &mut O)
where
    C: ProjectiveCurve,
    O: Output + ?Sized,
{
    write_length(writer, points.len());
    for point in points {
        write_point(point, writer);
    }
}

/// Writes `scalars` with a `u32` count prefix.
#[inline]
pub fn write_scalars<F, O>(scalars: &[F], writer: &mut O)
where
    F: PrimeField,
    O: Output + ?Sized,
{
    write_length(writer, scalars.len());
    for scalar in scalars {
        write_scalar(scalar, writer);
    }
}

/// Reads a `u32` count prefixed sequence of exactly `expected` points.
#[inline]
pub fn read_points<C, I>(reader: &mut I, expected: usize) -> Result<Vec<C>, DecodeError>
where
    C: ProjectiveCurve,
    I: Input,
{
    if read_length(reader, expected)? != expected {
        return Err(DecodeError::InvalidField("group element count"));
    }
    (0..expected).map(|_| read_point(reader)).collect()
}

/// Reads a `u32` count prefixed sequence of exactly `expected` scalars.
#[inline]
pub fn read_scalars<F, I>(reader: &mut I, expected: usize) -> Result<Vec<F>, DecodeError>
where
    F: PrimeField,
    I: Input,
{
    if read_length(reader, expected)? != expected {
        return Err(DecodeError::InvalidField("scalar count"));
    }
    (0..expected).map(|_| read_scalar(reader)).collect()
}
