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

//! Spark Configuration
//!
//! Concrete group choice for the protocol. The cryptographic building blocks in `spark-crypto`
//! are generic over the curve, everything in this crate is instantiated here.

use spark_crypto::arkworks::ed_on_bls12_381;

/// Group Type
///
/// The prime-order subgroup of the Jubjub curve.
pub type Group = ed_on_bls12_381::EdwardsProjective;

/// Scalar Field Type
pub type Scalar = ed_on_bls12_381::Fr;

/// Encoded Group Element Size
pub const GROUP_SIZE: usize = 32;

/// Encoded Scalar Size
pub const SCALAR_SIZE: usize = 32;
