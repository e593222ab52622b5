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

//! Proof Engine
//!
//! Sub-proofs share one Fiat-Shamir [`Transcript`](spark_crypto::transcript::Transcript) per
//! transaction. Each `prove` appends its commitments before drawing challenges and each `verify`
//! replays exactly the same appends, so a proof only verifies against the public data it was
//! generated for.

pub mod bulletproof;
pub mod chaum;
pub mod grootle;
pub mod schnorr;
