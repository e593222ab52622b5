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

//! Spark Private Payment Protocol
//!
//! Key hierarchy, coins and the spend transaction proof system of the Spark protocol over the
//! Jubjub curve.

#![no_std]
#![cfg_attr(doc_cfg, feature(doc_cfg))]
#![forbid(rustdoc::broken_intra_doc_links)]
#![forbid(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod hash;

#[cfg(test)]
mod test;

pub mod coin;
pub mod config;
pub mod error;
pub mod keys;
pub mod params;
pub mod proof;
pub mod transaction;

pub use error::*;
