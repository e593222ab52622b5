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

//! Transactions
//!
//! [`MintTransaction`]s create coins with public values and [`SpendTransaction`]s consume coins
//! from anonymity sets and create coins with hidden values.

use crate::{coin::Coin, params::Params};
use alloc::{collections::BTreeMap, vec::Vec};
use spark_crypto::{hash::Hasher, transcript::Transcript};
use spark_util::codec::Encode;

mod mint;
mod spend;

pub use mint::*;
pub use spend::*;

/// Transaction Record Version
pub const VERSION: u8 = 1;

/// Set Root Size
pub const SET_ROOT_SIZE: usize = 32;

/// Set Root
///
/// Opaque descriptor of an anonymity set snapshot.
pub type SetRoot = [u8; SET_ROOT_SIZE];

/// Anonymity Set Source
///
/// Resolves set roots to the ordered coin lists they describe.
pub trait CoverSet {
    /// Returns the coins of the anonymity set described by `root`.
    fn coins(&self, root: &SetRoot) -> Option<&[Coin]>;
}

/// A bare coin list is a single anonymity set, so every root resolves to the whole list. Use a
/// keyed source such as a [`BTreeMap`] when roots must select between snapshots.
impl CoverSet for [Coin] {
    #[inline]
    fn coins(&self, _: &SetRoot) -> Option<&[Coin]> {
        Some(self)
    }
}

/// Every root resolves to the whole list.
impl CoverSet for Vec<Coin> {
    #[inline]
    fn coins(&self, _: &SetRoot) -> Option<&[Coin]> {
        Some(self.as_slice())
    }
}

impl CoverSet for BTreeMap<SetRoot, Vec<Coin>> {
    #[inline]
    fn coins(&self, root: &SetRoot) -> Option<&[Coin]> {
        self.get(root).map(Vec::as_slice)
    }
}

/// Computes a snapshot root of the ordered `coins`.
#[inline]
pub fn snapshot_root(coins: &[Coin]) -> SetRoot {
    let mut hasher = Hasher::new(b"Spark/snapshot-root");
    hasher.update_u64(coins.len() as u64);
    for coin in coins {
        hasher.update(&coin.to_vec());
    }
    hasher.finalize_key()
}

/// Builds the transcript for a transaction under `domain`, seeded with the parameters and the
/// record version.
#[inline]
fn transcript(params: &Params, domain: &[u8]) -> Transcript {
    let mut transcript = Transcript::new(domain);
    transcript.append_message(b"params", params.digest());
    transcript.append_u64(b"version", VERSION as u64);
    transcript
}

/// Appends the encodings of `outputs` to `transcript`.
#[inline]
fn append_outputs(transcript: &mut Transcript, outputs: &[Coin]) {
    transcript.append_u64(b"output-count", outputs.len() as u64);
    for coin in outputs {
        transcript.append_message(b"output", &coin.to_vec());
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;

    /// Checks that coin lists ignore the root while keyed sources select by it.
    #[test]
    fn cover_sets_resolve_roots() {
        let list = Vec::<Coin>::new();
        assert_eq!(list.coins(&[0; SET_ROOT_SIZE]), Some(&[][..]));
        assert_eq!(
            list.as_slice().coins(&[7; SET_ROOT_SIZE]),
            Some(&[][..]),
            "A coin list should resolve every root to itself."
        );
        let mut keyed = BTreeMap::new();
        keyed.insert([1; SET_ROOT_SIZE], list);
        assert_eq!(keyed.coins(&[1; SET_ROOT_SIZE]), Some(&[][..]));
        assert_eq!(
            keyed.coins(&[0; SET_ROOT_SIZE]),
            None,
            "Keyed sources should not resolve unknown roots."
        );
    }
}
