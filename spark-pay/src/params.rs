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

//! Protocol Parameters

use crate::{config::Group, error::ValidationError};
use alloc::vec::Vec;
use spark_crypto::{
    commitment::{PedersenCommitment, VectorCommitment},
    hash::{Hasher, OUTPUT_SIZE},
};
use spark_util::num::checked_pow;

/// Network
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Network {
    /// Main Network
    Mainnet,

    /// Public Test Network
    Testnet,

    /// Local Regression Test Network
    Regtest,
}

impl Network {
    /// Returns the configuration of `self`.
    #[inline]
    pub const fn config(self) -> NetworkConfig {
        match self {
            Self::Mainnet => NetworkConfig {
                n: 16,
                m: 4,
                max_inputs: 32,
                max_outputs: 16,
                memo_bytes: 32,
                value_bits: 64,
                address_prefix: b'm',
            },
            Self::Testnet => NetworkConfig {
                n: 16,
                m: 4,
                max_inputs: 32,
                max_outputs: 16,
                memo_bytes: 32,
                value_bits: 64,
                address_prefix: b't',
            },
            Self::Regtest => NetworkConfig {
                n: 4,
                m: 2,
                max_inputs: 8,
                max_outputs: 4,
                memo_bytes: 32,
                value_bits: 64,
                address_prefix: b'r',
            },
        }
    }

    /// Returns the network whose addresses start with `prefix`.
    #[inline]
    pub fn from_prefix(prefix: u8) -> Option<Self> {
        [Self::Mainnet, Self::Testnet, Self::Regtest]
            .into_iter()
            .find(|network| network.config().address_prefix == prefix)
    }
}

/// Network Configuration
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NetworkConfig {
    /// Membership Proof Base
    pub n: usize,

    /// Membership Proof Exponent
    pub m: usize,

    /// Maximum Number of Inputs per Transaction
    pub max_inputs: usize,

    /// Maximum Number of Outputs per Transaction
    pub max_outputs: usize,

    /// Memo Size in Bytes
    pub memo_bytes: usize,

    /// Value Bit Width
    pub value_bits: usize,

    /// Address Prefix Byte
    pub address_prefix: u8,
}

impl NetworkConfig {
    /// Checks that `self` describes a usable proof shape and returns the anonymity set size
    /// `n^m`.
    #[inline]
    pub fn validate(&self) -> Result<usize, ValidationError> {
        let set_size = checked_pow(self.n, self.m).ok_or(ValidationError::InvalidParams)?;
        if self.n < 2
            || self.m < 1
            || self.max_inputs < 1
            || !self.max_outputs.is_power_of_two()
            || !self.value_bits.is_power_of_two()
            || self.value_bits > 64
            || self.value_bits.checked_mul(self.max_outputs).is_none()
        {
            return Err(ValidationError::InvalidParams);
        }
        Ok(set_size)
    }
}

/// Derives the `index`-th generator under `label`.
#[inline]
fn generator(label: &[u8], index: u64) -> Group {
    Hasher::new(b"Spark/generator")
        .update(label)
        .update_u64(index)
        .finalize_group()
}

/// Derives `count` generators under `label`.
#[inline]
fn generators(label: &[u8], count: usize) -> Vec<Group> {
    (0..count as u64).map(|i| generator(label, i)).collect()
}

/// Public Parameters
///
/// Built once and shared by reference. All generators are derived by hashing to the group, so
/// nobody knows a discrete logarithm relation between any two of them.
#[derive(Clone, Debug)]
pub struct Params {
    /// Network Configuration
    config: NetworkConfig,

    /// Anonymity Set Size
    set_size: usize,

    /// Serial Number Generator
    pub f: Group,

    /// Value Generator
    pub g: Group,

    /// Blinding Generator
    pub h: Group,

    /// Linking Tag Generator
    pub u: Group,

    /// Range Proof Value Vector Generators
    pub range_g: Vec<Group>,

    /// Range Proof Blinding Vector Generators
    pub range_h: Vec<Group>,

    /// Range Proof Inner Product Generator
    pub range_u: Group,

    /// Membership Proof Commitment Scheme
    grootle: VectorCommitment<Group>,

    /// Parameter Digest
    digest: [u8; OUTPUT_SIZE],
}

impl Params {
    /// Builds the parameters for `network`.
    #[inline]
    pub fn new(network: Network) -> Self {
        Self::with_shape(network.config()).expect("Built-in network configurations are valid.")
    }

    /// Builds parameters for a custom `config`, checking its shape.
    #[inline]
    pub fn with_shape(config: NetworkConfig) -> Result<Self, ValidationError> {
        let set_size = config.validate()?;
        let range_size = config.value_bits * config.max_outputs;
        let h = generator(b"H", 0);
        let mut params = Self {
            config,
            set_size,
            f: generator(b"F", 0),
            g: generator(b"G", 0),
            h,
            u: generator(b"U", 0),
            range_g: generators(b"range-G", range_size),
            range_h: generators(b"range-H", range_size),
            range_u: generator(b"range-U", 0),
            grootle: VectorCommitment::new(generators(b"grootle-G", config.n * config.m), h),
            digest: [0; OUTPUT_SIZE],
        };
        params.digest = params.compute_digest();
        Ok(params)
    }

    /// Hashes the configuration and every generator.
    #[inline]
    fn compute_digest(&self) -> [u8; OUTPUT_SIZE] {
        let mut hasher = Hasher::new(b"Spark/params");
        hasher
            .update_u64(self.config.n as u64)
            .update_u64(self.config.m as u64)
            .update_u64(self.config.max_inputs as u64)
            .update_u64(self.config.max_outputs as u64)
            .update_u64(self.config.memo_bytes as u64)
            .update_u64(self.config.value_bits as u64)
            .update(&[self.config.address_prefix]);
        for point in [&self.f, &self.g, &self.h, &self.u, &self.range_u] {
            hasher.update_point(point);
        }
        for point in self
            .range_g
            .iter()
            .chain(&self.range_h)
            .chain(&self.grootle.generators)
        {
            hasher.update_point(point);
        }
        hasher.finalize()
    }

    /// Returns the network configuration.
    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Returns the membership proof base `n`.
    #[inline]
    pub fn n(&self) -> usize {
        self.config.n
    }

    /// Returns the membership proof exponent `m`.
    #[inline]
    pub fn m(&self) -> usize {
        self.config.m
    }

    /// Returns the anonymity set size `n^m`.
    #[inline]
    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Returns the maximum number of inputs per transaction.
    #[inline]
    pub fn max_inputs(&self) -> usize {
        self.config.max_inputs
    }

    /// Returns the maximum number of outputs per transaction.
    #[inline]
    pub fn max_outputs(&self) -> usize {
        self.config.max_outputs
    }

    /// Returns the memo size in bytes.
    #[inline]
    pub fn memo_bytes(&self) -> usize {
        self.config.memo_bytes
    }

    /// Returns the value bit width.
    #[inline]
    pub fn value_bits(&self) -> usize {
        self.config.value_bits
    }

    /// Returns `true` if `value` fits into the value bit width.
    #[inline]
    pub fn value_in_range(&self, value: u64) -> bool {
        self.config.value_bits >= 64 || value >> self.config.value_bits == 0
    }

    /// Returns the address prefix byte.
    #[inline]
    pub fn address_prefix(&self) -> u8 {
        self.config.address_prefix
    }

    /// Returns the value commitment scheme `v * G + r * H`.
    #[inline]
    pub fn value_commitment(&self) -> PedersenCommitment<Group> {
        PedersenCommitment::new(self.g, self.h)
    }

    /// Returns the membership proof vector commitment scheme.
    #[inline]
    pub fn grootle_commitment(&self) -> &VectorCommitment<Group> {
        &self.grootle
    }

    /// Returns the parameter digest every transcript is seeded with.
    #[inline]
    pub fn digest(&self) -> &[u8; OUTPUT_SIZE] {
        &self.digest
    }
}

/// Testing Suite
#[cfg(test)]
mod test {
    use super::*;
    use spark_crypto::arkworks::Zero;

    /// Checks that the built-in networks have the documented shapes.
    #[test]
    fn network_shapes() {
        let params = Params::new(Network::Regtest);
        assert_eq!(params.set_size(), 16);
        assert_eq!(params.range_g.len(), 64 * 4);
        assert_eq!(params.grootle_commitment().len(), 8);
        assert_eq!(Network::Mainnet.config().validate(), Ok(65536));
        assert_eq!(Network::from_prefix(b't'), Some(Network::Testnet));
        assert_eq!(Network::from_prefix(b'x'), None);
    }

    /// Checks that the generators are distinct and non-trivial.
    #[test]
    fn generators_are_distinct() {
        let params = Params::new(Network::Regtest);
        let named = [params.f, params.g, params.h, params.u, params.range_u];
        for (i, lhs) in named.iter().enumerate() {
            assert!(!lhs.is_zero(), "Generators must not be the identity.");
            for rhs in &named[i + 1..] {
                assert_ne!(lhs, rhs, "Generators must be distinct.");
            }
        }
        assert_eq!(
            params.digest(),
            Params::new(Network::Regtest).digest(),
            "Parameter generation must be deterministic."
        );
        assert_ne!(params.digest(), Params::new(Network::Testnet).digest());
    }

    /// Checks that invalid shapes are rejected.
    #[test]
    fn invalid_shapes_are_rejected() {
        let mut config = Network::Regtest.config();
        config.n = 1;
        assert_eq!(config.validate(), Err(ValidationError::InvalidParams));
        let mut config = Network::Regtest.config();
        config.max_outputs = 3;
        assert_eq!(config.validate(), Err(ValidationError::InvalidParams));
        let mut config = Network::Regtest.config();
        config.value_bits = 128;
        assert_eq!(config.validate(), Err(ValidationError::InvalidParams));
        let mut config = Network::Regtest.config();
        config.n = usize::MAX;
        assert!(Params::with_shape(config).is_err());
        let mut config = Network::Regtest.config();
        config.value_bits = 8;
        assert!(Params::with_shape(config).is_ok());
    }
}
