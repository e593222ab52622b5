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

//! Error Types

use core::fmt;
use spark_util::{codec::DecodeError, from_variant_impl};

/// Validation Error
///
/// A field is malformed or the shape of a record is inconsistent with the parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValidationError {
    /// Invalid Parameter Shape
    InvalidParams,

    /// Memo Too Long
    MemoTooLong {
        /// Memo Length
        length: usize,

        /// Maximum Memo Length
        bound: usize,
    },

    /// Value Out of Range
    ///
    /// The value does not fit into the configured number of value bits.
    ValueOutOfRange,

    /// Serial Context Too Long or Mismatched
    SerialContext,

    /// Malformed Address String
    Address,

    /// Decoding Failure
    Decode(DecodeError),

    /// Unknown Record Version
    Version(u8),

    /// Transaction Without Inputs
    NoInputs,

    /// Too Many Inputs
    TooManyInputs,

    /// Transaction Without Outputs
    NoOutputs,

    /// Too Many Outputs
    TooManyOutputs,

    /// Number of Set Roots Differs From Number of Inputs
    RootCount,

    /// Unknown Anonymity Set Root
    UnknownRoot,

    /// Anonymity Set Empty or Larger Than the Proof Shape Allows
    CoverSet,

    /// Input Index Outside of its Anonymity Set
    InputIndex,

    /// Linking Tag Appears Twice
    DuplicateTag,

    /// Linking Tag is the Identity
    IdentityTag,

    /// Coin of the Wrong Type
    CoinType,

    /// Proof Shape Inconsistent With the Transaction
    ProofShape,
}

impl fmt::Display for ValidationError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidParams => write!(f, "invalid parameter shape"),
            Self::MemoTooLong { length, bound } => {
                write!(f, "memo of {} bytes exceeds {} bytes", length, bound)
            }
            Self::ValueOutOfRange => write!(f, "value out of range"),
            Self::SerialContext => write!(f, "invalid serial context"),
            Self::Address => write!(f, "malformed address"),
            Self::Decode(err) => write!(f, "decoding failed: {}", err),
            Self::Version(version) => write!(f, "unknown record version {}", version),
            Self::NoInputs => write!(f, "transaction has no inputs"),
            Self::TooManyInputs => write!(f, "transaction has too many inputs"),
            Self::NoOutputs => write!(f, "transaction has no outputs"),
            Self::TooManyOutputs => write!(f, "transaction has too many outputs"),
            Self::RootCount => write!(f, "set root count does not match input count"),
            Self::UnknownRoot => write!(f, "unknown anonymity set root"),
            Self::CoverSet => write!(f, "anonymity set is empty or too large"),
            Self::InputIndex => write!(f, "input index outside of anonymity set"),
            Self::DuplicateTag => write!(f, "duplicate linking tag"),
            Self::IdentityTag => write!(f, "linking tag is the identity"),
            Self::CoinType => write!(f, "coin has the wrong type"),
            Self::ProofShape => write!(f, "proof shape does not match transaction"),
        }
    }
}

from_variant_impl!(ValidationError, Decode, DecodeError);

/// Balance Error
///
/// The values and fee of a transaction request do not add up.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BalanceError {
    /// Value Sum Overflow
    Overflow,

    /// Inputs Do Not Cover Outputs Plus Fee
    Mismatch {
        /// Sum of Input Values
        inputs: u128,

        /// Sum of Output Values and Fee
        outputs: u128,
    },
}

impl fmt::Display for BalanceError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "value sum overflows"),
            Self::Mismatch { inputs, outputs } => write!(
                f,
                "insufficient funds: inputs {} do not equal outputs plus fee {}",
                inputs, outputs
            ),
        }
    }
}

/// Proof Error
///
/// A sub-proof failed its algebraic check.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ProofError {
    /// Anonymity Set Membership Proof Failed
    Membership,

    /// Ownership Proof Failed
    Ownership,

    /// Balance or Value Proof Failed
    Balance,
}

impl fmt::Display for ProofError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Membership => write!(f, "membership proof failed"),
            Self::Ownership => write!(f, "ownership proof failed"),
            Self::Balance => write!(f, "balance proof failed"),
        }
    }
}

/// State Error
///
/// Key hierarchy misuse.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StateError {
    /// Requested Key is More Privileged Than the Stored Key
    KeyLevel,

    /// Full View Key Does Not Own the Coin
    ViewKeyMismatch,

    /// Input Data Does Not Open the Referenced Coin
    InputMismatch,
}

impl fmt::Display for StateError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::KeyLevel => write!(f, "key level too low"),
            Self::ViewKeyMismatch => write!(f, "cannot recover coin with this view key"),
            Self::InputMismatch => write!(f, "input data does not match the referenced coin"),
        }
    }
}

/// Spark Error
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// Validation Error
    Validation(ValidationError),

    /// Balance Error
    Balance(BalanceError),

    /// Proof Error
    Proof(ProofError),

    /// Range Proof Error
    Range,

    /// State Error
    State(StateError),
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation error: {}", err),
            Self::Balance(err) => write!(f, "balance error: {}", err),
            Self::Proof(err) => write!(f, "proof error: {}", err),
            Self::Range => write!(f, "range proof failed"),
            Self::State(err) => write!(f, "state error: {}", err),
        }
    }
}

from_variant_impl!(Error, Validation, ValidationError);
from_variant_impl!(Error, Balance, BalanceError);
from_variant_impl!(Error, Proof, ProofError);
from_variant_impl!(Error, State, StateError);

impl From<DecodeError> for Error {
    #[inline]
    fn from(err: DecodeError) -> Self {
        Self::Validation(err.into())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for ValidationError {}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for BalanceError {}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for ProofError {}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for StateError {}

#[cfg(feature = "std")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "std")))]
impl std::error::Error for Error {}
