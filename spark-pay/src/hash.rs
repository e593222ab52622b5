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

//! Protocol Hash Functions
//!
//! Every derivation uses its own domain label.

use crate::config::{Group, Scalar};
use spark_crypto::hash::Hasher;

/// Derives the first spend key scalar from the root secret `r`.
#[inline]
pub fn spend_key_s1(r: &Scalar) -> Scalar {
    Hasher::new(b"Spark/spend-key-s1")
        .update_scalar(r)
        .finalize_scalar()
}

/// Derives the second spend key scalar from the root secret `r`.
#[inline]
pub fn spend_key_s2(r: &Scalar) -> Scalar {
    Hasher::new(b"Spark/spend-key-s2")
        .update_scalar(r)
        .finalize_scalar()
}

/// Derives the diversifier cipher key from `s1`.
#[inline]
pub fn diversifier_key(s1: &Scalar) -> [u8; 32] {
    Hasher::new(b"Spark/diversifier-key")
        .update_scalar(s1)
        .finalize_key()
}

/// Hashes the diversifier `d` to a group element.
#[inline]
pub fn diversifier_point(d: &[u8; 16]) -> Group {
    Hasher::new(b"Spark/diversifier").update(d).finalize_group()
}

/// Derives the address scalar for diversifier index `i`.
#[inline]
pub fn address_scalar(s1: &Scalar, i: u64) -> Scalar {
    Hasher::new(b"Spark/address")
        .update_scalar(s1)
        .update_u64(i)
        .finalize_scalar()
}

/// Derives the serial number scalar of a coin with nonce `k` minted under `context`.
#[inline]
pub fn serial_scalar(k: &Scalar, context: &[u8]) -> Scalar {
    Hasher::new(b"Spark/serial")
        .update_scalar(k)
        .update(context)
        .finalize_scalar()
}

/// Derives the value commitment blinding of a coin with nonce `k`.
#[inline]
pub fn value_blinding(k: &Scalar) -> Scalar {
    Hasher::new(b"Spark/value").update_scalar(k).finalize_scalar()
}

/// Derives the serial commitment offset blinding for spending serial `s` owned by `d`.
#[inline]
pub fn serial_offset(s: &Scalar, d: &Group) -> Scalar {
    Hasher::new(b"Spark/serial-offset")
        .update_scalar(s)
        .update_point(d)
        .finalize_scalar()
}

/// Derives the value commitment offset blinding for spending serial `s` owned by `d`.
#[inline]
pub fn value_offset(s: &Scalar, d: &Group) -> Scalar {
    Hasher::new(b"Spark/value-offset")
        .update_scalar(s)
        .update_point(d)
        .finalize_scalar()
}

/// Derives the payload encryption key from the shared point `shared`.
#[inline]
pub fn payload_key(shared: &Group) -> [u8; 32] {
    Hasher::new(b"Spark/payload-key")
        .update_point(shared)
        .finalize_key()
}

/// Computes the four byte address checksum of `body`.
#[inline]
pub fn address_checksum(body: &[u8]) -> [u8; 4] {
    let digest = Hasher::new(b"Spark/address-checksum").update(body).finalize();
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Derives the serial context of spend outputs from the encoded linking tags.
#[inline]
pub fn spend_serial_context(encoded_tags: &[u8]) -> [u8; 64] {
    Hasher::new(b"Spark/spend-context")
        .update(encoded_tags)
        .finalize()
}

/// Hashes an encoded record into a 32 byte identifier.
#[inline]
pub fn record_id(domain: &[u8], encoded: &[u8]) -> [u8; 32] {
    Hasher::new(domain).update(encoded).finalize_key()
}
