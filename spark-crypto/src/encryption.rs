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

//! Symmetric Encryption Primitives

use aes::{
    cipher::generic_array::GenericArray, Aes256, BlockDecrypt, BlockEncrypt, NewBlockCipher,
};
use aes_gcm::{
    aead::{Aead, NewAead, Payload},
    Aes256Gcm, Nonce,
};
use alloc::vec::Vec;

/// AES-GCM Authentication Tag Size
#[allow(clippy::cast_possible_truncation)] // NOTE: GCM Tag Size should be smaller than `2^32`.
pub const TAG_SIZE: usize = (aes_gcm::C_MAX - aes_gcm::P_MAX) as usize;

/// Computes the size of the ciphertext corresponding to a plaintext of the given
/// `plaintext_size`.
#[inline]
pub const fn ciphertext_size(plaintext_size: usize) -> usize {
    plaintext_size + TAG_SIZE
}

/// Fixed-Nonce AES Galois Counter Mode
///
/// # Safety
///
/// The encryption key can be used only once.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FixedNonceAesGcm;

impl FixedNonceAesGcm {
    /// Fixed Random Nonce
    ///
    /// # Safety
    ///
    /// Using a fixed nonce is safe under the assumption that the encryption keys are only used
    /// once.
    const NONCE: &'static [u8] = b"random nonce";

    /// Encrypts `plaintext` under `key`, authenticating the associated data `aad`.
    #[inline]
    pub fn encrypt(key: &[u8; 32], aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        Aes256Gcm::new_from_slice(key)
            .expect("The key has the correct size.")
            .encrypt(
                Nonce::from_slice(Self::NONCE),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .expect("Symmetric encryption is not allowed to fail.")
    }

    /// Tries to decrypt `ciphertext` under `key`, returning `None` if the key or the associated
    /// data `aad` do not match.
    #[inline]
    pub fn decrypt(key: &[u8; 32], aad: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
        Aes256Gcm::new_from_slice(key)
            .expect("The key has the correct size.")
            .decrypt(
                Nonce::from_slice(Self::NONCE),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .ok()
    }
}

/// Diversifier Cipher
///
/// A keyed pseudorandom permutation on 16-byte blocks used to turn address indices into
/// diversifiers and back.
#[derive(Clone)]
pub struct DiversifierCipher(Aes256);

impl DiversifierCipher {
    /// Builds a new [`DiversifierCipher`] keyed with `key`.
    #[inline]
    pub fn new(key: &[u8; 32]) -> Self {
        Self(Aes256::new(GenericArray::from_slice(key)))
    }

    /// Applies the forward permutation to `block`.
    #[inline]
    pub fn encrypt(&self, block: [u8; 16]) -> [u8; 16] {
        let mut block = GenericArray::from(block);
        self.0.encrypt_block(&mut block);
        block.into()
    }

    /// Applies the inverse permutation to `block`.
    #[inline]
    pub fn decrypt(&self, block: [u8; 16]) -> [u8; 16] {
        let mut block = GenericArray::from(block);
        self.0.decrypt_block(&mut block);
        block.into()
    }
}

impl core::fmt::Debug for DiversifierCipher {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("DiversifierCipher").finish_non_exhaustive()
    }
}
