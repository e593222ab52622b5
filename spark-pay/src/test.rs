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

//! Protocol Testing Suite

use crate::{
    coin::{Coin, CoinType, OutputCoinData},
    error::{BalanceError, Error, ProofError, StateError, ValidationError},
    keys::{FullViewKey, IncomingViewKey, SpendKey},
    params::{Network, Params},
    transaction::{snapshot_root, InputCoinData, SetRoot, SpendTransaction},
};
use alloc::{collections::BTreeMap, vec, vec::Vec};
use rand_chacha::ChaCha20Rng;
use spark_crypto::rand::{CryptoRng, OsRng, RngCore, Sample, SeedableRng};
use spark_util::codec::{Decode, Encode};

/// Fee paid by the test transactions.
const FEE: u64 = 7;

/// Wallet Fixture
struct Wallet {
    /// Spend Key
    spend_key: SpendKey,

    /// Full View Key
    fvk: FullViewKey,

    /// Incoming View Key
    ivk: IncomingViewKey,
}

impl Wallet {
    /// Samples a new wallet.
    #[inline]
    fn new<R>(params: &Params, rng: &mut R) -> Self
    where
        R: CryptoRng + RngCore + ?Sized,
    {
        let spend_key = SpendKey::gen(rng);
        let fvk = spend_key.full_view_key(params);
        let ivk = fvk.incoming_view_key();
        Self {
            spend_key,
            fvk,
            ivk,
        }
    }

    /// Identifies and recovers the coin at `index` in `coins`.
    #[inline]
    fn input(&self, params: &Params, coins: &[Coin], index: usize) -> InputCoinData {
        let identified = coins[index]
            .identify(params, &self.ivk)
            .expect("The wallet should identify its own coin.");
        let recovered = coins[index]
            .recover(params, &self.fvk, &identified)
            .expect("The wallet should recover its own coin.");
        InputCoinData::new(index, &identified, &recovered)
    }
}

/// Mints one coin per anonymity set slot to `wallet`, each with a distinct value.
#[inline]
fn mint_set<R>(params: &Params, wallet: &Wallet, rng: &mut R) -> Vec<Coin>
where
    R: CryptoRng + RngCore + ?Sized,
{
    (0..params.set_size())
        .map(|i| {
            let output = OutputCoinData::new(
                wallet.ivk.address(params, i as u64),
                1000 + 10 * i as u64,
                vec![i as u8],
            );
            Coin::mint(params, CoinType::Mint, &output, b"block", rng)
                .expect("Minting a valid coin is not allowed to fail.")
        })
        .collect()
}

/// Splits `total` between two outputs paid to `recipient`.
#[inline]
fn split_outputs(params: &Params, recipient: &Wallet, total: u64) -> Vec<OutputCoinData> {
    vec![
        OutputCoinData::new(recipient.ivk.address(params, 0), total / 3, b"first".to_vec()),
        OutputCoinData::new(
            recipient.ivk.address(params, 1),
            total - total / 3,
            b"second".to_vec(),
        ),
    ]
}

/// Spends the coins at `indices` of `coins` to a fresh recipient.
#[inline]
fn spend<R>(
    params: &Params,
    wallet: &Wallet,
    coins: &[Coin],
    indices: &[usize],
    rng: &mut R,
) -> (SpendTransaction, Wallet)
where
    R: CryptoRng + RngCore + ?Sized,
{
    let inputs = indices
        .iter()
        .map(|index| wallet.input(params, coins, *index))
        .collect::<Vec<_>>();
    let total = inputs.iter().map(|input| input.value).sum::<u64>();
    let recipient = Wallet::new(params, rng);
    let outputs = split_outputs(params, &recipient, total - FEE);
    let roots = vec![snapshot_root(coins); inputs.len()];
    let transaction = SpendTransaction::generate(
        params,
        &wallet.fvk,
        &wallet.spend_key,
        coins,
        &roots,
        &inputs,
        FEE,
        &outputs,
        rng,
    )
    .expect("Generating a balanced spend transaction is not allowed to fail.");
    (transaction, recipient)
}

/// Spends three coins out of a full anonymity set, checks that the transaction verifies and that
/// the recipient can use the outputs, then tampers with an output value commitment.
#[test]
fn spend_verifies_and_detects_tampering() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let (transaction, recipient) = spend(&params, &wallet, &coins, &[1, 3, 5], &mut rng);
    assert!(
        transaction.verify(&params, coins.as_slice()),
        "A freshly generated spend transaction should verify."
    );
    let total = 1010 + 1030 + 1050 - FEE;
    let received = transaction
        .outputs
        .iter()
        .map(|coin| {
            let identified = coin
                .identify(&params, &recipient.ivk)
                .expect("The recipient should identify every output.");
            coin.recover(&params, &recipient.fvk, &identified)
                .expect("The recipient should recover every output.");
            identified.value
        })
        .sum::<u64>();
    assert_eq!(received, total, "The outputs should carry the spent value minus the fee.");
    assert!(
        transaction.outputs[0].identify(&params, &wallet.ivk).is_none(),
        "The spender should not identify the recipient's outputs."
    );
    let mut tampered = transaction.clone();
    tampered.outputs[0].value_commitment += params.g;
    assert!(
        !SpendTransaction::verify_bytes(&params, &tampered.to_vec(), coins.as_slice()),
        "Adding one to an output value should break the transaction."
    );
}

/// Checks that the encoding round-trips and that flipping the low or high bit of any byte is
/// rejected.
#[test]
fn encoding_round_trips_and_rejects_bit_flips() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let (transaction, _) = spend(&params, &wallet, &coins, &[0, 15], &mut rng);
    let bytes = transaction.to_vec();
    let decoded = SpendTransaction::from_bytes(&bytes, &params)
        .expect("Decoding an encoded transaction is not allowed to fail.");
    assert_eq!(decoded, transaction, "The transaction should round-trip.");
    assert_eq!(decoded.id(), transaction.id(), "Equal transactions should share an id.");
    assert!(SpendTransaction::verify_bytes(&params, &bytes, coins.as_slice()));
    for i in 0..bytes.len() {
        for mask in [0x01, 0x80] {
            let mut flipped = bytes.clone();
            flipped[i] ^= mask;
            assert!(
                !SpendTransaction::verify_bytes(&params, &flipped, coins.as_slice()),
                "Flipping bit {:#04x} of byte {} should be rejected.",
                mask,
                i
            );
        }
    }
    let mut extended = bytes;
    extended.push(0);
    assert!(
        !SpendTransaction::verify_bytes(&params, &extended, coins.as_slice()),
        "Trailing bytes should be rejected."
    );
}

/// Checks that linking tags depend only on the coin and the spend key.
#[test]
fn linking_tags_are_deterministic() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let (first, _) = spend(&params, &wallet, &coins, &[2, 4], &mut rng);
    let (second, _) = spend(&params, &wallet, &coins, &[4, 2], &mut rng);
    assert_eq!(first.linking_tags()[0], second.linking_tags()[1]);
    assert_eq!(first.linking_tags()[1], second.linking_tags()[0]);
    assert_eq!(
        first.linking_tags()[0],
        wallet.input(&params, &coins, 2).tag,
        "The published tag should match the recovered tag."
    );
    assert_ne!(first.id(), second.id(), "Fresh randomness should give distinct transactions.");
    let restored = SpendKey::from_bytes(&wallet.spend_key.to_vec(), &())
        .expect("Decoding an encoded spend key is not allowed to fail.");
    let restored_fvk = restored.full_view_key(&params);
    let identified = coins[2]
        .identify(&params, &restored_fvk.incoming_view_key())
        .expect("The restored wallet should identify its coin.");
    let recovered = coins[2]
        .recover(&params, &restored_fvk, &identified)
        .expect("The restored wallet should recover its coin.");
    assert_eq!(recovered.tag, first.linking_tags()[0], "A restored key should give the same tag.");
}

/// Checks that membership proofs are freshly randomized on every spend, so that no proof field
/// repeats between two spends of the same coin or tracks the position of the spent coin.
#[test]
fn membership_proofs_do_not_reveal_position() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let (first, _) = spend(&params, &wallet, &coins, &[3], &mut rng);
    let (again, _) = spend(&params, &wallet, &coins, &[3], &mut rng);
    let (elsewhere, _) = spend(&params, &wallet, &coins, &[12], &mut rng);
    assert_eq!(
        first.linking_tags(),
        again.linking_tags(),
        "Spending the same coin twice should publish the same tag."
    );
    for other in [&again, &elsewhere] {
        assert!(other.verify(&params, coins.as_slice()));
        let (lhs, rhs) = (&first.proof.grootle[0], &other.proof.grootle[0]);
        assert_ne!(lhs.a, rhs.a, "Matrix commitments should be fresh.");
        assert_ne!(lhs.b, rhs.b, "Index commitments should be fresh.");
        assert_ne!(lhs.c, rhs.c);
        assert_ne!(lhs.d, rhs.d);
        assert!(
            lhs.x_s.iter().zip(&rhs.x_s).all(|(l, r)| l != r)
                && lhs.x_v.iter().zip(&rhs.x_v).all(|(l, r)| l != r),
            "Polynomial coefficient commitments should be fresh."
        );
        assert!(
            lhs.f.iter().zip(&rhs.f).all(|(l, r)| l != r),
            "No matrix response should repeat between spends."
        );
        assert!(
            [lhs.z_a, lhs.z_c, lhs.z_s, lhs.z_v] != [rhs.z_a, rhs.z_c, rhs.z_s, rhs.z_v],
            "Scalar responses should be fresh."
        );
        assert_ne!(
            first.proof.serial_offsets[0], other.proof.serial_offsets[0],
            "Serial commitment offsets should be re-blinded on every spend."
        );
        assert_ne!(first.proof.value_offsets[0], other.proof.value_offsets[0]);
    }
    let mut shuffled = coins.clone();
    shuffled.swap(3, 12);
    assert!(
        !first.verify(&params, shuffled.as_slice()),
        "A proof should not verify once its spent coin moves to another position."
    );
}

/// Checks that the membership proof does not depend on the order of the anonymity set as long as
/// prover and verifier agree on it.
#[test]
fn permuted_set_verifies() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let mut reversed = coins.clone();
    reversed.reverse();
    let last = coins.len() - 1;
    let (transaction, _) = spend(&params, &wallet, &reversed, &[last - 1, last - 6], &mut rng);
    assert!(
        transaction.verify(&params, reversed.as_slice()),
        "The transaction should verify against the set it was proven over."
    );
    assert_eq!(
        transaction.check(&params, coins.as_slice()),
        Err(ProofError::Membership.into()),
        "The transaction should not verify against a reordered set."
    );
}

/// Checks that a smaller set is padded and still proves membership.
#[test]
fn partial_set_verifies() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let mut coins = mint_set(&params, &wallet, &mut rng);
    coins.truncate(5);
    let (transaction, _) = spend(&params, &wallet, &coins, &[4], &mut rng);
    assert!(transaction.verify(&params, coins.as_slice()));
}

/// Checks the validation failures of spend generation.
#[test]
fn generate_rejects_invalid_requests() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let root = snapshot_root(&coins);
    let input = wallet.input(&params, &coins, 3);
    let outputs = split_outputs(&params, &wallet, input.value - FEE);
    let generate = |inputs: &[InputCoinData], roots: &[SetRoot], fee: u64, rng: &mut OsRng| {
        SpendTransaction::generate(
            &params,
            &wallet.fvk,
            &wallet.spend_key,
            coins.as_slice(),
            roots,
            inputs,
            fee,
            &outputs,
            rng,
        )
    };
    assert_eq!(
        generate(&[], &[], FEE, &mut rng),
        Err(ValidationError::NoInputs.into())
    );
    assert_eq!(
        generate(&[input.clone()], &[root, root], FEE, &mut rng),
        Err(ValidationError::RootCount.into())
    );
    assert_eq!(
        generate(&[input.clone()], &[root], FEE + 1, &mut rng),
        Err(BalanceError::Mismatch {
            inputs: input.value as u128,
            outputs: input.value as u128 + 1,
        }
        .into())
    );
    let duplicate = vec![input.clone(), input.clone()];
    let outputs_double = split_outputs(&params, &wallet, 2 * input.value - FEE);
    assert_eq!(
        SpendTransaction::generate(
            &params,
            &wallet.fvk,
            &wallet.spend_key,
            coins.as_slice(),
            &[root, root],
            &duplicate,
            FEE,
            &outputs_double,
            &mut rng,
        ),
        Err(ValidationError::DuplicateTag.into())
    );
    let mut misplaced = input.clone();
    misplaced.index = 4;
    assert_eq!(
        generate(&[misplaced], &[root], FEE, &mut rng),
        Err(StateError::InputMismatch.into())
    );
    let mut missing = input.clone();
    missing.index = coins.len();
    assert_eq!(
        generate(&[missing], &[root], FEE, &mut rng),
        Err(ValidationError::InputIndex.into())
    );
    let stranger = Wallet::new(&params, &mut rng);
    assert_eq!(
        SpendTransaction::generate(
            &params,
            &wallet.fvk,
            &stranger.spend_key,
            coins.as_slice(),
            &[root],
            &[input],
            FEE,
            &outputs,
            &mut rng,
        ),
        Err(StateError::ViewKeyMismatch.into())
    );
}

/// Checks that roots resolve through a keyed anonymity set source.
#[test]
fn keyed_sets_resolve_roots() {
    let mut rng = OsRng;
    let params = Params::new(Network::Regtest);
    let wallet = Wallet::new(&params, &mut rng);
    let coins = mint_set(&params, &wallet, &mut rng);
    let (old, new) = coins.split_at(8);
    let mut sets = BTreeMap::new();
    sets.insert(snapshot_root(old), old.to_vec());
    sets.insert(snapshot_root(new), new.to_vec());
    let first = wallet.input(&params, old, 2);
    let second = wallet.input(&params, new, 6);
    let recipient = Wallet::new(&params, &mut rng);
    let outputs = split_outputs(&params, &recipient, first.value + second.value - FEE);
    let transaction = SpendTransaction::generate(
        &params,
        &wallet.fvk,
        &wallet.spend_key,
        &sets,
        &[snapshot_root(old), snapshot_root(new)],
        &[first, second],
        FEE,
        &outputs,
        &mut rng,
    )
    .expect("Generating a balanced spend transaction is not allowed to fail.");
    assert!(transaction.verify(&params, &sets));
    sets.remove(&snapshot_root(new));
    assert_eq!(
        transaction.check(&params, &sets),
        Err(ValidationError::UnknownRoot.into()),
        "A transaction referencing a pruned set should be rejected."
    );
}

/// Checks that output values outside the configured range are rejected at generation.
#[test]
fn range_is_enforced() {
    let mut rng = ChaCha20Rng::from_seed([7; 32]);
    let mut config = Network::Regtest.config();
    config.value_bits = 8;
    let params = Params::with_shape(config).expect("The shape is valid.");
    let wallet = Wallet::new(&params, &mut rng);
    let coins = (0..4)
        .map(|i| {
            let output = OutputCoinData::new(wallet.ivk.address(&params, i), 200, Vec::new());
            Coin::mint(&params, CoinType::Mint, &output, b"block", &mut rng)
                .expect("Minting a valid coin is not allowed to fail.")
        })
        .collect::<Vec<_>>();
    let inputs = [
        wallet.input(&params, &coins, 0),
        wallet.input(&params, &coins, 1),
    ];
    let root = snapshot_root(&coins);
    let outputs = [OutputCoinData::new(wallet.ivk.address(&params, 9), 400 - FEE, Vec::new())];
    assert_eq!(
        SpendTransaction::generate(
            &params,
            &wallet.fvk,
            &wallet.spend_key,
            coins.as_slice(),
            &[root, root],
            &inputs,
            FEE,
            &outputs,
            &mut rng,
        ),
        Err(ValidationError::ValueOutOfRange.into())
    );
    let outputs = [
        OutputCoinData::new(wallet.ivk.address(&params, 9), 200, Vec::new()),
        OutputCoinData::new(wallet.ivk.address(&params, 10), 200 - FEE, Vec::new()),
    ];
    let transaction = SpendTransaction::generate(
        &params,
        &wallet.fvk,
        &wallet.spend_key,
        coins.as_slice(),
        &[root, root],
        &inputs,
        FEE,
        &outputs,
        &mut rng,
    )
    .expect("Generating an in-range spend transaction is not allowed to fail.");
    assert!(transaction.verify(&params, coins.as_slice()));
    assert_eq!(
        transaction.check(&Params::new(Network::Regtest), coins.as_slice())
            .map_err(|err| matches!(err, Error::Validation(_) | Error::Range)),
        Err(true),
        "Parameters with a different range should reject the transaction."
    );
}
