//! Verification engine
//!
//! Recomputes each input's digest independently and checks that
//! - the signature and public key have the fixed-width layout,
//! - the public key hashes to the locking hash of the spent output,
//! - the signature verifies under that key.

use crate::crypto::{verify_digest, AddressCodec, Base58Check, RawPublicKey, RawSignature};

use super::sighash::{input_sighash, referenced_output};
use super::transaction::{Transaction, TransactionError};
use super::utxo::PriorTransactions;

impl Transaction {
    /// `true` only if every input's signature verifies against its owner
    pub fn verify(&self, prior: &PriorTransactions) -> bool {
        self.verify_with(prior, &Base58Check::default())
    }

    /// As [`Transaction::verify`] with an explicit locking-hash policy
    pub fn verify_with<C: AddressCodec>(&self, prior: &PriorTransactions, codec: &C) -> bool {
        match self.check_signatures_with(prior, codec) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Transaction {} failed verification: {}", self.id, e);
                false
            }
        }
    }

    /// Verify all inputs, reporting the first failure
    pub fn check_signatures(&self, prior: &PriorTransactions) -> Result<(), TransactionError> {
        self.check_signatures_with(prior, &Base58Check::default())
    }

    pub fn check_signatures_with<C: AddressCodec>(
        &self,
        prior: &PriorTransactions,
        codec: &C,
    ) -> Result<(), TransactionError> {
        if self.is_coinbase() {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err(TransactionError::InvalidTransaction(
                "transaction has no inputs".to_string(),
            ));
        }

        for (index, input) in self.inputs.iter().enumerate() {
            let locking_hash = referenced_output(input, prior)?.locking_hash;
            let digest = input_sighash(&mut self.trimmed_copy(), index, &locking_hash);

            let malformed = |source| TransactionError::MalformedSignatureOrKey {
                input: index,
                source,
            };

            let signature = RawSignature::from_slice(&input.signature).map_err(malformed)?;
            let raw_key = RawPublicKey::from_slice(&input.public_key).map_err(malformed)?;

            if codec.public_key_to_locking_hash(raw_key.as_bytes()) != locking_hash {
                return Err(TransactionError::OwnerMismatch { input: index });
            }

            let public_key = raw_key.to_public_key().map_err(malformed)?;
            if !verify_digest(&public_key, &digest, &signature).map_err(malformed)? {
                return Err(TransactionError::InvalidSignature { input: index });
            }
        }

        log::debug!("Transaction {} verified ({} inputs)", self.id, self.inputs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{TxId, TxInput, TxOutput, BLOCK_REWARD};
    use crate::crypto::{KeyError, KeyPair, PubKeyHash, PUBLIC_KEY_LEN, SIGNATURE_LEN};
    use crate::test_utils::init_logger;

    /// `count` coinbase outputs owned by `kp`, and a signed spend of all of them
    fn signed_spend(kp: &KeyPair, count: usize) -> (PriorTransactions, Transaction) {
        let hash = PubKeyHash(kp.public_key_hash());
        let mut prior = PriorTransactions::new();
        let mut inputs = Vec::new();

        for i in 0..count {
            let coinbase = Transaction::coinbase(hash, BLOCK_REWARD, &[i as u8], 100 + i as i64);
            inputs.push(TxInput::spending(
                coinbase.id,
                0,
                kp.raw_public_key().as_bytes().to_vec(),
            ));
            prior.insert(coinbase.id, coinbase);
        }

        let mut tx = Transaction::new(
            inputs,
            vec![
                TxOutput::new(BLOCK_REWARD, PubKeyHash([0x42; 20])),
                TxOutput::new((count as u64 - 1) * BLOCK_REWARD, hash),
            ],
            500,
        );
        tx.sign(&kp.secret_key, &prior).unwrap();
        (prior, tx)
    }

    #[test]
    fn test_coinbase_always_verifies() {
        let tx = Transaction::coinbase(PubKeyHash([1; 20]), BLOCK_REWARD, b"genesis", 0);
        assert!(tx.verify(&PriorTransactions::new()));
    }

    #[test]
    fn test_sign_then_verify() {
        init_logger();
        let kp = KeyPair::generate();
        for count in 1..=4 {
            let (prior, tx) = signed_spend(&kp, count);
            assert!(tx.verify(&prior), "{} inputs", count);
        }
    }

    #[test]
    fn test_flipped_signature_byte_fails() {
        let kp = KeyPair::generate();
        let (prior, tx) = signed_spend(&kp, 2);

        for input in 0..tx.inputs.len() {
            for byte in [0, 31, 32, SIGNATURE_LEN - 1] {
                let mut tampered = tx.clone();
                tampered.inputs[input].signature[byte] ^= 0x01;
                assert!(!tampered.verify(&prior), "input {} byte {}", input, byte);
            }
        }
    }

    #[test]
    fn test_mutated_output_fails() {
        let kp = KeyPair::generate();
        let (prior, tx) = signed_spend(&kp, 2);

        let mut more_value = tx.clone();
        more_value.outputs[0].value += 1;
        assert_eq!(
            more_value.check_signatures(&prior),
            Err(TransactionError::InvalidSignature { input: 0 })
        );

        let mut redirected = tx.clone();
        redirected.outputs[0].locking_hash = PubKeyHash([0x66; 20]);
        assert!(!redirected.verify(&prior));

        let mut later = tx;
        later.timestamp += 1;
        assert!(!later.verify(&prior));
    }

    #[test]
    fn test_reordered_inputs_fail() {
        let kp = KeyPair::generate();
        let (prior, mut tx) = signed_spend(&kp, 2);
        tx.inputs.swap(0, 1);
        assert!(!tx.verify(&prior));
    }

    #[test]
    fn test_missing_prior_transaction() {
        let kp = KeyPair::generate();
        let (mut prior, tx) = signed_spend(&kp, 1);
        let prev = tx.inputs[0].prev_tx_id.unwrap();
        prior.remove(&prev);

        assert!(!tx.verify(&prior));
        assert_eq!(
            tx.check_signatures(&prior),
            Err(TransactionError::MissingPriorTransaction(prev))
        );
    }

    #[test]
    fn test_malformed_lengths_rejected() {
        let kp = KeyPair::generate();
        let (prior, tx) = signed_spend(&kp, 1);

        let mut short_sig = tx.clone();
        short_sig.inputs[0].signature.pop();
        assert_eq!(
            short_sig.check_signatures(&prior),
            Err(TransactionError::MalformedSignatureOrKey {
                input: 0,
                source: KeyError::InvalidLength {
                    what: "signature",
                    expected: SIGNATURE_LEN,
                    got: SIGNATURE_LEN - 1,
                },
            })
        );

        // an even but wrong length must not be halved and accepted
        let mut padded_sig = tx.clone();
        padded_sig.inputs[0].signature.extend_from_slice(&[0, 0]);
        assert!(!padded_sig.verify(&prior));

        let mut unsigned = tx.clone();
        unsigned.inputs[0].signature.clear();
        assert!(matches!(
            unsigned.check_signatures(&prior),
            Err(TransactionError::MalformedSignatureOrKey { input: 0, .. })
        ));

        let mut compressed_key = tx.clone();
        compressed_key.inputs[0].public_key = kp.public_key.serialize().to_vec();
        assert!(matches!(
            compressed_key.check_signatures(&prior),
            Err(TransactionError::MalformedSignatureOrKey {
                source: KeyError::InvalidLength {
                    what: "public key",
                    expected: PUBLIC_KEY_LEN,
                    got: 33,
                },
                ..
            })
        ));
    }

    #[test]
    fn test_key_of_another_owner_rejected() {
        // a thief signs with their own key and declares it: the signature is
        // valid but the key does not own the output
        let owner = KeyPair::generate();
        let thief = KeyPair::generate();
        let (prior, mut tx) = signed_spend(&owner, 1);

        tx.inputs[0].public_key = thief.raw_public_key().as_bytes().to_vec();
        tx.sign(&thief.secret_key, &prior).unwrap();

        assert_eq!(
            tx.check_signatures(&prior),
            Err(TransactionError::OwnerMismatch { input: 0 })
        );
    }

    #[test]
    fn test_owner_key_with_foreign_signature_rejected() {
        let owner = KeyPair::generate();
        let other = KeyPair::generate();
        let (prior, mut tx) = signed_spend(&owner, 1);

        // declared key is right, signature made by someone else
        tx.sign(&other.secret_key, &prior).unwrap();
        assert_eq!(
            tx.check_signatures(&prior),
            Err(TransactionError::InvalidSignature { input: 0 })
        );
    }

    #[test]
    fn test_non_coinbase_without_inputs_rejected() {
        let tx = Transaction::new(vec![], vec![TxOutput::new(1, PubKeyHash([1; 20]))], 0);
        assert!(!tx.verify(&PriorTransactions::new()));
    }

    #[test]
    fn test_verification_does_not_mutate() {
        let kp = KeyPair::generate();
        let (prior, tx) = signed_spend(&kp, 2);
        let before = tx.clone();
        assert!(tx.verify(&prior));
        assert_eq!(tx, before);
        assert_ne!(tx.id, TxId::default());
    }
}
