//! Shared fixtures for unit tests

use crate::core::transaction::{Transaction, BLOCK_REWARD};
use crate::crypto::{KeyPair, PubKeyHash};
use crate::storage::MemoryLedger;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Ledger holding `count` coinbase outputs owned by `kp`
pub fn funded_ledger(kp: &KeyPair, count: usize) -> (MemoryLedger, Vec<Transaction>) {
    init_logger();
    let hash = PubKeyHash(kp.public_key_hash());
    let mut ledger = MemoryLedger::new();
    let mut coinbases = Vec::with_capacity(count);

    for i in 0..count {
        let data = format!("block {}", i);
        let coinbase = Transaction::coinbase(hash, BLOCK_REWARD, data.as_bytes(), 1_000 + i as i64);
        ledger
            .accept(coinbase.clone())
            .expect("coinbase is always accepted");
        coinbases.push(coinbase);
    }

    (ledger, coinbases)
}
