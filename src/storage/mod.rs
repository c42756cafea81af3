//! Storage module: reference in-memory ledger

pub mod ledger;

pub use ledger::MemoryLedger;
