//! Thread-safe handle to a single ledger.
//!
//! Writers (append, corrupt) are serialized behind the write half of a
//! `parking_lot::RwLock`; validation runs under the read half, so it never
//! observes a block list mid-append.

use crate::blockchain::{Block, Ledger, ValidationReport};
use crate::error::Result;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Appends and returns a copy of the new tail block.
    pub fn append<T: Serialize + ?Sized>(
        &self,
        data: &T,
        timestamp: impl Into<String>,
    ) -> Result<Block> {
        let mut ledger = self.inner.write();
        let block = ledger.append(data, timestamp)?.clone();
        Ok(block)
    }

    pub fn append_now<T: Serialize + ?Sized>(&self, data: &T) -> Result<Block> {
        let mut ledger = self.inner.write();
        let block = ledger.append_now(data)?.clone();
        Ok(block)
    }

    pub fn corrupt_block<T: Serialize + ?Sized>(
        &self,
        position: u64,
        new_data: &T,
        rehash: bool,
    ) -> Result<()> {
        self.inner.write().corrupt_block(position, new_data, rehash)
    }

    pub fn validate(&self) -> ValidationReport {
        self.inner.read().validate()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Owned copy of the ledger, detached from later writes.
    pub fn snapshot(&self) -> Ledger {
        self.inner.read().clone()
    }

    /// Runs `f` against the ledger under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
