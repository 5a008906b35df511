use crate::blockchain::core::validation::{validate_chain, ValidationReport};
use crate::crypto::{block_digest, encode_value, payload_value, Digest};
use crate::error::{ChainError, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const GENESIS_DATA: &str = "Genesis Block";
pub const GENESIS_TIMESTAMP: &str = "01/01/2023";

/// One record of the ledger. The hash is fixed at construction time and is
/// only ever recomputed through [`Ledger::corrupt_block`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: String,
    data: Value,
    previous_hash: Digest,
    hash: Digest,
}

impl Block {
    pub fn new(index: u64, timestamp: impl Into<String>, data: Value, previous_hash: Digest) -> Self {
        let mut block = Block {
            index,
            timestamp: timestamp.into(),
            data,
            previous_hash,
            hash: Digest::ZERO,
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Builds a block from any serializable payload.
    pub fn with_payload<T: Serialize + ?Sized>(
        index: u64,
        timestamp: impl Into<String>,
        data: &T,
        previous_hash: Digest,
    ) -> Result<Self> {
        let data = payload_value(data)?;
        Ok(Block::new(index, timestamp, data, previous_hash))
    }

    pub fn genesis(timestamp: impl Into<String>) -> Self {
        Block::new(0, timestamp, Value::from(GENESIS_DATA), Digest::ZERO)
    }

    /// Hash of the block's current content. Differs from [`Block::hash`]
    /// once the payload has been changed without a rehash.
    pub fn calculate_hash(&self) -> Digest {
        block_digest(
            self.index,
            &self.previous_hash,
            &self.timestamp,
            &encode_value(&self.data),
        )
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

/// Current time in the form appended blocks carry by default.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Hash-linked chain of blocks, owned from genesis to tail.
///
/// The chain always holds at least the genesis block. Validity is never
/// stored; every call to [`Ledger::validate`] walks the current contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_genesis_timestamp(GENESIS_TIMESTAMP)
    }

    pub fn with_genesis_timestamp(timestamp: impl Into<String>) -> Self {
        let genesis = Block::genesis(timestamp);
        info!("Created ledger with genesis {}", genesis.hash().short());
        Ledger { blocks: vec![genesis] }
    }

    /// Rebuilds a ledger from an arbitrary block list. The blocks are taken
    /// as they are, so a broken chain stays broken until validated.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        Ok(Ledger { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Block at `position` in the chain.
    pub fn block(&self, position: u64) -> Option<&Block> {
        usize::try_from(position).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn tail(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Appends `data` as a new tail block linked to the current tail.
    ///
    /// On a serialization failure nothing is appended.
    pub fn append<T: Serialize + ?Sized>(
        &mut self,
        data: &T,
        timestamp: impl Into<String>,
    ) -> Result<&Block> {
        let tail = self.tail();
        let block = Block::with_payload(tail.index() + 1, timestamp, data, *tail.hash())?;
        debug!(
            "Appended block {} ({} -> {})",
            block.index(),
            block.previous_hash().short(),
            block.hash().short()
        );
        self.blocks.push(block);
        Ok(self.tail())
    }

    /// Like [`Ledger::append`], stamping the block with the current UTC time.
    pub fn append_now<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<&Block> {
        self.append(data, now_timestamp())
    }

    /// Overwrites the payload of the block at `position`, simulating an
    /// out-of-band edit.
    ///
    /// With `rehash` the edited block's own hash is refreshed, the way an
    /// attacker covering their tracks would; no other block is touched, so
    /// the successor keeps its now-stale `previous_hash`.
    pub fn corrupt_block<T: Serialize + ?Sized>(
        &mut self,
        position: u64,
        new_data: &T,
        rehash: bool,
    ) -> Result<()> {
        let data = payload_value(new_data)?;
        let block = usize::try_from(position)
            .ok()
            .and_then(|i| self.blocks.get_mut(i))
            .ok_or(ChainError::BlockNotFound(position))?;

        block.data = data;
        if rehash {
            block.hash = block.calculate_hash();
        }
        info!(
            "Corrupted block {} (rehash = {}, stored hash {})",
            position,
            rehash,
            block.hash.short()
        );
        Ok(())
    }

    pub fn validate(&self) -> ValidationReport {
        let report = validate_chain(&self.blocks);
        if let Some(fault) = report.fault() {
            warn!("Ledger failed validation: {}", fault);
        }
        report
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_valid()
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
