//! TamperChain - A tamper-evident, hash-linked append-only ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, and chain validation
//! - [`crypto`] - Block digests and canonical payload encoding
//! - [`shared`] - Lock-guarded handle for multi-threaded callers
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - Table and banner rendering for the command-line tools
//!
//! # Example
//!
//! ```
//! use tamperchain::blockchain::Ledger;
//!
//! let mut ledger = Ledger::new();
//! ledger.append("A", "2024-01-01T00:00:00.000Z")?;
//! assert!(ledger.is_valid());
//!
//! ledger.corrupt_block(1, "X", false)?;
//! assert!(!ledger.is_valid());
//! # Ok::<(), tamperchain::ChainError>(())
//! ```

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod crypto;
pub mod shared;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;

pub use blockchain::{Block, ChainFault, Ledger, ValidationReport};
pub use crypto::Digest;
pub use error::{ChainError, Result};
pub use shared::SharedLedger;
