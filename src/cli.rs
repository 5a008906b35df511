//! Rendering helpers shared by the command-line tools.

use crate::blockchain::{Block, Ledger, ValidationReport};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Color as TableColor;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::Value;

pub const VALID_BANNER: &str = "Blockchain is Valid";
pub const INVALID_BANNER: &str = "Warning: Blockchain Integrity Compromised";

/// Per-block integrity as shown in the chain table. Unlike validation this
/// looks at every block instead of stopping at the first fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Ok,
    ContentMismatch,
    BrokenLink,
}

impl BlockStatus {
    pub fn of(block: &Block, predecessor: Option<&Block>) -> Self {
        if *block.hash() != block.calculate_hash() {
            return BlockStatus::ContentMismatch;
        }
        match predecessor {
            Some(prev) if block.previous_hash() != prev.hash() => BlockStatus::BrokenLink,
            _ => BlockStatus::Ok,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockStatus::Ok => "ok",
            BlockStatus::ContentMismatch => "content mismatch",
            BlockStatus::BrokenLink => "broken link",
        }
    }

    fn color(&self) -> TableColor {
        match self {
            BlockStatus::Ok => TableColor::Green,
            BlockStatus::ContentMismatch => TableColor::Red,
            BlockStatus::BrokenLink => TableColor::Yellow,
        }
    }
}

pub fn block_statuses(ledger: &Ledger) -> Vec<BlockStatus> {
    let blocks = ledger.blocks();
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| BlockStatus::of(block, i.checked_sub(1).map(|p| &blocks[p])))
        .collect()
}

/// Strings are shown bare; anything else as compact JSON.
pub fn display_data(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn render_chain_table(ledger: &Ledger, hash_prefix_len: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Block")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Timestamp")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Data")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Previous Hash")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Hash")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new("Status")
                .fg(TableColor::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

    for (block, status) in ledger.iter().zip(block_statuses(ledger)) {
        let previous = if block.is_genesis() && block.previous_hash().is_zero() {
            "0".to_string()
        } else {
            block.previous_hash().short_with(hash_prefix_len)
        };

        table.add_row(vec![
            Cell::new(format!("#{}", block.index())).fg(TableColor::White),
            Cell::new(block.timestamp()).fg(TableColor::Grey),
            Cell::new(display_data(block.data())).fg(TableColor::White),
            Cell::new(previous).fg(TableColor::Grey),
            Cell::new(block.hash().short_with(hash_prefix_len)).fg(TableColor::White),
            Cell::new(status.label()).fg(status.color()),
        ]);
    }

    table
}

pub fn validity_banner(report: &ValidationReport) -> String {
    match report.fault() {
        None => VALID_BANNER.to_string(),
        Some(fault) => format!("{} ({})", INVALID_BANNER, fault),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_statuses_flag_every_broken_block() {
        let mut ledger = Ledger::new();
        for payload in ["A", "B", "C"] {
            ledger.append(payload, "t").unwrap();
        }
        ledger.corrupt_block(1, "X", true).unwrap();
        ledger.corrupt_block(3, "Y", false).unwrap();

        assert_eq!(
            block_statuses(&ledger),
            vec![
                BlockStatus::Ok,
                BlockStatus::Ok,
                BlockStatus::BrokenLink,
                BlockStatus::ContentMismatch,
            ]
        );
    }

    #[test]
    fn test_display_data() {
        assert_eq!(display_data(&json!("plain text")), "plain text");
        assert_eq!(display_data(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_table_renders_short_hashes() {
        let mut ledger = Ledger::new();
        ledger.append("A", "t").unwrap();

        let rendered = render_chain_table(&ledger, 10).to_string();
        let tail_hash = ledger.tail().hash();
        assert!(rendered.contains(&tail_hash.short_with(10)));
        assert!(!rendered.contains(&tail_hash.to_hex()));
        assert!(rendered.contains("Genesis Block"));
    }

    #[test]
    fn test_validity_banner() {
        let mut ledger = Ledger::new();
        ledger.append("A", "t").unwrap();
        assert_eq!(validity_banner(&ledger.validate()), VALID_BANNER);

        ledger.corrupt_block(1, "X", false).unwrap();
        let banner = validity_banner(&ledger.validate());
        assert!(banner.starts_with(INVALID_BANNER));
        assert!(banner.contains("Block 1"));
    }
}
