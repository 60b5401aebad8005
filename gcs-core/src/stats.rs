//! Build statistics reported after a filter is finalized.

use serde::{Deserialize, Serialize};

use crate::params::{FilterParams, HEADER_SIZE};

/// Summary of a finished filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
    pub n: u32,
    pub p: u32,
    /// Items passed to `add`, duplicates included
    pub items_added: u64,
    /// Distinct non-sentinel hash values, i.e. deltas written
    pub encoded_deltas: u64,
    pub payload_bytes: u64,
    pub filter_bytes: u64,
    pub bits_per_item: f64,
    pub false_positive_rate: f64,
}

impl FilterInfo {
    pub fn new(params: &FilterParams, items_added: u64, encoded_deltas: u64, payload_bytes: u64) -> Self {
        let filter_bytes = payload_bytes + HEADER_SIZE as u64;
        let bits_per_item = if items_added == 0 {
            0.0
        } else {
            (filter_bytes * 8) as f64 / items_added as f64
        };

        Self {
            n: params.n(),
            p: params.p(),
            items_added,
            encoded_deltas,
            payload_bytes,
            filter_bytes,
            bits_per_item,
            false_positive_rate: params.false_positive_rate(),
        }
    }
}

/// Filter size for display: plain bytes below 1 KiB, else two decimals
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
