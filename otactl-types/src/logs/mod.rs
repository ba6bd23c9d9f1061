// otactl/otactl-types/src/logs/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

use serde_json::Value;

/// One row of the backend log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    /// 1-based position after reversal; the newest entry is row 1.
    pub index: usize,
    pub message: String,
}

/// Builds the log table from the backend's chronological log list.
pub fn log_rows(logs: &[Value]) -> Vec<LogRow> {
    logs.iter()
        .rev()
        .enumerate()
        .map(|(i, entry)| LogRow {
            index: i + 1,
            message: match entry {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}
