// otactl/src/display/mod.rs
//
// Copyright (c) 2025 Otactl Team
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE>
// or the MIT license <LICENSE-MIT>, at your option.
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Terminal rendering of backend responses, the log table and status notices.
//!
//! Every render writes one complete block that replaces whatever the operator
//! saw before; there is no incremental update of a previous block.

use std::io::{self, Write};

use serde_json::Value;

use otactl_types::logs::log_rows;
use otactl_types::Endpoint;

pub struct Panel {
    out: Box<dyn Write + Send>,
}

impl Panel {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Pretty-printed response block.
    pub fn render_response(&mut self, endpoint: &Endpoint, response: &Value) -> io::Result<()> {
        let body = serde_json::to_string_pretty(response)?;
        self.block(&format!("Response: {}", endpoint), &body)
    }

    /// Single-line response block, used for drive update data.
    pub fn render_response_compact(
        &mut self,
        endpoint: &Endpoint,
        response: &Value,
    ) -> io::Result<()> {
        self.block(&format!("Response: {}", endpoint), &response.to_string())
    }

    /// Log table, newest entry first.
    pub fn render_logs(&mut self, logs: &[Value]) -> io::Result<()> {
        let rows = log_rows(logs);
        let body = if rows.is_empty() {
            "(no log entries)".to_string()
        } else {
            rows.iter()
                .map(|row| format!("{:>4}  {}", row.index, row.message))
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.block("Logs", &body)
    }

    pub fn render_notice(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "! {}", message)?;
        self.out.flush()
    }

    pub fn render_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "[{}]", label)?;
        self.out.flush()
    }

    pub fn block(&mut self, title: &str, body: &str) -> io::Result<()> {
        writeln!(self.out, "== {} ==", title)?;
        writeln!(self.out, "{}", body)?;
        self.out.flush()
    }
}
