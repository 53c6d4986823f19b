//! Session report generation.

use chrono::{DateTime, Utc};
use kfx_core::types::{OrderReceipt, Side, Signal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::engine::{Outcome, SymbolOutcome};

/// Receipts and rejections kept for the summary. Counters are unbounded.
pub const RECENT_ORDERS: usize = 500;

/// An order the sink refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub symbol: String,
    pub side: Side,
    pub reason: String,
}

/// Counters for one engine session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Completed evaluation cycles
    pub cycles: u64,
    /// Symbols the evaluator looked at
    pub evaluations: u64,
    /// Symbols skipped before evaluation
    pub skipped: u64,
    pub buy_signals: u64,
    pub sell_signals: u64,
    /// No-signal outcomes keyed by reason kind
    pub abstentions: BTreeMap<String, u64>,
    pub orders_accepted: u64,
    pub orders_rejected: u64,
    /// Signals that never reached the sink
    pub orders_not_sent: u64,
    /// Most recent executions, oldest first
    pub receipts: VecDeque<OrderReceipt>,
    /// Most recent refusals, oldest first
    pub rejections: VecDeque<Rejection>,
}

impl SessionReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            cycles: 0,
            evaluations: 0,
            skipped: 0,
            buy_signals: 0,
            sell_signals: 0,
            abstentions: BTreeMap::new(),
            orders_accepted: 0,
            orders_rejected: 0,
            orders_not_sent: 0,
            receipts: VecDeque::new(),
            rejections: VecDeque::new(),
        }
    }

    /// Count one per-symbol outcome.
    pub fn record(&mut self, outcome: &SymbolOutcome) {
        if let Some(signal) = &outcome.signal {
            self.evaluations += 1;
            match signal {
                Signal::Buy(_) => self.buy_signals += 1,
                Signal::Sell(_) => self.sell_signals += 1,
                Signal::None(reason) => {
                    *self.abstentions.entry(reason.kind().to_string()).or_insert(0) += 1;
                }
            }
        }

        match &outcome.outcome {
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::NoOrder => {}
            Outcome::NotSent { .. } => self.orders_not_sent += 1,
            Outcome::Executed(receipt) => {
                self.orders_accepted += 1;
                push_recent(&mut self.receipts, receipt.clone());
            }
            Outcome::Rejected { side, reason } => {
                self.orders_rejected += 1;
                push_recent(
                    &mut self.rejections,
                    Rejection {
                        symbol: outcome.symbol.clone(),
                        side: *side,
                        reason: reason.clone(),
                    },
                );
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn abstentions_total(&self) -> u64 {
        self.abstentions.values().sum()
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                      SESSION REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("CYCLES\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Started:             {}\n", self.started_at));
        if let Some(finished) = self.finished_at {
            s.push_str(&format!("  Finished:            {}\n", finished));
        }
        s.push_str(&format!("  Cycles:              {}\n", self.cycles));
        s.push_str(&format!("  Evaluations:         {}\n", self.evaluations));
        s.push_str(&format!("  Skipped Symbols:     {}\n", self.skipped));
        s.push('\n');

        s.push_str("SIGNALS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Buy:                 {}\n", self.buy_signals));
        s.push_str(&format!("  Sell:                {}\n", self.sell_signals));
        s.push_str(&format!("  None:                {}\n", self.abstentions_total()));
        for (kind, count) in &self.abstentions {
            s.push_str(&format!("    {:<18} {}\n", format!("{}:", kind), count));
        }
        s.push('\n');

        s.push_str("ORDERS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Accepted:            {}\n", self.orders_accepted));
        s.push_str(&format!("  Rejected:            {}\n", self.orders_rejected));
        s.push_str(&format!("  Not Sent:            {}\n", self.orders_not_sent));
        for receipt in &self.receipts {
            s.push_str(&format!(
                "    #{} {} {} {} @ {}\n",
                receipt.ticket, receipt.symbol, receipt.side, receipt.volume, receipt.price
            ));
        }
        for rejection in &self.rejections {
            s.push_str(&format!(
                "    {} {} refused: {}\n",
                rejection.symbol, rejection.side, rejection.reason
            ));
        }
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn push_recent<T>(items: &mut VecDeque<T>, item: T) {
    if items.len() == RECENT_ORDERS {
        items.pop_front();
    }
    items.push_back(item);
}

impl Default for SessionReport {
    fn default() -> Self {
        Self::new()
    }
}
