//! Diagnostic sink
//!
//! Every caught failure ends up here. Nothing is retried or surfaced beyond
//! this point; the poll loop simply carries on.

use std::collections::VecDeque;

use crate::error::DashError;

/// Receives failures caught at an operation boundary
pub trait DiagnosticSink {
    /// Record a failure; `context` names the operation that failed
    fn report(&mut self, context: &str, error: &DashError);
}

/// Logs failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, context: &str, error: &DashError) {
        tracing::warn!(context, transport = error.is_transport(), "{}", error);
    }
}

/// Number of reports a [`RecordingSink`] keeps by default
pub const DEFAULT_REPORT_LIMIT: usize = 32;

/// Logs failures and keeps the most recent ones as text, newest last
#[derive(Debug, Clone)]
pub struct RecordingSink {
    /// `(context, message)` pairs, oldest first
    pub reports: VecDeque<(String, String)>,
    limit: usize,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::with_limit(DEFAULT_REPORT_LIMIT)
    }
}

impl RecordingSink {
    /// Sink that keeps at most `limit` reports
    pub fn with_limit(limit: usize) -> Self {
        Self {
            reports: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Number of reports kept
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Most recent report
    pub fn last(&self) -> Option<&(String, String)> {
        self.reports.back()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&mut self, context: &str, error: &DashError) {
        tracing::warn!(context, transport = error.is_transport(), "{}", error);
        if self.reports.len() == self.limit {
            self.reports.pop_front();
        }
        self.reports.push_back((context.to_string(), error.to_string()));
    }
}
