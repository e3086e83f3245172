//! Fixed-answer GA4 source for router tests and demo mode.
//!
//! Reports are keyed by the request's comma-joined dimension list, falling
//! back to its first dimension alone (`""` for the dimensionless site
//! totals). Unknown reports answer with no rows.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{Ga4ReportSource, ReportRequest, ReportRow};
use crate::error::{ReportingError, Result};

#[derive(Debug, Default)]
struct CannedState {
    reports: HashMap<String, Vec<ReportRow>>,
    requests: Vec<ReportRequest>,
    failure: Option<String>,
}

/// Cloneable handle; clones share reports and the request log
#[derive(Debug, Clone, Default)]
pub struct CannedReportSource {
    state: Arc<Mutex<CannedState>>,
}

fn lookup<'a>(
    reports: &'a HashMap<String, Vec<ReportRow>>,
    request: &ReportRequest,
) -> Option<&'a Vec<ReportRow>> {
    reports.get(&request.dimensions.join(",")).or_else(|| {
        let first = request.dimensions.first().copied().unwrap_or_default();
        reports.get(first)
    })
}

impl CannedReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key` is either the request's first dimension or all of them joined
    /// with commas
    pub fn with_report(self, key: &str, rows: Vec<ReportRow>) -> Self {
        self.with_state(|state| {
            state.reports.insert(key.to_string(), rows);
        });
        self
    }

    /// Fail every subsequent report with an upstream error
    pub fn set_failure(&self, message: Option<&str>) {
        self.with_state(|state| state.failure = message.map(str::to_string));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ReportRequest> {
        self.with_state(|state| state.requests.clone())
    }

    fn with_state<T>(&self, apply: impl FnOnce(&mut CannedState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut state)
    }
}

#[async_trait]
impl Ga4ReportSource for CannedReportSource {
    async fn run_report(&self, request: &ReportRequest) -> Result<Vec<ReportRow>> {
        self.with_state(|state| {
            state.requests.push(request.clone());
            if let Some(message) = &state.failure {
                return Err(ReportingError::Upstream(message.clone()));
            }
            Ok(lookup(&state.reports, request).cloned().unwrap_or_default())
        })
    }
}
