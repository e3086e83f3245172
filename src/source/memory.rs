//! In-memory sales source.
//!
//! Backs the router tests and the server's `--demo` mode. It counts live
//! sessions so tests can assert that every tile released its session, and it
//! can be switched into a failing mode to exercise the degraded envelopes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

use super::{
    ActivationCounts, AttemptCounts, BusinessDays, DailyActivations, DailyAttempts, HourlyCut,
    MonthlyGoals, SalesSession, SalesSource,
};
use crate::engine::Period;
use crate::error::{ReportingError, Result};

#[derive(Debug, Default, Clone)]
struct SalesData {
    goals: BTreeMap<Period, MonthlyGoals>,
    monthly_attempts: BTreeMap<Period, AttemptCounts>,
    business_days: BTreeMap<Period, BusinessDays>,
    daily_activations: BTreeMap<NaiveDate, ActivationCounts>,
    daily_attempts: BTreeMap<NaiveDate, AttemptCounts>,
    hourly_cuts: Vec<HourlyCut>,
}

#[derive(Debug, Default)]
struct Shared {
    data: RwLock<SalesData>,
    live_sessions: AtomicUsize,
    opened_sessions: AtomicUsize,
    failing: AtomicBool,
}

/// Cloneable handle; clones share the same data and counters
#[derive(Debug, Clone, Default)]
pub struct InMemorySalesSource {
    shared: Arc<Shared>,
}

impl InMemorySalesSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_goals(self, period: Period, goals: MonthlyGoals) -> Self {
        self.write(|data| {
            data.goals.insert(period, goals);
        });
        self
    }

    pub fn with_business_days(self, period: Period, days: BusinessDays) -> Self {
        self.write(|data| {
            data.business_days.insert(period, days);
        });
        self
    }

    /// Monthly attempts are stored separately from the daily rows, as the
    /// monthly view is not required to equal the sum of the daily one
    pub fn with_monthly_attempts(self, period: Period, attempts: AttemptCounts) -> Self {
        self.write(|data| {
            data.monthly_attempts.insert(period, attempts);
        });
        self
    }

    pub fn with_daily_activations(self, date: NaiveDate, counts: ActivationCounts) -> Self {
        self.write(|data| {
            data.daily_activations.insert(date, counts);
        });
        self
    }

    pub fn with_daily_attempts(self, date: NaiveDate, counts: AttemptCounts) -> Self {
        self.write(|data| {
            data.daily_attempts.insert(date, counts);
        });
        self
    }

    pub fn with_hourly_cut(self, cut: HourlyCut) -> Self {
        self.write(|data| data.hourly_cuts.push(cut));
        self
    }

    /// Make every subsequent query fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }

    /// Sessions opened and not yet dropped
    pub fn live_sessions(&self) -> usize {
        self.shared.live_sessions.load(Ordering::SeqCst)
    }

    pub fn opened_sessions(&self) -> usize {
        self.shared.opened_sessions.load(Ordering::SeqCst)
    }

    fn write(&self, apply: impl FnOnce(&mut SalesData)) {
        // a poisoned lock only means a test panicked mid-write
        let mut data = self
            .shared
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        apply(&mut data);
    }
}

#[async_trait]
impl SalesSource for InMemorySalesSource {
    async fn open(&self) -> Result<Box<dyn SalesSession>> {
        self.shared.live_sessions.fetch_add(1, Ordering::SeqCst);
        let opened = self.shared.opened_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(opened = opened, "Opened in-memory sales session");
        Ok(Box::new(InMemorySession {
            shared: Arc::clone(&self.shared),
        }))
    }

    async fn ping(&self) -> Result<()> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(ReportingError::Database("in-memory source is failing".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct InMemorySession {
    shared: Arc<Shared>,
}

impl InMemorySession {
    fn read<T>(&self, query: &str, select: impl FnOnce(&SalesData) -> T) -> Result<T> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(ReportingError::Database(format!(
                "{query}: connection reset by peer"
            )));
        }
        let data = self
            .shared
            .data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(select(&data))
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        self.shared.live_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

fn month_activations(data: &SalesData, period: Period) -> Option<ActivationCounts> {
    let mut days = data
        .daily_activations
        .range(period.first_day()..period.next_first_day())
        .peekable();
    days.peek()?;
    Some(days.fold(ActivationCounts::default(), |acc, (_, day)| ActivationCounts {
        total: acc.total + day.total,
        migration: acc.migration + day.migration,
        portability: acc.portability + day.portability,
        click_to_chat: acc.click_to_chat + day.click_to_chat,
        new_line: acc.new_line + day.new_line,
    }))
}

#[async_trait]
impl SalesSession for InMemorySession {
    async fn monthly_goals(&mut self, period: Period) -> Result<Option<MonthlyGoals>> {
        self.read("monthly_goals", |data| data.goals.get(&period).copied())
    }

    async fn monthly_activations(&mut self, period: Period) -> Result<Option<ActivationCounts>> {
        self.read("monthly_activations", |data| month_activations(data, period))
    }

    async fn monthly_attempts(&mut self, period: Period) -> Result<Option<AttemptCounts>> {
        self.read("monthly_attempts", |data| {
            data.monthly_attempts.get(&period).copied()
        })
    }

    async fn business_days(&mut self, period: Period) -> Result<Option<BusinessDays>> {
        self.read("business_days", |data| {
            data.business_days.get(&period).copied()
        })
    }

    async fn daily_activations(&mut self, period: Period) -> Result<Vec<DailyActivations>> {
        self.read("daily_activations", |data| {
            data.daily_activations
                .range(period.first_day()..period.next_first_day())
                .map(|(date, counts)| DailyActivations {
                    date: *date,
                    counts: *counts,
                })
                .collect()
        })
    }

    async fn daily_attempts(&mut self, period: Period) -> Result<Vec<DailyAttempts>> {
        self.read("daily_attempts", |data| {
            data.daily_attempts
                .range(period.first_day()..period.next_first_day())
                .map(|(date, counts)| DailyAttempts {
                    date: *date,
                    counts: *counts,
                })
                .collect()
        })
    }

    async fn activations_on(&mut self, date: NaiveDate) -> Result<Option<ActivationCounts>> {
        self.read("activations_on", |data| {
            data.daily_activations.get(&date).copied()
        })
    }

    async fn attempts_on(&mut self, date: NaiveDate) -> Result<Option<AttemptCounts>> {
        self.read("attempts_on", |data| data.daily_attempts.get(&date).copied())
    }

    async fn hourly_cuts_today(&mut self) -> Result<Vec<HourlyCut>> {
        self.read("hourly_cuts_today", |data| data.hourly_cuts.clone())
    }
}
