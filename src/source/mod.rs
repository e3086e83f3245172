//! # Sales Data Source
//!
//! The seam between the engine and the sales database. A [`SalesSource`]
//! hands out one [`SalesSession`] per request; the session answers raw fact
//! queries and nothing else. Goals, calendars and counters come back exactly
//! as stored, and every derived number is computed by [`crate::engine`].
//!
//! Sessions release their underlying resources when dropped, so a tile that
//! returns early (empty result or error) still gives its connection back.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::Period;
use crate::error::Result;

pub use memory::InMemorySalesSource;

/// Budget sums for one month, restricted to the configured product, manager
/// and channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGoals {
    pub total: f64,
    pub migration: f64,
    pub portability: f64,
    pub portability_ecommerce: f64,
    pub click_to_chat: f64,
    pub new_line: f64,
}

/// Activated sales (R5)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCounts {
    pub total: i64,
    pub migration: i64,
    pub portability: i64,
    pub click_to_chat: i64,
    pub new_line: i64,
}

impl ActivationCounts {
    /// Portability activations not attributed to click-to-chat
    pub fn portability_ecommerce(&self) -> i64 {
        self.portability - self.click_to_chat
    }
}

/// Attempted sales (V9, "cantadas")
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounts {
    pub total: i64,
    pub migration: i64,
    pub portability: i64,
    pub new_line: i64,
}

/// Business days of a month as reported by the calendar view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessDays {
    pub total: f64,
    pub elapsed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivations {
    pub date: NaiveDate,
    pub counts: ActivationCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttempts {
    pub date: NaiveDate,
    pub counts: AttemptCounts,
}

/// Attempts registered during one hour of the current day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCut {
    pub hour: i32,
    pub attempts: i64,
    pub migration: i64,
    pub portability: i64,
    pub new_line: i64,
}

/// Factory for request-scoped sessions
#[async_trait]
pub trait SalesSource: Send + Sync + std::fmt::Debug {
    /// Acquire a session; fails with a configuration or database error
    async fn open(&self) -> Result<Box<dyn SalesSession>>;

    /// Cheap connectivity probe used by the readiness endpoint
    async fn ping(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Raw fact queries over one acquired connection
#[async_trait]
pub trait SalesSession: Send {
    /// `None` when no budget rows match the period
    async fn monthly_goals(&mut self, period: Period) -> Result<Option<MonthlyGoals>>;

    async fn monthly_activations(&mut self, period: Period) -> Result<Option<ActivationCounts>>;

    async fn monthly_attempts(&mut self, period: Period) -> Result<Option<AttemptCounts>>;

    async fn business_days(&mut self, period: Period) -> Result<Option<BusinessDays>>;

    /// Ascending by date
    async fn daily_activations(&mut self, period: Period) -> Result<Vec<DailyActivations>>;

    /// Ascending by date
    async fn daily_attempts(&mut self, period: Period) -> Result<Vec<DailyAttempts>>;

    async fn activations_on(&mut self, date: NaiveDate) -> Result<Option<ActivationCounts>>;

    async fn attempts_on(&mut self, date: NaiveDate) -> Result<Option<AttemptCounts>>;

    async fn hourly_cuts_today(&mut self) -> Result<Vec<HourlyCut>>;
}
