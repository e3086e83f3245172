//! PostgreSQL implementation of [`SalesSource`].
//!
//! Each session owns one pooled connection for the lifetime of a request.
//! Dropping the session returns the connection to the pool, whichever way
//! the tile exits.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use tracing::debug;

use super::connection::{create_lazy_pool, health_check};
use super::sales_queries::*;
use crate::config::{BudgetConfig, DatabaseConfig};
use crate::engine::Period;
use crate::error::{ReportingError, Result};
use crate::source::{
    ActivationCounts, AttemptCounts, BusinessDays, DailyActivations, DailyAttempts, HourlyCut,
    MonthlyGoals, SalesSession, SalesSource,
};

#[derive(Clone)]
pub struct PgSalesSource {
    /// `None` when no database URL was configured
    pool: Option<PgPool>,
    budget: BudgetConfig,
}

impl std::fmt::Debug for PgSalesSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSalesSource")
            .field("configured", &self.pool.is_some())
            .field("pool_size", &self.pool.as_ref().map(PgPool::size))
            .field("manager", &self.budget.manager)
            .finish()
    }
}

impl PgSalesSource {
    pub fn new(pool: PgPool, budget: BudgetConfig) -> Self {
        Self {
            pool: Some(pool),
            budget,
        }
    }

    /// Build from configuration. A missing URL is not an error here; every
    /// `open()` reports it instead.
    pub fn from_config(database: &DatabaseConfig, budget: &BudgetConfig) -> Result<Self> {
        let pool = match database.url {
            Some(_) => Some(create_lazy_pool(database)?),
            None => None,
        };
        Ok(Self {
            pool,
            budget: budget.clone(),
        })
    }

    fn pool(&self) -> Result<&PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            ReportingError::configuration("database.url is not set (POSPAGO__DATABASE__URL)")
        })
    }
}

#[async_trait]
impl SalesSource for PgSalesSource {
    async fn open(&self) -> Result<Box<dyn SalesSession>> {
        let conn = self.pool()?.acquire().await?;
        debug!("Acquired sales database connection");
        Ok(Box::new(PgSalesSession {
            conn,
            budget: self.budget.clone(),
        }))
    }

    async fn ping(&self) -> Result<()> {
        if health_check(self.pool()?).await? {
            Ok(())
        } else {
            Err(ReportingError::Database("health check returned an unexpected value".to_string()))
        }
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

pub struct PgSalesSession {
    conn: PoolConnection<Postgres>,
    budget: BudgetConfig,
}

fn year_month(period: Period) -> (i32, i32) {
    (period.year(), period.month() as i32)
}

#[async_trait]
impl SalesSession for PgSalesSession {
    async fn monthly_goals(&mut self, period: Period) -> Result<Option<MonthlyGoals>> {
        let row = sqlx::query_as::<_, MonthlyGoalsRow>(MONTHLY_GOALS_SQL)
            .bind(&self.budget.product)
            .bind(&self.budget.manager)
            .bind(&self.budget.ecommerce_channel)
            .bind(&self.budget.ctw_channel)
            .bind(period.first_day())
            .bind(period.next_first_day())
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn monthly_activations(&mut self, period: Period) -> Result<Option<ActivationCounts>> {
        let (year, month) = year_month(period);
        let row = sqlx::query_as::<_, ActivationsRow>(MONTHLY_ACTIVATIONS_SQL)
            .bind(year)
            .bind(month)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn monthly_attempts(&mut self, period: Period) -> Result<Option<AttemptCounts>> {
        let (year, month) = year_month(period);
        let row = sqlx::query_as::<_, AttemptsRow>(MONTHLY_ATTEMPTS_SQL)
            .bind(year)
            .bind(month)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn business_days(&mut self, period: Period) -> Result<Option<BusinessDays>> {
        let (year, month) = year_month(period);
        let row = sqlx::query_as::<_, BusinessDaysRow>(BUSINESS_DAYS_SQL)
            .bind(year)
            .bind(month)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn daily_activations(&mut self, period: Period) -> Result<Vec<DailyActivations>> {
        let rows = sqlx::query_as::<_, DailyActivationsRow>(DAILY_ACTIVATIONS_SQL)
            .bind(period.first_day())
            .bind(period.next_first_day())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn daily_attempts(&mut self, period: Period) -> Result<Vec<DailyAttempts>> {
        let rows = sqlx::query_as::<_, DailyAttemptsRow>(DAILY_ATTEMPTS_SQL)
            .bind(period.first_day())
            .bind(period.next_first_day())
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn activations_on(&mut self, date: NaiveDate) -> Result<Option<ActivationCounts>> {
        let row = sqlx::query_as::<_, DailyActivationsRow>(ACTIVATIONS_ON_SQL)
            .bind(date)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(|day| day.counts.into()))
    }

    async fn attempts_on(&mut self, date: NaiveDate) -> Result<Option<AttemptCounts>> {
        let row = sqlx::query_as::<_, DailyAttemptsRow>(ATTEMPTS_ON_SQL)
            .bind(date)
            .fetch_optional(&mut *self.conn)
            .await?;
        Ok(row.map(|day| day.counts.into()))
    }

    async fn hourly_cuts_today(&mut self) -> Result<Vec<HourlyCut>> {
        let rows = sqlx::query_as::<_, HourlyCutRow>(HOURLY_CUTS_TODAY_SQL)
            .fetch_all(&mut *self.conn)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
