//! SQL for the sales views and the rows they return.
//!
//! The queries only read raw facts; every percentage, projection and goal
//! split is computed by the engine. Budget filters are bound as parameters
//! (`$1` product, `$2` manager, `$3` ecommerce channel, `$4` click-to-chat
//! channel) rather than inlined.
//!
//! Month filters use half-open date ranges so the views' date indexes apply.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::source::{
    ActivationCounts, AttemptCounts, BusinessDays, DailyActivations, DailyAttempts, HourlyCut,
    MonthlyGoals,
};

/// Budget sums for one month (`$5` first day, `$6` first day of next month)
pub const MONTHLY_GOALS_SQL: &str = r#"
SELECT
    COALESCE(SUM(COALESCE(p.migraciones, 0) + COALESCE(p.portabilidad, 0) + COALESCE(p.linea_nueva, 0)), 0)::float8 AS meta_total,
    COALESCE(SUM(COALESCE(p.migraciones, 0)), 0)::float8 AS meta_migra,
    COALESCE(SUM(COALESCE(p.portabilidad, 0)), 0)::float8 AS meta_porta,
    COALESCE(SUM(CASE WHEN p.descrip2 = $3 THEN COALESCE(p.portabilidad, 0) ELSE 0 END), 0)::float8 AS meta_porta_ecomm,
    COALESCE(SUM(CASE WHEN p.descrip2 = $4 THEN COALESCE(p.portabilidad, 0) ELSE 0 END), 0)::float8 AS meta_ctw,
    COALESCE(SUM(CASE WHEN p.descrip2 = $3 THEN COALESCE(p.linea_nueva, 0) ELSE 0 END), 0)::float8 AS meta_linea_nueva
FROM tb_presupuesto_fijo_movil p
WHERE p.producto = $1
  AND p.jefe = $2
  AND p.descrip2 IN ($3, $4)
  AND p.mes >= $5
  AND p.mes < $6
HAVING COUNT(*) > 0
"#;

pub const MONTHLY_ACTIVATIONS_SQL: &str = r#"
SELECT
    COALESCE(a.total_activadas, 0)::int8 AS total_activadas,
    COALESCE(a.migraciones, 0)::int8 AS migraciones,
    COALESCE(a.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(a.ctw, 0)::int8 AS ctw,
    COALESCE(a.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_activadas_mes a
WHERE a.anio = $1 AND a.mes = $2
"#;

pub const MONTHLY_ATTEMPTS_SQL: &str = r#"
SELECT
    COALESCE(c.total_cantadas, 0)::int8 AS total_cantadas,
    COALESCE(c.migraciones, 0)::int8 AS migraciones,
    COALESCE(c.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(c.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_cantadas_mes c
WHERE c.anio = $1 AND c.mes = $2
"#;

pub const BUSINESS_DAYS_SQL: &str = r#"
SELECT
    COALESCE(dh.dias_totales, 0)::float8 AS dias_totales,
    COALESCE(dh.dias_transcurridos, 0)::float8 AS dias_transcurridos
FROM vw_dias_habiles_mes dh
WHERE dh.anio = $1 AND dh.mes = $2
"#;

pub const DAILY_ACTIVATIONS_SQL: &str = r#"
SELECT
    a.fecha::date AS fecha,
    COALESCE(a.total_activadas, 0)::int8 AS total_activadas,
    COALESCE(a.migraciones, 0)::int8 AS migraciones,
    COALESCE(a.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(a.ctw, 0)::int8 AS ctw,
    COALESCE(a.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_activadas_diario a
WHERE a.fecha >= $1 AND a.fecha < $2
ORDER BY a.fecha
"#;

pub const DAILY_ATTEMPTS_SQL: &str = r#"
SELECT
    c.fecha::date AS fecha,
    COALESCE(c.total_cantadas, 0)::int8 AS total_cantadas,
    COALESCE(c.migraciones, 0)::int8 AS migraciones,
    COALESCE(c.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(c.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_cantadas_diario c
WHERE c.fecha >= $1 AND c.fecha < $2
ORDER BY c.fecha
"#;

pub const ACTIVATIONS_ON_SQL: &str = r#"
SELECT
    a.fecha::date AS fecha,
    COALESCE(a.total_activadas, 0)::int8 AS total_activadas,
    COALESCE(a.migraciones, 0)::int8 AS migraciones,
    COALESCE(a.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(a.ctw, 0)::int8 AS ctw,
    COALESCE(a.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_activadas_diario a
WHERE a.fecha = $1
"#;

pub const ATTEMPTS_ON_SQL: &str = r#"
SELECT
    c.fecha::date AS fecha,
    COALESCE(c.total_cantadas, 0)::int8 AS total_cantadas,
    COALESCE(c.migraciones, 0)::int8 AS migraciones,
    COALESCE(c.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(c.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_cantadas_diario c
WHERE c.fecha = $1
"#;

pub const HOURLY_CUTS_TODAY_SQL: &str = r#"
SELECT
    h.hora::int4 AS hora,
    COALESCE(h.ventas_hora, 0)::int8 AS ventas_hora,
    COALESCE(h.migraciones, 0)::int8 AS migraciones,
    COALESCE(h.portabilidades, 0)::int8 AS portabilidades,
    COALESCE(h.linea_nueva, 0)::int8 AS linea_nueva
FROM vw_cortes_dia_actual h
ORDER BY h.hora
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyGoalsRow {
    pub meta_total: f64,
    pub meta_migra: f64,
    pub meta_porta: f64,
    pub meta_porta_ecomm: f64,
    pub meta_ctw: f64,
    pub meta_linea_nueva: f64,
}

impl From<MonthlyGoalsRow> for MonthlyGoals {
    fn from(row: MonthlyGoalsRow) -> Self {
        Self {
            total: row.meta_total,
            migration: row.meta_migra,
            portability: row.meta_porta,
            portability_ecommerce: row.meta_porta_ecomm,
            click_to_chat: row.meta_ctw,
            new_line: row.meta_linea_nueva,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivationsRow {
    pub total_activadas: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub ctw: i64,
    pub linea_nueva: i64,
}

impl From<ActivationsRow> for ActivationCounts {
    fn from(row: ActivationsRow) -> Self {
        Self {
            total: row.total_activadas,
            migration: row.migraciones,
            portability: row.portabilidades,
            click_to_chat: row.ctw,
            new_line: row.linea_nueva,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyActivationsRow {
    pub fecha: NaiveDate,
    #[sqlx(flatten)]
    pub counts: ActivationsRow,
}

impl From<DailyActivationsRow> for DailyActivations {
    fn from(row: DailyActivationsRow) -> Self {
        Self {
            date: row.fecha,
            counts: row.counts.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttemptsRow {
    pub total_cantadas: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub linea_nueva: i64,
}

impl From<AttemptsRow> for AttemptCounts {
    fn from(row: AttemptsRow) -> Self {
        Self {
            total: row.total_cantadas,
            migration: row.migraciones,
            portability: row.portabilidades,
            new_line: row.linea_nueva,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyAttemptsRow {
    pub fecha: NaiveDate,
    #[sqlx(flatten)]
    pub counts: AttemptsRow,
}

impl From<DailyAttemptsRow> for DailyAttempts {
    fn from(row: DailyAttemptsRow) -> Self {
        Self {
            date: row.fecha,
            counts: row.counts.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessDaysRow {
    pub dias_totales: f64,
    pub dias_transcurridos: f64,
}

impl From<BusinessDaysRow> for BusinessDays {
    fn from(row: BusinessDaysRow) -> Self {
        Self {
            total: row.dias_totales,
            elapsed: row.dias_transcurridos,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HourlyCutRow {
    pub hora: i32,
    pub ventas_hora: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub linea_nueva: i64,
}

impl From<HourlyCutRow> for HourlyCut {
    fn from(row: HourlyCutRow) -> Self {
        Self {
            hour: row.hora,
            attempts: row.ventas_hora,
            migration: row.migraciones,
            portability: row.portabilidades,
            new_line: row.linea_nueva,
        }
    }
}
