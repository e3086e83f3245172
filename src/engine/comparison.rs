//! Attempts vs activations for the month, per category.

use serde::Serialize;

use super::round1;
use crate::constants::comparison_labels as labels;
use crate::source::{ActivationCounts, AttemptCounts};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub tipo: &'static str,
    pub cantadas: i64,
    pub activadas: i64,
    pub tasa_activacion: f64,
}

impl ComparisonRow {
    fn new(tipo: &'static str, cantadas: i64, activadas: i64) -> Self {
        Self {
            tipo,
            cantadas,
            activadas,
            tasa_activacion: activation_rate(cantadas, activadas),
        }
    }
}

/// Comparative tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub comparativo: Vec<ComparisonRow>,
}

/// `activations / attempts * 100`, one decimal, `0` without attempts
pub fn activation_rate(attempts: i64, activations: i64) -> f64 {
    if attempts > 0 {
        round1(activations as f64 / attempts as f64 * 100.0)
    } else {
        0.0
    }
}

/// Build the comparison rows. `None` when neither monthly row exists.
///
/// The click-to-chat row has no attempts counterpart and only appears when
/// activations were recorded for the month.
pub fn build_comparison(
    attempts: Option<&AttemptCounts>,
    activations: Option<&ActivationCounts>,
) -> Option<Comparison> {
    if attempts.is_none() && activations.is_none() {
        return None;
    }
    let att = attempts.copied().unwrap_or_default();
    let act = activations.copied().unwrap_or_default();

    let mut comparativo = vec![
        ComparisonRow::new(labels::TOTAL, att.total, act.total),
        ComparisonRow::new(labels::MIGRATION, att.migration, act.migration),
        ComparisonRow::new(labels::PORTABILITY, att.portability, act.portability),
        ComparisonRow::new(
            labels::PORTABILITY_ECOMMERCE,
            att.portability,
            act.portability_ecommerce(),
        ),
    ];
    if activations.is_some() {
        comparativo.push(ComparisonRow {
            tipo: labels::CLICK_TO_CHAT,
            cantadas: 0,
            activadas: act.click_to_chat,
            tasa_activacion: 0.0,
        });
    }
    comparativo.push(ComparisonRow::new(labels::NEW_LINE, att.new_line, act.new_line));

    Some(Comparison { comparativo })
}
