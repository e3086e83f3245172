//! Intraday cuts: today's attempts bucketed into fixed hour bands.

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::INTRADAY_BANDS;
use crate::source::HourlyCut;

/// Band label for an hour of the day; negative hours have no band
pub fn band_for_hour(hour: i32) -> Option<&'static str> {
    let hour = u32::try_from(hour).ok()?;
    INTRADAY_BANDS
        .iter()
        .rev()
        .find(|(first_hour, _)| hour >= *first_hour)
        .map(|(_, label)| *label)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandCut {
    pub franja: &'static str,
    pub cantadas: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub linea_nueva: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CutTotals {
    pub cantadas: i64,
    pub migraciones: i64,
    pub portabilidades: i64,
    pub linea_nueva: i64,
}

/// Intraday tile payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradayCuts {
    pub fecha: NaiveDate,
    pub cortes_por_franja: Vec<BandCut>,
    pub totales: CutTotals,
}

/// Bucket hourly rows. Only bands that received rows appear, in label order.
///
/// Returns `None` when no row falls into a band.
pub fn build_intraday_cuts(today: NaiveDate, hours: &[HourlyCut]) -> Option<IntradayCuts> {
    let mut bands: Vec<Option<BandCut>> = vec![None; INTRADAY_BANDS.len()];

    for row in hours {
        let Some(label) = band_for_hour(row.hour) else {
            continue;
        };
        let Some(index) = INTRADAY_BANDS.iter().position(|(_, l)| *l == label) else {
            continue;
        };
        let band = bands[index].get_or_insert_with(|| BandCut {
            franja: label,
            ..BandCut::default()
        });
        band.cantadas += row.attempts;
        band.migraciones += row.migration;
        band.portabilidades += row.portability;
        band.linea_nueva += row.new_line;
        band.total = band.cantadas;
    }

    let cortes_por_franja: Vec<BandCut> = bands.into_iter().flatten().collect();
    if cortes_por_franja.is_empty() {
        return None;
    }

    let totales = cortes_por_franja
        .iter()
        .fold(CutTotals::default(), |acc, band| CutTotals {
            cantadas: acc.cantadas + band.cantadas,
            migraciones: acc.migraciones + band.migraciones,
            portabilidades: acc.portabilidades + band.portabilidades,
            linea_nueva: acc.linea_nueva + band.linea_nueva,
        });

    Some(IntradayCuts {
        fecha: today,
        cortes_por_franja,
        totales,
    })
}
