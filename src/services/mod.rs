//! # Dashboard Services
//!
//! One method per dashboard tile. A service opens a session, fetches the raw
//! facts, runs the engine and settles the result into a [`TileOutcome`]. No
//! error escapes a tile: failures are logged here and carried to the web layer
//! as data.

pub mod pospago_service;

pub use pospago_service::PospagoService;

use crate::error::ReportingError;

/// Result of producing one tile
#[derive(Debug, Clone, PartialEq)]
pub enum TileOutcome<T> {
    Data(T),
    /// Valid query with nothing to show (`tiene_datos: false` with a message)
    NoData { message: String },
    Failed { error: ReportingError },
}

impl<T> TileOutcome<T> {
    pub fn is_data(&self) -> bool {
        matches!(self, TileOutcome::Data(_))
    }

    pub fn data(self) -> Option<T> {
        match self {
            TileOutcome::Data(value) => Some(value),
            _ => None,
        }
    }
}
