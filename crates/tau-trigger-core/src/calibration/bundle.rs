//! JSON calibration bundle: every named table for one data-taking year.
//!
//! ```json
//! {
//!   "year": 2017,
//!   "tables": {
//!     "ditau_mediumMVAv2_dm0_DATA_fit": { "kind": "turn_on", "plateau": 0.9, "midpoint": 35.0, "width": 4.0 },
//!     "ditau_mediumMVAv2_dm0_DATA_errorBand": { "kind": "histogram1d", "axis": {"bins": 430, "min": 20.0, "max": 450.0}, "contents": [...], "errors": [...] },
//!     "ditau_mediumMVAv2_dm0_DATA": { "kind": "histogram2d", "x_axis": {...}, "y_axis": {...}, "contents": [[...]] }
//!   }
//! }
//! ```

use super::{CalibrationTables, SampleTables, TableRole, required_table_names, table_name};
use crate::domain::{DecayMode, SampleKind, TriggerConfig, TriggerSfError, TriggerSfResult};
use crate::tables::{
    FitCurve, Histogram1D, Histogram2D, TabulatedCurve, TurnOnCurve, UncertaintyBand,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationTable {
    TurnOn(TurnOnCurve),
    Tabulated(TabulatedCurve),
    #[serde(rename = "histogram1d")]
    Histogram1D(Histogram1D),
    #[serde(rename = "histogram2d")]
    Histogram2D(Histogram2D),
}

impl CalibrationTable {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TurnOn(_) => "turn_on",
            Self::Tabulated(_) => "tabulated",
            Self::Histogram1D(_) => "histogram1d",
            Self::Histogram2D(_) => "histogram2d",
        }
    }
}

/// Tables are shape-checked while decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBundle")]
pub struct CalibrationBundle {
    pub year: u32,
    pub tables: BTreeMap<String, CalibrationTable>,
}

/// Tables stay undecoded until their name is known, so shape errors can
/// carry it.
#[derive(Deserialize)]
struct RawBundle {
    year: u32,
    #[serde(default)]
    tables: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<RawBundle> for CalibrationBundle {
    type Error = TriggerSfError;

    fn try_from(raw: RawBundle) -> Result<Self, Self::Error> {
        let tables: BTreeMap<String, CalibrationTable> = raw
            .tables
            .into_iter()
            .map(|(name, value)| match serde_json::from_value(value) {
                Ok(table) => Ok((name, table)),
                Err(error) => Err(TriggerSfError::invalid_table(name, error.to_string())),
            })
            .collect::<TriggerSfResult<_>>()?;
        Ok(Self {
            year: raw.year,
            tables,
        })
    }
}

impl CalibrationBundle {
    pub fn new(year: u32) -> Self {
        Self {
            year,
            tables: BTreeMap::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> TriggerSfResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TriggerSfError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let bundle = Self::from_json_str(&source, path)?;
        tracing::debug!(
            path = %path.display(),
            year = bundle.year,
            tables = bundle.tables.len(),
            "calibration bundle loaded"
        );
        Ok(bundle)
    }

    /// Parses bundle JSON; `origin` only labels errors. Malformed JSON is a
    /// `Parse` error, a malformed table an `InvalidTable` naming it.
    pub fn from_json_str(source: &str, origin: impl Into<PathBuf>) -> TriggerSfResult<Self> {
        let raw: RawBundle =
            serde_json::from_str(source).map_err(|source| TriggerSfError::Parse {
                path: origin.into(),
                source,
            })?;
        Self::try_from(raw)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: CalibrationTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&CalibrationTable> {
        self.tables.get(name)
    }

    /// Names `config` needs that the bundle does not carry.
    pub fn missing_tables(&self, config: &TriggerConfig) -> Vec<String> {
        required_table_names(config)
            .into_iter()
            .filter(|name| !self.tables.contains_key(name))
            .collect()
    }

    /// Resolves the 24 tables for `config` into evaluator-ready lookups.
    pub fn tables_for(&self, config: &TriggerConfig) -> TriggerSfResult<CalibrationTables> {
        config.validate()?;
        if self.year != config.year {
            return Err(TriggerSfError::configuration(format!(
                "calibration bundle holds year {} but year {} was requested",
                self.year, config.year
            )));
        }

        CalibrationTables::try_from_fn(|sample, decay_mode| {
            self.sample_tables(config, sample, decay_mode)
        })
    }

    fn sample_tables(
        &self,
        config: &TriggerConfig,
        sample: SampleKind,
        decay_mode: DecayMode,
    ) -> TriggerSfResult<SampleTables> {
        let lookup = |role: TableRole| {
            let name = table_name(config, decay_mode, sample, role);
            match self.tables.get(&name) {
                Some(table) => Ok((name, table)),
                None => Err(TriggerSfError::MissingTable { name }),
            }
        };

        let fit: Arc<dyn FitCurve> = match lookup(TableRole::Fit)? {
            (_, CalibrationTable::TurnOn(curve)) => Arc::new(*curve),
            (_, CalibrationTable::Tabulated(curve)) => Arc::new(curve.clone()),
            (name, other) => return Err(kind_mismatch(name, "turn_on or tabulated", other)),
        };
        let band: Arc<dyn UncertaintyBand> = match lookup(TableRole::ErrorBand)? {
            (_, CalibrationTable::Histogram1D(histogram)) => Arc::new(histogram.clone()),
            (name, other) => return Err(kind_mismatch(name, "histogram1d", other)),
        };
        let eta_phi = eta_phi_map(lookup(TableRole::EtaPhi)?)?;
        let eta_phi_avg = eta_phi_map(lookup(TableRole::EtaPhiAverage)?)?;

        Ok(SampleTables {
            fit,
            band,
            eta_phi,
            eta_phi_avg,
        })
    }
}

fn eta_phi_map((name, table): (String, &CalibrationTable)) -> TriggerSfResult<Arc<Histogram2D>> {
    match table {
        CalibrationTable::Histogram2D(histogram) => Ok(Arc::new(histogram.clone())),
        other => Err(kind_mismatch(name, "histogram2d", other)),
    }
}

fn kind_mismatch(name: String, expected: &'static str, found: &CalibrationTable) -> TriggerSfError {
    TriggerSfError::TableKindMismatch {
        name,
        expected,
        found: found.kind(),
    }
}
