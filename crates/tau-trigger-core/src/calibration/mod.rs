//! The per-configuration set of calibration tables owned by an evaluator.

pub mod bundle;

pub use bundle::{CalibrationBundle, CalibrationTable};

use crate::domain::{DecayMode, SampleKind, TriggerConfig, TriggerSfResult};
use crate::tables::{EtaPhiMap, FitCurve, UncertaintyBand};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRole {
    Fit,
    ErrorBand,
    EtaPhi,
    EtaPhiAverage,
}

impl TableRole {
    pub const ALL: [Self; 4] = [
        Self::Fit,
        Self::ErrorBand,
        Self::EtaPhi,
        Self::EtaPhiAverage,
    ];

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Fit => "_fit",
            Self::ErrorBand => "_errorBand",
            Self::EtaPhi => "",
            Self::EtaPhiAverage => "_AVG",
        }
    }
}

/// Archive name of one table, e.g. `ditau_mediumMVAv2_dm10_MC_errorBand`.
pub fn table_name(
    config: &TriggerConfig,
    decay_mode: DecayMode,
    sample: SampleKind,
    role: TableRole,
) -> String {
    format!(
        "{}_{}_{}{}",
        config.table_prefix(),
        decay_mode,
        sample,
        role.suffix()
    )
}

/// Every table name an evaluator for `config` needs, data before MC.
pub fn required_table_names(config: &TriggerConfig) -> Vec<String> {
    let mut names = Vec::with_capacity(SampleKind::ALL.len() * DecayMode::ALL.len() * 4);
    for sample in SampleKind::ALL {
        for decay_mode in DecayMode::ALL {
            for role in TableRole::ALL {
                names.push(table_name(config, decay_mode, sample, role));
            }
        }
    }
    names
}

/// The four lookups behind one (decay mode, sample) efficiency.
#[derive(Clone)]
pub struct SampleTables {
    pub fit: Arc<dyn FitCurve>,
    pub band: Arc<dyn UncertaintyBand>,
    pub eta_phi: Arc<dyn EtaPhiMap>,
    pub eta_phi_avg: Arc<dyn EtaPhiMap>,
}

impl SampleTables {
    pub fn new(
        fit: impl FitCurve + 'static,
        band: impl UncertaintyBand + 'static,
        eta_phi: impl EtaPhiMap + 'static,
        eta_phi_avg: impl EtaPhiMap + 'static,
    ) -> Self {
        Self {
            fit: Arc::new(fit),
            band: Arc::new(band),
            eta_phi: Arc::new(eta_phi),
            eta_phi_avg: Arc::new(eta_phi_avg),
        }
    }
}

impl Debug for SampleTables {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SampleTables { .. }")
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationTables {
    data: [SampleTables; 3],
    mc: [SampleTables; 3],
}

impl CalibrationTables {
    /// `data` and `mc` are ordered by decay mode 0, 1, 10.
    pub fn new(data: [SampleTables; 3], mc: [SampleTables; 3]) -> Self {
        Self { data, mc }
    }

    pub fn try_from_fn<F>(mut build: F) -> TriggerSfResult<Self>
    where
        F: FnMut(SampleKind, DecayMode) -> TriggerSfResult<SampleTables>,
    {
        let data = build_sample(&mut build, SampleKind::Data)?;
        let mc = build_sample(&mut build, SampleKind::Mc)?;
        Ok(Self { data, mc })
    }

    /// Same tables for every decay mode and sample.
    pub fn uniform(tables: SampleTables) -> Self {
        let row = [tables.clone(), tables.clone(), tables];
        Self {
            data: row.clone(),
            mc: row,
        }
    }

    pub fn get(&self, sample: SampleKind, decay_mode: DecayMode) -> &SampleTables {
        match sample {
            SampleKind::Data => &self.data[decay_mode.index()],
            SampleKind::Mc => &self.mc[decay_mode.index()],
        }
    }
}

fn build_sample<F>(build: &mut F, sample: SampleKind) -> TriggerSfResult<[SampleTables; 3]>
where
    F: FnMut(SampleKind, DecayMode) -> TriggerSfResult<SampleTables>,
{
    Ok([
        build(sample, DecayMode::OneProng)?,
        build(sample, DecayMode::OneProngPi0)?,
        build(sample, DecayMode::ThreeProng)?,
    ])
}
