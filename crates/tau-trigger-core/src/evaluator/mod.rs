//! Trigger efficiencies and data/MC scale factors for hadronic taus.

pub mod kinematics;

pub use kinematics::{
    MIN_MC_EFFICIENCY, PT_MAX, PT_MIN, clamp_pt, normalize_decay_mode, normalize_eta,
};

use crate::calibration::{CalibrationBundle, CalibrationTables, SampleTables};
use crate::domain::{
    DecayMode, SampleKind, TauCandidate, TriggerConfig, TriggerSfError, TriggerSfResult,
    UncertaintyMode,
};
use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// Efficiency of one sample at one point, optionally shifted by the fit
/// uncertainty band, corrected by the local (eta, phi) map and kept in `[0, 1]`.
///
/// Returns 0.0 when the (eta, phi) average is not positive, i.e. the tau is
/// outside the region where taus trigger.
pub fn efficiency(
    pt: f64,
    eta: f64,
    phi: f64,
    tables: &SampleTables,
    mode: UncertaintyMode,
) -> f64 {
    let pt = clamp_pt(pt);
    let mut eff = tables.fit.eval(pt);

    match mode {
        UncertaintyMode::Nominal => {}
        UncertaintyMode::Up => eff += tables.band.band_at(pt),
        UncertaintyMode::Down => eff -= tables.band.band_at(pt),
    }

    let eta = normalize_eta(eta);
    let eta_phi_val = tables.eta_phi.value_at(eta, phi);
    let eta_phi_avg = tables.eta_phi_avg.value_at(eta, phi);
    if eta_phi_avg <= 0.0 {
        tracing::warn!(
            eta,
            phi,
            "tau (eta, phi) is outside the boundary of triggering taus, returning efficiency 0.0"
        );
        return 0.0;
    }

    eff *= eta_phi_val / eta_phi_avg;
    // Some fits overshoot the plateau or go negative at very low pt.
    eff.clamp(0.0, 1.0)
}

/// Every efficiency and scale factor for one tau.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TriggerWeights {
    pub decay_mode: i32,
    pub efficiency_data: f64,
    pub efficiency_data_up: f64,
    pub efficiency_data_down: f64,
    pub efficiency_mc: f64,
    pub efficiency_mc_up: f64,
    pub efficiency_mc_down: f64,
    pub scale_factor: f64,
    pub scale_factor_up: f64,
    pub scale_factor_down: f64,
}

pub struct TriggerEfficiencyEvaluator {
    config: TriggerConfig,
    tables: CalibrationTables,
}

impl TriggerEfficiencyEvaluator {
    pub fn new(config: TriggerConfig, tables: CalibrationTables) -> TriggerSfResult<Self> {
        config.validate()?;
        tracing::info!(
            trigger = %config.trigger,
            id_family = %config.id_family,
            working_point = %config.working_point,
            year = config.year,
            "loading tau trigger efficiencies"
        );
        Ok(Self { config, tables })
    }

    pub fn from_labels(
        trigger: &str,
        year: u32,
        working_point: &str,
        id_family: &str,
        tables: CalibrationTables,
    ) -> TriggerSfResult<Self> {
        let config = TriggerConfig::from_labels(trigger, year, working_point, id_family)?;
        Self::new(config, tables)
    }

    pub fn from_bundle(config: TriggerConfig, bundle: &CalibrationBundle) -> TriggerSfResult<Self> {
        let tables = bundle.tables_for(&config)?;
        Self::new(config, tables)
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Efficiency for a raw decay mode code. Only 0, 1 and 10 are accepted;
    /// decay mode 2 is not remapped here.
    pub fn trigger_efficiency(
        &self,
        sample: SampleKind,
        mode: UncertaintyMode,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        let decay_mode = DecayMode::try_from(decay_mode)?;
        Ok(self.efficiency_for(sample, mode, pt, eta, phi, decay_mode))
    }

    pub fn trigger_efficiency_data(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Data, UncertaintyMode::Nominal, pt, eta, phi, decay_mode)
    }

    pub fn trigger_efficiency_data_uncert_up(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Data, UncertaintyMode::Up, pt, eta, phi, decay_mode)
    }

    pub fn trigger_efficiency_data_uncert_down(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Data, UncertaintyMode::Down, pt, eta, phi, decay_mode)
    }

    pub fn trigger_efficiency_mc(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Mc, UncertaintyMode::Nominal, pt, eta, phi, decay_mode)
    }

    pub fn trigger_efficiency_mc_uncert_up(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Mc, UncertaintyMode::Up, pt, eta, phi, decay_mode)
    }

    pub fn trigger_efficiency_mc_uncert_down(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        self.trigger_efficiency(SampleKind::Mc, UncertaintyMode::Down, pt, eta, phi, decay_mode)
    }

    /// Data/MC scale factor. Decay mode 2 is treated as decay mode 1.
    pub fn trigger_scale_factor(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
    ) -> TriggerSfResult<f64> {
        let pt = clamp_pt(pt);
        let decay_mode = normalize_decay_mode(decay_mode)?;
        Ok(self.scale_factor_for(pt, eta, phi, decay_mode))
    }

    /// Scale factor shifted by +/- 1 sigma.
    ///
    /// Data and MC fit uncertainties are uncorrelated and the result is
    /// symmetric. Both relative uncertainties come from the Down shift, since
    /// the Up shift can be cut off by the efficiency ceiling of 1.
    pub fn trigger_scale_factor_uncert(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: i32,
        direction: UncertaintyMode,
    ) -> TriggerSfResult<f64> {
        if direction == UncertaintyMode::Nominal {
            return Err(TriggerSfError::InvalidUncertaintyMode {
                mode: direction.to_string(),
                expected: "Up, Down",
            });
        }
        let pt = clamp_pt(pt);
        let decay_mode = normalize_decay_mode(decay_mode)?;
        Ok(self.scale_factor_uncert_for(pt, eta, phi, decay_mode, direction))
    }

    /// All efficiencies and scale factors for `candidate`, with the same
    /// decay-mode handling as [`Self::trigger_scale_factor`].
    pub fn evaluate(&self, candidate: &TauCandidate) -> TriggerSfResult<TriggerWeights> {
        let TauCandidate { pt, eta, phi, .. } = *candidate;
        let pt = clamp_pt(pt);
        let decay_mode = normalize_decay_mode(candidate.decay_mode)?;
        let eff = |sample: SampleKind, mode: UncertaintyMode| {
            self.efficiency_for(sample, mode, pt, eta, phi, decay_mode)
        };

        Ok(TriggerWeights {
            decay_mode: decay_mode.code(),
            efficiency_data: eff(SampleKind::Data, UncertaintyMode::Nominal),
            efficiency_data_up: eff(SampleKind::Data, UncertaintyMode::Up),
            efficiency_data_down: eff(SampleKind::Data, UncertaintyMode::Down),
            efficiency_mc: eff(SampleKind::Mc, UncertaintyMode::Nominal),
            efficiency_mc_up: eff(SampleKind::Mc, UncertaintyMode::Up),
            efficiency_mc_down: eff(SampleKind::Mc, UncertaintyMode::Down),
            scale_factor: self.scale_factor_for(pt, eta, phi, decay_mode),
            scale_factor_up: self.scale_factor_uncert_for(
                pt,
                eta,
                phi,
                decay_mode,
                UncertaintyMode::Up,
            ),
            scale_factor_down: self.scale_factor_uncert_for(
                pt,
                eta,
                phi,
                decay_mode,
                UncertaintyMode::Down,
            ),
        })
    }

    fn efficiency_for(
        &self,
        sample: SampleKind,
        mode: UncertaintyMode,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: DecayMode,
    ) -> f64 {
        efficiency(pt, eta, phi, self.tables.get(sample, decay_mode), mode)
    }

    fn scale_factor_for(&self, pt: f64, eta: f64, phi: f64, decay_mode: DecayMode) -> f64 {
        let nominal = UncertaintyMode::Nominal;
        let eff_data = self.efficiency_for(SampleKind::Data, nominal, pt, eta, phi, decay_mode);
        let eff_mc = self.efficiency_for(SampleKind::Mc, nominal, pt, eta, phi, decay_mode);
        if eff_mc < MIN_MC_EFFICIENCY {
            tracing::warn!(
                trigger = %self.config.trigger,
                id_family = %self.config.id_family,
                working_point = %self.config.working_point,
                pt,
                eta,
                phi,
                eff_mc,
                "MC efficiency is suspiciously low, returning scale factor 0.0"
            );
            return 0.0;
        }
        eff_data / eff_mc
    }

    fn scale_factor_uncert_for(
        &self,
        pt: f64,
        eta: f64,
        phi: f64,
        decay_mode: DecayMode,
        direction: UncertaintyMode,
    ) -> f64 {
        let eff = |sample: SampleKind, mode: UncertaintyMode| {
            self.efficiency_for(sample, mode, pt, eta, phi, decay_mode)
        };

        let eff_data = eff(SampleKind::Data, UncertaintyMode::Nominal);
        let eff_data_down = eff(SampleKind::Data, UncertaintyMode::Down);
        let rel_data_diff = relative_shift(eff_data, eff_data_down);

        let eff_mc = eff(SampleKind::Mc, UncertaintyMode::Nominal);
        if eff_mc < MIN_MC_EFFICIENCY {
            return 0.0;
        }
        let eff_mc_down = eff(SampleKind::Mc, UncertaintyMode::Down);
        let rel_mc_diff = relative_shift(eff_mc, eff_mc_down);

        let delta_sf = (rel_data_diff * rel_data_diff + rel_mc_diff * rel_mc_diff).sqrt();
        let sf = eff_data / eff_mc;
        match direction {
            UncertaintyMode::Up => sf * (1.0 + delta_sf),
            _ => sf * (1.0 - delta_sf),
        }
    }
}

/// `(nominal - shifted) / nominal`, zero when the nominal efficiency is zero.
fn relative_shift(nominal: f64, shifted: f64) -> f64 {
    if nominal <= 0.0 {
        0.0
    } else {
        (nominal - shifted) / nominal
    }
}

impl Debug for TriggerEfficiencyEvaluator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerEfficiencyEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
