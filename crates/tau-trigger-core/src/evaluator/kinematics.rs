use crate::domain::{DecayMode, TriggerSfResult};

pub const PT_MIN: f64 = 20.0;
pub const PT_MAX: f64 = 450.0;

/// Barrel edge of the (eta, phi) maps and the value boundary taus snap to.
pub const ETA_EDGE: f64 = 2.1;
pub const ETA_EDGE_SNAP: f64 = 2.09;

/// MC efficiencies below this give a zero scale factor.
pub const MIN_MC_EFFICIENCY: f64 = 1e-5;

/// Keeps pt on the calibrated range `[20, 450]` GeV.
pub fn clamp_pt(pt: f64) -> f64 {
    if pt > PT_MAX {
        PT_MAX
    } else if pt < PT_MIN {
        PT_MIN
    } else {
        pt
    }
}

/// Maps decay mode 2 onto 1 and validates the result.
///
/// Dynamic strip clustering usually merges the second strip into the first,
/// so taus that survive as decay mode 2 are calibrated as decay mode 1.
pub fn normalize_decay_mode(decay_mode: i32) -> TriggerSfResult<DecayMode> {
    let decay_mode = if decay_mode == 2 { 1 } else { decay_mode };
    DecayMode::try_from(decay_mode)
}

/// Pulls taus sitting exactly on the barrel edge into the last map bin.
pub fn normalize_eta(eta: f64) -> f64 {
    if eta == ETA_EDGE {
        ETA_EDGE_SNAP
    } else if eta == -ETA_EDGE {
        -ETA_EDGE_SNAP
    } else {
        eta
    }
}
