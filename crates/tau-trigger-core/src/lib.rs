//! Tau trigger efficiencies and data/MC scale factors.
//!
//! A [`TriggerEfficiencyEvaluator`] is built once per trigger configuration
//! from a fixed set of calibration tables and then answers pure queries in
//! (pt, eta, phi, decay mode).
//!
//! ```no_run
//! use tau_trigger_core::{CalibrationBundle, TriggerConfig, TriggerEfficiencyEvaluator};
//!
//! let bundle = CalibrationBundle::load("tauTriggerEfficiencies2017.json").unwrap();
//! let config = TriggerConfig::from_labels("ditau", 2017, "medium", "MVAv2").unwrap();
//! let evaluator = TriggerEfficiencyEvaluator::from_bundle(config, &bundle).unwrap();
//! let sf = evaluator.trigger_scale_factor(45.0, 0.8, -1.2, 1).unwrap();
//! ```

pub mod calibration;
pub mod domain;
pub mod evaluator;
pub mod tables;

pub use calibration::{CalibrationBundle, CalibrationTable, CalibrationTables, SampleTables};
pub use domain::{
    DecayMode, ErrorCategory, IdFamily, SampleKind, TauCandidate, TriggerConfig, TriggerKind,
    TriggerSfError, TriggerSfResult, UncertaintyMode, WorkingPoint,
};
pub use evaluator::{TriggerEfficiencyEvaluator, TriggerWeights};
