pub mod errors;

pub use errors::{ErrorCategory, TriggerSfError, TriggerSfResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const SUPPORTED_YEARS: [u32; 1] = [2017];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Ditau,
    Mutau,
    Etau,
}

impl TriggerKind {
    pub const ALL: [Self; 3] = [Self::Ditau, Self::Mutau, Self::Etau];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ditau => "ditau",
            Self::Mutau => "mutau",
            Self::Etau => "etau",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingPoint {
    Vloose,
    Loose,
    Medium,
    Tight,
    Vtight,
    Vvtight,
}

impl WorkingPoint {
    pub const ALL: [Self; 6] = [
        Self::Vloose,
        Self::Loose,
        Self::Medium,
        Self::Tight,
        Self::Vtight,
        Self::Vvtight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vloose => "vloose",
            Self::Loose => "loose",
            Self::Medium => "medium",
            Self::Tight => "tight",
            Self::Vtight => "vtight",
            Self::Vvtight => "vvtight",
        }
    }
}

/// Tau identification algorithm family the working points belong to.
///
/// `MVAv2` uses a dR=0.5 isolation cone, `dR0p3` the narrow dR=0.3 cone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdFamily {
    #[serde(rename = "MVAv2")]
    MvaV2,
    #[serde(rename = "dR0p3")]
    Dr0p3,
}

impl IdFamily {
    pub const ALL: [Self; 2] = [Self::MvaV2, Self::Dr0p3];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MvaV2 => "MVAv2",
            Self::Dr0p3 => "dR0p3",
        }
    }

    pub const fn is_supported(self) -> bool {
        matches!(self, Self::MvaV2)
    }
}

/// Reconstructed hadronic tau decay topology with calibrated efficiencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum DecayMode {
    OneProng,
    OneProngPi0,
    ThreeProng,
}

impl DecayMode {
    pub const ALL: [Self; 3] = [Self::OneProng, Self::OneProngPi0, Self::ThreeProng];

    pub const fn code(self) -> i32 {
        match self {
            Self::OneProng => 0,
            Self::OneProngPi0 => 1,
            Self::ThreeProng => 10,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::OneProng => 0,
            Self::OneProngPi0 => 1,
            Self::ThreeProng => 2,
        }
    }
}

impl TryFrom<i32> for DecayMode {
    type Error = TriggerSfError;

    fn try_from(decay_mode: i32) -> Result<Self, Self::Error> {
        match decay_mode {
            0 => Ok(Self::OneProng),
            1 => Ok(Self::OneProngPi0),
            10 => Ok(Self::ThreeProng),
            _ => Err(TriggerSfError::InvalidDecayMode { decay_mode }),
        }
    }
}

impl From<DecayMode> for i32 {
    fn from(decay_mode: DecayMode) -> Self {
        decay_mode.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleKind {
    Data,
    Mc,
}

impl SampleKind {
    pub const ALL: [Self; 2] = [Self::Data, Self::Mc];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Data => "DATA",
            Self::Mc => "MC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UncertaintyMode {
    #[default]
    Nominal,
    Up,
    Down,
}

impl UncertaintyMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nominal => "Nominal",
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }
}

macro_rules! impl_label {
    ($ty:ty, $what:literal) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str((*self).as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TriggerSfError;

            fn from_str(label: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str() == label)
                    .ok_or_else(|| {
                        let expected: Vec<&str> =
                            Self::ALL.iter().map(|candidate| candidate.as_str()).collect();
                        TriggerSfError::configuration(format!(
                            "unknown {} '{}', choose from: {}",
                            $what,
                            label,
                            expected.join(", ")
                        ))
                    })
            }
        }
    };
}

impl_label!(TriggerKind, "trigger");
impl_label!(WorkingPoint, "working point");
impl_label!(IdFamily, "identification family");

impl Display for DecayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "dm{}", self.code())
    }
}

impl Display for SampleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl Display for UncertaintyMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for UncertaintyMode {
    type Err = TriggerSfError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "Nominal" => Ok(Self::Nominal),
            "Up" => Ok(Self::Up),
            "Down" => Ok(Self::Down),
            other => Err(TriggerSfError::InvalidUncertaintyMode {
                mode: other.to_string(),
                expected: "Nominal, Up, Down",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub trigger: TriggerKind,
    pub year: u32,
    pub working_point: WorkingPoint,
    pub id_family: IdFamily,
}

impl TriggerConfig {
    pub fn new(trigger: TriggerKind, working_point: WorkingPoint) -> Self {
        Self {
            trigger,
            year: 2017,
            working_point,
            id_family: IdFamily::MvaV2,
        }
    }

    pub fn from_labels(
        trigger: &str,
        year: u32,
        working_point: &str,
        id_family: &str,
    ) -> TriggerSfResult<Self> {
        let config = Self {
            trigger: trigger.parse()?,
            year,
            working_point: working_point.parse()?,
            id_family: id_family.parse()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects combinations present in the enums but not yet calibrated.
    pub fn validate(&self) -> TriggerSfResult<()> {
        if !self.id_family.is_supported() {
            return Err(TriggerSfError::configuration(format!(
                "efficiencies are only provided for the MVAv2 identification family, got '{}'",
                self.id_family
            )));
        }
        if !SUPPORTED_YEARS.contains(&self.year) {
            return Err(TriggerSfError::configuration(format!(
                "only 2017 trigger efficiencies are provided, got year {}",
                self.year
            )));
        }
        Ok(())
    }

    /// Common prefix of every calibration table name for this configuration,
    /// e.g. `ditau_mediumMVAv2`.
    pub fn table_prefix(&self) -> String {
        format!(
            "{}_{}{}",
            self.trigger, self.working_point, self.id_family
        )
    }
}

impl Display for TriggerConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "trigger {} using tau {} ID WP {} for year {}",
            self.trigger, self.id_family, self.working_point, self.year
        )
    }
}

/// A reconstructed hadronic tau as seen by the calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TauCandidate {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub decay_mode: i32,
}

impl TauCandidate {
    pub fn new(pt: f64, eta: f64, phi: f64, decay_mode: i32) -> Self {
        Self {
            pt,
            eta,
            phi,
            decay_mode,
        }
    }
}
