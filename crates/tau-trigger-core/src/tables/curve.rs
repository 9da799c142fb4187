use super::{FitCurve, TableShapeError, validate_increasing};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

/// Error-function turn-on: `plateau * 0.5 * (1 + erf((pt - midpoint) / (sqrt(2) * width)))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TurnOnParameters")]
pub struct TurnOnCurve {
    plateau: f64,
    midpoint: f64,
    width: f64,
}

#[derive(Deserialize)]
struct TurnOnParameters {
    plateau: f64,
    midpoint: f64,
    width: f64,
}

impl TurnOnCurve {
    pub fn new(plateau: f64, midpoint: f64, width: f64) -> Result<Self, TableShapeError> {
        let curve = Self {
            plateau,
            midpoint,
            width,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), TableShapeError> {
        for (field, value) in [
            ("plateau", self.plateau),
            ("midpoint", self.midpoint),
            ("width", self.width),
        ] {
            if !value.is_finite() {
                return Err(TableShapeError::NonFiniteParameter { field, value });
            }
        }
        if self.width <= 0.0 {
            return Err(TableShapeError::NonPositiveWidth { width: self.width });
        }
        Ok(())
    }
}

impl TryFrom<TurnOnParameters> for TurnOnCurve {
    type Error = TableShapeError;

    fn try_from(raw: TurnOnParameters) -> Result<Self, Self::Error> {
        Self::new(raw.plateau, raw.midpoint, raw.width)
    }
}

impl FitCurve for TurnOnCurve {
    fn eval(&self, pt: f64) -> f64 {
        let z = (pt - self.midpoint) / (std::f64::consts::SQRT_2 * self.width);
        self.plateau * 0.5 * (1.0 + erf(z))
    }
}

/// Curve sampled at increasing pt points, linearly interpolated and held
/// constant beyond the first and last samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TabulatedSamples")]
pub struct TabulatedCurve {
    pt: Vec<f64>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct TabulatedSamples {
    pt: Vec<f64>,
    values: Vec<f64>,
}

impl TabulatedCurve {
    pub fn new(pt: Vec<f64>, values: Vec<f64>) -> Result<Self, TableShapeError> {
        let curve = Self { pt, values };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), TableShapeError> {
        if self.pt.is_empty() {
            return Err(TableShapeError::EmptyAxis);
        }
        validate_increasing(&self.pt)?;
        if self.values.len() != self.pt.len() {
            return Err(TableShapeError::LengthMismatch {
                field: "values",
                expected: self.pt.len(),
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<TabulatedSamples> for TabulatedCurve {
    type Error = TableShapeError;

    fn try_from(raw: TabulatedSamples) -> Result<Self, Self::Error> {
        Self::new(raw.pt, raw.values)
    }
}

impl FitCurve for TabulatedCurve {
    fn eval(&self, pt: f64) -> f64 {
        if pt.is_nan() {
            return f64::NAN;
        }
        let last = self.pt.len() - 1;
        if pt <= self.pt[0] {
            return self.values[0];
        }
        if pt >= self.pt[last] {
            return self.values[last];
        }

        let upper = self.pt.partition_point(|&sample| sample < pt);
        if self.pt[upper] == pt {
            return self.values[upper];
        }
        let lower = upper - 1;
        let t = (pt - self.pt[lower]) / (self.pt[upper] - self.pt[lower]);
        self.values[lower] + t * (self.values[upper] - self.values[lower])
    }
}
