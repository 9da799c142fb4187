//! Lookup-table kinds consumed by the efficiency evaluator.
//!
//! The evaluator only needs three capabilities: evaluate a pt curve, read an
//! uncertainty band at a pt, and read a 2-D (eta, phi) map. Concrete tables
//! loaded from a calibration bundle implement these traits, and so does any
//! plain closure of the right shape.

pub mod curve;
pub mod histogram;

pub use curve::{TabulatedCurve, TurnOnCurve};
pub use histogram::{AxisSpec, BinnedAxis, Histogram1D, Histogram2D};

/// Smooth pt-dependent efficiency estimate.
pub trait FitCurve: Send + Sync {
    fn eval(&self, pt: f64) -> f64;
}

/// Symmetric uncertainty magnitude on a [`FitCurve`] at a given pt.
pub trait UncertaintyBand: Send + Sync {
    fn band_at(&self, pt: f64) -> f64;
}

/// Binned (eta, phi) lookup. Also used for the region-averaged efficiency,
/// where a non-positive value marks a point outside the instrumented region.
pub trait EtaPhiMap: Send + Sync {
    fn value_at(&self, eta: f64, phi: f64) -> f64;
}

impl<F> FitCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn eval(&self, pt: f64) -> f64 {
        self(pt)
    }
}

impl<F> UncertaintyBand for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn band_at(&self, pt: f64) -> f64 {
        self(pt)
    }
}

impl<F> EtaPhiMap for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn value_at(&self, eta: f64, phi: f64) -> f64 {
        self(eta, phi)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableShapeError {
    #[error("axis must have at least one bin")]
    EmptyAxis,
    #[error("axis edge at index {index} must be finite, got {value}")]
    NonFiniteEdge { index: usize, value: f64 },
    #[error("axis edges must be strictly increasing, index {index} has {current} after {previous}")]
    NonIncreasingEdges {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("'{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("curve parameter '{field}' must be finite, got {value}")]
    NonFiniteParameter { field: &'static str, value: f64 },
    #[error("turn-on width must be positive, got {width}")]
    NonPositiveWidth { width: f64 },
}

pub(crate) fn validate_increasing(values: &[f64]) -> Result<(), TableShapeError> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(TableShapeError::NonFiniteEdge { index, value });
        }
        if index > 0 && value <= values[index - 1] {
            return Err(TableShapeError::NonIncreasingEdges {
                index,
                previous: values[index - 1],
                current: value,
            });
        }
    }
    Ok(())
}
