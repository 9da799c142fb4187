//! Binned 1-D and 2-D tables.
//!
//! Bins are half-open `[low, high)`. A coordinate below the first edge, at or
//! above the last edge, or NaN lands in a flow bin; flow bins hold no content
//! and read back as 0.0.

use super::{EtaPhiMap, TableShapeError, UncertaintyBand, validate_increasing};
use serde::{Deserialize, Serialize};

/// Axis as written in a calibration bundle: explicit edges or a uniform range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Edges { edges: Vec<f64> },
    Uniform { bins: usize, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AxisSpec", into = "AxisSpec")]
pub struct BinnedAxis {
    edges: Vec<f64>,
}

impl BinnedAxis {
    pub fn from_edges(edges: Vec<f64>) -> Result<Self, TableShapeError> {
        if edges.len() < 2 {
            return Err(TableShapeError::EmptyAxis);
        }
        validate_increasing(&edges)?;
        Ok(Self { edges })
    }

    pub fn uniform(bins: usize, min: f64, max: f64) -> Result<Self, TableShapeError> {
        if bins == 0 {
            return Err(TableShapeError::EmptyAxis);
        }
        let width = (max - min) / bins as f64;
        let edges = (0..=bins).map(|i| min + i as f64 * width).collect();
        Self::from_edges(edges)
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Zero-based index of the in-range bin containing `x`, `None` for flow.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        let last = self.edges.len() - 1;
        if x.is_nan() || x < self.edges[0] || x >= self.edges[last] {
            return None;
        }
        Some(self.edges.partition_point(|&edge| edge <= x) - 1)
    }
}

impl TryFrom<AxisSpec> for BinnedAxis {
    type Error = TableShapeError;

    fn try_from(spec: AxisSpec) -> Result<Self, Self::Error> {
        match spec {
            AxisSpec::Edges { edges } => Self::from_edges(edges),
            AxisSpec::Uniform { bins, min, max } => Self::uniform(bins, min, max),
        }
    }
}

impl From<BinnedAxis> for AxisSpec {
    fn from(axis: BinnedAxis) -> Self {
        AxisSpec::Edges { edges: axis.edges }
    }
}

/// 1-D histogram with per-bin errors. As an [`UncertaintyBand`] it reports
/// the bin error, not the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Histogram1DFields")]
pub struct Histogram1D {
    axis: BinnedAxis,
    contents: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct Histogram1DFields {
    axis: BinnedAxis,
    contents: Vec<f64>,
    #[serde(default)]
    errors: Option<Vec<f64>>,
}

impl TryFrom<Histogram1DFields> for Histogram1D {
    type Error = TableShapeError;

    fn try_from(raw: Histogram1DFields) -> Result<Self, Self::Error> {
        Self::new(raw.axis, raw.contents, raw.errors)
    }
}

impl Histogram1D {
    pub fn new(
        axis: BinnedAxis,
        contents: Vec<f64>,
        errors: Option<Vec<f64>>,
    ) -> Result<Self, TableShapeError> {
        let histogram = Self {
            axis,
            contents,
            errors,
        };
        histogram.validate()?;
        Ok(histogram)
    }

    pub fn validate(&self) -> Result<(), TableShapeError> {
        let bins = self.axis.bin_count();
        if self.contents.len() != bins {
            return Err(TableShapeError::LengthMismatch {
                field: "contents",
                expected: bins,
                actual: self.contents.len(),
            });
        }
        if let Some(errors) = &self.errors {
            if errors.len() != bins {
                return Err(TableShapeError::LengthMismatch {
                    field: "errors",
                    expected: bins,
                    actual: errors.len(),
                });
            }
        }
        Ok(())
    }

    pub fn axis(&self) -> &BinnedAxis {
        &self.axis
    }

    pub fn bin_content(&self, x: f64) -> f64 {
        self.axis
            .find_bin(x)
            .map_or(0.0, |bin| self.contents[bin])
    }

    /// Stored error, or the Poisson `sqrt(content)` when none were stored.
    pub fn bin_error(&self, x: f64) -> f64 {
        let Some(bin) = self.axis.find_bin(x) else {
            return 0.0;
        };
        match &self.errors {
            Some(errors) => errors[bin],
            None => self.contents[bin].max(0.0).sqrt(),
        }
    }
}

impl UncertaintyBand for Histogram1D {
    fn band_at(&self, pt: f64) -> f64 {
        self.bin_error(pt)
    }
}

/// 2-D histogram over (x, y) = (eta, phi); `contents[ix][iy]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Histogram2DFields")]
pub struct Histogram2D {
    x_axis: BinnedAxis,
    y_axis: BinnedAxis,
    contents: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct Histogram2DFields {
    x_axis: BinnedAxis,
    y_axis: BinnedAxis,
    contents: Vec<Vec<f64>>,
}

impl TryFrom<Histogram2DFields> for Histogram2D {
    type Error = TableShapeError;

    fn try_from(raw: Histogram2DFields) -> Result<Self, Self::Error> {
        Self::new(raw.x_axis, raw.y_axis, raw.contents)
    }
}

impl Histogram2D {
    pub fn new(
        x_axis: BinnedAxis,
        y_axis: BinnedAxis,
        contents: Vec<Vec<f64>>,
    ) -> Result<Self, TableShapeError> {
        let histogram = Self {
            x_axis,
            y_axis,
            contents,
        };
        histogram.validate()?;
        Ok(histogram)
    }

    /// Histogram with every in-range bin set to `value`.
    pub fn filled(x_axis: BinnedAxis, y_axis: BinnedAxis, value: f64) -> Self {
        let contents = vec![vec![value; y_axis.bin_count()]; x_axis.bin_count()];
        Self {
            x_axis,
            y_axis,
            contents,
        }
    }

    pub fn validate(&self) -> Result<(), TableShapeError> {
        let x_bins = self.x_axis.bin_count();
        let y_bins = self.y_axis.bin_count();
        if self.contents.len() != x_bins {
            return Err(TableShapeError::LengthMismatch {
                field: "contents",
                expected: x_bins,
                actual: self.contents.len(),
            });
        }
        if let Some(row) = self.contents.iter().find(|row| row.len() != y_bins) {
            return Err(TableShapeError::LengthMismatch {
                field: "contents row",
                expected: y_bins,
                actual: row.len(),
            });
        }
        Ok(())
    }

    pub fn bin_content(&self, x: f64, y: f64) -> f64 {
        match (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            (Some(ix), Some(iy)) => self.contents[ix][iy],
            _ => 0.0,
        }
    }

    pub fn set_bin_content(&mut self, x: f64, y: f64, value: f64) -> bool {
        match (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) {
            (Some(ix), Some(iy)) => {
                self.contents[ix][iy] = value;
                true
            }
            _ => false,
        }
    }
}

impl EtaPhiMap for Histogram2D {
    fn value_at(&self, eta: f64, phi: f64) -> f64 {
        self.bin_content(eta, phi)
    }
}
