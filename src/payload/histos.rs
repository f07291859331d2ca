//! The per-bin payload: a named set of 1D histograms, one per statistic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A uniformly binned 1D histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    pub min: f64,
    pub max: f64,
    pub counts: Vec<f64>,
}

impl Hist1D {
    pub fn new(min: f64, max: f64, counts: Vec<f64>) -> Self {
        Self { min, max, counts }
    }

    pub fn bin_width(&self) -> f64 {
        if self.counts.is_empty() {
            0.0
        } else {
            (self.max - self.min) / self.counts.len() as f64
        }
    }

    pub fn integral(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> f64 {
        self.counts.iter().copied().fold(0.0, f64::max)
    }

    /// Scaled to unit integral; an empty histogram is returned unchanged.
    pub fn normalized(&self) -> Hist1D {
        let total = self.integral();
        if total <= 0.0 {
            return self.clone();
        }
        Hist1D {
            min: self.min,
            max: self.max,
            counts: self.counts.iter().map(|c| c / total).collect(),
        }
    }

    /// Outline of the histogram as a step line: two points per bin.
    pub fn step_points(&self) -> Vec<(f64, f64)> {
        let w = self.bin_width();
        let mut points = Vec::with_capacity(self.counts.len() * 2 + 2);
        points.push((self.min, 0.0));
        for (i, &c) in self.counts.iter().enumerate() {
            let lo = self.min + w * i as f64;
            points.push((lo, c));
            points.push((lo + w, c));
        }
        points.push((self.max, 0.0));
        points
    }
}

/// Aggregated data for one leaf bin of a source.
///
/// The comparison core treats this as opaque: it only moves `Histos` between
/// sources and asks for histograms by statistic name when rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histos {
    pub name: String,
    #[serde(default)]
    pub histograms: BTreeMap<String, Hist1D>,
}

impl Histos {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), histograms: BTreeMap::new() }
    }

    pub fn with(mut self, statistic: impl Into<String>, hist: Hist1D) -> Self {
        self.histograms.insert(statistic.into(), hist);
        self
    }

    pub fn get(&self, statistic: &str) -> Option<&Hist1D> {
        self.histograms.get(statistic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hist_basics() {
        let h = Hist1D::new(0.0, 2.0, vec![1.0, 3.0]);
        assert_eq!(h.bin_width(), 1.0);
        assert_eq!(h.integral(), 4.0);
        assert_eq!(h.max_count(), 3.0);
        assert_eq!(h.normalized().counts, vec![0.25, 0.75]);
    }

    #[test]
    fn test_normalizing_empty_histogram_is_noop() {
        let h = Hist1D::new(0.0, 1.0, vec![0.0, 0.0]);
        assert_eq!(h.normalized(), h);
    }

    #[test]
    fn test_step_points_outline() {
        let h = Hist1D::new(0.0, 2.0, vec![1.0, 3.0]);
        assert_eq!(
            h.step_points(),
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 3.0), (2.0, 3.0), (2.0, 0.0)]
        );
    }

    #[test]
    fn test_histos_lookup_by_statistic() {
        let h = Histos::new("bin_x0_q20").with("x_Res", Hist1D::new(-1.0, 1.0, vec![2.0]));
        assert!(h.get("x_Res").is_some());
        assert!(h.get("y_Res").is_none());
    }
}
