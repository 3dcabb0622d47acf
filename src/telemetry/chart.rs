//! Dual-axis chart series: latency on the left axis, loss on the right.

use std::collections::HashMap;

use serde::Serialize;

use super::downsample::Point;
use super::series::GroupedSamples;
use crate::model::{target_label, ProbeSample, ProbeTarget};

/// Y axis a series binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// Primary (left) axis, round-trip time in ms.
    Latency,
    /// Secondary (right) axis, fixed to 0..=100 percent.
    Loss,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::Latency => 0,
            Axis::Loss => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub name: &'static str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub label_suffix: Option<&'static str>,
}

/// One line of the chart. The rendering layer down-samples `points` to
/// the width it draws at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub target_key: String,
    pub axis: Axis,
    pub points: Vec<Point>,
}

/// Renderable description of the probe chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub axes: [AxisSpec; 2],
    pub series: Vec<ChartSeries>,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self { axes: chart_axes(), series: Vec::new() }
    }
}

fn chart_axes() -> [AxisSpec; 2] {
    [
        AxisSpec { name: "RTT (ms)", min: None, max: None, label_suffix: None },
        AxisSpec { name: "Loss (%)", min: Some(0.0), max: Some(100.0), label_suffix: Some("%") },
    ]
}

/// Latency value of one sample; failed probes are gaps, never zero.
pub fn latency_value(sample: &ProbeSample) -> Option<f64> {
    if sample.ok {
        sample.rtt_ms
    } else {
        None
    }
}

/// Per-sample loss signal: 0 for a reply, 100 for a miss.
pub fn loss_value(sample: &ProbeSample) -> f64 {
    if sample.ok {
        0.0
    } else {
        100.0
    }
}

impl ChartSpec {
    /// Build one latency and one loss series per target group.
    pub fn build(grouped: &GroupedSamples, targets: &HashMap<String, ProbeTarget>) -> Self {
        let mut series = Vec::with_capacity(grouped.len() * 2);

        for group in grouped.iter() {
            let label = target_label(targets, &group.key);

            series.push(ChartSeries {
                name: format!("{} RTT", label),
                target_key: group.key.clone(),
                axis: Axis::Latency,
                points: group.samples.iter().map(|s| (s.time_ms, latency_value(s))).collect(),
            });
            series.push(ChartSeries {
                name: format!("{} loss %", label),
                target_key: group.key.clone(),
                axis: Axis::Loss,
                points: group.samples.iter().map(|s| (s.time_ms, Some(loss_value(s)))).collect(),
            });
        }

        Self { axes: chart_axes(), series }
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}
