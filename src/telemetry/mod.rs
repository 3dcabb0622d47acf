//! Telemetry shaping: grouping probe samples into per-target series,
//! building chart series, and formatting scalar metrics for display.

mod billing;
mod chart;
mod downsample;
mod format;
mod outage;
mod series;

pub use billing::*;
pub use chart::*;
pub use downsample::*;
pub use format::*;
pub use outage::*;
pub use series::*;
