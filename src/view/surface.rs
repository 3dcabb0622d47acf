//! Chart rendering surface and window-resize events.
//!
//! A surface is an explicitly owned resource: created when a detail view
//! first has data, updated in place on every new load, resized on layout
//! changes and disposed when the view goes away.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::watch;

use crate::telemetry::{lttb, ChartSpec};

/// Fewest points a down-sampled series is reduced to.
pub const MIN_SAMPLED_POINTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 960, height: 360 }
    }
}

pub trait ChartSurface: Send {
    /// Replace every series with those of `chart`.
    fn update(&mut self, chart: &ChartSpec);
    /// Re-lay out the retained series for a new viewport.
    fn resize(&mut self, viewport: Viewport);
    fn dispose(&mut self);
}

pub trait ChartEngine: Send {
    type Surface: ChartSurface;

    fn create(&self, viewport: Viewport) -> Self::Surface;
}

/// Source of window-resize events.
#[derive(Clone)]
pub struct ResizeHub {
    tx: Arc<watch::Sender<Viewport>>,
}

impl Default for ResizeHub {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl ResizeHub {
    pub fn new(initial: Viewport) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, viewport: Viewport) {
        self.tx.send_replace(viewport);
    }

    pub fn current(&self) -> Viewport {
        *self.tx.borrow()
    }

    /// Register a listener. Dropping it deregisters.
    pub fn subscribe(&self) -> ResizeListener {
        ResizeListener { rx: self.tx.subscribe() }
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct ResizeListener {
    rx: watch::Receiver<Viewport>,
}

impl ResizeListener {
    /// The latest viewport if it changed since the last poll.
    pub fn poll(&mut self) -> Option<Viewport> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            _ => None,
        }
    }
}

/// Headless ECharts surface: renders the option document the browser
/// hands to `echarts.setOption`.
#[derive(Debug)]
pub struct EchartsSurface {
    viewport: Viewport,
    chart: Option<ChartSpec>,
    option: Value,
    renders: usize,
    disposed: bool,
}

impl EchartsSurface {
    fn new(viewport: Viewport) -> Self {
        Self { viewport, chart: None, option: Value::Null, renders: 0, disposed: false }
    }

    pub fn option(&self) -> &Value {
        &self.option
    }

    fn point_budget(&self) -> usize {
        (self.viewport.width as usize).max(MIN_SAMPLED_POINTS)
    }

    fn render(&mut self) {
        let Some(chart) = &self.chart else {
            return;
        };
        let budget = self.point_budget();

        let y_axes: Vec<Value> = chart
            .axes
            .iter()
            .map(|axis| {
                let mut y = json!({ "type": "value", "name": axis.name });
                if let Some(min) = axis.min {
                    y["min"] = json!(min);
                }
                if let Some(max) = axis.max {
                    y["max"] = json!(max);
                }
                if let Some(suffix) = axis.label_suffix {
                    y["axisLabel"] = json!({ "formatter": format!("{{value}}{}", suffix) });
                }
                y
            })
            .collect();

        let series: Vec<Value> = chart
            .series
            .iter()
            .map(|s| {
                let points = lttb(&s.points, budget);
                json!({
                    "type": "line",
                    "name": s.name,
                    "showSymbol": false,
                    "connectNulls": false,
                    "yAxisIndex": s.axis.index(),
                    "data": points.iter().map(|(t, v)| json!([t, v])).collect::<Vec<_>>(),
                })
            })
            .collect();

        self.option = json!({
            "tooltip": { "trigger": "axis" },
            "legend": { "type": "scroll" },
            "dataZoom": [
                { "type": "inside", "throttle": 50 },
                { "type": "slider", "height": 20 }
            ],
            "xAxis": { "type": "time" },
            "yAxis": y_axes,
            "series": series,
            "grid": { "left": 40, "right": 20, "top": 40, "bottom": 30 },
            "width": self.viewport.width,
            "height": self.viewport.height,
        });
        self.renders += 1;
        tracing::debug!(
            "Chart render #{} at {}x{} ({} point budget)",
            self.renders,
            self.viewport.width,
            self.viewport.height,
            budget
        );
    }
}

impl ChartSurface for EchartsSurface {
    fn update(&mut self, chart: &ChartSpec) {
        if self.disposed {
            tracing::warn!("Ignoring update of a disposed chart surface");
            return;
        }
        self.chart = Some(chart.clone());
        self.render();
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.render();
    }

    fn dispose(&mut self) {
        self.chart = None;
        self.option = Value::Null;
        self.disposed = true;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EchartsEngine;

impl ChartEngine for EchartsEngine {
    type Surface = EchartsSurface;

    fn create(&self, viewport: Viewport) -> EchartsSurface {
        EchartsSurface::new(viewport)
    }
}
