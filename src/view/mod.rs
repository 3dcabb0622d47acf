//! Telemetry view: load orchestration for the detail and overview pages.
//!
//! A view moves `Idle -> Loading -> Ready` and re-enters `Loading` on
//! every navigation, range change or refresh. Loads are split in three
//! steps so the owner never has to hold the view across a network
//! round-trip:
//!
//! 1. a state change returns a [`LoadTicket`],
//! 2. [`fetch`] performs the backend calls for that ticket,
//! 3. [`TelemetryView::complete`] applies the outcome, or discards it
//!    when a newer ticket has been issued in the meantime.

mod cards;
mod state;
mod surface;

pub use cards::*;
pub use state::*;
pub use surface::*;

use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::{DashboardAggregator, OverviewFetch, OverviewModel};
use crate::client::{ApiError, TelemetryApi};
use crate::model::{DetailPayload, NodeSummary, Range};
use crate::telemetry::{format_sla, outage_rows, ChartSpec, GroupedSamples, OutageRow};

/// Backend results for one ticket.
#[derive(Debug)]
pub enum LoadOutcome {
    Detail {
        payload: Result<DetailPayload, ApiError>,
        /// Roster fetched alongside an authenticated detail load, used
        /// only to resolve the node's name.
        roster: Option<Result<Vec<NodeSummary>, ApiError>>,
    },
    Overview(OverviewFetch),
}

/// Perform the backend calls a ticket asks for.
pub async fn fetch(api: &Arc<dyn TelemetryApi>, ticket: &LoadTicket) -> LoadOutcome {
    let key = ticket.key();
    match (key.scope, key.route) {
        (Scope::Authenticated, Route::Detail(node_id)) => {
            let (payload, roster) = tokio::join!(api.node_detail(node_id, key.range), api.node_roster());
            LoadOutcome::Detail { payload, roster: Some(roster) }
        }
        (Scope::Shared, Route::Detail(node_id)) => LoadOutcome::Detail {
            payload: api.shared_detail(node_id, key.range).await,
            roster: None,
        },
        (Scope::Authenticated, Route::Overview) => {
            LoadOutcome::Overview(DashboardAggregator::new(api.clone()).fetch_overview(key.range).await)
        }
        (Scope::Shared, Route::Overview) => LoadOutcome::Overview(
            DashboardAggregator::new(api.clone()).fetch_shared_overview(key.range).await,
        ),
    }
}

/// Detail-page state derived from one payload.
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub node_name: String,
    pub payload: DetailPayload,
    pub grouped: GroupedSamples,
    pub chart: ChartSpec,
}

impl DetailState {
    fn new(node_name: String, payload: DetailPayload) -> Self {
        let grouped = GroupedSamples::group(&payload.results);
        let chart = ChartSpec::build(&grouped, &payload.targets);
        tracing::debug!(
            "{}: {} samples in {} groups, {} chart points",
            node_name,
            grouped.sample_count(),
            grouped.len(),
            chart.point_count()
        );
        Self { node_name, payload, grouped, chart }
    }

    pub fn sla_text(&self) -> String {
        format_sla(self.payload.sla)
    }

    pub fn outage_rows(&self) -> Vec<OutageRow> {
        outage_rows(&self.payload.disconnects)
    }
}

struct MountedChart<S> {
    surface: S,
    listener: ResizeListener,
}

pub struct TelemetryView<E: ChartEngine> {
    scope: Scope,
    route: Route,
    range: Range,
    phase: Phase,
    generation: u64,
    detail: DetailState,
    overview: OverviewModel,
    cycle_overrides: HashMap<i64, u32>,
    notices: Vec<Notice>,
    engine: E,
    hub: ResizeHub,
    chart: Option<MountedChart<E::Surface>>,
}

impl<E: ChartEngine> TelemetryView<E> {
    pub fn new(scope: Scope, engine: E, hub: ResizeHub, range: Range) -> Self {
        Self {
            scope,
            route: Route::Overview,
            range,
            phase: Phase::Idle,
            generation: 0,
            detail: DetailState::default(),
            overview: OverviewModel::default(),
            cycle_overrides: HashMap::new(),
            notices: Vec::new(),
            engine,
            hub,
            chart: None,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    /// The mounted chart surface, if a detail chart is on screen.
    pub fn surface(&self) -> Option<&E::Surface> {
        self.chart.as_ref().map(|c| &c.surface)
    }

    pub fn resize_hub(&self) -> &ResizeHub {
        &self.hub
    }

    pub fn key(&self) -> LoadKey {
        LoadKey { scope: self.scope, route: self.route, range: self.range }
    }

    /// Change page. Leaving a detail page disposes its chart.
    pub fn navigate(&mut self, route: Route) -> LoadTicket {
        self.switch_route(route);
        self.begin_load()
    }

    pub fn select_range(&mut self, range: Range) -> LoadTicket {
        self.range = range;
        self.begin_load()
    }

    pub fn refresh(&mut self) -> LoadTicket {
        self.begin_load()
    }

    /// Navigate and select a range with a single load.
    pub fn show(&mut self, route: Route, range: Range) -> LoadTicket {
        self.switch_route(route);
        self.range = range;
        self.begin_load()
    }

    /// Start the load a page request for `(route, range)` implies: a
    /// refresh when nothing changed, otherwise a range switch, a
    /// navigation or both.
    pub fn open(&mut self, route: Route, range: Range) -> LoadTicket {
        match (route == self.route, range == self.range) {
            (true, true) => self.refresh(),
            (true, false) => self.select_range(range),
            (false, true) => self.navigate(route),
            (false, false) => self.show(route, range),
        }
    }

    fn switch_route(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        if let Route::Detail(node_id) = self.route {
            tracing::debug!("Leaving detail view of node {}", node_id);
            self.unmount();
            self.detail = DetailState::default();
        }
        self.route = route;
    }

    fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = Phase::Loading;
        LoadTicket::new(self.generation, self.key())
    }

    /// Whether `ticket` is still the newest load of this view.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation() == self.generation && ticket.key() == self.key()
    }

    /// Apply a load outcome. Returns `false` when the ticket was
    /// superseded and the outcome was dropped.
    pub fn complete(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> bool {
        if !self.is_current(&ticket) {
            tracing::debug!(
                "Discarding stale response for {} (generation {}, current {})",
                ticket.key(),
                ticket.generation(),
                self.generation
            );
            return false;
        }

        match (ticket.key().route, outcome) {
            (Route::Detail(node_id), LoadOutcome::Detail { payload, roster }) => {
                self.apply_detail(node_id, payload, roster)
            }
            (Route::Overview, LoadOutcome::Overview(fetch)) => self.apply_overview(fetch),
            (route, _) => {
                tracing::error!("Load outcome does not match route {:?}", route);
            }
        }

        self.phase = Phase::Ready;
        true
    }

    fn apply_detail(
        &mut self,
        node_id: i64,
        payload: Result<DetailPayload, ApiError>,
        roster: Option<Result<Vec<NodeSummary>, ApiError>>,
    ) {
        let from_roster = match roster {
            Some(Ok(nodes)) => nodes.into_iter().find(|n| n.id == node_id).map(|n| n.name),
            Some(Err(e)) => {
                tracing::debug!("Roster lookup for node name failed: {}", e);
                None
            }
            None => None,
        };
        let node_name = from_roster
            .or_else(|| self.overview.find(node_id).map(|v| v.node.name.clone()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Node {}", node_id));

        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Detail load for node {} failed: {}", node_id, e);
                self.push_notice(&e);
                self.detail.node_name = node_name;
                return;
            }
        };

        self.detail = DetailState::new(node_name, payload);
        self.mount_or_update();
    }

    fn apply_overview(&mut self, fetch: OverviewFetch) {
        let (model, errors) = fetch.merge(&self.overview);
        for e in &errors {
            tracing::warn!("Overview load failed: {}", e);
            self.push_notice(e);
        }
        self.overview = model;
    }

    /// Create the surface on first data, then only replace its series.
    fn mount_or_update(&mut self) {
        if self.chart.is_none() {
            let listener = self.hub.subscribe();
            let surface = self.engine.create(self.hub.current());
            tracing::debug!(
                "Mounted chart surface for {} ({} resize listeners)",
                self.key(),
                self.hub.listener_count()
            );
            self.chart = Some(MountedChart { surface, listener });
        }
        if let Some(chart) = self.chart.as_mut() {
            chart.surface.update(&self.detail.chart);
        }
    }

    /// Layout-only re-render after a window resize. Returns whether the
    /// surface was re-rendered.
    pub fn handle_resize(&mut self) -> bool {
        let Some(chart) = self.chart.as_mut() else {
            return false;
        };
        match chart.listener.poll() {
            Some(viewport) => {
                chart.surface.resize(viewport);
                true
            }
            None => false,
        }
    }

    /// Dispose the chart surface and drop its resize listener.
    pub fn unmount(&mut self) {
        if let Some(mut chart) = self.chart.take() {
            chart.surface.dispose();
        }
    }

    /// Set or clear a transient billing-cycle preview. Ignored in shared
    /// scope.
    pub fn set_cycle_override(&mut self, node_id: i64, days: Option<u32>) -> bool {
        if self.scope != Scope::Authenticated {
            return false;
        }
        match days.filter(|d| *d > 0) {
            Some(days) => self.cycle_overrides.insert(node_id, days),
            None => self.cycle_overrides.remove(&node_id),
        };
        true
    }

    pub fn cards_at(&self, now_ms: i64) -> Vec<NodeCard> {
        self.overview
            .nodes
            .iter()
            .map(|view| NodeCard::new(view, self.cycle_overrides.get(&view.node.id).copied(), now_ms))
            .collect()
    }

    fn push_notice(&mut self, error: &ApiError) {
        self.notices.push(Notice { message: error.notice() });
    }

    /// Drain pending notices; each is shown once.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// A fresh view carrying this one's overview and cycle overrides but
    /// none of its load state or chart. Used to render a load this view
    /// has already moved past.
    pub fn detached(&self) -> Self
    where
        E: Clone,
    {
        let mut view = Self::new(self.scope, self.engine.clone(), ResizeHub::new(self.hub.current()), self.range);
        view.overview = self.overview.clone();
        view.cycle_overrides = self.cycle_overrides.clone();
        view
    }
}

impl<E: ChartEngine> Drop for TelemetryView<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::ScriptedApi;
    use crate::model::{DisconnectEvent, LatencyStat, ProbeSample, ProbeTarget};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        created: usize,
        updates: usize,
        resizes: Vec<Viewport>,
        disposed: usize,
        last_series: usize,
    }

    #[derive(Clone, Default)]
    struct RecordingEngine {
        log: Arc<Mutex<Log>>,
    }

    struct RecordingSurface {
        log: Arc<Mutex<Log>>,
    }

    impl ChartSurface for RecordingSurface {
        fn update(&mut self, chart: &ChartSpec) {
            let mut log = self.log.lock().unwrap();
            log.updates += 1;
            log.last_series = chart.series.len();
        }
        fn resize(&mut self, viewport: Viewport) {
            self.log.lock().unwrap().resizes.push(viewport);
        }
        fn dispose(&mut self) {
            self.log.lock().unwrap().disposed += 1;
        }
    }

    impl ChartEngine for RecordingEngine {
        type Surface = RecordingSurface;
        fn create(&self, _viewport: Viewport) -> RecordingSurface {
            self.log.lock().unwrap().created += 1;
            RecordingSurface { log: self.log.clone() }
        }
    }

    fn detail_payload(targets: i64) -> DetailPayload {
        let mut payload = DetailPayload { sla: 0.9987, ..Default::default() };
        for t in 1..=targets {
            payload.targets.insert(t.to_string(), ProbeTarget { id: t, name: format!("t{}", t), ip: None });
            for i in 0..5 {
                payload.results.push(ProbeSample { target_id: Some(t), time_ms: i, ok: i != 2, rtt_ms: Some(10.0) });
            }
        }
        payload.disconnects.push(DisconnectEvent { id: 1, down_at_ms: 1000, up_at_ms: Some(6000), duration_s: None });
        payload
    }

    fn api() -> ScriptedApi {
        let mut api = ScriptedApi {
            nodes: vec![ScriptedApi::node(1, "tokyo", true), ScriptedApi::node(2, "osaka", false)],
            ..Default::default()
        };
        api.details.insert(1, detail_payload(2));
        api.details.insert(2, detail_payload(1));
        api.snapshots.insert(1, ScriptedApi::snapshot(5.0));
        api.batch.insert(1, LatencyStat { avg: Some(9.0), latest: Some(8.0), latest_target: None });
        api
    }

    fn view(scope: Scope) -> (TelemetryView<RecordingEngine>, RecordingEngine, ResizeHub) {
        let engine = RecordingEngine::default();
        let hub = ResizeHub::default();
        let view = TelemetryView::new(scope, engine.clone(), hub.clone(), Range::OneHour);
        (view, engine, hub)
    }

    async fn run(view: &mut TelemetryView<RecordingEngine>, api: &Arc<dyn TelemetryApi>, ticket: LoadTicket) -> bool {
        let outcome = fetch(api, &ticket).await;
        view.complete(ticket, outcome)
    }

    #[tokio::test]
    async fn test_phases() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, _, _) = view(Scope::Authenticated);
        assert_eq!(v.phase(), Phase::Idle);

        let ticket = v.navigate(Route::Detail(1));
        assert_eq!(v.phase(), Phase::Loading);
        assert!(run(&mut v, &api, ticket).await);
        assert_eq!(v.phase(), Phase::Ready);

        assert_eq!(v.detail().node_name, "tokyo");
        assert_eq!(v.detail().sla_text(), "99.87%");
        assert_eq!(v.detail().grouped.len(), 2);
        assert_eq!(v.detail().chart.series.len(), 4);
        assert_eq!(v.detail().outage_rows()[0].duration, "5s");
    }

    #[tokio::test]
    async fn test_stale_range_response_is_discarded() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, _, _) = view(Scope::Authenticated);

        let hour = v.navigate(Route::Detail(1));
        let day = v.select_range(Range::OneDay);
        let hour_outcome = fetch(&api, &hour).await;
        let day_outcome = fetch(&api, &day).await;

        assert!(v.complete(day, day_outcome));
        assert_eq!(v.phase(), Phase::Ready);
        let applied = v.detail().payload.clone();

        assert!(!v.complete(hour, hour_outcome));
        assert_eq!(v.range(), Range::OneDay);
        assert_eq!(v.detail().payload, applied);
    }

    #[tokio::test]
    async fn test_stale_response_arriving_late_over_the_network() {
        let mut scripted = api();
        scripted.detail_delays.insert(Range::OneHour, 60);
        scripted.detail_delays.insert(Range::OneDay, 5);
        let api: Arc<dyn TelemetryApi> = Arc::new(scripted);
        let (v, _, _) = view(Scope::Shared);
        let v = Arc::new(tokio::sync::Mutex::new(v));

        let hour = v.lock().await.navigate(Route::Detail(1));
        let slow = {
            let (api, v) = (api.clone(), v.clone());
            tokio::spawn(async move {
                let outcome = fetch(&api, &hour).await;
                v.lock().await.complete(hour, outcome)
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let day = v.lock().await.select_range(Range::OneDay);
        let outcome = fetch(&api, &day).await;
        assert!(v.lock().await.complete(day, outcome));

        assert!(!slow.await.unwrap());
        let v = v.lock().await;
        assert_eq!(v.range(), Range::OneDay);
        assert_eq!(v.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_pending_load_stays_loading_when_stale_arrives() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, _, _) = view(Scope::Authenticated);

        let first = v.refresh();
        let _second = v.refresh();
        assert!(!run(&mut v, &api, first).await);
        assert_eq!(v.phase(), Phase::Loading);
    }

    #[tokio::test]
    async fn test_chart_created_once_and_reused() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, engine, hub) = view(Scope::Authenticated);

        let t = v.navigate(Route::Detail(1));
        run(&mut v, &api, t).await;
        let t = v.select_range(Range::SevenDays);
        run(&mut v, &api, t).await;
        let t = v.refresh();
        run(&mut v, &api, t).await;

        let log = engine.log.lock().unwrap();
        assert_eq!(log.created, 1);
        assert_eq!(log.updates, 3);
        assert_eq!(log.last_series, 4);
        assert_eq!(hub.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_resize_is_layout_only() {
        let scripted = Arc::new(api());
        let api: Arc<dyn TelemetryApi> = scripted.clone();
        let (mut v, engine, hub) = view(Scope::Authenticated);

        assert!(!v.handle_resize());
        let t = v.navigate(Route::Detail(1));
        run(&mut v, &api, t).await;
        let calls_before = scripted.calls().len();

        hub.publish(Viewport { width: 640, height: 300 });
        assert!(v.handle_resize());
        assert!(!v.handle_resize());

        let log = engine.log.lock().unwrap();
        assert_eq!(log.resizes, vec![Viewport { width: 640, height: 300 }]);
        assert_eq!(log.updates, 1);
        assert_eq!(scripted.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_navigating_away_disposes_chart_and_listener() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, engine, hub) = view(Scope::Authenticated);

        let t = v.navigate(Route::Detail(1));
        run(&mut v, &api, t).await;
        assert_eq!(hub.listener_count(), 1);

        let t = v.navigate(Route::Detail(2));
        assert_eq!(hub.listener_count(), 0);
        assert!(v.surface().is_none());
        run(&mut v, &api, t).await;
        assert_eq!(v.detail().node_name, "osaka");
        assert_eq!(hub.listener_count(), 1);

        let t = v.navigate(Route::Overview);
        run(&mut v, &api, t).await;
        assert_eq!(hub.listener_count(), 0);
        assert!(v.surface().is_none());

        let log = engine.log.lock().unwrap();
        assert_eq!(log.created, 2);
        assert_eq!(log.disposed, 2);
    }

    #[tokio::test]
    async fn test_drop_releases_chart() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, engine, hub) = view(Scope::Shared);
        let t = v.navigate(Route::Detail(1));
        run(&mut v, &api, t).await;

        drop(v);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(engine.log.lock().unwrap().disposed, 1);
    }

    #[tokio::test]
    async fn test_failed_detail_keeps_prior_state_and_notifies() {
        let mut scripted = api();
        let good: Arc<dyn TelemetryApi> = Arc::new(api());
        scripted.detail_fails = true;
        let bad: Arc<dyn TelemetryApi> = Arc::new(scripted);
        let (mut v, _, _) = view(Scope::Authenticated);

        let t = v.navigate(Route::Detail(1));
        run(&mut v, &good, t).await;
        let before = v.detail().payload.clone();

        let t = v.refresh();
        assert!(run(&mut v, &bad, t).await);
        assert_eq!(v.phase(), Phase::Ready);
        assert_eq!(v.detail().payload, before);
        let notices = v.take_notices();
        assert_eq!(notices, vec![Notice { message: "detail unavailable".to_string() }]);
        assert!(v.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_first_detail_shows_empty_default() {
        let mut scripted = api();
        scripted.detail_fails = true;
        let api: Arc<dyn TelemetryApi> = Arc::new(scripted);
        let (mut v, engine, _) = view(Scope::Shared);

        let t = v.navigate(Route::Detail(1));
        run(&mut v, &api, t).await;
        assert!(v.detail().grouped.is_empty());
        assert_eq!(v.take_notices().len(), 1);
        assert_eq!(engine.log.lock().unwrap().created, 0);
    }

    #[tokio::test]
    async fn test_overview_cards() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, _, _) = view(Scope::Authenticated);

        let t = v.navigate(Route::Overview);
        run(&mut v, &api, t).await;
        let cards = v.cards_at(0);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].cpu, "5.0%");
        assert_eq!(cards[0].latency, "8 ms · avg 9 ms");
        assert_eq!(cards[1].cpu, "-");
        assert!(v.surface().is_none());
    }

    #[tokio::test]
    async fn test_shared_detail_name_from_prior_roster() {
        let mut scripted = api();
        scripted.shared.nodes = scripted.nodes.clone();
        let api: Arc<dyn TelemetryApi> = Arc::new(scripted);
        let (mut v, _, _) = view(Scope::Shared);

        let t = v.navigate(Route::Detail(2));
        run(&mut v, &api, t).await;
        assert_eq!(v.detail().node_name, "Node 2");

        let t = v.navigate(Route::Overview);
        run(&mut v, &api, t).await;
        let t = v.navigate(Route::Detail(2));
        run(&mut v, &api, t).await;
        assert_eq!(v.detail().node_name, "osaka");
    }

    #[test]
    fn test_cycle_override_only_in_authenticated_scope() {
        let (mut admin, _, _) = view(Scope::Authenticated);
        assert!(admin.set_cycle_override(1, Some(90)));
        assert!(admin.set_cycle_override(1, None));

        let (mut shared, _, _) = view(Scope::Shared);
        assert!(!shared.set_cycle_override(1, Some(90)));
    }

    #[test]
    fn test_show_issues_single_ticket() {
        let (mut v, _, _) = view(Scope::Authenticated);
        let t = v.show(Route::Detail(3), Range::ThirtyDays);
        assert_eq!(t.generation(), 1);
        assert_eq!(t.key().range, Range::ThirtyDays);
        assert!(v.is_current(&t));
    }

    #[test]
    fn test_refresh_drives_future_to_completion() {
        let api: Arc<dyn TelemetryApi> = Arc::new(api());
        let (mut v, _, _) = view(Scope::Shared);
        let t = v.refresh();
        let applied = tokio_test::block_on(run(&mut v, &api, t));
        assert!(applied);
        assert_eq!(v.phase(), Phase::Ready);
    }

    #[test]
    fn test_open_picks_the_narrowest_load() {
        let (mut v, _, _) = view(Scope::Authenticated);
        let t = v.open(Route::Overview, Range::OneHour);
        assert_eq!((t.generation(), t.key().route), (1, Route::Overview));

        let t = v.open(Route::Overview, Range::OneDay);
        assert_eq!((t.generation(), t.key().range), (2, Range::OneDay));

        let t = v.open(Route::Detail(3), Range::OneDay);
        assert_eq!(t.key().route, Route::Detail(3));

        let t = v.open(Route::Detail(4), Range::SevenDays);
        assert_eq!(t.key(), v.key());
        assert_eq!(t.generation(), 4);
        assert_eq!(v.phase(), Phase::Loading);
    }

    #[tokio::test]
    async fn test_detached_view_renders_a_superseded_load() {
        let scripted = api();
        let api: Arc<dyn TelemetryApi> = Arc::new(scripted);
        let (mut v, engine, hub) = view(Scope::Authenticated);
        assert!(v.set_cycle_override(1, Some(90)));

        let first = v.navigate(Route::Detail(1));
        let outcome = fetch(&api, &first).await;
        let _second = v.navigate(Route::Detail(2));
        assert!(!v.is_current(&first));

        let mut own = v.detached();
        let t = own.show(first.key().route, first.key().range);
        assert!(own.complete(t, outcome));
        assert_eq!(own.detail().node_name, "tokyo");
        assert!(own.surface().is_some());
        assert_eq!(own.cycle_overrides.get(&1), Some(&90));

        // the detached chart never listens on the original hub
        assert_eq!(hub.listener_count(), 0);
        drop(own);
        assert_eq!(engine.log.lock().unwrap().disposed, 1);
        assert_eq!(v.route(), Route::Detail(2));
    }
}
