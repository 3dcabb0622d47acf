//! HTML rendering of view state.
//!
//! Templates use simple `{{placeholder}}` replacement. Every string that
//! originates from the backend goes through [`escape`].

use crate::model::Range;
use crate::telemetry::{OutageRow, CYCLE_PRESETS};
use crate::view::{EchartsEngine, NodeCard, Notice, Phase, Route, Scope, TelemetryView};

const LAYOUT_TEMPLATE: &str = include_str!("templates/layout.html");
const OVERVIEW_TEMPLATE: &str = include_str!("templates/overview.html");
const DETAIL_TEMPLATE: &str = include_str!("templates/detail.html");

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render whatever the view currently shows.
pub fn page(view: &TelemetryView<EchartsEngine>, notices: &[Notice], now_ms: i64) -> String {
    let (title, content) = match view.route() {
        Route::Overview => ("Network".to_string(), overview(view, now_ms)),
        Route::Detail(_) => {
            let name = &view.detail().node_name;
            (format!("Network - {}", name), detail(view))
        }
    };

    LAYOUT_TEMPLATE
        .replace("{{title}}", &escape(&title))
        .replace("{{notices}}", &notices_html(notices))
        .replace("{{content}}", &content)
}

fn notices_html(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape(&n.message)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_html(phase: Phase) -> &'static str {
    match phase {
        Phase::Loading => r#"<span class="status">Loading…</span>"#,
        Phase::Idle | Phase::Ready => "",
    }
}

fn range_tabs(base: &str, current: Range) -> String {
    Range::ALL
        .iter()
        .map(|r| {
            let class = if *r == current { "tab active" } else { "tab" };
            format!(r#"<a class="{}" href="{}?range={}">{}</a>"#, class, base, r, r.label())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn overview(view: &TelemetryView<EchartsEngine>, now_ms: i64) -> String {
    let scope = view.scope();
    let cards = view.cards_at(now_ms);
    let cards_html = if cards.is_empty() {
        r#"<p class="empty">No nodes</p>"#.to_string()
    } else {
        cards
            .iter()
            .map(|c| card_html(c, scope, view.range()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    OVERVIEW_TEMPLATE
        .replace("{{range_tabs}}", &range_tabs(scope.base_path(), view.range()))
        .replace("{{status}}", status_html(view.phase()))
        .replace("{{cards}}", &cards_html)
}

fn card_html(card: &NodeCard, scope: Scope, range: Range) -> String {
    let badge = if card.online {
        r#"<span class="badge online">online</span>"#
    } else {
        r#"<span class="badge offline">offline</span>"#
    };
    let version = card
        .version
        .as_deref()
        .map(|v| format!(r#"<span class="version">v{}</span>"#, escape(v)))
        .unwrap_or_default();
    let target = card
        .latency_target
        .as_deref()
        .map(|t| format!(r#" <span class="target">({})</span>"#, escape(t)))
        .unwrap_or_default();
    let billing = card
        .billing
        .as_deref()
        .map(|b| format!(r#"<div class="billing">{}</div>"#, escape(b)))
        .unwrap_or_default();
    let cycle = match scope {
        Scope::Authenticated => cycle_form(card, range),
        Scope::Shared => String::new(),
    };

    format!(
        r#"<div class="card">
  <div class="card-head"><a href="{base}/{id}?range={range}">{name}</a> {badge} {version}</div>
  <dl>
    <dt>CPU</dt><dd>{cpu}</dd>
    <dt>Memory</dt><dd>{mem}</dd>
    <dt>Uptime</dt><dd>{uptime}</dd>
    <dt>Latency</dt><dd>{latency}{target}</dd>
    <dt>Upload</dt><dd>{tx}</dd>
    <dt>Download</dt><dd>{rx}</dd>
  </dl>
  {billing}
  {cycle}
</div>"#,
        base = scope.base_path(),
        id = card.id,
        range = range,
        name = escape(&card.name),
        badge = badge,
        version = version,
        cpu = card.cpu,
        mem = card.mem,
        uptime = card.uptime,
        latency = card.latency,
        target = target,
        tx = card.tx,
        rx = card.rx,
        billing = billing,
        cycle = cycle,
    )
}

fn cycle_form(card: &NodeCard, range: Range) -> String {
    let mut options = vec![format!(
        r#"<option value=""{}>default</option>"#,
        if card.cycle_override.is_none() { " selected" } else { "" }
    )];
    for (days, label) in CYCLE_PRESETS {
        let selected = if card.cycle_override == Some(days) { " selected" } else { "" };
        options.push(format!(r#"<option value="{}"{}>{}</option>"#, days, selected, label));
    }

    format!(
        r#"<form class="cycle" method="post" action="/network/cycle">
    <input type="hidden" name="node_id" value="{}">
    <input type="hidden" name="range" value="{}">
    <select name="days" onchange="this.form.submit()">{}</select>
  </form>"#,
        card.id,
        range,
        options.join("")
    )
}

fn detail(view: &TelemetryView<EchartsEngine>) -> String {
    let scope = view.scope();
    let Some(node_id) = view.route().node_id() else {
        return String::new();
    };
    let detail = view.detail();
    let option = view
        .surface()
        .map(|s| s.option().to_string())
        .unwrap_or_else(|| "null".to_string());
    let base = format!("{}/{}", scope.base_path(), node_id);

    DETAIL_TEMPLATE
        .replace("{{back}}", &format!("{}?range={}", scope.base_path(), view.range()))
        .replace("{{node_name}}", &escape(&detail.node_name))
        .replace("{{range_tabs}}", &range_tabs(&base, view.range()))
        .replace("{{status}}", status_html(view.phase()))
        .replace("{{sla}}", &detail.sla_text())
        .replace("{{scope}}", scope_token(scope))
        .replace("{{node_id}}", &node_id.to_string())
        .replace("{{range}}", view.range().token())
        .replace("{{outages}}", &outages_html(&detail.outage_rows()))
        // JSON is embedded in a <script> element
        .replace("{{option_json}}", &option.replace("</", "<\\/"))
}

pub fn scope_token(scope: Scope) -> &'static str {
    match scope {
        Scope::Authenticated => "admin",
        Scope::Shared => "share",
    }
}

fn outages_html(rows: &[OutageRow]) -> String {
    if rows.is_empty() {
        return r#"<tr><td colspan="3" class="empty">No disconnects recorded</td></tr>"#.to_string();
    }
    rows.iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                r.started, r.recovered, r.duration
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
