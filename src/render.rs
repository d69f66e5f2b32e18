/// Board rendering.
///
/// Turns sorted, filtered records into display rows, and display rows into
/// the two surfaces the board publishes: an HTML page (table body, group
/// bar, status line) and a plain console table. Every render rebuilds the
/// whole surface from scratch; boards are a few hundred rows at most.

use std::fmt::Write as _;

use crate::fields::fields_for;
use crate::format::{PLACEHOLDER, display_raw, format_numeric, parse_numeric};
use crate::groups::GroupFilter;
use crate::model::{Record, Tab};
use crate::window::Window;

/// Arrow glyph, rotated per row by the indicator angle.
pub const ARROW_IMAGE: &str = "/static/images/arrow.webp";

// ---------------------------------------------------------------------------
// Row model
// ---------------------------------------------------------------------------

/// One painted table row. Text fields are display-ready.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRow {
    /// 1-based position in sorted order.
    pub rank: usize,
    pub name: String,
    pub station_id: String,
    pub speed: String,
    pub direction: String,
    /// Rotation for the arrow glyph; `None` shows the placeholder.
    pub arrow_angle: Option<f64>,
    pub time: String,
}

/// One button of the group bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupButton {
    pub name: String,
    pub active: bool,
}

/// Everything a surface needs to paint the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub tab: Tab,
    pub window: Window,
    pub rows: Vec<BoardRow>,
    pub groups: Vec<GroupButton>,
    pub updated_label: String,
    /// Set when the last refresh failed and `rows` are from an older fetch.
    pub stale_error: Option<String>,
}

/// Converts a wind-from direction into the blows-toward angle for the arrow.
///
/// Absent directions and exactly 0° both mean "no arrow": the convention
/// used upstream reports calm and unknown alike as 0.
pub fn indicator_angle(direction_deg: Option<f64>) -> Option<f64> {
    match direction_deg {
        Some(deg) if deg != 0.0 => Some((deg + 180.0).rem_euclid(360.0)),
        _ => None,
    }
}

/// Builds display rows, in the order given, using the tab's field mapping.
pub fn build_rows(tab: Tab, records: &[&Record]) -> Vec<BoardRow> {
    let fields = fields_for(tab);
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let direction = r.value(fields.direction);
            BoardRow {
                rank: i + 1,
                name: r.name.clone(),
                station_id: r.station_id.clone(),
                speed: format_numeric(parse_numeric(r.value(fields.speed))),
                direction: display_raw(direction),
                arrow_angle: indicator_angle(parse_numeric(direction)),
                time: display_raw(r.value(fields.time)),
            }
        })
        .collect()
}

pub fn group_buttons(filter: &GroupFilter) -> Vec<GroupButton> {
    filter
        .available()
        .iter()
        .map(|name| GroupButton {
            name: name.clone(),
            active: name == filter.selected(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// HTML surface
// ---------------------------------------------------------------------------

/// Renders `records` (already filtered and sorted) as `<tbody>` content.
pub fn render(tab: Tab, records: &[&Record]) -> String {
    render_table_body(&build_rows(tab, records))
}

pub fn render_table_body(rows: &[BoardRow]) -> String {
    let mut html = String::new();
    for row in rows {
        let arrow = match row.arrow_angle {
            Some(angle) => format!(
                r#"<td class="dir-arrow"><img src="{}" alt="dir" style="transform:rotate({}deg);" /></td>"#,
                ARROW_IMAGE, angle
            ),
            None => format!(r#"<td class="dir-arrow">{}</td>"#, PLACEHOLDER),
        };
        let _ = writeln!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td class="muted">{}</td><td>{}</td><td>{}</td>{}<td class="muted">{}</td></tr>"#,
            row.rank,
            html_escape(&row.name),
            html_escape(&row.station_id),
            html_escape(&row.speed),
            html_escape(&row.direction),
            arrow,
            html_escape(&row.time),
        );
    }
    html
}

pub fn render_group_bar(buttons: &[GroupButton]) -> String {
    buttons
        .iter()
        .map(|b| {
            let class = if b.active { "group-btn active" } else { "group-btn" };
            format!(
                r#"<button class="{}" data-group="{}">{}</button>"#,
                class,
                html_escape(&b.name),
                html_escape(&b.name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a self-contained board page.
pub fn render_page(view: &BoardView) -> String {
    let stale_banner = view
        .stale_error
        .as_ref()
        .map(|err| {
            format!(
                r#"<div class="stale">資料更新失敗，目前顯示的是先前的資料（{}）</div>"#,
                html_escape(err)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
    <meta charset="UTF-8">
    <title>風速看板 - {window}</title>
</head>
<body>
    <header>
        <span class="window">{window}</span>
        <span class="tab" data-tab="{tab_id}">{tab}</span>
        <span class="muted">更新時間：<span id="updatedAt">{updated}</span></span>
    </header>
    {stale_banner}
    <nav id="groupBar">
{group_bar}
    </nav>
    <table id="board">
        <thead><tr><th>#</th><th>站名</th><th>站號</th><th>風速</th><th>風向</th><th></th><th>時間</th></tr></thead>
        <tbody>
{body}        </tbody>
    </table>
</body>
</html>
"#,
        window = view.window.label(),
        tab_id = view.tab.id(),
        tab = view.tab.label(),
        updated = html_escape(&view.updated_label),
        stale_banner = stale_banner,
        group_bar = render_group_bar(&view.groups),
        body = render_table_body(&view.rows),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ---------------------------------------------------------------------------
// Console surface
// ---------------------------------------------------------------------------

/// Plain-text board for terminal output.
pub fn render_console(view: &BoardView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {} | 更新時間: {}",
        view.window.label(),
        view.tab.label(),
        view.updated_label
    );
    if let Some(err) = &view.stale_error {
        let _ = writeln!(out, "!! stale: {}", err);
    }
    let groups: Vec<String> = view
        .groups
        .iter()
        .map(|g| if g.active { format!("[{}]", g.name) } else { g.name.clone() })
        .collect();
    let _ = writeln!(out, "groups: {}", groups.join(" "));
    // Header names the payload fields the tab reads.
    let fields = fields_for(view.tab);
    let _ = writeln!(
        out,
        "{:>4}  {:<16} {:<8} {:>10} {:>8} {:>6}  {}",
        "#",
        "name",
        "station",
        fields.speed.wire_name(),
        fields.direction.wire_name(),
        "arrow",
        fields.time.wire_name()
    );
    for row in &view.rows {
        let arrow = row
            .arrow_angle
            .map(|a| format!("{}°", a))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let _ = writeln!(
            out,
            "{:>4}  {:<16} {:<8} {:>10} {:>8} {:>6}  {}",
            row.rank, row.name, row.station_id, row.speed, row.direction, arrow, row.time
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rec(value: Value) -> Record {
        serde_json::from_value(value).expect("record should decode")
    }

    fn sample_view(rows: Vec<BoardRow>) -> BoardView {
        BoardView {
            tab: Tab::AverageWind,
            window: Window::Now,
            rows,
            groups: vec![
                GroupButton { name: "全部".to_string(), active: true },
                GroupButton { name: "茶葉產區".to_string(), active: false },
            ],
            updated_label: "10:05".to_string(),
            stale_error: None,
        }
    }

    // --- indicator_angle ----------------------------------------------------

    #[test]
    fn test_angle_points_downwind() {
        assert_eq!(indicator_angle(Some(90.0)), Some(270.0));
        assert_eq!(indicator_angle(Some(180.0)), Some(0.0));
        assert_eq!(indicator_angle(Some(270.0)), Some(90.0));
        assert_eq!(indicator_angle(Some(359.0)), Some(179.0));
    }

    #[test]
    fn test_zero_and_absent_direction_have_no_arrow() {
        assert_eq!(indicator_angle(Some(0.0)), None);
        assert_eq!(indicator_angle(None), None);
    }

    // --- build_rows ---------------------------------------------------------

    #[test]
    fn test_rows_carry_rank_and_formatted_values() {
        let a = rec(json!({"name": "S1", "station_id": "001", "speed": "12.34", "dir": "90", "time": "10:00"}));
        let b = rec(json!({"name": "S2", "station_id": "002", "speed": null, "dir": null, "time": null}));
        let rows = build_rows(Tab::AverageWind, &[&a, &b]);

        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].speed, "12.3");
        assert_eq!(rows[0].direction, "90");
        assert_eq!(rows[0].arrow_angle, Some(270.0));
        assert_eq!(rows[0].time, "10:00");

        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].speed, "—");
        assert_eq!(rows[1].direction, "—");
        assert_eq!(rows[1].arrow_angle, None);
        assert_eq!(rows[1].time, "—");
    }

    #[test]
    fn test_gust_tab_reads_gust_columns() {
        let r = rec(json!({
            "name": "S1", "station_id": "001",
            "speed": 2.0, "dir": 45,
            "gust_speed": 8.26, "gust_dir": 200, "time": "10:00"
        }));
        let rows = build_rows(Tab::Gust, &[&r]);
        assert_eq!(rows[0].speed, "8.3");
        assert_eq!(rows[0].direction, "200");
        assert_eq!(rows[0].arrow_angle, Some(20.0));
    }

    #[test]
    fn test_non_numeric_direction_shows_raw_text_without_arrow() {
        let r = rec(json!({"name": "S1", "station_id": "001", "dir": "calm"}));
        let rows = build_rows(Tab::AverageWind, &[&r]);
        assert_eq!(rows[0].direction, "calm");
        assert_eq!(rows[0].arrow_angle, None);
    }

    // --- HTML ---------------------------------------------------------------

    #[test]
    fn test_table_body_renders_arrow_rotation() {
        let a = rec(json!({"name": "S1", "station_id": "001", "speed": 5, "dir": 90, "time": "10:00"}));
        let html = render(Tab::AverageWind, &[&a]);
        assert!(html.contains("transform:rotate(270deg);"), "got {}", html);
        assert!(html.contains(ARROW_IMAGE));
        assert!(html.contains("<td>1</td>"));
        assert_eq!(html.matches("<tr>").count(), 1);
    }

    #[test]
    fn test_table_body_uses_placeholder_arrow() {
        let a = rec(json!({"name": "S1", "station_id": "001", "dir": 0}));
        let html = render(Tab::AverageWind, &[&a]);
        assert!(html.contains(r#"<td class="dir-arrow">—</td>"#), "got {}", html);
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_backend_text_is_escaped() {
        let a = rec(json!({"name": "<script>x</script>", "station_id": "a&b"}));
        let html = render(Tab::AverageWind, &[&a]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&amp;b"));
    }

    #[test]
    fn test_group_bar_marks_active_button() {
        let bar = render_group_bar(&sample_view(Vec::new()).groups);
        assert!(bar.contains(r#"<button class="group-btn active" data-group="全部">全部</button>"#));
        assert!(bar.contains(r#"<button class="group-btn" data-group="茶葉產區">茶葉產區</button>"#));
    }

    #[test]
    fn test_page_shows_stale_banner_only_when_stale() {
        let mut view = sample_view(Vec::new());
        assert!(!render_page(&view).contains(r#"class="stale""#));

        view.stale_error = Some("HTTP error: 502".to_string());
        let page = render_page(&view);
        assert!(page.contains(r#"class="stale""#));
        assert!(page.contains("HTTP error: 502"));
        assert!(page.contains(r#"<span id="updatedAt">10:05</span>"#));
    }

    // --- Console ------------------------------------------------------------

    #[test]
    fn test_console_lists_rows_and_active_group() {
        let a = rec(json!({"name": "S1", "station_id": "001", "speed": 3, "dir": 90}));
        let view = sample_view(build_rows(Tab::AverageWind, &[&a]));
        let text = render_console(&view);
        assert!(text.contains("[全部]"));
        assert!(text.contains("S1"));
        assert!(text.contains("270°"));
        assert!(text.contains("3.0"));
        assert!(text.contains(" speed "), "average wind header names the speed field");
    }

    #[test]
    fn test_console_header_follows_gust_tab() {
        let mut view = sample_view(Vec::new());
        view.tab = Tab::Gust;
        let text = render_console(&view);
        assert!(text.contains("gust_speed"), "got {}", text);
        assert!(text.contains("gust_dir"), "got {}", text);
    }

    #[test]
    fn test_float_direction_shows_as_whole_degrees() {
        let r = rec(json!({"name": "S1", "station_id": "001", "speed": 4.25, "dir": 90.0}));
        let rows = build_rows(Tab::AverageWind, &[&r]);
        assert_eq!(rows[0].direction, "90");
        assert_eq!(rows[0].speed, "4.3");
        assert_eq!(rows[0].arrow_angle, Some(270.0));
    }
}
