use crate::heatmap::{DailyGrid, HeatmapCell};
use crate::models::Theme;

const GREEN: (u8, u8, u8) = (47, 179, 106);
const RED: (u8, u8, u8) = (227, 83, 63);
const EMPTY_DAY: &str = "#f1f0ec";

pub struct HeatmapPage<'a> {
    pub user_id: Option<&'a str>,
    pub year: i32,
    pub years: &'a [i32],
    pub grid: &'a DailyGrid,
    pub theme: Theme,
}

pub fn render_index(page: &HeatmapPage<'_>) -> String {
    let year = page.year.to_string();
    let Some(user_id) = page.user_id else {
        return fill_template(
            INDEX_HTML,
            &[
                ("THEME", "light"),
                ("YEAR", year.as_str()),
                ("ACCOUNT", ""),
                ("YEARS", ""),
                ("SUMMARY", "Sign in to see your goals."),
                ("HEATMAP", ""),
            ],
        );
    };

    let (passed, failed) = page
        .grid
        .weeks
        .iter()
        .flatten()
        .flatten()
        .fold((0u32, 0u32), |(pass, fail), cell| {
            (
                pass.saturating_add(cell.pass_count),
                fail.saturating_add(cell.fail_count),
            )
        });

    let theme = match page.theme {
        Theme::Light => "light",
        Theme::Dark => "dark",
    };

    let account = format!("Signed in as {}", escape_html(user_id));
    let years = render_year_links(page.year, page.years);
    let summary = format!("{passed} passed, {failed} failed");
    let heatmap = render_grid(page.grid);

    fill_template(
        INDEX_HTML,
        &[
            ("THEME", theme),
            ("YEAR", year.as_str()),
            ("ACCOUNT", account.as_str()),
            ("YEARS", years.as_str()),
            ("SUMMARY", summary.as_str()),
            ("HEATMAP", heatmap.as_str()),
        ],
    )
}

/// Replaces each `{{NAME}}` marker in a single pass. Substituted text is
/// never scanned again, and unknown markers are left as they are.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut html = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}") else {
            break;
        };
        let name = &rest[start + 2..start + len];
        html.push_str(&rest[..start]);
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => html.push_str(value),
            None => html.push_str(&rest[start..start + len + 2]),
        }
        rest = &rest[start + len + 2..];
    }
    html.push_str(rest);
    html
}

fn render_year_links(selected: i32, years: &[i32]) -> String {
    years
        .iter()
        .map(|year| {
            let class = if *year == selected { "year active" } else { "year" };
            format!(r#"<a class="{class}" href="/?year={year}">{year}</a>"#)
        })
        .collect::<Vec<_>>()
        .join("\n        ")
}

fn render_grid(grid: &DailyGrid) -> String {
    let mut html = String::new();

    html.push_str(r#"<div class="months">"#);
    for label in &grid.month_labels {
        html.push_str(&format!(
            r#"<span style="grid-column: {}">{}</span>"#,
            label.index + 1,
            escape_html(&label.label)
        ));
    }
    html.push_str("</div>\n");

    html.push_str(r#"<div class="weeks">"#);
    for week in &grid.weeks {
        html.push_str(r#"<div class="week">"#);
        for slot in week {
            match slot {
                Some(cell) => html.push_str(&render_cell(cell, grid.max_total)),
                None => html.push_str(r#"<span class="day blank"></span>"#),
            }
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn render_cell(cell: &HeatmapCell, max_total: u32) -> String {
    let title = format!(
        "{}: {} passed, {} failed",
        cell.label, cell.pass_count, cell.fail_count
    );
    format!(
        r#"<span class="day" data-date="{}" style="background: {}" title="{}"></span>"#,
        cell.key,
        cell_background(cell, max_total),
        escape_html(&title)
    )
}

/// Passed share in green on the left, failed in red on the right.
pub fn cell_background(cell: &HeatmapCell, max_total: u32) -> String {
    if cell.total() == 0 {
        return EMPTY_DAY.to_string();
    }
    let alpha = cell.intensity(max_total);
    let split = (cell.pass_ratio() * 100.0).round() as u32;
    format!(
        "linear-gradient(90deg, rgba({}, {}, {}, {alpha}) {split}%, rgba({}, {}, {}, {alpha}) {split}%)",
        GREEN.0, GREEN.1, GREEN.2, RED.0, RED.1, RED.2
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Quickgoal · {{YEAR}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #f8f5f0;
      --ink: #1a1a1a;
      --muted: #6b6b6b;
      --line: #e6e0d8;
      --card: rgba(255, 255, 255, 0.9);
    }

    html.dark {
      --bg: #151514;
      --ink: #f1f0ec;
      --muted: #a29d96;
      --line: #34322f;
      --card: rgba(32, 31, 29, 0.9);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    .summary,
    .account {
      color: var(--muted);
      margin: 0;
    }

    .years {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
    }

    .year {
      border: 1px solid var(--line);
      border-radius: 999px;
      padding: 4px 12px;
      color: var(--muted);
      text-decoration: none;
    }

    .year.active {
      background: var(--ink);
      color: var(--bg);
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 16px;
      padding: 20px;
      overflow-x: auto;
    }

    .months {
      display: grid;
      grid-auto-columns: 15px;
      grid-auto-flow: column;
      font-size: 10px;
      color: var(--muted);
      height: 14px;
    }

    .weeks {
      display: flex;
      gap: 3px;
    }

    .week {
      display: grid;
      grid-template-rows: repeat(7, 12px);
      gap: 3px;
    }

    .day {
      width: 12px;
      height: 12px;
      border-radius: 4px;
      border: 1px solid var(--line);
    }

    .day.blank {
      border: none;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Quickgoal {{YEAR}}</h1>
      <p class="summary">{{SUMMARY}}</p>
      <p class="account">{{ACCOUNT}}</p>
    </header>
    <nav class="years">
        {{YEARS}}
    </nav>
    <section class="card">
      {{HEATMAP}}
    </section>
  </main>
</body>
</html>
"#;
