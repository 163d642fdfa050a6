//! Horizontal bar chart of candidate/baseline ratios, one bar per catalog row.
//!
//! The geometry depends only on the rows; the theme only changes colors, so the
//! light and dark renders of the same rows line up exactly.

use crate::schema::SummaryRow;

pub const WIDTH: u32 = 900;
pub const ROW_HEIGHT: u32 = 28;
pub const TOP: u32 = 40;
pub const LEFT: u32 = 260;
pub const RIGHT: u32 = 40;
pub const BOTTOM: u32 = 40;
pub const BAR_HEIGHT: u32 = 18;

/// Extra room to the right of the longest bar.
const HEADROOM: f64 = 1.1;

const TITLE: &str = "Median ns/op ratio (my-stl / std). Lower is better.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub text: &'static str,
    pub axis: &'static str,
    pub bar: &'static str,
    pub baseline: &'static str,
    pub background: &'static str,
}

pub const LIGHT: Theme = Theme {
    name: "light",
    text: "#24292f",
    axis: "#57606a",
    bar: "#2f6f8f",
    baseline: "#c23a3a",
    background: "#ffffff",
};

pub const DARK: Theme = Theme {
    name: "dark",
    text: "#e6edf3",
    axis: "#8b949e",
    bar: "#58a6ff",
    baseline: "#f85149",
    background: "#0d1117",
};

pub const THEMES: [Theme; 2] = [LIGHT, DARK];

pub fn height(rows: usize) -> u32 {
    TOP + ROW_HEIGHT * rows as u32 + BOTTOM
}

/// Maps a ratio to an x coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    max_ratio: f64,
}

impl Scale {
    pub fn for_rows(rows: &[SummaryRow]) -> Self {
        let max_ratio = rows
            .iter()
            .filter_map(|r| r.ratio_mini_vs_std)
            .fold(1.0_f64, f64::max);
        Self {
            max_ratio: max_ratio * HEADROOM,
        }
    }

    pub fn x(&self, ratio: f64) -> f64 {
        let usable = f64::from(WIDTH - LEFT - RIGHT);
        f64::from(LEFT) + (ratio / self.max_ratio) * usable
    }
}

pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.2}x"),
        None => "n/a".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_ratio_chart(rows: &[SummaryRow], theme: &Theme) -> String {
    let height = height(rows.len());
    let scale = Scale::for_rows(rows);
    let line_top = TOP - 6;
    let line_bottom = height - 20;

    let mut lines = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" role="img">"#
        ),
        format!(
            "<style>text{{font-family:Arial, sans-serif;font-size:12px;fill:{};}}\
             .axis{{stroke:{};stroke-width:1;}}\
             .bar{{fill:{};}}\
             .baseline{{stroke:{};stroke-width:1;stroke-dasharray:4 4;}}</style>",
            theme.text, theme.axis, theme.bar, theme.baseline
        ),
        format!(
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            theme.background
        ),
        format!(r#"<text x="{LEFT}" y="20">{}</text>"#, escape(TITLE)),
        format!(
            r#"<line class="axis" x1="{LEFT}" y1="{line_top}" x2="{LEFT}" y2="{line_bottom}"/>"#
        ),
        format!(
            r#"<line class="baseline" x1="{x:.1}" y1="{line_top}" x2="{x:.1}" y2="{line_bottom}"/>"#,
            x = scale.x(1.0)
        ),
    ];

    for (i, row) in rows.iter().enumerate() {
        let y = TOP + i as u32 * ROW_HEIGHT;
        let bar_w = scale.x(row.ratio_mini_vs_std.unwrap_or(0.0)) - f64::from(LEFT);
        lines.push(format!(
            r#"<text x="10" y="{}">{}</text>"#,
            y + 15,
            escape(&row.title)
        ));
        lines.push(format!(
            r#"<rect class="bar" x="{LEFT}" y="{y}" width="{bar_w:.1}" height="{BAR_HEIGHT}"/>"#
        ));
        lines.push(format!(
            r#"<text x="{:.1}" y="{}">{}</text>"#,
            f64::from(LEFT) + bar_w + 6.0,
            y + 15,
            format_ratio(row.ratio_mini_vs_std)
        ));
    }

    lines.push("</svg>".to_string());
    lines.join("\n")
}
