//! Turns a persisted run into the comparison summary, CSV and charts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Pairing;
use crate::chart::{self, THEMES};
use crate::error::{Error, Result};
use crate::schema::{LoadedRun, Sample, Summary, SummaryRow};

pub const SUMMARY_JSON: &str = "bench_summary.json";
pub const SUMMARY_CSV: &str = "bench_summary.csv";
pub const CHARTS_DIR: &str = "charts";

pub const CSV_HEADER: [&str; 7] = [
    "case_id",
    "title",
    "n",
    "iters",
    "mini_median_ns_per_op",
    "std_median_ns_per_op",
    "ratio_mini_vs_std",
];

pub fn load_run(path: &Path) -> Result<LoadedRun> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Lookup by case name. A name printed twice keeps its last sample.
pub fn index_samples(results: &[Sample]) -> HashMap<&str, &Sample> {
    let mut by_name = HashMap::with_capacity(results.len());
    for sample in results {
        if by_name.insert(sample.name.as_str(), sample).is_some() {
            // TODO: decide whether duplicate case names should be rejected outright
            log::warn!(
                "duplicate sample name {:?}; keeping the last occurrence",
                sample.name
            );
        }
    }
    by_name
}

/// Candidate over baseline median ns/op, if the baseline is present and positive.
///
/// A quotient that overflows to infinity counts as absent.
pub fn ratio(candidate: Option<&Sample>, baseline: Option<&Sample>) -> Option<f64> {
    match (candidate, baseline) {
        (Some(c), Some(b)) if b.median_ns_per_op > 0.0 => {
            Some(c.median_ns_per_op / b.median_ns_per_op).filter(|r| r.is_finite())
        }
        _ => None,
    }
}

pub fn summarize(results: &[Sample], catalog: &[Pairing]) -> Vec<SummaryRow> {
    let by_name = index_samples(results);

    catalog
        .iter()
        .map(|pair| {
            let mini = by_name.get(pair.candidate).copied();
            let std = by_name.get(pair.baseline).copied();
            if mini.is_none() && std.is_none() {
                log::debug!("no samples for {}", pair.case_id);
            }
            let counts = mini.or(std);

            SummaryRow {
                case_id: pair.case_id.to_string(),
                title: pair.title.to_string(),
                n: counts.map(|s| s.n),
                iters: counts.map(|s| s.iters),
                mini_median_ns_per_op: mini.map(|s| s.median_ns_per_op),
                std_median_ns_per_op: std.map(|s| s.median_ns_per_op),
                ratio_mini_vs_std: ratio(mini, std),
            }
        })
        .collect()
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn render_csv(rows: &[SummaryRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        let fields = [
            csv_field(&row.case_id),
            csv_field(&row.title),
            opt(row.n),
            opt(row.iters),
            opt(row.mini_median_ns_per_op),
            opt(row.std_median_ns_per_op),
            opt(row.ratio_mini_vs_std),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

pub fn render_summary_json(
    meta: &serde_json::Map<String, serde_json::Value>,
    run: &Path,
    rows: &[SummaryRow],
) -> Result<String> {
    let summary = Summary {
        meta,
        run: run.display().to_string(),
        pairs: rows,
    };
    serde_json::to_string_pretty(&summary).map_err(|source| Error::Serialize {
        what: "summary",
        source,
    })
}

/// Files written by [`write_report`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub summary_json: PathBuf,
    pub summary_csv: PathBuf,
    pub charts: Vec<PathBuf>,
}

pub fn chart_path(out_dir: &Path, theme: &chart::Theme) -> PathBuf {
    out_dir
        .join(CHARTS_DIR)
        .join(format!("ratio-{}.svg", theme.name))
}

/// Render everything for the run at `run`, then write it under `out_dir`.
pub fn write_report(run: &Path, out_dir: &Path, catalog: &[Pairing]) -> Result<ReportPaths> {
    let record = load_run(run)?;
    log::info!(
        "loaded {} samples from {}",
        record.results.len(),
        run.display()
    );
    let rows = summarize(&record.results, catalog);

    let json = render_summary_json(&record.meta, run, &rows)?;
    let csv = render_csv(&rows);
    let charts: Vec<(PathBuf, String)> = THEMES
        .iter()
        .map(|theme| {
            (
                chart_path(out_dir, theme),
                chart::render_ratio_chart(&rows, theme),
            )
        })
        .collect();

    let charts_dir = out_dir.join(CHARTS_DIR);
    fs::create_dir_all(&charts_dir).map_err(|e| Error::io(&charts_dir, e))?;

    let paths = ReportPaths {
        summary_json: out_dir.join(SUMMARY_JSON),
        summary_csv: out_dir.join(SUMMARY_CSV),
        charts: charts.iter().map(|(p, _)| p.clone()).collect(),
    };
    fs::write(&paths.summary_json, json).map_err(|e| Error::io(&paths.summary_json, e))?;
    fs::write(&paths.summary_csv, csv).map_err(|e| Error::io(&paths.summary_csv, e))?;
    for (path, svg) in &charts {
        fs::write(path, svg).map_err(|e| Error::io(path, e))?;
    }

    let with_ratio = rows
        .iter()
        .filter(|r| r.ratio_mini_vs_std.is_some())
        .count();
    log::info!("{with_ratio}/{} pairings have a ratio", rows.len());
    Ok(paths)
}
