use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parsed benchmark line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub iters: u64,
    pub n: u64,

    pub min_ns: u64,
    pub median_ns: u64,
    pub mean_ns: u64,
    pub max_ns: u64,

    pub min_ns_per_op: f64,
    pub median_ns_per_op: f64,
    pub mean_ns_per_op: f64,
    pub max_ns_per_op: f64,
}

/// Arguments the benchmark executable was invoked with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchArgs {
    pub n: u64,
    pub iters: u64,
    pub warmup: u64,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub timestamp: String,
    pub platform: String,
    pub cpu: String,
    pub compiler: String,
    pub harness_version: String,
    pub bench_args: BenchArgs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_dirty: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_build_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cxx_compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cxx_flags_release: Option<String>,

    /// Keys written by other tools; carried through to the summary untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The persisted artifact of one `run` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub meta: Metadata,
    pub results: Vec<Sample>,
}

/// A run record as the reporter reads it back.
///
/// `meta` stays a free-form object so records from other writers load too.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoadedRun {
    pub meta: serde_json::Map<String, serde_json::Value>,
    pub results: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub case_id: String,
    pub title: String,
    pub n: Option<u64>,
    pub iters: Option<u64>,
    pub mini_median_ns_per_op: Option<f64>,
    pub std_median_ns_per_op: Option<f64>,
    pub ratio_mini_vs_std: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary<'a> {
    pub meta: &'a serde_json::Map<String, serde_json::Value>,
    pub run: String,
    pub pairs: &'a [SummaryRow],
}
