use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

const BIN: &str = env!("CARGO_BIN_EXE_stl-bench-harness");

const RUN_RECORD: &str = r#"{
  "meta": {
    "timestamp": "2026-03-01T12:30:00.000000+00:00",
    "platform": "Linux-6.8.0-x86_64",
    "cpu": "AMD EPYC 7B13",
    "compiler": "c++ (GCC) 13.2.0",
    "harness_version": "0.3.0",
    "bench_args": { "n": 200000, "iters": 5, "warmup": 1, "filter": null },
    "git_sha": "0123456789abcdef0123456789abcdef01234567",
    "git_dirty": false
  },
  "results": [
    { "name": "Vector<int>::push_back (reserve)", "iters": 5, "n": 200000,
      "min_ns": 100, "median_ns": 110, "mean_ns": 112, "max_ns": 130,
      "min_ns_per_op": 0.0005, "median_ns_per_op": 0.00055, "mean_ns_per_op": 0.00056, "max_ns_per_op": 0.00065 },
    { "name": "std::vector<int>::push_back (reserve)", "iters": 5, "n": 200000,
      "min_ns": 200, "median_ns": 220, "mean_ns": 224, "max_ns": 260,
      "min_ns_per_op": 0.001, "median_ns_per_op": 0.0011, "mean_ns_per_op": 0.00112, "max_ns_per_op": 0.0013 }
  ]
}"#;

fn report(run: &Path, out: &Path) -> std::process::Output {
    Command::new(BIN)
        .arg("report")
        .arg("--run")
        .arg(run)
        .arg("--out-dir")
        .arg(out)
        .output()
        .expect("failed to run binary")
}

#[test]
fn report_writes_summary_and_charts() {
    let dir = tempdir().unwrap();
    let run = dir.path().join("bench-20260301-123000.json");
    fs::write(&run, RUN_RECORD).unwrap();
    let out = dir.path().join("docs");

    let output = report(&run, &out);
    assert!(output.status.success(), "{output:?}");

    let csv = fs::read_to_string(out.join("bench_summary.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(
        lines[0],
        "case_id,title,n,iters,mini_median_ns_per_op,std_median_ns_per_op,ratio_mini_vs_std"
    );
    assert_eq!(lines[1], "deque_push_pop,Deque push_back+pop_front,,,,,");
    assert!(
        lines[3].starts_with("vector_push_back_reserve,Vector push_back (reserve),200000,5,0.00055,0.0011,0.5"),
        "{}",
        lines[3]
    );

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("bench_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["run"], run.display().to_string());
    assert_eq!(summary["meta"]["git_dirty"], false);
    assert_eq!(summary["pairs"].as_array().unwrap().len(), 10);

    for theme in ["light", "dark"] {
        let svg = fs::read_to_string(out.join("charts").join(format!("ratio-{theme}.svg"))).unwrap();
        assert_eq!(svg.matches(r#"class="bar""#).count(), 10);
        assert_eq!(svg.matches(r#"class="baseline""#).count(), 1);
    }
}

#[test]
fn report_on_missing_run_fails() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("docs");
    let output = report(&dir.path().join("nope.json"), &out);
    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn run_without_executable_fails() {
    let dir = tempdir().unwrap();
    let output = Command::new(BIN)
        .arg("run")
        .arg("--root")
        .arg(dir.path())
        .arg("--no-build")
        .output()
        .expect("failed to run binary");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing benchmark binary"), "{stderr}");
    assert!(!dir.path().join("docs").exists());
}
