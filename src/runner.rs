use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};

use crate::error::{Error, Result};
use crate::harness::{bench_executable, run_captured, BenchConfig};
use crate::metadata::Collector;
use crate::parse::parse_output;
use crate::schema::RunRecord;

#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Project root; the build runs on it and the benchmark runs in it.
    pub root: PathBuf,
    pub build_dir: PathBuf,
    /// CMake program used for the configure and build steps.
    pub cmake: PathBuf,
    pub no_build: bool,
    pub bench: BenchConfig,
    pub out_dir: PathBuf,
    pub label: Option<String>,
}

impl RunOptions {
    /// `build_dir` relative to the root (absolute paths are kept).
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.build_dir)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.out_dir)
    }
}

/// The two files a run leaves behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunArtifacts {
    pub json: PathBuf,
    pub log: PathBuf,
}

/// `bench-<stamp>[-<label>]`
pub fn artifact_stem(stamp: &str, label: Option<&str>) -> String {
    match label.filter(|l| !l.is_empty()) {
        Some(label) => format!("bench-{stamp}-{label}"),
        None => format!("bench-{stamp}"),
    }
}

/// Configure and build the project in release mode.
pub fn build(cmake: &Path, root: &Path, build_dir: &Path) -> Result<()> {
    log::info!("configuring {} into {}", root.display(), build_dir.display());
    let configure = run_captured(
        cmake,
        &[
            OsStr::new("-S"),
            root.as_os_str(),
            OsStr::new("-B"),
            build_dir.as_os_str(),
            OsStr::new("-DCMAKE_BUILD_TYPE=Release"),
        ],
        None,
    )?;
    log::debug!("{}", configure.trim_end());

    log::info!("building {}", build_dir.display());
    let built = run_captured(
        cmake,
        &[OsStr::new("--build"), build_dir.as_os_str(), OsStr::new("-j")],
        None,
    )?;
    log::debug!("{}", built.trim_end());
    Ok(())
}

/// Build, benchmark, and persist one [`RunRecord`].
///
/// Nothing is written unless every step before persisting succeeded.
pub fn run(opts: &RunOptions, collector: &Collector) -> Result<RunArtifacts> {
    let build_dir = opts.build_dir();
    if opts.no_build {
        log::info!("skipping build");
    } else {
        build(&opts.cmake, &opts.root, &build_dir)?;
    }

    let exe = bench_executable(&build_dir);
    if !exe.is_file() {
        return Err(Error::MissingExecutable(exe));
    }

    log::info!("running {} {}", exe.display(), opts.bench.args().join(" "));
    let output = run_captured(&exe, &opts.bench.args(), Some(opts.root.as_path()))?;
    let results = parse_output(&output);
    if results.is_empty() {
        return Err(Error::NoSamples);
    }
    log::info!("parsed {} samples", results.len());

    let now = Utc::now();
    let record = RunRecord {
        meta: collector.collect(now, &opts.bench, &build_dir),
        results,
    };

    let stamp = now.with_timezone(&Local).format("%Y%m%d-%H%M%S").to_string();
    let stem = artifact_stem(&stamp, opts.label.as_deref());
    write_artifacts(&opts.out_dir(), &stem, &record, &output)
}

fn create_new(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::ArtifactExists(path.to_path_buf()),
            _ => Error::io(path, e),
        })?;
    file.write_all(contents).map_err(|e| Error::io(path, e))
}

/// Write `<stem>.json` and `<stem>.log`. Existing files are never replaced.
pub fn write_artifacts(
    out_dir: &Path,
    stem: &str,
    record: &RunRecord,
    output: &str,
) -> Result<RunArtifacts> {
    let json = serde_json::to_string_pretty(record).map_err(|source| Error::Serialize {
        what: "run record",
        source,
    })?;

    fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
    let artifacts = RunArtifacts {
        json: out_dir.join(format!("{stem}.json")),
        log: out_dir.join(format!("{stem}.log")),
    };
    for path in [&artifacts.json, &artifacts.log] {
        if path.exists() {
            return Err(Error::ArtifactExists(path.clone()));
        }
    }

    persist(&artifacts, json.as_bytes(), format!("{}\n", output.trim_end()).as_bytes())?;
    Ok(artifacts)
}

/// Both files or neither: a failed log write takes the record back out.
fn persist(artifacts: &RunArtifacts, json: &[u8], raw: &[u8]) -> Result<()> {
    create_new(&artifacts.json, json)?;
    if let Err(e) = create_new(&artifacts.log, raw) {
        if let Err(rm) = fs::remove_file(&artifacts.json) {
            log::warn!("could not remove {}: {rm}", artifacts.json.display());
        }
        return Err(e);
    }
    Ok(())
}
