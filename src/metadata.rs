//! Best-effort description of the machine and build a run was taken on.
//!
//! Every fact comes from an ordered list of independent probes. The first probe to
//! return a value wins; if none does, the fact falls back to `"unknown"` or is left
//! out of the record. Nothing in here can fail a run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use sysinfo::System;

use crate::harness::{try_capture, BenchConfig};
use crate::schema::Metadata;

pub const UNKNOWN: &str = "unknown";

/// CMake cache file looked up inside the build directory.
pub const BUILD_CACHE_FILE: &str = "CMakeCache.txt";

pub type Probe = Box<dyn Fn() -> Option<String>>;

pub fn first_success(probes: &[Probe]) -> Option<String> {
    probes.iter().find_map(|probe| probe())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsInfo {
    pub sha: String,
    pub dirty: bool,
}

/// Build settings extracted from the CMake cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildCache {
    pub build_type: Option<String>,
    pub cxx_compiler: Option<String>,
    pub cxx_flags_release: Option<String>,
}

pub struct Collector {
    pub platform: Vec<Probe>,
    pub cpu: Vec<Probe>,
    pub compiler: Vec<Probe>,
    pub vcs: Box<dyn Fn() -> Option<VcsInfo>>,
}

impl Default for Collector {
    fn default() -> Self {
        Self {
            platform: vec![Box::new(sysinfo_platform) as Probe],
            cpu: vec![
                Box::new(sysctl_cpu_brand) as Probe,
                Box::new(lscpu_model_name),
                Box::new(sysinfo_cpu_brand),
            ],
            compiler: vec![
                Box::new(env_cxx_version) as Probe,
                Box::new(default_cxx_version),
            ],
            vcs: Box::new(git_info),
        }
    }
}

impl Collector {
    pub fn collect(&self, now: DateTime<Utc>, bench: &BenchConfig, build_dir: &Path) -> Metadata {
        let vcs = (self.vcs)();
        if vcs.is_none() {
            log::debug!("no VCS revision available");
        }
        let cache = read_build_cache(build_dir).unwrap_or_default();

        Metadata {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, false),
            platform: first_success(&self.platform).unwrap_or_else(fallback_platform),
            cpu: first_success(&self.cpu).unwrap_or_else(|| UNKNOWN.to_string()),
            compiler: first_success(&self.compiler).unwrap_or_else(|| UNKNOWN.to_string()),
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
            bench_args: bench.bench_args(),
            git_sha: vcs.as_ref().map(|v| v.sha.clone()),
            git_dirty: vcs.as_ref().map(|v| v.dirty),
            cmake_build_type: cache.build_type,
            cxx_compiler: cache.cxx_compiler,
            cxx_flags_release: cache.cxx_flags_release,
            extra: BTreeMap::new(),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// --- Platform ---

fn fallback_platform() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn sysinfo_platform() -> Option<String> {
    let name = System::name()?;
    let mut parts = vec![name];
    parts.extend(System::kernel_version());
    parts.push(std::env::consts::ARCH.to_string());
    Some(parts.join("-"))
}

// --- CPU ---

fn sysctl_cpu_brand() -> Option<String> {
    try_capture("sysctl", &["-n", "machdep.cpu.brand_string"]).and_then(non_empty)
}

fn lscpu_model_name() -> Option<String> {
    try_capture("lscpu", &[] as &[&str]).and_then(|out| model_name(&out))
}

/// Value of the `Model name:` field of `lscpu` output.
pub fn model_name(lscpu: &str) -> Option<String> {
    lscpu
        .lines()
        .find(|l| l.to_ascii_lowercase().starts_with("model name"))
        .and_then(|l| l.split_once(':'))
        .and_then(|(_, v)| non_empty(v.to_string()))
}

fn sysinfo_cpu_brand() -> Option<String> {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    sys.cpus()
        .first()
        .and_then(|cpu| non_empty(cpu.brand().to_string()))
}

// --- Compiler ---

/// First line of `<compiler> --version`.
pub fn compiler_version(compiler: impl AsRef<std::ffi::OsStr>) -> Option<String> {
    try_capture(compiler, &["--version"])
        .and_then(|out| out.lines().next().map(str::to_string))
        .and_then(non_empty)
}

fn env_cxx_version() -> Option<String> {
    let cxx = std::env::var_os("CXX").filter(|v| !v.is_empty())?;
    compiler_version(cxx)
}

fn default_cxx_version() -> Option<String> {
    let cxx = which::which("c++")
        .map_err(|e| log::debug!("c++ not on PATH: {e}"))
        .ok()?;
    compiler_version(cxx)
}

// --- VCS ---

fn git_info() -> Option<VcsInfo> {
    let sha = try_capture("git", &["rev-parse", "HEAD"]).and_then(non_empty)?;
    let status = try_capture("git", &["status", "--porcelain"])?;
    Some(VcsInfo {
        sha,
        dirty: !status.is_empty(),
    })
}

// --- Build cache ---

/// Parse `KEY:TYPE=VALUE` lines. Comments and lines lacking `:` or `=` are ignored.
pub fn parse_build_cache(text: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in text.lines() {
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        values.insert(key.to_string(), value.to_string());
    }
    values
}

/// `None` when the build directory has no readable cache.
pub fn read_build_cache(build_dir: &Path) -> Option<BuildCache> {
    let path = build_dir.join(BUILD_CACHE_FILE);
    let text = fs::read_to_string(&path)
        .map_err(|e| log::debug!("no build cache at {}: {e}", path.display()))
        .ok()?;
    let mut values = parse_build_cache(&text);
    Some(BuildCache {
        build_type: values.remove("CMAKE_BUILD_TYPE"),
        cxx_compiler: values.remove("CMAKE_CXX_COMPILER"),
        cxx_flags_release: values.remove("CMAKE_CXX_FLAGS_RELEASE"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn stub(value: Option<&'static str>) -> Probe {
        Box::new(move || value.map(str::to_string))
    }

    fn stub_collector() -> Collector {
        Collector {
            platform: vec![stub(Some("TestOS-1.0-x86_64"))],
            cpu: vec![stub(None), stub(Some("Test CPU @ 3.0GHz"))],
            compiler: vec![stub(None)],
            vcs: Box::new(|| None),
        }
    }

    #[test]
    fn test_first_success_stops_at_first_hit() {
        let calls = Rc::new(Cell::new(0));
        let counted = |value: Option<&'static str>| -> Probe {
            let calls = Rc::clone(&calls);
            Box::new(move || {
                calls.set(calls.get() + 1);
                value.map(str::to_string)
            })
        };
        let probes = vec![counted(None), counted(Some("b")), counted(Some("c"))];
        assert_eq!(first_success(&probes).as_deref(), Some("b"));
        assert_eq!(calls.get(), 2);

        assert_eq!(first_success(&[stub(None)]), None);
        assert_eq!(first_success(&[]), None);
    }

    #[test]
    fn test_model_name_from_lscpu() {
        let out = "Architecture:            x86_64\n\
                   CPU op-mode(s):          32-bit, 64-bit\n\
                   Model name:              AMD EPYC 7B13\n\
                   Thread(s) per core:      2\n";
        assert_eq!(model_name(out).as_deref(), Some("AMD EPYC 7B13"));
        assert_eq!(model_name("model name: x: y").as_deref(), Some("x: y"));
        assert_eq!(model_name("Architecture: arm64\n"), None);
        assert_eq!(model_name("Model name:   \n"), None);
    }

    #[test]
    fn test_parse_build_cache() {
        let text = "# This is the CMakeCache file.\n\
                    //Flags used by the CXX compiler during RELEASE builds.\n\
                    CMAKE_CXX_FLAGS_RELEASE:STRING=-O3 -DNDEBUG\n\
                    \n\
                    CMAKE_BUILD_TYPE:STRING=Release\n\
                    CMAKE_CXX_COMPILER:FILEPATH=/usr/bin/c++\n\
                    NO_TYPE=1\n\
                    NO_VALUE:BOOL\n\
                    URL:STRING=a=b\n";
        let values = parse_build_cache(text);
        assert_eq!(values["CMAKE_CXX_FLAGS_RELEASE"], "-O3 -DNDEBUG");
        assert_eq!(values["CMAKE_BUILD_TYPE"], "Release");
        assert_eq!(values["CMAKE_CXX_COMPILER"], "/usr/bin/c++");
        assert_eq!(values["URL"], "a=b");
        assert!(!values.contains_key("NO_TYPE"));
        assert!(!values.contains_key("NO_VALUE"));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_collect_with_stub_probes() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(BUILD_CACHE_FILE),
            "CMAKE_BUILD_TYPE:STRING=Release\n",
        )
        .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let meta = stub_collector().collect(now, &BenchConfig::default(), dir.path());

        assert_eq!(meta.timestamp, "2026-03-01T12:30:00.000000+00:00");
        assert_eq!(meta.platform, "TestOS-1.0-x86_64");
        assert_eq!(meta.cpu, "Test CPU @ 3.0GHz");
        assert_eq!(meta.compiler, UNKNOWN);
        assert_eq!(meta.bench_args.n, 200_000);
        assert_eq!(meta.git_sha, None);
        assert_eq!(meta.git_dirty, None);
        assert_eq!(meta.cmake_build_type.as_deref(), Some("Release"));
        assert_eq!(meta.cxx_compiler, None);
    }

    #[test]
    fn test_optional_fields_are_omitted_from_json() {
        let dir = tempdir().unwrap();
        let mut collector = stub_collector();
        collector.vcs = Box::new(|| {
            Some(VcsInfo {
                sha: "abc123".to_string(),
                dirty: true,
            })
        });
        let meta = collector.collect(Utc::now(), &BenchConfig::default(), dir.path());
        let json = serde_json::to_value(&meta).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["git_sha"], "abc123");
        assert_eq!(obj["git_dirty"], true);
        assert_eq!(obj["bench_args"]["filter"], serde_json::Value::Null);
        for key in ["cmake_build_type", "cxx_compiler", "cxx_flags_release"] {
            assert!(!obj.contains_key(key), "{key} should be omitted");
        }
    }

    #[test]
    fn test_missing_build_cache() {
        let dir = tempdir().unwrap();
        assert_eq!(read_build_cache(dir.path()), None);
        assert_eq!(read_build_cache(&dir.path().join("nope")), None);
    }

    #[test]
    fn test_default_probes_never_panic() {
        let dir = tempdir().unwrap();
        let meta = Collector::default().collect(Utc::now(), &BenchConfig::default(), dir.path());
        assert!(!meta.cpu.is_empty());
        assert!(!meta.compiler.is_empty());
        assert!(!meta.platform.is_empty());
    }
}
