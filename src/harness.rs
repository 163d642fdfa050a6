use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::schema::BenchArgs;

/// File name of the benchmark executable inside the build directory.
pub const BENCH_EXECUTABLE: &str = "stl_bench";

/// How the benchmark executable is asked to measure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    pub n: u64,
    pub iters: u64,
    pub warmup: u64,
    pub filter: Option<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n: 200_000,
            iters: 5,
            warmup: 1,
            filter: None,
        }
    }
}

impl BenchConfig {
    /// An empty filter selects every case, same as no filter.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }

    /// `--n=<n> --iters=<iters> --warmup=<warmup> [--filter=<f>]`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--n={}", self.n),
            format!("--iters={}", self.iters),
            format!("--warmup={}", self.warmup),
        ];
        if let Some(f) = self.filter() {
            args.push(format!("--filter={f}"));
        }
        args
    }

    pub fn bench_args(&self) -> BenchArgs {
        BenchArgs {
            n: self.n,
            iters: self.iters,
            warmup: self.warmup,
            filter: self.filter().map(str::to_string),
        }
    }
}

/// Path of the benchmark executable for this platform.
pub fn bench_executable(build_dir: &Path) -> std::path::PathBuf {
    build_dir.join(format!("{BENCH_EXECUTABLE}{}", std::env::consts::EXE_SUFFIX))
}

fn display_command<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut s = program.to_string_lossy().into_owned();
    for a in args {
        s.push(' ');
        s.push_str(&a.as_ref().to_string_lossy());
    }
    s
}

/// Run a child process to completion and return its stdout.
///
/// The child's stderr is forwarded to ours. A non-zero exit is an error; there is
/// no timeout.
pub fn run_captured<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<String> {
    let program = program.as_ref();
    let command = display_command(program, args);
    log::debug!("exec: {command}");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|source| Error::Spawn {
        command: command.clone(),
        source,
    })?;

    if !output.stderr.is_empty() {
        let _ = io::stderr().write_all(&output.stderr);
    }
    if !output.status.success() {
        return Err(Error::CommandFailed {
            command,
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Like [`run_captured`] but for probes: any failure is `None` and stderr is discarded.
pub fn try_capture<S: AsRef<OsStr>>(program: impl AsRef<OsStr>, args: &[S]) -> Option<String> {
    let program = program.as_ref();
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| log::debug!("probe `{}` unavailable: {e}", program.to_string_lossy()))
        .ok()?;
    if !output.status.success() {
        log::debug!(
            "probe `{}` exited with {}",
            display_command(program, args),
            output.status
        );
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
