use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stl_bench_harness::catalog::PAIRINGS;
use stl_bench_harness::harness::BenchConfig;
use stl_bench_harness::metadata::Collector;
use stl_bench_harness::report;
use stl_bench_harness::runner::{self, RunOptions};

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and run the benchmark executable, then store a timestamped run record.
    Run {
        /// Project root. Relative --build-dir and --out-dir are resolved against it.
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,

        /// CMake build directory.
        #[arg(long, value_name = "DIR", default_value = "build")]
        build_dir: PathBuf,

        /// CMake program for the configure and build steps.
        #[arg(long, value_name = "PROGRAM", default_value = "cmake")]
        cmake: PathBuf,

        /// Skip CMake configure/build.
        #[arg(long, default_value_t = false)]
        no_build: bool,

        /// Elements per case.
        #[arg(long, default_value_t = 200_000)]
        n: u64,

        /// Measured iterations per case.
        #[arg(long, default_value_t = 5)]
        iters: u64,

        /// Unmeasured iterations before measuring.
        #[arg(long, default_value_t = 1)]
        warmup: u64,

        /// Only run cases whose name contains this substring.
        #[arg(long)]
        filter: Option<String>,

        /// Output directory for the JSON record and raw log.
        #[arg(long, value_name = "DIR", default_value = "docs/benchmarks/runs")]
        out_dir: PathBuf,

        /// Appended to the output file names.
        #[arg(long)]
        label: Option<String>,
    },

    /// Render the summary CSV/JSON and ratio charts for one run record.
    Report {
        /// Run record JSON written by `run`.
        #[arg(long, value_name = "FILE")]
        run: PathBuf,

        #[arg(long, value_name = "DIR", default_value = "docs/benchmarks")]
        out_dir: PathBuf,
    },
}

#[derive(Parser, Debug)]
#[command(name = "stl-bench-harness")]
#[command(about = "Run the container benchmarks and report them against std")]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.cmd {
        Command::Run {
            root,
            build_dir,
            cmake,
            no_build,
            n,
            iters,
            warmup,
            filter,
            out_dir,
            label,
        } => {
            let opts = RunOptions {
                root,
                build_dir,
                cmake,
                no_build,
                bench: BenchConfig {
                    n,
                    iters,
                    warmup,
                    filter,
                },
                out_dir,
                label,
            };
            let artifacts = runner::run(&opts, &Collector::default())
                .context("benchmark run failed")?;
            log::info!("raw output saved to {}", artifacts.log.display());
            println!("{}", artifacts.json.display());
        }
        Command::Report { run, out_dir } => {
            let paths = report::write_report(&run, &out_dir, PAIRINGS)
                .with_context(|| format!("failed to report on {}", run.display()))?;
            log::info!(
                "wrote {}, {} and {} charts",
                paths.summary_json.display(),
                paths.summary_csv.display(),
                paths.charts.len()
            );
        }
    }

    Ok(())
}
