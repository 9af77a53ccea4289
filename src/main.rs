use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use lanewise::{
    fs::load_npy,
    memory::{ALIGNMENT, AlignedBuffer, ZeroValid},
    numerics::{self, BinaryOp, Element, tier_widths},
    statistics::RunStats,
    verify,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use serde::Serialize;
use std::{hint::black_box, path::PathBuf, time::Instant};
use tqdm::tqdm;
use tracing::{debug, info, warn};

/// Benchmark and verify the tiered-width SIMD kernels
#[derive(Parser, Debug)]
#[command(name = "lanewise")]
#[command(about = "Benchmark and verify tiered-width SIMD kernels", long_about = None)]
struct Args {
    /// Array lengths to run (comma-separated list, e.g., "0,7,1024,1000000")
    #[arg(short, long, value_delimiter = ',', default_value = "1024,65536,1048576")]
    lengths: Vec<usize>,

    /// Kernel calls per job
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,

    /// Element precision
    #[arg(short, long, value_enum, default_value_t = Precision::F32)]
    precision: Precision,

    /// Kernel to run
    #[arg(short, long, value_enum, default_value_t = Kernel::All)]
    kernel: Kernel,

    /// Distribution random inputs are drawn from
    #[arg(long, value_enum, default_value_t = InputDistribution::Uniform)]
    distribution: InputDistribution,

    /// Seed for random inputs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// NumPy file used as the first operand instead of random data. Its size
    /// replaces --lengths; the second operand stays random.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write every job report to this path as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Precision {
    F32,
    F64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kernel {
    Add,
    Mul,
    Sum,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum InputDistribution {
    /// Uniform on [-1, 1)
    Uniform,
    /// Standard normal
    Normal,
}

#[derive(Clone, Copy, Debug)]
enum Job {
    Add,
    Mul,
    Sum,
}

impl Kernel {
    fn jobs(self) -> &'static [Job] {
        match self {
            Kernel::Add => &[Job::Add],
            Kernel::Mul => &[Job::Mul],
            Kernel::Sum => &[Job::Sum],
            Kernel::All => &[Job::Add, Job::Mul, Job::Sum],
        }
    }
}

impl Job {
    fn describe(self) -> String {
        match self {
            Job::Add => format!("out = a {} b", numerics::Add::SYMBOL),
            Job::Mul => format!("out = a {} b", numerics::Mul::SYMBOL),
            Job::Sum => "sum(a)".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JobReport {
    kernel: String,
    precision: &'static str,
    len: usize,
    passed: bool,
    stats: RunStats,
}

fn random_buffer<T: Element + ZeroValid>(
    len: usize,
    distribution: InputDistribution,
    rng: &mut StdRng,
) -> Result<AlignedBuffer<T>> {
    let mut buffer = AlignedBuffer::<T>::zeroed(len).context("allocating input buffer")?;
    for slot in buffer.iter_mut() {
        let value: f64 = match distribution {
            InputDistribution::Uniform => rng.random_range(-1.0..1.0),
            InputDistribution::Normal => rng.sample(StandardNormal),
        };
        *slot = T::from_f64(value);
    }
    Ok(buffer)
}

fn run_job<T: Element + ZeroValid>(
    job: Job,
    a: &[T],
    b: &[T],
    iterations: u64,
) -> Result<JobReport> {
    let len = a.len();
    let mut stats = RunStats::new();

    let passed = match job {
        Job::Add | Job::Mul => {
            let (kernel, reference): (fn(&mut [T], &[T], &[T]), fn(&mut [T], &[T], &[T])) =
                match job {
                    Job::Add => (numerics::add::<T>, verify::scalar_add::<T>),
                    _ => (numerics::mul::<T>, verify::scalar_mul::<T>),
                };

            let mut out = AlignedBuffer::<T>::zeroed(len).context("allocating output buffer")?;
            let mut expected =
                AlignedBuffer::<T>::zeroed(len).context("allocating reference buffer")?;
            reference(&mut expected, a, b);

            for _ in tqdm(0..iterations) {
                let start = Instant::now();
                kernel(&mut out, black_box(a), black_box(b));
                stats.bump_call(len, start.elapsed());
            }

            // elementwise kernels are exact: every lane does the scalar operation
            let error = verify::max_abs_diff(&out[..], &expected[..]);
            stats.observe_error(error);
            error == 0.0
        }
        Job::Sum => {
            let mut total = T::from_f64(0.0);
            for _ in tqdm(0..iterations) {
                let start = Instant::now();
                total = numerics::sum(black_box(a));
                stats.bump_call(len, start.elapsed());
            }

            let error = (total.to_f64() - verify::reference_sum(a)).abs();
            stats.observe_error(error);
            debug!(error, bound = verify::sum_error_bound(a), "sum deviation");
            error <= verify::sum_error_bound(a)
        }
    };

    Ok(JobReport {
        kernel: job.describe(),
        precision: T::NAME,
        len,
        passed,
        stats,
    })
}

fn run<T>(args: &Args) -> Result<Vec<JobReport>>
where
    T: Element + ZeroValid + npyz::Deserialize,
{
    let [wide, narrow, _] = tier_widths::<T>();
    info!(
        precision = T::NAME,
        wide, narrow, alignment = ALIGNMENT, "lane tiers"
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let inputs: Vec<AlignedBuffer<T>> = match &args.input {
        Some(path) => vec![
            load_npy::<T>(path).with_context(|| format!("loading {}", path.display()))?,
        ],
        None => args
            .lengths
            .iter()
            .map(|&len| random_buffer::<T>(len, args.distribution, &mut rng))
            .collect::<Result<_>>()?,
    };

    let mut reports = Vec::new();
    for a in &inputs {
        let b = random_buffer::<T>(a.len(), args.distribution, &mut rng)?;
        for &job in args.kernel.jobs() {
            println!("\n==========");
            println!("Running {} with {} len={}", job.describe(), T::NAME, a.len());
            println!("==========");

            let report = run_job(job, &a[..], &b[..], args.iterations)?;
            if !report.passed {
                warn!(
                    kernel = %report.kernel,
                    len = report.len,
                    error = report.stats.get_max_abs_error(),
                    "kernel diverged from the scalar reference"
                );
            }
            println!(
                "{} calls in {:.3?} ({:.2} Melem/s), max abs error {:e}, {}",
                report.stats.get_kernel_calls(),
                report.stats.get_elapsed(),
                report.stats.throughput() / 1e6,
                report.stats.get_max_abs_error(),
                if report.passed { "ok" } else { "FAILED" }
            );
            reports.push(report);
        }
    }
    Ok(reports)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lanewise=info".parse()?),
        )
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let reports = match args.precision {
        Precision::F32 => run::<f32>(&args)?,
        Precision::F64 => run::<f64>(&args)?,
    };

    let total = reports
        .iter()
        .fold(RunStats::new(), |acc, report| acc.merge(&report.stats));
    println!(
        "\nTotal: {} calls over {} elements in {:.3?}",
        total.get_kernel_calls(),
        total.get_elements(),
        total.get_elapsed()
    );

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&reports).context("serializing reports")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), jobs = reports.len(), "wrote report");
    }

    let failed = reports.iter().filter(|report| !report.passed).count();
    if failed > 0 {
        bail!(
            "{failed} of {} jobs diverged from the scalar reference",
            reports.len()
        );
    }

    println!("All jobs completed!");
    Ok(())
}
