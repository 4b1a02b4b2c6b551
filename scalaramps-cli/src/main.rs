use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use num_complex::Complex64;
use scalaramps_core::{
    close_momenta, is_conserved, spatial_product, ComplexVector, FourVector, RealVector,
    ScalarTreeAmplitude,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Amplitude {
            legs,
            coupling,
            mass,
            momentum,
            momenta_file,
            close,
            stats,
        } => run_amplitude(legs, coupling, mass, momentum, momenta_file, close, stats),
        Command::Demo => {
            run_demo();
            Ok(())
        }
        Command::Vectors => {
            run_vectors();
            Ok(())
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "scalaramps",
    about = "Tree amplitudes of scalar phi^3 theory via Berends-Giele recursion"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one amplitude
    Amplitude {
        /// Number of external legs; defaults to the number of momenta given
        #[arg(long)]
        legs: Option<usize>,

        /// Coupling constant
        #[arg(long, default_value_t = 1.0)]
        coupling: f64,

        /// Internal mass; selects the unmemoized massive recursion, even for 0
        #[arg(long)]
        mass: Option<f64>,

        /// External momentum as E,px,py,pz (repeat once per leg)
        #[arg(long, value_parser = parse_momentum, allow_hyphen_values = true)]
        momentum: Vec<[f64; 4]>,

        /// JSON file with a list of momenta, `[E, px, py, pz]` or `{"e":..,"px":..,"py":..,"pz":..}`
        #[arg(long)]
        momenta_file: Option<PathBuf>,

        /// Append the last leg from momentum conservation
        #[arg(long, action = ArgAction::SetTrue)]
        close: bool,

        /// Print recursion statistics
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
    },

    /// Cross-check the recursion on the 3-, 4- and 6-leg reference momenta
    Demo,

    /// Show four-vector arithmetic between real and complex vectors
    Vectors,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum MomentumEntry {
    Array([f64; 4]),
    Named { e: f64, px: f64, py: f64, pz: f64 },
}

impl From<MomentumEntry> for RealVector {
    fn from(entry: MomentumEntry) -> Self {
        match entry {
            MomentumEntry::Array(c) => FourVector::from_array(c),
            MomentumEntry::Named { e, px, py, pz } => FourVector::new(e, px, py, pz),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_momentum(s: &str) -> Result<[f64; 4], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected 4 comma-separated components, got {}", parts.len()));
    }
    let mut components = [0.0; 4];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|err| format!("invalid component {part:?}: {err}"))?;
    }
    Ok(components)
}

fn read_momenta_file(path: &Path) -> anyhow::Result<Vec<RealVector>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let entries: Vec<MomentumEntry> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse momenta from {}", path.display()))?;
    Ok(entries.into_iter().map(RealVector::from).collect())
}

fn run_amplitude(
    legs: Option<usize>,
    coupling: f64,
    mass: Option<f64>,
    momentum: Vec<[f64; 4]>,
    momenta_file: Option<PathBuf>,
    close: bool,
    stats: bool,
) -> anyhow::Result<()> {
    let mut momenta = match momenta_file {
        Some(path) => read_momenta_file(&path)?,
        None => Vec::new(),
    };
    momenta.extend(momentum.into_iter().map(FourVector::from_array));
    if momenta.is_empty() {
        bail!("no momenta given; use --momentum or --momenta-file");
    }
    if close {
        momenta = close_momenta(&momenta);
    }
    if !is_conserved(&momenta, 1e-9) {
        tracing::warn!("external momenta do not sum to zero");
    }

    let n_legs = legs.unwrap_or(momenta.len());
    let engine = match mass {
        Some(m) => ScalarTreeAmplitude::with_mass(n_legs, coupling, m),
        None => ScalarTreeAmplitude::new(n_legs, coupling),
    };

    println!(
        "Amplitude (n={}, g={}, {})",
        n_legs,
        coupling,
        match mass {
            Some(m) => format!("m={m}"),
            None => "massless".to_string(),
        }
    );
    for (i, p) in momenta.iter().enumerate() {
        println!("  p{} = {}", i + 1, p);
    }

    let (value, evaluation) = engine
        .amplitude_with_stats(&momenta)
        .context("cannot evaluate amplitude")?;
    println!("A = {}", value);
    if stats {
        println!(
            "[Stats] currents computed={}  cache hits={}  splits visited={}",
            evaluation.currents_computed, evaluation.cache_hits, evaluation.splits_visited
        );
    }
    Ok(())
}

fn regression_line(label: &str, a: Complex64, b: Complex64) {
    let scale = a.norm().max(b.norm());
    let ok = (a - b).norm() <= 1e-9 * scale;
    println!(
        "[Regression] {}: {}  vs  {}{}",
        label,
        a,
        b,
        if ok { "  (OK)" } else { "  (MISMATCH)" }
    );
}

fn run_demo() {
    let i = Complex64::new(0.0, 1.0);
    let p1 = FourVector::new(1.0, 22.0, 3.0, 44.0);
    let p2 = FourVector::new(11.0, 2.0, 33.0, 4.0);
    let p3 = FourVector::new(-1.0, 22.0, -4.0, 55.0);
    let p4 = FourVector::new(-2.0, 32.0, -5.0, 5.0);
    let p5 = FourVector::new(8.0, 11.0, 21.0, 7.0);

    let momenta = close_momenta(&[p1, p2, p3, p4, p5]);
    let permuted = [
        momenta[2], momenta[3], momenta[4], momenta[5], momenta[0], momenta[1],
    ];

    println!("6-leg amplitude (massless, g=1)");
    let amplitude6 = ScalarTreeAmplitude::new(6, 1.0);
    let reference = amplitude6.amplitude(&momenta);
    println!("  A = {}", reference);
    regression_line(
        "leg permutation",
        amplitude6.amplitude(&permuted),
        reference,
    );
    regression_line(
        "massive path at m=0",
        ScalarTreeAmplitude::with_mass(6, 1.0, 0.0).amplitude(&momenta),
        reference,
    );
    println!(
        "  A(m=500) = {}",
        ScalarTreeAmplitude::with_mass(6, 1.0, 500.0).amplitude(&momenta)
    );

    println!("\n3-leg amplitude");
    let amplitude3 = ScalarTreeAmplitude::new(3, 1.0);
    regression_line(
        "single vertex",
        amplitude3.amplitude(&[p1, p2, -(p1 + p2)]),
        amplitude3.vertex(),
    );

    println!("\n4-leg amplitude");
    let q4 = -(p1 + p2 + p3);
    let amplitude4 = ScalarTreeAmplitude::new(4, 1.0);
    let analytic = i
        * i
        * (amplitude4.massless_propagator(&(p1 + q4))
            + amplitude4.massless_propagator(&(p1 + p2))
            + amplitude4.massless_propagator(&(p1 + p3)));
    regression_line("s+t+u channels", amplitude4.amplitude(&[p1, p2, p3, q4]), analytic);

    println!("\nLeg-count mismatch (6-leg engine, 5 momenta)");
    match amplitude6.try_amplitude(&momenta[..5]) {
        Ok(value) => println!("  unexpected amplitude {}  (MISMATCH)", value),
        Err(err) => println!("  {}  (OK)", err),
    }
}

fn run_vectors() {
    let v1: RealVector = FourVector::new(1.0, 2.0, 3.0, 4.0);
    let v3: ComplexVector = FourVector::from_array([
        Complex64::new(3.0, 4.0),
        Complex64::new(5.0, 6.0),
        Complex64::new(7.0, 8.0),
        Complex64::new(9.0, 10.0),
    ]);
    let c1 = 5.0;
    let c2 = Complex64::new(5.0, 6.0);

    println!("v1: {}", v1);
    println!("v3: {}", v3);
    println!("v1 + v1: {}", v1 + v1);
    println!("v1 + v3: {}", v1 + v3);
    println!("v3 - v1: {}", v3 - v1);
    println!("-v3: {}", -v3);
    println!("v1 * v1: {}", v1 * v1);
    println!("v1 * v3: {}", v1 * v3);
    println!("c1 * v1: {}", c1 * v1);
    println!("c2 * v1: {}", c2 * v1);
    println!("v3 * c2: {}", v3 * c2);
    println!("v1 / c1: {}", v1 / c1);
    println!("v3 / c2: {}", v3 / c2);
    println!("v1(2): {}", v1.component(2));
    println!("v3**2: {}", v3.square());
    println!("v3 length: {}", v3.length());
    let [x, y, z] = v3.spatial();
    println!("v3 spatial part: {}, {}, {}", x, y, z);
    println!("spatial product v1 * v3: {}", spatial_product(&v1, &v3));
}
