use clap::Parser;
use log::{info, LevelFilter};
use radiant::benchmark::{relative_l1_error, relative_l2_error};
use radiant::problems::{GaussianPulse, ReferenceProblem};
use serde::Serialize;
use simple_logger::SimpleLogger;

#[derive(Debug, Parser)]
#[clap(version, about = "Diffuse a Gaussian radiation pulse and compare with the analytic solution")]
struct Opts {
    #[clap(short = 'n', long, default_value = "100")]
    num_zones: i64,

    #[clap(short = 'k', long, default_value = "200.0")]
    kappa: f64,

    #[clap(short = 't', long, default_value = "0.03")]
    stop_time: f64,

    #[clap(short = 'o', long, default_value = "pulse.cbor")]
    output: String,

    #[clap(short = 'v', long)]
    verbose: bool,
}




#[derive(Serialize)]
struct Output {
    problem: GaussianPulse,
    time: f64,
    x: Vec<f64>,
    erad: Vec<f64>,
    exact: Vec<f64>,
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new()
        .with_level(if opts.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init()?;

    let problem = GaussianPulse {
        num_zones: opts.num_zones,
        kappa: opts.kappa,
        stop_time: opts.stop_time,
        ..GaussianPulse::default()
    };
    let mut system = problem.clone().build()?;
    let summary = system.evolve(problem.stop_time)?;

    let (x, erad) = system.line_profile(|u| u.rad_energy);
    let exact: Vec<f64> = x.iter().map(|&x| problem.exact_energy(x, summary.time)).collect();

    info!(
        "relative L1 error {:.4}, L2 error {:.4}",
        relative_l1_error(&erad, &exact),
        relative_l2_error(&erad, &exact)
    );
    info!("writing {}", opts.output);

    let output = Output {
        problem,
        time: summary.time,
        x,
        erad,
        exact,
    };
    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&output, &mut buffer)?;
    Ok(())
}
