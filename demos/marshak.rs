use clap::Parser;
use log::{info, LevelFilter};
use radiant::problems::{MarshakWave, ReferenceProblem};
use radiant::Problem;
use serde::Serialize;
use simple_logger::SimpleLogger;

#[derive(Debug, Parser)]
#[clap(version, about = "Run the classical Marshak wave and write the final profiles")]
struct Opts {
    #[clap(short = 'n', long, default_value = "1500")]
    num_zones: i64,

    #[clap(short = 'l', long, default_value = "100.0")]
    domain_length: f64,

    #[clap(short = 't', long, default_value = "10.0")]
    stop_time: f64,

    #[clap(short = 'o', long, default_value = "marshak.cbor")]
    output: String,

    #[clap(short = 'v', long)]
    verbose: bool,
}




/**
 * The final radiation and gas temperature profiles
 */
#[derive(Serialize)]
struct Output {
    problem: MarshakWave,
    time: f64,
    steps: u64,
    x: Vec<f64>,
    trad: Vec<f64>,
    tgas: Vec<f64>,
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new()
        .with_level(if opts.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init()?;

    let problem = MarshakWave {
        num_zones: opts.num_zones,
        domain_length: opts.domain_length,
        stop_time: opts.stop_time,
        ..MarshakWave::default()
    };
    let mut system = problem.clone().build()?;
    let summary = system.evolve(problem.stop_time)?;

    let params = system.params();
    let material = system.problem();
    let (x, trad) = system.line_profile(|u| (u.rad_energy / params.radiation_constant()).powf(0.25));
    let (_, tgas) = system.line_profile(|u| material.tgas_from_egas(params, u.gas_density, u.gas_internal_energy()));

    info!("writing {}", opts.output);

    let output = Output {
        problem,
        time: summary.time,
        steps: summary.steps,
        x,
        trad,
        tgas,
    };
    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&output, &mut buffer)?;
    Ok(())
}
