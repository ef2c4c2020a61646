use clap::Parser;
use log::{info, LevelFilter};
use radiant::benchmark::{
    interpolate_onto, relative_l1_error, relative_l2_error, ReferenceProfile, SU_OLSON_EGAS_TRANSPORT_1,
    SU_OLSON_EGAS_TRANSPORT_10, SU_OLSON_ERAD_TRANSPORT_1, SU_OLSON_ERAD_TRANSPORT_10,
};
use radiant::problems::{ReferenceProblem, SuOlsonSource};
use serde::Serialize;
use simple_logger::SimpleLogger;

#[derive(Debug, Parser)]
#[clap(version, about = "Run the Su-Olson source problem and compare against the transport solution")]
struct Opts {
    #[clap(short = 'n', long, default_value = "400")]
    num_zones: i64,

    /// Stop time; the tabulated solution is available at 1 and 10
    #[clap(short = 't', long, default_value = "10.0")]
    stop_time: f64,

    #[clap(short = 'o', long, default_value = "su_olson.cbor")]
    output: String,

    #[clap(short = 'v', long)]
    verbose: bool,
}




#[derive(Serialize)]
struct Output {
    problem: SuOlsonSource,
    time: f64,
    x: Vec<f64>,
    erad: Vec<f64>,
    egas: Vec<f64>,
}




// ============================================================================
fn report(name: &str, table: &ReferenceProfile, x: &[f64], values: &[f64]) {
    let numerical = interpolate_onto(table.x, x, values);
    info!(
        "{} at t = {}: relative L1 error {:.4}, L2 error {:.4}",
        name,
        table.time,
        relative_l1_error(&numerical, table.values),
        relative_l2_error(&numerical, table.values)
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new()
        .with_level(if opts.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init()?;

    let problem = SuOlsonSource {
        num_zones: opts.num_zones,
        stop_time: opts.stop_time,
        ..SuOlsonSource::default()
    };
    let mut system = problem.clone().build()?;
    let summary = system.evolve(problem.stop_time)?;

    let (x, erad) = system.line_profile(|u| u.rad_energy);
    let (_, egas) = system.line_profile(|u| u.gas_internal_energy());

    for (erad_table, egas_table) in [
        (SU_OLSON_ERAD_TRANSPORT_1, SU_OLSON_EGAS_TRANSPORT_1),
        (SU_OLSON_ERAD_TRANSPORT_10, SU_OLSON_EGAS_TRANSPORT_10),
    ] {
        if (erad_table.time - summary.time).abs() < 1e-6 {
            report("Erad", &erad_table, &x, &erad);
            report("Egas", &egas_table, &x, &egas);
        }
    }
    info!("writing {}", opts.output);

    let output = Output {
        problem,
        time: summary.time,
        x,
        erad,
        egas,
    };
    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(&output, &mut buffer)?;
    Ok(())
}
