#[macro_use]
extern crate log;

pub mod generator;

use std::time::{Duration, Instant};

use clap::{Arg, Command};
use generator::LoadGenerator;
use num_bigint::BigUint;
use psum_solver::arithmetic::PrimeField;
use psum_solver::config::DICEMIX_PRIME;
use psum_solver::{PowerSums, SolveError, Solver, SolverConfig};

fn combine(field: &PrimeField, g: &mut LoadGenerator) -> PowerSums {
    let t1 = Instant::now();
    let contributions: Vec<PowerSums> = g.collect();
    let combined = PowerSums::combine(field, &contributions).unwrap();
    let t2 = Instant::now();
    debug!("combined {} contributions: {:?}", contributions.len(), t2 - t1);
    match combined.to_bytes() {
        Ok(bytes) => info!("aggregate size = {} bytes", bytes.len()),
        Err(e) => warn!("failed to encode aggregate: {}", e),
    }
    combined
}

/// Solve the aggregate and check the result against the generated values.
fn validate(
    solver: &Solver,
    prime: &BigUint,
    sums: &PowerSums,
    values: &[BigUint],
    malicious: bool,
) -> Result<Duration, ()> {
    let t1 = Instant::now();
    let result = solver.solve_power_sums(prime, sums);
    let total = Instant::now() - t1;
    let mut expected = values.to_vec();
    expected.sort();
    match result {
        Ok(recovered) if !malicious && recovered == expected => {
            info!("recovered {} values: {:?}", recovered.len(), total);
            Ok(total)
        }
        Ok(recovered) if malicious && recovered != expected => {
            // a tampered aggregate can still split into linear factors
            info!("tampered aggregate solved to other values: {:?}", total);
            Ok(total)
        }
        Err(SolveError::InvalidReconstruction(e)) if malicious => {
            info!("rejected tampered aggregate ({}): {:?}", e, total);
            Ok(total)
        }
        Ok(_) => {
            error!("solver returned the wrong values");
            Err(())
        }
        Err(e) => {
            error!("solver failed: {}", e);
            Err(())
        }
    }
}

fn median(mut results: Vec<Duration>) -> Duration {
    if results.is_empty() {
        return Duration::ZERO;
    }
    results.sort();
    let mid = results.len() / 2;
    if results.len() & 1 == 0 {
        (results[mid - 1] + results[mid]) / 2
    } else {
        results[mid]
    }
}

fn main() {
    env_logger::builder().filter_level(log::LevelFilter::Debug).init();
    let matches = Command::new("benchmark")
        .arg(Arg::new("count")
            .help("Number of hidden values, which is also the number of \
                power sums in the aggregate.")
            .short('n')
            .long("count")
            .takes_value(true)
            .default_value("100"))
        .arg(Arg::new("contributors")
            .help("Number of peers the values are split among.")
            .short('c')
            .long("contributors")
            .takes_value(true)
            .default_value("1"))
        .arg(Arg::new("prime")
            .help("Decimal prime modulus. Defaults to the DiceMix prime \
                2^61 - 1.")
            .short('p')
            .long("prime")
            .takes_value(true))
        .arg(Arg::new("malicious")
            .help("Whether one peer adds one to its first power sum. \
                The peer is randomly selected.")
            .long("malicious"))
        .arg(Arg::new("seed")
            .help("Seed for the generated values and for the solver.")
            .long("seed")
            .takes_value(true)
            .default_value("0"))
        .arg(Arg::new("trials")
            .help("Number of trials to run. Reports the median.")
            .long("trials")
            .takes_value(true)
            .default_value("1"))
        .get_matches();

    let trials: usize = matches.value_of_t("trials").unwrap();
    let count: usize = matches.value_of_t("count").unwrap();
    let contributors: usize = matches.value_of_t("contributors").unwrap();
    let seed: u64 = matches.value_of_t("seed").unwrap();
    let malicious: bool = matches.is_present("malicious");
    let prime = match matches.value_of("prime") {
        Some(numeral) => psum_solver::parse_decimal(numeral).unwrap(),
        None => DICEMIX_PRIME.clone(),
    };
    debug!("count = {}", count);
    debug!("contributors = {}", contributors);
    debug!("prime = {}", prime);
    debug!("malicious = {}", malicious);

    let field = PrimeField::new(prime.clone()).unwrap();
    let solver = Solver::with_config(&SolverConfig { seed });
    let mut results = vec![];
    let mut errors = 0;
    for trial in 0..trials {
        let mut g = LoadGenerator::new(
            &field, count, contributors, malicious, seed + trial as u64);
        let sums = combine(&field, &mut g);
        if let Ok(result) = validate(&solver, &prime, &sums, &g.values, malicious) {
            results.push(result);
        } else {
            errors += 1;
        }
    }
    info!("errors\tcount\tpeers\tmedian");
    info!("{}\t{}\t{}\t{:?}", errors, count, contributors, median(results));
}
