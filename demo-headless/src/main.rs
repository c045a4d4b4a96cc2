use caelum_core::{
    flight_report, AnalysisConfig, AtmosphereProfile, FlightConfig, FlightPhase, FlightSimulator,
    NoiseConfig,
};
use clap::Parser;
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

/// CanSat sounding demo: simulate one flight and analyze the column
#[derive(Parser, Debug)]
#[command(name = "caelum-demo")]
#[command(about = "CanSat atmospheric sounding demo", long_about = None)]
struct Args {
    /// Random seed for the flight
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Atmosphere scenario (inversion, well-mixed)
    #[arg(long, default_value = "inversion")]
    scenario: String,

    /// Start the mission from the ground instead of the drop altitude
    #[arg(long)]
    from_ground: bool,

    /// Drop / separation start altitude in m AGL
    #[arg(long, default_value_t = 1000.0)]
    start_altitude: f64,

    /// Parachute deploy altitude in m AGL
    #[arg(short, long, default_value_t = 900.0)]
    deploy_altitude: f64,

    /// Sample interval in seconds
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,

    /// Analysis bin width in meters
    #[arg(short, long, default_value_t = 50.0)]
    bin_width: f64,

    /// Wind east component in m/s
    #[arg(long, default_value_t = 1.5)]
    wind_east: f64,

    /// Wind north component in m/s
    #[arg(long, default_value_t = 2.5)]
    wind_north: f64,
}

fn run(args: &Args) -> caelum_core::Result<()> {
    let profile = match args.scenario.to_lowercase().as_str() {
        "well-mixed" | "clean" => AtmosphereProfile::well_mixed(),
        "inversion" => AtmosphereProfile::inversion_scenario(),
        other => {
            println!("Unknown scenario '{other}', using the inversion scenario");
            AtmosphereProfile::inversion_scenario()
        }
    };

    let mut flight = FlightConfig {
        seed: args.seed,
        start_altitude_agl: args.start_altitude,
        deploy_altitude_m: args.deploy_altitude,
        sample_interval_s: args.interval,
        wind_ms: Vector3::new(args.wind_east, args.wind_north, 0.0),
        ..FlightConfig::default()
    };
    if args.from_ground {
        flight.start_phase = FlightPhase::Ascent;
    }

    println!("=== Caelum CanSat Sounding Demo ===\n");
    println!(
        "Flight: start {:.0} m AGL ({}), deploy {:.0} m, {:.1} s interval, seed {}",
        flight.start_altitude_agl, flight.start_phase, flight.deploy_altitude_m,
        flight.sample_interval_s, flight.seed
    );

    let mut sim = FlightSimulator::new(flight, profile, NoiseConfig::default())?;
    let records = sim.run();
    println!("Simulated {} telemetry records\n", records.len());

    let analysis = AnalysisConfig {
        bin_width_m: args.bin_width,
        ..AnalysisConfig::default()
    };
    let report = flight_report(&records, &analysis)?;

    println!("--- Mission report ---");
    println!(
        "Duration: {:.0} s over {} samples, ceiling {:.0} m AGL ({:.0} m MSL)",
        report.duration_s, report.samples, report.max_altitude_agl_m, report.max_altitude_msl_m
    );
    for dwell in &report.phase_dwell {
        println!("  {:<20} {:>6.0} s", dwell.phase.to_string(), dwell.seconds);
    }
    println!("Ground-track drift: {:.0} m", report.drift_distance_m);
    println!(
        "Temperature: {:.1} / {:.1} / {:.1} C (min/mean/max)",
        report.temperature_c.min, report.temperature_c.mean, report.temperature_c.max
    );
    println!(
        "CO2: {:.0} ppm mean, {:.0} ppm max ({}); PM2.5: {:.1} mean, {:.1} max ({})",
        report.co2_ppm.mean, report.co2_ppm.max, report.co2_quality,
        report.pm2_5.mean, report.pm2_5.max, report.pm25_quality
    );
    println!(
        "Peak source signature: {} (risk {})",
        report.peak_signature, report.peak_risk
    );

    println!("\n--- Vertical profile ({} bins of {:.0} m) ---", report.bins.len(), analysis.bin_width_m);
    for (bin, assessment) in report.bins.iter().zip(&report.layers.bins) {
        let mut flags = String::new();
        if assessment.inversion {
            flags.push_str(" INVERSION");
        }
        if assessment.accumulation {
            flags.push_str(" PM-LAYER");
        }
        println!(
            "  {:>4.0}-{:<4.0} m  {:>5.1} C  {:>5.0} ppm  {:>5.1} ug/m3  ({} samples){}",
            bin.bin_floor,
            bin.bin_floor + analysis.bin_width_m,
            bin.mean_temp_c,
            bin.mean_co2_ppm,
            bin.mean_pm2_5,
            bin.sample_count,
            flags
        );
    }

    println!("\n--- Layer detection ---");
    println!(
        "Inversions: {} ({:?}); PM accumulation: {} ({:?})",
        report.layers.inversion_count,
        report.layers.inversion_ranges,
        report.layers.accumulation_count,
        report.layers.accumulation_ranges
    );
    println!(
        "CO2 column spread: {:.0} ppm -> {:?}",
        report.layers.co2_range_ppm, report.layers.mixing
    );

    println!("\n--- Cross-sensor validation ---");
    let pairs = [
        ("temp primary vs CO2", &report.cross_validation.temp_primary_vs_co2),
        ("temp primary vs baro", &report.cross_validation.temp_primary_vs_baro),
        ("humidity pair", &report.cross_validation.humidity),
    ];
    for (name, agreement) in pairs {
        println!(
            "  {:<22} mean |d| {:.2}, max |d| {:.2}{}",
            name,
            agreement.mean_abs_delta,
            agreement.max_abs_delta,
            if agreement.alarm { "  ALARM" } else { "" }
        );
    }

    Ok(())
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::FAILURE
        }
    }
}
