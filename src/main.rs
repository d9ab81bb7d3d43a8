use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geoscale::{angle::Dms, Hemisphere, ScaleFactorCalculator, ScaleFactors, UtmPoint};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// Grid, height and combined scale factors of a WGS84 / UTM point
#[derive(Parser)]
#[command(name = "geoscale")]
#[command(author, version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Point given as decimal degrees
    Wgs84 {
        /// Latitude in decimal degrees, negative south
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees, negative west
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Ellipsoidal height in meters
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        height: f64,

        /// Project in this UTM zone instead of the one containing the point
        #[arg(long)]
        zone: Option<i32>,
    },

    /// Point given as degrees, minutes, seconds
    Dms {
        /// Latitude as D,M,S,H (e.g. 36,30,35.05,N)
        #[arg(long)]
        lat: Dms,

        /// Longitude as D,M,S,H (e.g. 1,18,15.87,E)
        #[arg(long)]
        lon: Dms,

        /// Ellipsoidal height in meters
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        height: f64,
    },

    /// Point given as UTM coordinates
    Utm {
        /// UTM zone (1-60)
        #[arg(long)]
        zone: i32,

        /// Hemisphere: N or S
        #[arg(long, default_value = "N")]
        hemisphere: Hemisphere,

        /// Easting in meters
        #[arg(long)]
        easting: f64,

        /// Northing in meters
        #[arg(long)]
        northing: f64,

        /// Ellipsoidal height in meters
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        height: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let calculator = ScaleFactorCalculator::wgs84();

    let factors = match cli.command {
        Commands::Wgs84 { lat, lon, height, zone } => {
            debug!(lat, lon, height, zone = ?zone, "WGS84 point");
            match zone {
                Some(zone) => calculator.compute_in_zone(lat, lon, height, zone),
                None => calculator.compute(lat, lon, height),
            }
            .context("Could not compute scale factors for the WGS84 point")?
        }
        Commands::Dms { lat, lon, height } => {
            debug!(lat = ?lat, lon = ?lon, height, "DMS point");
            calculator
                .compute(lat.to_decimal(), lon.to_decimal(), height)
                .context("Could not compute scale factors for the DMS point")?
        }
        Commands::Utm { zone, hemisphere, easting, northing, height } => {
            debug!(zone, %hemisphere, easting, northing, height, "UTM point");
            let utm = UtmPoint::create(zone, hemisphere, easting, northing)
                .context("Invalid UTM coordinates")?;
            calculator
                .compute_from_utm(&utm, height)
                .context("Could not compute scale factors for the UTM point")?
        }
    };

    print_factors(&factors);

    Ok(())
}

fn print_factors(factors: &ScaleFactors) {
    println!("UTM zone            : {}{}", factors.zone(), factors.hemisphere());
    println!("Easting (X)         : {:.3} m", factors.easting());
    println!("Northing (Y)        : {:.3} m", factors.northing());
    println!("Latitude            : {:.8}°", factors.latitude());
    println!("Longitude           : {:.8}°", factors.longitude());
    println!("Height              : {:.3} m", factors.height());
    println!("Grid scale factor   : {:.10}", factors.grid_scale_factor());
    println!("Height scale factor : {:.10}", factors.height_scale_factor());
    println!("Combined factor     : {:.10}", factors.combined_scale_factor());
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
