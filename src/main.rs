extern crate rwh;

use anyhow::Context;
use clap::Parser;
use rwh::output::FileOutput;
use rwh::read_rainfall_file::rainfall_data_from_csv;
use rwh::run_project;
use rwh::weather::DailyRainfall;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct RwhArgs {
    /// Report request as a JSON file.
    request_file: PathBuf,
    /// Daily rainfall CSV (date,rain_mm). When absent, the Open-Meteo
    /// historical archive is queried for the requested period.
    #[arg(long, short)]
    rainfall_file: Option<PathBuf>,
    /// Directory the monthly CSV and summary JSON are written to.
    #[arg(long, short, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = RwhArgs::parse();

    let rainfall_data: Option<DailyRainfall> = match &args.rainfall_file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening rainfall file {}", path.display()))?;
            Some(rainfall_data_from_csv(BufReader::new(file))?)
        }
        None => None,
    };

    let file_prefix = args
        .request_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("rwh")
        .to_string();
    let output = FileOutput::new(args.out_dir.clone(), file_prefix);

    let request_file = File::open(&args.request_file).with_context(|| {
        format!("opening request file {}", args.request_file.display())
    })?;
    let report = run_project(BufReader::new(request_file), &output, rainfall_data)?;

    info!(
        "captured {:.0} litres over {} days; estimated savings ₹{:.2}",
        report.summary.totals.captured_liters,
        report.daily_data_count,
        report.summary.totals.savings_rs
    );
    info!("results written to {}", args.out_dir.display());

    Ok(())
}
