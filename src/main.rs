use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;

use rusty_psth::analysis::Analysis;
use rusty_psth::config::AnalysisConfig;
use rusty_psth::error::PsthError;
use rusty_psth::session::{Session, UnitFilter};

#[derive(Parser, Debug)]
#[command(about = "Align the spikes of sorted units to stimulus presentations and compute their PSTH")]
struct Args {
    /// The session file (JSON) with the units and the epochs
    #[arg(long)]
    session: PathBuf,
    /// The epoch (stimulus presentations) to align the spikes to
    #[arg(long)]
    epoch: String,
    /// The units to analyze; if omitted, the units are selected with the filter options
    #[arg(short = 'u', long = "unit")]
    units: Vec<usize>,
    /// The analysis configuration (JSON); defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// The minimum firing rate (in Hz) of the selected units
    #[arg(long, default_value = "5.0")]
    min_firing_rate: f64,
    /// The maximum firing rate (in Hz) of the selected units
    #[arg(long)]
    max_firing_rate: Option<f64>,
    /// The quality label of the selected units, e.g., good
    #[arg(long)]
    quality: Option<String>,
    /// The maximum number of selected units
    #[arg(long, default_value = "10")]
    max_units: usize,
    /// The report file (JSON); the report is printed if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// An additional log file
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// The log level, must be one of: off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn init_logging(args: &Args) -> Result<(), PsthError> {
    let pattern = "{d(%H:%M:%S)} {l} - {m}\n";
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let mut config = Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(log_file) = &args.log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
            .build(log_file)
            .map_err(|e| PsthError::IOError(e.to_string()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(args.log_level))
        .map_err(|e| PsthError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| PsthError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), PsthError> {
    let args = Args::parse();
    init_logging(&args)?;
    log::debug!("{:?}", args);

    let config = match &args.config {
        Some(path) => AnalysisConfig::load_from(path)?,
        None => AnalysisConfig::default(),
    };
    let analysis = Analysis::new(config)?;

    let session = Session::load_from(&args.session)?;
    log::info!(
        "Session {} loaded: {} units, epochs {:?}",
        session.identifier,
        session.num_units(),
        session.epoch_names()
    );

    let unit_ids = if args.units.is_empty() {
        let filter = UnitFilter {
            min_firing_rate: args.min_firing_rate,
            max_firing_rate: args.max_firing_rate,
            quality: args.quality.clone(),
            max_units: Some(args.max_units),
        };
        session.select_units(&filter)
    } else {
        args.units.clone()
    };
    if unit_ids.is_empty() {
        log::warn!("No unit to analyze");
    }

    let report = analysis.run(&session, &unit_ids, &args.epoch)?;
    for unit in report.units.iter() {
        log::info!(
            "Unit {}: {} spikes, {} in histogram range, responsive: {}",
            unit.unit_id,
            unit.num_spikes,
            unit.histogram.total_count(),
            unit.responsive
        );
    }

    match &args.output {
        Some(path) => {
            report.save_to(path)?;
            log::info!("Report saved to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| PsthError::IOError(e.to_string()))?;
            println!("{}", json);
        }
    }

    Ok(())
}
