use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use pg_single_server_inventory::config::{Args, Config};
use std::process::ExitCode;

/// Console logging at `level` for when no log4rs file is present.
fn init_default_logging(level: LevelFilter) -> Result<(), Box<dyn std::error::Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} {h({l:5})} {t} - {m}{n}",
        )))
        .build();
    let config = LogConfig::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.log_config.exists() {
        log4rs::init_file(&args.log_config, Default::default())?;
    } else {
        init_default_logging(args.log_level)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let args = Args::parse();
    if let Err(e) = init_logging(&args) {
        eprintln!("Error initializing logging: {e}");
        return ExitCode::FAILURE;
    }
    log::info!("#Start main()");
    log::debug!(
        "input={} batch_size={} backend={:?}",
        args.input.display(),
        args.batch_size,
        args.backend
    );

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match pg_single_server_inventory::run(&config).await {
        Ok(report) => {
            pg_single_server_inventory::output::print_summary(&report);
            if report.query_failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
