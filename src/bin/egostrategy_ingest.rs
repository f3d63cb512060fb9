use egostrategy_ingest::config::{Config, DEFAULT_INPUT_ENCODING};
use egostrategy_ingest::models::report::BatchReport;
use egostrategy_ingest::services::batch_service::BatchService;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{App, Arg, ArgMatches};
use log::{error, info};
use std::path::Path;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_OUTPUT_FOLDER: i32 = 3;

#[tokio::main]
async fn main() {
    // Initialize logger
    env_logger::init();

    let matches = App::new("DataHub Ingest")
        .version("1.0.0")
        .author("DataHub Team")
        .about("Convert daily quote export files and merge them into per-stock history")
        .arg(
            Arg::with_name("input-file")
                .short('i')
                .long("input-file")
                .value_name("FILE")
                .help("Single input file to process")
                .takes_value(true)
                .conflicts_with("input-file-list"),
        )
        .arg(
            Arg::with_name("input-file-list")
                .short('l')
                .long("input-file-list")
                .value_name("LIST_FILE")
                .help("File containing input file paths, one per line")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output-folder")
                .short('o')
                .long("output-folder")
                .value_name("FOLDER")
                .help("Folder for the generated csv files")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("start-date")
                .short('s')
                .long("start-date")
                .value_name("DATE")
                .help("First date to keep (YYYY-MM-DD)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("end-date")
                .short('e')
                .long("end-date")
                .value_name("DATE")
                .help("Last date to keep (YYYY-MM-DD)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("name-file")
                .short('n')
                .long("name-file")
                .value_name("FILE")
                .help("Output file for '<code> <name>' lines")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("code-file")
                .short('c')
                .long("code-file")
                .value_name("FILE")
                .help("Output file for stock codes")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("workers")
                .short('w')
                .long("workers")
                .value_name("COUNT")
                .help("Maximum number of files processed concurrently (default: unbounded)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("encoding")
                .long("encoding")
                .value_name("LABEL")
                .help("Text encoding of the input files")
                .takes_value(true)
                .default_value(DEFAULT_INPUT_ENCODING),
        )
        .arg(
            Arg::with_name("keep-going")
                .short('k')
                .long("keep-going")
                .help("Continue with other files when one file fails")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("report")
                .long("report")
                .value_name("FILE")
                .help("Write a JSON summary of the batch")
                .takes_value(true),
        )
        .get_matches();

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{:#}", e);
            std::process::exit(EXIT_USAGE);
        }
    };

    if matches.value_of("input-file").is_none() && matches.value_of("input-file-list").is_none() {
        eprintln!("Neither input file nor input file list is specified");
        std::process::exit(EXIT_USAGE);
    }

    // 输出目录不存在时尝试创建
    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        eprintln!(
            "Create output file folder {} failed: {}",
            config.output_dir.display(),
            e
        );
        std::process::exit(EXIT_OUTPUT_FOLDER);
    }

    if let Err(e) = run(&matches, config).await {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn parse_date(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<NaiveDate>> {
    match matches.value_of(name) {
        Some(text) => {
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .with_context(|| format!("Invalid --{}: {}", name, text))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

fn build_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let output_folder = matches.value_of("output-folder").unwrap_or_default();
    if output_folder.trim().is_empty() {
        bail!("output file folder is empty");
    }

    let output_dir = std::env::current_dir()?.join(output_folder);

    let max_workers = match matches.value_of("workers") {
        Some(text) => Some(
            text.parse::<usize>()
                .with_context(|| format!("Invalid --workers: {}", text))?,
        ),
        None => None,
    };

    let mut config = Config::new()
        .with_output_dir(output_dir)
        .with_max_workers(max_workers)
        .with_fail_fast(!matches.is_present("keep-going"))
        .with_input_encoding(matches.value_of("encoding").unwrap_or(DEFAULT_INPUT_ENCODING))?;

    if let Some(start) = parse_date(matches, "start-date")? {
        config = config.with_start_date(start);
    }
    if let Some(end) = parse_date(matches, "end-date")? {
        config = config.with_end_date(end);
    }

    config.validate()?;

    info!("Output folder: {}", config.output_dir.display());
    info!("Date window: {} ~ {}", config.window.start, config.window.end);
    info!("Input encoding: {}", config.input_encoding.name());
    match config.max_workers {
        Some(n) => info!("Workers: {}", n),
        None => info!("Workers: unbounded"),
    }
    if !config.fail_fast {
        info!("Keep-going mode enabled");
    }

    Ok(config)
}

async fn run(matches: &ArgMatches, config: Config) -> anyhow::Result<()> {
    let service = BatchService::new(config);

    let report: BatchReport = if let Some(file) = matches.value_of("input-file") {
        service.process_single_file(file)?
    } else if let Some(list_file) = matches.value_of("input-file-list") {
        service
            .process_file_list(list_file)
            .await
            .with_context(|| format!("Failed to process input file list {}", list_file))?
    } else {
        bail!("Neither input file nor input file list is specified");
    };

    if let Some(name_file) = matches.value_of("name-file") {
        report
            .registry
            .write_name_file(Path::new(name_file))
            .with_context(|| format!("Failed to write name file {}", name_file))?;
    }

    if let Some(code_file) = matches.value_of("code-file") {
        report
            .registry
            .write_code_file(Path::new(code_file))
            .with_context(|| format!("Failed to write code file {}", code_file))?;
    }

    if let Some(report_file) = matches.value_of("report") {
        report
            .save_json(report_file)
            .with_context(|| format!("Failed to write report {}", report_file))?;
    }

    if report.has_failures() {
        for failure in &report.failures {
            error!("{}: {}", failure.path, failure.error);
        }
        bail!("{} input files failed", report.failures.len());
    }

    info!("Done.");
    Ok(())
}
