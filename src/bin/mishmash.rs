use std::path::PathBuf;
use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{ArgAction, Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use mishmash::app::{App, ScanResult};
use mishmash::config::{ConfigLoader, FailurePolicy};
use mishmash::error::MishmashError;
use mishmash::input::{ColumnSelector, InputFile, collect_accessions, collect_identifiers};
use mishmash::ncbi::EutilsHttpClient;
use mishmash::output::{CsvOutput, JsonOutput, OutputMode, StderrProgress};
use mishmash::sra::{MetadataCollector, MetadataResult};

#[derive(Parser)]
#[command(name = "mishmash")]
#[command(about = "Score published microbiome articles on how openly their sequence data is shared")]
#[command(version, author)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence."
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch PMC articles and assign sequence accessibility badges")]
    Scan(ScanArgs),
    #[command(about = "Fetch SRA run metadata for sequence accessions")]
    Metadata(MetadataArgs),
}

#[derive(Args)]
struct ScanArgs {
    #[arg(help = "PMC ids, with or without the PMC prefix.")]
    ids: Vec<String>,

    #[arg(short, long, help = "Comma-separated file listing PMC ids.")]
    input_file: Option<PathBuf>,

    #[arg(long, help = "Column holding the ids, by zero-based index or header name.")]
    column: Option<ColumnSelector>,

    #[arg(long, help = "The input file starts with a header row.")]
    header: bool,

    #[arg(short, long, help = "CSV file to write.")]
    output: Option<Utf8PathBuf>,

    #[arg(
        long,
        help = "Add publication year, journal, publisher and first author affiliation."
    )]
    journal_data: bool,

    #[arg(
        long,
        help = "Record failed articles and keep going instead of aborting the batch."
    )]
    continue_on_error: bool,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, help = "Overwrite an existing output file.")]
    force: bool,

    #[arg(long, help = "Print the JSON report on stdout.")]
    json: bool,
}

#[derive(Args)]
struct MetadataArgs {
    #[arg(help = "Accessions to resolve, e.g. PRJNA605207 or SRR1234567.")]
    accessions: Vec<String>,

    #[arg(short, long, help = "Comma-separated file listing accessions.")]
    input_file: Option<PathBuf>,

    #[arg(long)]
    column: Option<ColumnSelector>,

    #[arg(long)]
    header: bool,

    #[arg(short, long, help = "CSV file to write.")]
    output: Option<Utf8PathBuf>,

    #[arg(short, long, help = "Contact address sent to NCBI with every request.")]
    email: Option<String>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    force: bool,

    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<MishmashError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &MishmashError) -> u8 {
    match error {
        MishmashError::MissingInput
        | MishmashError::InvalidPmcId(_)
        | MishmashError::InputRead(_)
        | MishmashError::EmptyInput(_)
        | MishmashError::InputColumn(_)
        | MishmashError::Configuration(_)
        | MishmashError::ConfigRead(_)
        | MishmashError::ConfigParse(_)
        | MishmashError::OutputExists(_) => 2,
        MishmashError::EutilsHttp(_)
        | MishmashError::EutilsStatus { .. }
        | MishmashError::EutilsResponse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Metadata(args) => run_metadata(args),
    }
}

fn run_scan(args: ScanArgs) -> miette::Result<()> {
    let output_mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut settings = ConfigLoader::resolve(args.config.as_deref())?;
    if args.journal_data {
        settings.include_journal_data = true;
    }
    if args.continue_on_error {
        settings.failure_policy = FailurePolicy::Continue;
    }

    // pre-flight: nothing here touches the network
    let input_file = args.input_file.map(|path| InputFile {
        path,
        column: args.column.unwrap_or_default(),
        has_header: args.header,
    });
    let ids = collect_identifiers(&args.ids, input_file.as_ref())?;

    check_output(args.output.as_ref(), output_mode, args.force)?;

    let include_journal_data = settings.include_journal_data;
    let client = EutilsHttpClient::new(settings.eutils.clone())?;
    let app = App::new(client.clone(), client, settings);

    let result = match output_mode {
        OutputMode::Json => app.scan(&ids, &JsonOutput)?,
        OutputMode::Text => app.scan(&ids, &StderrProgress)?,
    };

    if let Some(path) = &args.output {
        CsvOutput::write(path, &result.rows, include_journal_data, args.force)?;
    }
    match output_mode {
        OutputMode::Json => JsonOutput::print_report(&result).into_diagnostic()?,
        OutputMode::Text => print_summary(&result, args.output.as_ref()),
    }
    Ok(())
}

fn run_metadata(args: MetadataArgs) -> miette::Result<()> {
    let output_mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut settings = ConfigLoader::resolve(args.config.as_deref())?;
    if let Some(email) = args.email {
        settings.eutils.email = Some(email);
    }

    let input_file = args.input_file.map(|path| InputFile {
        path,
        column: args.column.unwrap_or_default(),
        has_header: args.header,
    });
    let accessions = collect_accessions(&args.accessions, input_file.as_ref())?;
    check_output(args.output.as_ref(), output_mode, args.force)?;

    let collector = MetadataCollector::new(EutilsHttpClient::new(settings.eutils)?);
    let result = match output_mode {
        OutputMode::Json => collector.collect(&accessions, &JsonOutput)?,
        OutputMode::Text => collector.collect(&accessions, &StderrProgress)?,
    };

    if let Some(path) = &args.output {
        CsvOutput::write_runs(path, &result.runs, args.force)?;
    }
    match output_mode {
        OutputMode::Json => JsonOutput::print_metadata(&result).into_diagnostic()?,
        OutputMode::Text => print_metadata_summary(&result, args.output.as_ref()),
    }
    Ok(())
}

fn check_output(
    output: Option<&Utf8PathBuf>,
    mode: OutputMode,
    force: bool,
) -> Result<(), MishmashError> {
    if output.is_none() && matches!(mode, OutputMode::Text) {
        return Err(MishmashError::Configuration(
            "an output path is required unless --json is given".to_string(),
        ));
    }
    if let Some(path) = output {
        if path.exists() && !force {
            return Err(MishmashError::OutputExists(path.as_std_path().to_path_buf()));
        }
    }
    Ok(())
}

fn print_metadata_summary(result: &MetadataResult, output: Option<&Utf8PathBuf>) {
    println!("Runs: {}", result.runs.len());
    if let Some(path) = output {
        println!("Metadata: {path}");
    }
    if !result.unresolved.is_empty() {
        eprintln!("No SRA records for: {}", result.unresolved.join(", "));
    }
}

fn print_summary(result: &ScanResult, output: Option<&Utf8PathBuf>) {
    println!("Scored articles: {}", result.rows.len());
    if let Some(path) = output {
        println!("Report: {path}");
    }
    if !result.blocked.is_empty() {
        let ids: Vec<String> = result.blocked.iter().map(|id| format!("PMC{id}")).collect();
        eprintln!(
            "Blocked by publisher, evaluate manually: {}",
            ids.join(", ")
        );
    }
    for failed in &result.failed {
        eprintln!("PMC{} failed: {}", failed.pmc_id, failed.error);
    }
}
