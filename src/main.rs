use anyhow::Result;
use clap::{ArgAction, Parser};
use eusurveymgr::commands::{self, ExportOptions, config::Config};
use eusurveymgr::runtime::RealRuntime;
use std::path::PathBuf;

/// eusurveymgr - EUSurvey command-line client
///
/// Export survey results, download survey and answer PDFs, and inspect the
/// surveys of the configured account.
///
/// Credentials come from the config file or from the EUSURVEYMGR_WEB_USER,
/// EUSURVEYMGR_WEB_PASSWORD and EUSURVEYMGR_BASE_URL environment variables.
///
/// Examples:
///   eusurveymgr surveys list
///   eusurveymgr pdf answer --code a1b2c3d4-...
#[derive(Parser, Debug)]
#[command(author, version = env!("EUSURVEYMGR_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the JSON configuration file
    #[arg(
        long = "config",
        short = 'c',
        env = "EUSURVEYMGR_CONFIG",
        value_name = "PATH",
        default_value = commands::config::DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Verbose output: debug logging and the effective configuration
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Survey listing and metadata
    #[command(subcommand)]
    Surveys(SurveysCommand),

    /// Survey results export
    #[command(subcommand)]
    Results(ResultsCommand),

    /// Survey form and answer PDFs
    #[command(subcommand)]
    Pdf(PdfCommand),
}

#[derive(clap::Subcommand, Debug)]
enum SurveysCommand {
    /// List the surveys of the configured user
    List(ListArgs),

    /// Show the metadata of a survey
    Info(InfoArgs),
}

#[derive(clap::Subcommand, Debug)]
enum ResultsCommand {
    /// Export the results of a survey as XML
    Export(ExportArgs),
}

#[derive(clap::Subcommand, Debug)]
enum PdfCommand {
    /// Download the blank survey form as PDF
    Survey(SurveyPdfArgs),

    /// Download the PDF of one respondent's answers
    Answer(AnswerPdfArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Survey alias
    #[arg(long)]
    pub alias: String,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Survey id or alias
    #[arg(long)]
    pub id: String,

    /// Output file (defaults to results-<id>.xml in output_dir)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Include contribution ids in the export
    #[arg(long = "showids", action = ArgAction::Set, default_value_t = true, value_name = "BOOL")]
    pub show_ids: bool,

    /// Do not ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SurveyPdfArgs {
    /// Survey alias
    #[arg(long)]
    pub alias: String,

    /// Output file (defaults to <alias>.pdf in output_dir)
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct AnswerPdfArgs {
    /// Contribution code of the answer
    #[arg(long)]
    pub code: String,

    /// Output directory (defaults to output_dir)
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let runtime = RealRuntime;
    let config = Config::load(&runtime, &cli.config)?;
    if cli.verbose {
        eprintln!("Configuration:\n{}", config.to_display_string()?);
    }
    let client = commands::build_survey_client(&config)?;

    match cli.command {
        Commands::Surveys(SurveysCommand::List(args)) => {
            commands::surveys_list(&client, args.json).await?
        }
        Commands::Surveys(SurveysCommand::Info(args)) => {
            commands::surveys_info(&client, &args.alias, args.json).await?
        }
        Commands::Results(ResultsCommand::Export(args)) => {
            let options = ExportOptions {
                form_id: args.id,
                output: args.output,
                show_ids: args.show_ids,
                yes: args.yes,
            };
            let path = commands::results_export(&runtime, &config, &client, &options).await?;
            println!("{}", path.display());
        }
        Commands::Pdf(PdfCommand::Survey(args)) => {
            let path =
                commands::pdf_survey(&runtime, &config, &client, &args.alias, args.output).await?;
            println!("{}", path.display());
        }
        Commands::Pdf(PdfCommand::Answer(args)) => {
            let path =
                commands::pdf_answer(&runtime, &config, &client, &args.code, args.output).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
