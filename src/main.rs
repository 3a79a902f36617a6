/// Version injected at compile time via GCEVM_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("GCEVM_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gcevm::config::Config;
use gcevm::request::RequestDocument;
use gcevm::resource::{generate_resource_list, make_resource, OutputFormat};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Generate Compute Engine VM deployment resources
#[derive(Parser, Debug)]
#[command(name = "gcevm", version, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the resource list for a request document
    Generate {
        /// Request document (YAML or JSON), or "-" for stdin
        input: PathBuf,

        /// Deployment name (overrides env.name)
        #[arg(short, long)]
        name: Option<String>,

        /// GCP project to use (overrides env.project)
        #[arg(short, long)]
        project: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or change the persisted configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set the default project
    SetProject { project: String },
    /// Set the default zone
    SetZone { zone: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn to_output_format(self) -> OutputFormat {
        match self {
            Format::Yaml => OutputFormat::Yaml,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcevm {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gcevm").join("gcevm.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcevm").join("gcevm.log");
    }
    PathBuf::from("gcevm.log")
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:?}", err);
            eprintln!("{}", gcevm::format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    let mut config = Config::load();

    match command {
        Command::Generate {
            input,
            name,
            project,
            format,
            output,
        } => {
            let text = read_input(&input)?;
            let context = RequestDocument::parse(&text)?.into_context(
                name.as_deref(),
                project.as_deref(),
                &config,
            )?;

            let resources = generate_resource_list(&context, &config.defaults)?;
            let document = make_resource(&resources, format.to_output_format())?;

            match output {
                Some(path) => std::fs::write(&path, document)
                    .with_context(|| format!("Failed to write {:?}", path))?,
                None => print!("{}", document),
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::SetProject { project } => {
                config.set_project(&project)?;
                println!("Default project set to {}", project);
            }
            ConfigAction::SetZone { zone } => {
                config.set_zone(&zone)?;
                println!("Default zone set to {}", zone);
            }
        },
    }

    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read request from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))
}
