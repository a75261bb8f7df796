mod logging;
mod settings;
mod sink;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ermgen_core::{
    Dialect, EntityModel, Error as CoreError, GeneratorConfig, NamingMode, validate_model,
};
use ermgen_emit::{GenerateError, generate_into};
use logging::{LogFormat, init_logging};
use settings::{format_report, load_config, load_model};
use sink::DirectorySink;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("model error: {0}")]
    Core(#[from] CoreError),
    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),
    #[error("invalid model:\n{0}")]
    InvalidModel(String),
    #[error("logging error: {0}")]
    Logging(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "ermgen",
    version,
    about = "Generate DDL and mapping documents from an entity model"
)]
struct Cli {
    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write schema.sql and mapping.hbm.xml for a model.
    Generate(GenerateArgs),
    /// Check a model file without generating anything.
    Validate(ValidateArgs),
    /// Print the JSON Schema of the model file format.
    ModelSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Entity model JSON file.
    #[arg(long)]
    model: PathBuf,
    /// Generator settings TOML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output directory for the artifacts.
    #[arg(long, default_value = "generated")]
    out: PathBuf,
    /// Target dialect, overriding the settings file.
    #[arg(long, value_parser = parse_dialect)]
    dialect: Option<Dialect>,
    /// Table name prefix, overriding the settings file.
    #[arg(long)]
    prefix: Option<String>,
    /// Naming mode, overriding the settings file.
    #[arg(long, value_enum)]
    naming: Option<NamingArg>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Entity model JSON file.
    #[arg(long)]
    model: PathBuf,
    /// Treat warnings as errors.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NamingArg {
    Verbatim,
    Normalized,
}

impl From<NamingArg> for NamingMode {
    fn from(value: NamingArg) -> Self {
        match value {
            NamingArg::Verbatim => NamingMode::Verbatim,
            NamingArg::Normalized => NamingMode::Normalized,
        }
    }
}

fn parse_dialect(value: &str) -> Result<Dialect, String> {
    Dialect::from_name(value).ok_or_else(|| {
        format!("unknown dialect '{value}' (expected sqlserver, postgresql, mysql, sqlite or oracle)")
    })
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::ModelSchema => run_model_schema(),
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        model,
        config,
        out,
        dialect,
        prefix,
        naming,
    } = args;

    let timer = Instant::now();
    let mut config = load_config(config.as_deref())?;
    apply_overrides(&mut config, dialect, prefix, naming);

    let model = load_model(&model)?;
    check_model(&model, false)?;

    let mut sink = DirectorySink::new(&out);
    generate_into(&model, &config, &mut sink)?;

    tracing::info!(
        event = "run_finished",
        status = "success",
        out = %out.display(),
        files = sink.written().len(),
        duration_ms = timer.elapsed().as_millis() as u64
    );
    Ok(())
}

fn apply_overrides(
    config: &mut GeneratorConfig,
    dialect: Option<Dialect>,
    prefix: Option<String>,
    naming: Option<NamingArg>,
) {
    if let Some(dialect) = dialect {
        config.dialect = dialect;
    }
    if let Some(prefix) = prefix {
        config.table_prefix = prefix;
    }
    if let Some(naming) = naming {
        config.naming = naming.into();
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let model = load_model(&args.model)?;
    check_model(&model, args.strict)?;
    tracing::info!(event = "model_valid", classes = model.classes.len());
    Ok(())
}

fn check_model(model: &EntityModel, strict: bool) -> Result<(), CliError> {
    let report = validate_model(model);
    for warning in &report.warnings {
        tracing::warn!(
            event = "model_warning",
            code = %warning.code,
            path = %warning.path,
            message = %warning.message
        );
    }

    if !report.is_ok() || (strict && !report.warnings.is_empty()) {
        return Err(CliError::InvalidModel(format_report(&report)));
    }
    Ok(())
}

fn run_model_schema() -> Result<(), CliError> {
    let schema = schemars::schema_for!(EntityModel);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
