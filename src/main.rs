use lotmeter::cli::{Cli, Commands, ConfigAction};
use lotmeter::config::Config;
use lotmeter::error::{LotmeterError, Result};
use lotmeter::pipeline::{self, AnalysisRequest};
use std::path::PathBuf;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            file,
            intervals,
            policy,
            count_timeouts,
            json,
        } => cmd_analyze(cli.config, file, intervals, policy, count_timeouts, json),
        Commands::Config { action } => cmd_config(cli.config, action),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Diagnostics go to stderr so they never mix into the report
    let filter = if verbose {
        EnvFilter::new("lotmeter=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lotmeter=info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_analyze(
    config_path: Option<PathBuf>,
    file: PathBuf,
    intervals: Option<usize>,
    policy: Option<String>,
    count_timeouts: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    // CLI flags override file values
    let mut retrieval = config.retrieval.clone();
    if let Some(policy) = policy {
        retrieval.policy = policy;
    }
    if count_timeouts {
        retrieval.count_timeouts = true;
    }

    let request = AnalysisRequest {
        path: file,
        intervals: intervals.unwrap_or(config.analysis.default_intervals),
        layout: config.fields,
        endpoints: config.endpoints.clone(),
        retrieval,
    };

    let summary = pipeline::analyze(&request)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&summary).map_err(|e| LotmeterError::Json {
                source: e,
                context: "Failed to serialize summary".to_string(),
            })?;
        println!("{rendered}");
    } else {
        print!("{summary}");
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let rendered =
                serde_json::to_string_pretty(&config).map_err(|e| LotmeterError::Json {
                    source: e,
                    context: "Failed to serialize config".to_string(),
                })?;
            println!("{rendered}");
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'lotmeter config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}
