use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opc_provider::config::{Config, ConfigInput};
use opc_provider::opc::http::format_opc_error;
use opc_provider::resource::{self, short_name};
use opc_provider::Provider;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive; overrides --log-level
const LOG_FILTER_ENV: &str = "OPC_PROVIDER_LOG";

/// Oracle Public Cloud provider
#[derive(Parser, Debug)]
#[command(name = "opc-provider", version, about, long_about = None)]
struct Args {
    /// Provider block as a JSON or YAML file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// The user name for OPC API operations
    #[arg(long, global = true)]
    user: Option<String>,

    /// The user password for OPC API operations
    #[arg(long, global = true)]
    password: Option<String>,

    /// The OPC identity domain for API operations
    #[arg(long, global = true)]
    identity_domain: Option<String>,

    /// The HTTP endpoint for OPC API operations
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Maximum number of attempts per request
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Skip TLS verification for self-signed certificates
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    insecure: Option<bool>,

    /// The HTTP endpoint for Oracle Storage operations
    #[arg(long, global = true)]
    storage_endpoint: Option<String>,

    /// The Storage Service ID
    #[arg(long, global = true)]
    storage_service_id: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the configuration and print it with the password masked
    Validate,
    /// Print the provider option table
    Schema,
    /// List registered resource and data source types
    Catalog,
    /// Read one object of a registered type
    Read {
        /// Type name, e.g. opc_compute_instance
        resource_type: String,
        /// Object name (short or fully qualified)
        name: String,
    },
    /// List objects of a registered type
    List {
        /// Type name, e.g. opc_compute_ssh_key
        resource_type: String,
        /// Container to list, for opc_storage_object
        #[arg(long)]
        container: Option<String>,
    },
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = std::env::var(LOG_FILTER_ENV).ok().filter(|v| !v.is_empty());

    let tracing_level = match (level.to_tracing_level(), &env_filter) {
        (Some(level), _) => level,
        (None, Some(_)) => Level::TRACE,
        (None, None) => return Ok(None),
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = match env_filter {
        Some(directive) => EnvFilter::try_new(&directive)
            .with_context(|| format!("Invalid {} directive: {}", LOG_FILTER_ENV, directive))?,
        None => EnvFilter::new(tracing_level.as_str()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("opc-provider started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("opc-provider").join("opc-provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".opc-provider").join("opc-provider.log");
    }
    PathBuf::from("opc-provider.log")
}

impl Args {
    /// Explicit settings: flags first, then the provider block file
    fn config_input(&self) -> Result<ConfigInput> {
        let flags = ConfigInput {
            user: self.user.clone(),
            password: self.password.clone(),
            identity_domain: self.identity_domain.clone(),
            endpoint: self.endpoint.clone(),
            max_retries: self.max_retries,
            insecure: self.insecure,
            storage_endpoint: self.storage_endpoint.clone(),
            storage_service_id: self.storage_service_id.clone(),
        };

        match &self.config {
            Some(path) => Ok(flags.or(ConfigInput::from_file(path)?)),
            None => Ok(flags),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    match run(&args).await {
        Ok(()) => Ok(()),
        Err(err) => {
            tracing::error!("Command failed: {:#}", err);
            eprintln!("Error: {}", format_opc_error(&err));
            std::process::exit(1);
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let provider = Provider::new();

    match &args.command {
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(provider.schema())?);
        }
        Command::Catalog => {
            println!("Resources:");
            for key in resource::resource_keys() {
                println!("  {}", key);
            }
            println!("Data sources:");
            for key in resource::data_source_keys() {
                println!("  {}", key);
            }
        }
        Command::Validate => {
            let config = Config::from_input(&args.config_input()?)?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        Command::Read {
            resource_type,
            name,
        } => {
            resource::lookup(resource_type)?;
            let client = provider.configure(&args.config_input()?).await?;
            let item = resource::read_resource(&client, resource_type, name).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Command::List {
            resource_type,
            container,
        } => {
            resource::lookup(resource_type)?;
            let client = provider.configure(&args.config_input()?).await?;
            let items =
                resource::list_resources(&client, resource_type, container.as_deref()).await?;
            for item in &items {
                println!("{}", short_name(item));
            }
            tracing::info!("Listed {} {} objects", items.len(), resource_type);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_insecure_flag() {
        let args = Args::try_parse_from(["opc-provider", "--insecure", "validate"]).unwrap();
        assert_eq!(args.insecure, Some(true));
        assert!(matches!(args.command, Command::Validate));

        let args = Args::try_parse_from(["opc-provider", "validate", "--insecure"]).unwrap();
        assert_eq!(args.insecure, Some(true));
    }

    #[test]
    fn test_insecure_flag_values() {
        let args = Args::try_parse_from(["opc-provider", "--insecure=false", "schema"]).unwrap();
        assert_eq!(args.insecure, Some(false));

        let args = Args::try_parse_from(["opc-provider", "schema"]).unwrap();
        assert_eq!(args.insecure, None);
        assert_eq!(args.config_input().unwrap().insecure, None);
    }
}
