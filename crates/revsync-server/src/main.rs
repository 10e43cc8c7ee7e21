use std::{env, sync::Arc};

use revsync_cloudrun::{
    AccessTokenProvider, CloudRunClient, MetadataTokenProvider, StaticTokenProvider,
};
use revsync_registry::RegistryClient;
use revsync_server::config::loader::load_config;
use revsync_server::{AppConfig, AppState, Reconciler, ServerBuilder};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From REVSYNC_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (revsync.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (REVSYNC_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    revsync_server::observability::init_tracing();

    // Parse config path from CLI, environment, or use default
    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    revsync_server::observability::apply_logging_level(&cfg.logging.level);

    let state = match init_state(&cfg) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Client initialization failed: {e}");
            std::process::exit(2);
        }
    };

    let server = ServerBuilder::new(state).with_config(cfg).build();

    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }
}

/// Construct the outbound collaborators once and wire them into the reconciler.
fn init_state(cfg: &AppConfig) -> Result<AppState, String> {
    let registry_endpoint = url::Url::parse(&cfg.registry.endpoint)
        .map_err(|e| format!("registry.endpoint: {e}"))?;
    let cloudrun_endpoint = url::Url::parse(&cfg.cloudrun.endpoint)
        .map_err(|e| format!("cloudrun.endpoint: {e}"))?;

    let tokens: Arc<dyn AccessTokenProvider> = match cfg.cloudrun.token {
        Some(ref token) => Arc::new(StaticTokenProvider::new(token)),
        None => Arc::new(MetadataTokenProvider::new()),
    };

    let cloudrun = Arc::new(
        CloudRunClient::new(tokens)
            .with_endpoint(&cloudrun_endpoint)
            .with_polling(cfg.cloudrun.poll_interval(), cfg.cloudrun.poll_timeout()),
    );

    let registry = RegistryClient::new(registry_endpoint);

    let reconciler = Reconciler::new(
        cloudrun.clone(),
        cloudrun,
        registry,
        &cfg.registry.stable_image,
    )
    .with_sort_by_create_time(cfg.reconciler.sort_by_create_time);

    Ok(AppState {
        reconciler: Arc::new(reconciler),
    })
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: REVSYNC_CONFIG
/// 3. Default: revsync.toml
fn resolve_config_path() -> (String, ConfigSource) {
    // 1. Check CLI: --config <path>
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config"
            && let Some(path) = args.next()
        {
            return (path, ConfigSource::CliArgument);
        }
    }

    // 2. Check environment variable
    if let Ok(path) = env::var("REVSYNC_CONFIG")
        && !path.is_empty()
    {
        return (path, ConfigSource::EnvironmentVariable);
    }

    // 3. Default to revsync.toml
    ("revsync.toml".to_string(), ConfigSource::Default)
}
