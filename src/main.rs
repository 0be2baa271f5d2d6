use clap::Parser;
use finexus::{
    cli::{App, Cli},
    config::{ApiConfig, Config},
    http::ApiClient,
    navigation::HistoryNavigator,
    session::FileSessionStore,
    utils::{init_logger, user_message},
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api = ApiConfig::new(url);
    }
    if cli.verbose {
        config.logging.filter = "finexus=debug".to_string();
    }

    let _guard = init_logger(&config.logging)?;
    info!(api = %config.api.base_url, "Configuration loaded");

    let store = Arc::new(FileSessionStore::new(&config.session.data_dir));
    let navigator = Arc::new(HistoryNavigator::new());
    let client = ApiClient::new(&config.api, store, navigator.clone())?;
    let app = App::new(client);

    let action = cli.command.action();
    let outcome = app.run(cli.command).await;
    debug!(history = ?navigator.history(), "Navigation");

    match outcome {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", user_message(&e, action));
            Ok(ExitCode::FAILURE)
        }
    }
}
