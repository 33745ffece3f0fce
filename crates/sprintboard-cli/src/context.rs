use crate::cli::Cli;
use sprintboard_core::{AppConfig, BoardResult};
use sprintboard_session::{Session, SessionConfig};
use sprintboard_sync::{CredentialProvider, HttpTransport, RemoteSync, RetryPolicy, StaticCredential};
use std::sync::Arc;

/// File configuration with command-line overrides applied.
pub fn resolve_config(cli: &Cli) -> BoardResult<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if let Some(api) = &cli.api {
        config.api_base_url = Some(api.clone());
    }
    if let Some(project) = cli.project {
        config.project_id = Some(project);
    }
    if let Some(user) = cli.user {
        config.current_user = Some(user);
    }
    Ok(config)
}

pub struct CliContext {
    pub session: Session<HttpTransport>,
}

impl CliContext {
    /// Connect to the configured project and load it.
    pub async fn connect(cli: &Cli) -> BoardResult<Self> {
        let config = resolve_config(cli)?;
        let session_config = SessionConfig::from_app_config(&config)?;

        let credentials: Arc<dyn CredentialProvider> = match &cli.token {
            Some(token) => Arc::new(StaticCredential::new(token.clone())),
            None => Arc::new(StaticCredential::from_env(config.effective_token_env())),
        };
        let transport = HttpTransport::from_config(&config, credentials)?;
        tracing::debug!("Using API at {}", transport.base_url());

        let sync = RemoteSync::new(transport, RetryPolicy::from(&config.retry));
        let session = Session::new(sync, session_config);
        session.load().await?;
        Ok(Self { session })
    }
}
