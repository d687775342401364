//! `serve` command
//!
//! Wires configuration, the notifier, the coordinator and the HTTP server
//! together and runs until the shutdown token fires.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::cli::args::ServeArgs;
use crate::config::{CatFactsConfig, ConfigLoader};
use crate::content::ContentSource;
use crate::coordinator::{AdminAllowList, Coordinator, CoordinatorOptions};
use crate::error::CatFactsError;
use crate::http::{AppState, HttpConfig, HttpServer, parse_bind_addr};
use crate::notifier::{LogNotifier, Notifier, TwilioConfig, TwilioNotifier};
use crate::observability::events::{Event, EventEmitter};
use crate::worker::WorkerSettings;

/// Message shown when neither `--environment` nor `--http` is given.
const MISSING_ENVIRONMENT: &str = "You must specify either dev or prod environments via ENVIRONMENT (or --environment) when starting the service";

/// Run the webhook server and coordinator.
///
/// # Errors
///
/// Returns a usage error if no listen address can be determined, a config
/// error if the configuration or facts file is invalid, or a transport
/// error if the listener cannot bind.
pub async fn run(args: &ServeArgs, cancel: CancellationToken) -> Result<(), CatFactsError> {
    let bind_addr = resolve_bind_addr(args)?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    tracing::info!(config = %args.config.display(), "loading configuration");
    let load_result = ConfigLoader::with_defaults().load(&args.config)?;
    for warning in &load_result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    let config = apply_overrides(&load_result.config, args);

    let content = ContentSource::load(&config.facts_file)?;
    if content.is_empty() {
        tracing::warn!(file = %config.facts_file.display(), "facts file is empty; attacks will exhaust immediately");
    }
    tracing::info!(facts = content.len(), "facts loaded");

    let notifier = build_notifier(&config, args.dry_run)?;

    let events = Arc::new(match args.events_file {
        Some(ref path) => EventEmitter::from_file(path)?,
        None => EventEmitter::stderr(),
    });

    let coordinator = Coordinator::new(CoordinatorOptions {
        admins: AdminAllowList::new(config.authorized_users.iter().cloned()),
        notifier: Arc::clone(&notifier),
        content: content.clone(),
        settings: WorkerSettings {
            sender: config.sender.clone(),
            interval: config.attack_interval(),
        },
        events: Arc::clone(&events),
        cancel: cancel.clone(),
    });
    let (handle, coordinator_task) = coordinator.start(cancel.clone());

    let state = Arc::new(AppState {
        coordinator: handle,
        notifier: Arc::clone(&notifier),
        content,
        sender: config.sender.clone(),
        server_root: config.server_root().to_string(),
        public_dir: config.public_dir.clone(),
    });

    let http_config = HttpConfig { bind_addr };
    let (server, bound_addr) = HttpServer::bind(&http_config, state, cancel.clone()).await?;
    tracing::info!(%bound_addr, "HTTP server listening");
    events.emit(Event::ServerStarted {
        timestamp: Utc::now(),
        bind_addr: bound_addr.to_string(),
        notifier: notifier.name().to_string(),
    });

    cancel.cancelled().await;
    tracing::info!("shutting down");

    let served = server.wait().await;
    let _ = coordinator_task.await;

    let reason = match served {
        Ok(()) => "shutdown requested".to_string(),
        Err(ref e) => e.to_string(),
    };
    events.emit(Event::ServerStopped {
        timestamp: Utc::now(),
        reason,
    });
    served.map_err(Into::into)
}

/// Picks the listen address: `--http` wins, then the environment's port.
fn resolve_bind_addr(args: &ServeArgs) -> Result<String, CatFactsError> {
    if let Some(ref http) = args.http {
        return Ok(parse_bind_addr(http)?);
    }
    args.environment.map_or_else(
        || Err(CatFactsError::Usage(MISSING_ENVIRONMENT.to_string())),
        |env| Ok(format!("0.0.0.0:{}", env.port())),
    )
}

/// Applies command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &CatFactsConfig, args: &ServeArgs) -> CatFactsConfig {
    let mut config = config.clone();
    if let Some(ref facts) = args.facts {
        config.facts_file.clone_from(facts);
    }
    if let Some(interval_ms) = args.interval_ms {
        config.attack_interval_ms = interval_ms;
    }
    config
}

/// Twilio when credentials are configured, otherwise a dry-run logger.
fn build_notifier(
    config: &CatFactsConfig,
    dry_run: bool,
) -> Result<Arc<dyn Notifier>, CatFactsError> {
    if dry_run {
        tracing::info!("dry run: outbound messages will be logged, not sent");
        return Ok(Arc::new(LogNotifier::new()));
    }

    let Some((sid, token)) = config.twilio_credentials() else {
        tracing::warn!("no Twilio credentials configured; outbound messages will be logged, not sent");
        return Ok(Arc::new(LogNotifier::new()));
    };

    let mut twilio = TwilioConfig::new(sid, token);
    if let Some(ref base) = config.twilio_api_base {
        twilio.api_base = base.trim_end_matches('/').to_string();
    }
    Ok(Arc::new(TwilioNotifier::new(twilio)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::Environment;
    use std::path::PathBuf;

    fn args() -> ServeArgs {
        ServeArgs {
            config: PathBuf::from("config.json"),
            environment: None,
            http: None,
            facts: None,
            interval_ms: None,
            dry_run: false,
            events_file: None,
            metrics_port: None,
        }
    }

    #[test]
    fn bind_addr_requires_environment_or_http() {
        let err = resolve_bind_addr(&args()).unwrap_err();
        assert!(matches!(err, CatFactsError::Usage(_)));
        assert_eq!(err.exit_code(), crate::error::ExitCode::USAGE_ERROR);
    }

    #[test]
    fn bind_addr_from_environment() {
        let mut a = args();
        a.environment = Some(Environment::Dev);
        assert_eq!(resolve_bind_addr(&a).unwrap(), "0.0.0.0:3000");
        a.environment = Some(Environment::Prod);
        assert_eq!(resolve_bind_addr(&a).unwrap(), "0.0.0.0:8080");
    }

    #[test]
    fn http_overrides_environment() {
        let mut a = args();
        a.environment = Some(Environment::Prod);
        a.http = Some("127.0.0.1:0".to_string());
        assert_eq!(resolve_bind_addr(&a).unwrap(), "127.0.0.1:0");

        a.http = Some("nope".to_string());
        assert!(matches!(
            resolve_bind_addr(&a),
            Err(CatFactsError::Transport(_))
        ));
    }

    #[test]
    fn overrides_replace_config_values() {
        let config = CatFactsConfig::new("+15550001111");
        let mut a = args();
        a.facts = Some(PathBuf::from("/tmp/facts.json"));
        a.interval_ms = Some(10);
        let config = apply_overrides(&config, &a);
        assert_eq!(config.facts_file, PathBuf::from("/tmp/facts.json"));
        assert_eq!(config.attack_interval_ms, 10);
    }

    #[test]
    fn notifier_falls_back_to_dry_run() {
        let mut config = CatFactsConfig::new("+15550001111");
        assert_eq!(build_notifier(&config, false).unwrap().name(), "log");

        config.twilio_sid = Some("AC123".into());
        config.twilio_auth_token = Some("secret".into());
        assert_eq!(build_notifier(&config, true).unwrap().name(), "log");
        assert_eq!(build_notifier(&config, false).unwrap().name(), "twilio");
    }
}
