//! Newwork CLI - drive the Newwork backend from a terminal
//!
//! Sessions live only in process memory, so every invocation that needs
//! authentication logs in first and then issues its call.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::FutureExt;
use newwork_client::{
    ApiClient, AuthService, Authenticator, Method, Payload, RequestOptions, ResponseEnvelope,
    SessionContext, SessionStore,
};
use newwork_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success,
    retry_async_if, with_timeout, ClientConfig, LoggingConfig, NewworkError, RetryConfig,
    Session, API_URL_ENV,
};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "newwork")]
#[command(about = "Command-line client for the Newwork backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to NEWWORK_API_URL from the environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args)]
struct Credentials {
    /// Login identifier
    #[arg(long, env = "NEWWORK_EMAIL")]
    email: Option<String>,

    /// Login secret
    #[arg(long, env = "NEWWORK_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and print the resulting session
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Issue a request, optionally logging in first
    Request {
        /// GET, POST, PUT or DELETE
        method: Method,

        /// Resource path, e.g. /api/employees
        path: String,

        #[command(flatten)]
        credentials: Credentials,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,

        /// Concurrency token from a previous response's ETag
        #[arg(long)]
        if_match: Option<String>,

        /// Extra header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Attempts made when the backend cannot be reached
        #[arg(long, default_value = "1")]
        retries: usize,

        /// Overall time limit in seconds, covering every attempt
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Starting Newwork CLI v{}", env!("CARGO_PKG_VERSION"));

    // Missing configuration is fatal here, before any request is attempted.
    let config = load_config(cli.config.as_ref())?;
    let api = ApiClient::new(config, SessionStore::new())?;
    let context = SessionContext::from_service(AuthService::new(api.clone()));

    match cli.command {
        Commands::Login { credentials } => {
            let session = handle_login(&context, credentials).await?;
            println!("Logged in as {} (employee {})", session.role, session.employee_id);
            Ok(())
        }
        Commands::Request {
            method,
            path,
            credentials,
            body,
            if_match,
            headers,
            retries,
            timeout,
        } => {
            // stdout carries only the response here
            if credentials.email.is_some() {
                let session = handle_login(&context, credentials).await?;
                info!(role = %session.role, employee_id = %session.employee_id, "Logged in");
            }

            let mut options = RequestOptions::new(method);
            if let Some(body) = body {
                let value: serde_json::Value =
                    serde_json::from_str(&body).context("--body must be valid JSON")?;
                options = options.json(&value)?;
            }
            if let Some(token) = if_match {
                options = options.if_match(token);
            }
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .with_context(|| format!("Header '{}' must look like NAME:VALUE", header))?;
                options = options.header(name.trim(), value.trim());
            }

            handle_request(&api, path, options, retries, timeout).await
        }
    }
}

fn load_config(config_path: Option<&PathBuf>) -> anyhow::Result<ClientConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return Ok(ClientConfig::from_file(path)?);
    }

    dotenvy::dotenv().ok();
    if std::env::var_os(API_URL_ENV).is_some() {
        return Ok(ClientConfig::from_env()?);
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("newwork").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".newwork").join("config.toml")),
        Some(PathBuf::from("newwork.toml")),
    ];
    for path in default_paths.into_iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return Ok(ClientConfig::from_file(&path)?);
        }
    }

    // Surfaces the standard "NEWWORK_API_URL is not set" configuration error.
    Ok(ClientConfig::from_env()?)
}

/// Log in and hand back the session; printing is left to the caller
async fn handle_login<A: Authenticator>(
    context: &SessionContext<A>,
    credentials: Credentials,
) -> anyhow::Result<Session> {
    let (Some(email), Some(password)) = (credentials.email, credentials.password) else {
        bail!("Both --email and --password are required to log in");
    };

    log_operation_start!("login", email = %email);
    if let Err(e) = context.login(&email, &password).await {
        log_operation_error!("login", e, email = %email);
        if e.is_network() {
            bail!("Could not reach the server: {}", e);
        }
        bail!("Login failed: {}", e);
    }

    let session = context
        .current_session()
        .context("Login succeeded but no session was recorded")?;
    log_operation_success!("login", role = %session.role, employee_id = %session.employee_id);
    Ok(session)
}

async fn handle_request(
    api: &ApiClient,
    path: String,
    options: RequestOptions,
    retries: usize,
    timeout_seconds: Option<u64>,
) -> anyhow::Result<()> {
    let retry_config = RetryConfig {
        max_attempts: retries,
        ..Default::default()
    };

    let operation = || {
        let api = api.clone();
        let path = path.clone();
        let options = options.clone();
        async move { api.request::<serde_json::Value>(&path, options).await }.boxed()
    };

    let attempts = retry_async_if(
        operation,
        retry_config,
        "request",
        NewworkError::is_recoverable,
    );
    let envelope = match timeout_seconds {
        Some(seconds) => with_timeout(attempts, seconds.saturating_mul(1000), "request").await??,
        None => attempts.await?,
    };

    print_envelope(&envelope)?;

    if !envelope.ok {
        bail!("Request returned HTTP {}", envelope.status);
    }
    Ok(())
}

fn print_envelope(envelope: &ResponseEnvelope<serde_json::Value>) -> anyhow::Result<()> {
    println!("HTTP {}", envelope.status);
    if let Some(token) = &envelope.concurrency_token {
        println!("ETag: {}", token);
    }

    match &envelope.data {
        Some(Payload::Json(value)) | Some(Payload::Problem(value)) => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Some(Payload::Text(text)) => println!("{}", text),
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use newwork_client::{AuthError, AuthResult};
    use newwork_core::Role;

    struct FixedAuthenticator {
        store: SessionStore,
        accept: bool,
    }

    #[async_trait]
    impl Authenticator for FixedAuthenticator {
        async fn authenticate(&self, _identifier: &str, _secret: &str) -> AuthResult<Session> {
            if !self.accept {
                return Err(AuthError::InvalidCredentials { status: 401 });
            }
            self.store.set_credential(Some("tok1".to_string()));
            Ok(Session::new("tok1", Role::Manager, "42"))
        }
    }

    fn context(accept: bool) -> SessionContext<FixedAuthenticator> {
        let store = SessionStore::new();
        SessionContext::new(
            FixedAuthenticator {
                store: store.clone(),
                accept,
            },
            store,
        )
    }

    fn credentials(email: Option<&str>, password: Option<&str>) -> Credentials {
        Credentials {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_step_returns_session() {
        let context = context(true);

        let session = handle_login(&context, credentials(Some("a@b.test"), Some("pw")))
            .await
            .unwrap();

        assert_eq!(session.role, Role::Manager);
        assert_eq!(session.employee_id, "42");
        assert_eq!(context.current_session(), Some(session));
    }

    #[tokio::test]
    async fn test_login_step_failures() {
        let missing = handle_login(&context(true), credentials(Some("a@b.test"), None)).await;
        assert!(missing.is_err());

        let context = context(false);
        let rejected = handle_login(&context, credentials(Some("a@b.test"), Some("pw"))).await;
        assert!(rejected.unwrap_err().to_string().starts_with("Login failed"));
        assert!(!context.is_authenticated());
    }

    #[test]
    fn test_request_arguments() {
        let cli = Cli::try_parse_from([
            "newwork",
            "request",
            "put",
            "/api/profile",
            "--if-match",
            "\"3\"",
            "--retries",
            "3",
            "--timeout",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Request {
                method,
                path,
                if_match,
                retries,
                timeout,
                ..
            } => {
                assert_eq!(method, Method::Put);
                assert_eq!(path, "/api/profile");
                assert_eq!(if_match.as_deref(), Some("\"3\""));
                assert_eq!(retries, 3);
                assert_eq!(timeout, Some(5));
            }
            Commands::Login { .. } => panic!("Expected request command"),
        }
    }
}
