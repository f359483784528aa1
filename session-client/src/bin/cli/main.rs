use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use session_client::config::Config;
use session_client::guard::models::Redirect;
use session_client::guard::ports::Navigator;
use session_client::guard::service::AccessGuard;
use session_client::outbound::http::HttpAuthApi;
use session_client::outbound::http::RequestMediator;
use session_client::outbound::storage::FileTokenStore;
use session_client::session::models::Credentials;
use session_client::session::models::Registration;
use session_client::session::ports::SessionPort;
use session_client::session::service::SessionManager;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "session-cli", about = "Log in, inspect and use an Auth API session")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange credentials for a session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SESSION_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and log in as it
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "SESSION_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        role: Option<String>,
    },
    /// Trade the stored refresh token for a new pair
    Refresh,
    /// Forget the stored session
    Logout,
    /// Print the current identity
    Whoami,
    /// Check whether a destination may be entered
    CheckRoute { destination: String },
    /// GET a protected resource with the session's token
    Get { url: String },
}

/// Prints where a denied navigation would go.
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn navigate(&self, redirect: &Redirect) {
        println!("denied, redirect to {}", redirect.to_url());
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_client=debug,session_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    tracing::debug!(
        auth_api = %config.auth_api.base_url,
        storage = %config.storage.path.display(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let store = Arc::new(FileTokenStore::new(&config.storage.path));
    let auth_api = Arc::new(HttpAuthApi::new(
        config.auth_api.base_url.clone(),
        Duration::from_secs(config.auth_api.timeout_seconds),
    )?);
    let session = Arc::new(SessionManager::new(store, Arc::clone(&auth_api)));

    session
        .subscribe(|state| match state {
            Some(identity) => {
                tracing::debug!(username = %identity.username(), "Session state: logged in")
            }
            None => tracing::debug!("Session state: logged out"),
        })
        .detach();

    match cli.command {
        Command::Login { username, password } => {
            let identity = session.login(&Credentials::new(username, password)).await?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Register {
            username,
            password,
            first_name,
            last_name,
            role,
        } => {
            let registration = Registration {
                username,
                password,
                first_name,
                last_name,
                role,
            };
            let identity = session.register(&registration).await?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Refresh => {
            let identity = session.refresh().await?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Logout => {
            session.logout();
            println!("logged out");
        }
        Command::Whoami => {
            if session.is_authenticated() {
                let identity = session.current_identity();
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                println!("not logged in");
            }
        }
        Command::CheckRoute { destination } => {
            let guard = AccessGuard::new(Arc::clone(&session), config.guard.clone());
            if guard.navigate(&destination, &config.route_table(), &StdoutNavigator) {
                println!("allowed");
            }
        }
        Command::Get { url } => {
            let mediator = RequestMediator::new(
                auth_api.client().clone(),
                Arc::clone(&session),
                config.mediator.clone(),
            );
            let response = mediator.send(mediator.client().get(&url)).await?;
            println!("{}", response.status());
            println!("{}", response.text().await?);
        }
    }

    Ok(())
}
