use ms_server::logger::{self, LogSink};
use ms_server::{AppState, PURGE_INTERVAL, build_router, spawn_purge_task, token_codec};

use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "ms-server", version, about = "Multi-tenant request gatekeeper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a bearer token signed with the configured secret
    IssueToken {
        /// Subject (user id)
        #[arg(long)]
        user: String,
        /// Tenant the token is bound to
        #[arg(long)]
        tenant: String,
        /// Lifetime in seconds; defaults to auth.token_ttl_secs
        #[arg(long)]
        ttl_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // A missing .env is normal outside development
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    // Load and validate configuration
    let config = ms_config::Config::load()?;
    config.validate()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::IssueToken {
            user,
            tenant,
            ttl_secs,
        } => {
            let codec = token_codec(&config.auth)?;
            let ttl = Duration::from_secs(ttl_secs.unwrap_or(config.auth.token_ttl_secs));
            println!("{}", codec.issue(&user, &tenant, ttl)?);
            Ok(())
        }
    }
}

async fn serve(config: ms_config::Config) -> Result<(), Box<dyn Error>> {
    // Logger first, so everything after it is captured
    let sink = LogSink::from_config(&config.logging, &ms_config::Config::config_dir()?);
    logger::initialize(*config.logging.level, &sink)?;

    info!("Starting ms-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let app_state = AppState::from_config(&config).await?;

    let _purge_task = spawn_purge_task(app_state.gatekeeper.clone(), PURGE_INTERVAL);

    let app = build_router(app_state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    // Get actual bound address (important when port is 0 / auto-assigned)
    let actual_addr = listener.local_addr()?;
    info!("Server listening on {}", actual_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        Err(e) => {
            error!("Failed to listen for SIGINT: {}", e);
            warn!("Graceful shutdown unavailable; waiting for the process to be killed");
            std::future::pending::<()>().await;
        }
    }
}
