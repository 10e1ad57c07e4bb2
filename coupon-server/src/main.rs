use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use coupon_core::tasks::spawn_throttle_prune_task;
use coupon_core::Error;

mod context;
use context::ServerContext;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Postgres via `--database-url`.
    Postgres,
    /// Process-local store; everything is lost on exit.
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "couponbot")]
#[command(author, version, about = "Couponbot - round-robin coupon distribution service")]
pub struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, env = "COUPON_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: SocketAddr,

    /// Backing store
    #[arg(long, value_enum, env = "COUPON_STORE", default_value = "postgres")]
    pub store: StoreKind,

    /// Postgres connection URL (required for the postgres store)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Max pooled Postgres connections
    #[arg(long, env = "COUPON_DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub db_max_connections: u32,

    /// Secret used to sign admin access tokens. A random one is generated
    /// when unset, which invalidates tokens on restart.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Minimum seconds between two successful claims by the same identity
    #[arg(long, env = "COUPON_COOLDOWN_SECS", default_value_t = 300)]
    pub cooldown_secs: i64,

    /// Claim requests allowed per address per throttle window
    #[arg(long, env = "COUPON_THROTTLE_BURST", default_value_t = 5)]
    pub throttle_burst: u32,

    /// Throttle window in seconds
    #[arg(long, env = "COUPON_THROTTLE_WINDOW_SECS", default_value_t = 300)]
    pub throttle_window_secs: u64,

    /// Dashboard origin allowed by CORS; empty disables the CORS layer
    #[arg(long, env = "COUPON_CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// Trust the first X-Forwarded-For hop as the client address
    #[arg(long, env = "COUPON_TRUST_FORWARDED_FOR", default_value = "false")]
    pub trust_forwarded_for: bool,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("coupon=info".parse().unwrap_or_default())
        .add_directive("couponbot=info".parse().unwrap_or_default());
    fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's `env = ...` fallbacks can see it.
    let _ = dotenv::dotenv();
    init_tracing();
    let args = Args::parse();
    info!(
        "Couponbot starting. store={:?}, listen_addr={}, cooldown={}s",
        args.store, args.listen_addr, args.cooldown_secs
    );

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    let ctx = ServerContext::new(&args).await?;

    let _prune_handle = spawn_throttle_prune_task(
        ctx.app_state.throttle.clone(),
        Duration::from_secs(args.throttle_window_secs.max(1)),
    );

    let app = coupon_core::api::router(ctx.app_state.clone());

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("HTTP server listening on http://{}", args.listen_addr);
    axum_server::bind(args.listen_addr)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    info!("HTTP server shut down.");
    if let Some(db) = ctx.db {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
