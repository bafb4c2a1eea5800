use call_agent_rs::{
    analytics::{self, AnalyticsConfig, AnalyticsConnection},
    call_control::{CallActions, JambonzCallControl},
    config::load_config,
    error::Result as AgentResult,
    messaging::{JambonzMessenger, Notifier},
    server::{self, AppState},
    token,
    workflow::{Session, Workflow},
};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "call-agent",
    about = "Voice-command sidekick bridging a jambonz conference call to Symbl.ai"
)]
struct Args {
    /// Port for the inbound audio stream and SMS webhook
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> AgentResult<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("🚀 Initializing call-agent");

    let config = load_config()?;

    // Startup is strictly ordered: token, then the outbound analytics
    // connection, then the primary dial, and only then the inbound listener.
    // No inbound audio can arrive before the outbound side is ready.
    let access_token = token::fetch_access_token(config.app_id(), config.app_secret()).await?;

    let session = Session::new();
    log::info!("meeting id: {}", session.meeting_id());

    let calls: Arc<dyn CallActions> = Arc::new(JambonzCallControl::new(&config));
    let notifier: Arc<dyn Notifier> = Arc::new(JambonzMessenger::new(&config));
    let workflow = Arc::new(Workflow::new(
        session,
        calls,
        notifier,
        config.boss_name().to_string(),
        config.boss_phone_number().to_string(),
    ));

    let AnalyticsConnection { handle, closed } = analytics::connect(
        &access_token,
        AnalyticsConfig::default(),
        Arc::clone(&workflow),
    )
    .await?;

    workflow.dial_primary().await?;

    let state = AppState::new(handle, workflow);
    let app = server::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("http server error: {}", e);
        }
    });

    tokio::select! {
        _ = closed => {
            log::info!("analytics connection closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
