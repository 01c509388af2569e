//! Parley - terminal chat front-end
//!
//! Each line typed is submitted as a turn. When the service offers quick
//! replies, typing the option's number selects it. Ctrl-D or Ctrl-C ends the
//! session.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parley::render::ActiveMenu;
use parley::{
    Config, ConversationController, HttpChatService, IdentityStore, MemoryTabStorage,
    TerminalSurface, UiEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env()?;
    let profile = config.load_profile()?;
    let service = Arc::new(HttpChatService::new(
        &config.server_url,
        config.request_timeout(),
    )?);
    tracing::info!("💬 Talking to {}", service.endpoint());

    // The process is the tab: identity lives as long as it does.
    let identities = IdentityStore::with_key(
        Box::new(MemoryTabStorage::new()),
        profile.identity_key.clone(),
    );
    let surface = TerminalSurface::new(std::io::stdout());
    let active_menu = surface.active_menu();

    let controller = ConversationController::start(service, identities, surface, profile);

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(read_input(tx, active_menu));

    controller.run(rx).await;
    Ok(())
}

/// Forward stdin lines to the controller until EOF or Ctrl-C
async fn read_input(tx: mpsc::Sender<UiEvent>, active_menu: ActiveMenu) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };

        let event = match line {
            Ok(Some(line)) => to_event(&line, &active_menu),
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                break;
            }
        };

        if tx.send(event).await.is_err() {
            return;
        }
    }

    let _ = tx.send(UiEvent::Teardown).await;
}

fn to_event(line: &str, active_menu: &ActiveMenu) -> UiEvent {
    let choice = line
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| active_menu.resolve(n));

    match choice {
        Some((menu, index)) => UiEvent::QuickReply { menu, index },
        None => UiEvent::Submit(line.to_string()),
    }
}
