//! ClariFind Client
//!
//! Signs in (or restores the saved session), then hands the terminal to the
//! results TUI. An optional command-line argument is looked up right away.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use clarifind::api::{ApiClient, Session};
use clarifind::config::ClientConfig;
use clarifind::indicators::Normalizer;
use clarifind::telemetry::init_telemetry;
use clarifind::tui::{ClariFindTui, TuiExit};

// ──────────────────────────────────────────────────────────────────────────────
// LOGIN
// ──────────────────────────────────────────────────────────────────────────────

fn prompt(label: &str) -> Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Restore the saved session or ask for credentials until login succeeds.
/// `Ok(false)` means the user gave up (empty username or EOF).
async fn sign_in(api: &ApiClient) -> Result<bool> {
    if let Some(user) = api.restore().await.context("Failed to restore session")? {
        println!("🔐 Signed in as {}", user.username);
        return Ok(true);
    }

    loop {
        let Some(username) = prompt("👤 Username: ")?.filter(|u| !u.is_empty()) else {
            return Ok(false);
        };
        let Some(password) = prompt("🔑 Password: ")? else {
            return Ok(false);
        };

        match api.login(&username, &password).await {
            Ok(true) => {
                println!("✅ Signed in as {}\n", username);
                return Ok(true);
            }
            Ok(false) => println!("❌ Invalid username or password\n"),
            Err(e) => println!("❌ Login failed: {}\n", e),
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    let config = ClientConfig::from_env();

    let _telemetry = init_telemetry(&config.log_dir)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    println!("\n{}", "═".repeat(60));
    println!("🔎 ClariFind v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("API: {}", config.api_base);
    println!("{}\n", "═".repeat(60));

    let session = Arc::new(Session::new(&config.session_file));
    let api = Arc::new(ApiClient::new(&config, session).context("Failed to build HTTP client")?);
    let normalizer = Normalizer::new(config.unknown_codes);
    info!("Client configured for {}", config.api_base);

    let mut initial = std::env::args().nth(1);
    loop {
        if !sign_in(&api).await? {
            println!("\n👋 Goodbye!\n");
            break;
        }

        let tui = ClariFindTui::new(Arc::clone(&api), normalizer.clone());
        match tui.run(initial.take()).await? {
            TuiExit::Quit => {
                println!("\n👋 Goodbye!\n");
                break;
            }
            TuiExit::SessionExpired => {
                println!("\n⚠️  Session expired, please sign in again.\n");
            }
        }
    }

    Ok(())
}
