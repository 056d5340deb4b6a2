//! SheetKeeper Engine - command-line entry point.
//!
//! Imports a character template into an in-memory store and prints the
//! derived sheet as JSON:
//!
//! ```text
//! sheetkeeper-engine <template.json> [format]
//! ```

use anyhow::Context;
use sheetkeeper_domain::UserId;
use sheetkeeper_engine::infrastructure::app_settings::EngineSettings;
use sheetkeeper_engine::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FORMAT: &str = "native-json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetkeeper_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: sheetkeeper-engine <template.json> [format]")?;
    let format = args.next().unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    let settings = EngineSettings::from_env();
    tracing::info!(
        max_characters_per_owner = settings.max_characters_per_owner,
        restore_window_secs = settings.restore_window_secs,
        max_write_retries = settings.max_write_retries,
        "Starting SheetKeeper Engine"
    );

    let payload = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read template {}", path))?;

    let app = App::in_memory(settings);
    let characters = &app.use_cases.character;
    let owner = UserId::new();

    let record = characters
        .import(owner, &format, &payload)
        .await
        .with_context(|| format!("failed to import {} as {}", path, format))?;
    let id = record.id();

    let sheet = serde_json::json!({
        "summary": characters.summary(owner, id).await?,
        "stats": characters.stats(owner, id).await?,
        "spellcasting": characters.spellcasting(owner, id).await?,
        "carryingCapacity": characters.carrying_capacity(owner, id).await?,
        "experience": characters.experience(owner, id).await?,
    });
    println!("{}", serde_json::to_string_pretty(&sheet)?);

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
