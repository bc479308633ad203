use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use moji_config::Config;
use moji_types::AppEvent;
use tracing_subscriber::EnvFilter;

pub mod controller;
pub mod events;
pub mod oneshot;
pub mod profile;
pub mod repl;
pub mod services;
pub mod state;
pub mod view;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::oneshot::{Step, run_steps};
use self::profile::ProfileStore;
use self::services::Services;
use self::state::AppState;

#[derive(Parser)]
#[command(name = "moji", version, about = "Recognize, translate and keep text from images")]
struct Cli {
    /// Profile to load from the config folder
    #[arg(long, default_value = "main")]
    profile: String,
    /// Source language, e.g. "ko"
    #[arg(long)]
    from: Option<String>,
    /// Target language, e.g. "en"
    #[arg(long)]
    to: Option<String>,
    /// Translation provider: "memory" or "deepl"
    #[arg(long)]
    provider: Option<String>,
    /// Seconds to wait for a one-shot command
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session on stdin (default)
    Repl,
    /// Translate the given text
    Translate { text: Vec<String> },
    /// Recognize text in an image
    Recognize {
        image: PathBuf,
        /// Translate the recognized text too
        #[arg(long)]
        translate: bool,
        /// Save the result afterwards
        #[arg(long)]
        save: bool,
    },
    /// List saved results
    History { query: Option<String> },
    /// List downloaded translation models
    Models,
    /// Delete a downloaded translation model
    DeleteModel { language: String },
    /// Create a profile cloned from main
    AddProfile { name: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("MOJI_LOG_JSON").is_ok_and(|v| v == "1") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(cli: &Cli, profiles: &ProfileStore) -> anyhow::Result<Config> {
    profiles.init()?;
    let mut config = profiles.load(&cli.profile)?;
    config.apply_env();

    if let Some(from) = &cli.from {
        config.translator.from_lang = from.clone();
    }
    if let Some(to) = &cli.to {
        config.translator.to_lang = to.clone();
    }
    if let Some(provider) = &cli.provider {
        config.translator.provider = provider.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is the normal case
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let profiles = ProfileStore::from_env();

    if let Some(Command::AddProfile { name }) = &cli.command {
        let file = profiles.add_from_main(name)?;
        println!("{}", file.display());
        return Ok(());
    }

    let config = load_config(&cli, &profiles)?;
    let services = Services::from_config(&config)?;
    let state = Arc::new(AppState::new(config));

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(services);
    let (app_to_ui_rx, ui_to_app_tx) = controller.ui_handle();
    let timeout = Duration::from_secs(cli.timeout);

    let result = match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => {
            tokio::select! {
                res = repl::ui_loop(app_to_ui_rx, ui_to_app_tx, controller.cancel_token()) => res,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown requested");
                    Ok(())
                }
            }
        }
        Command::Translate { text } => {
            let setup = vec![AppEvent::TextInput(text.join(" "))];
            let steps = vec![Step::new(AppEvent::Translate, oneshot::is_translation)];
            run_steps(&app_to_ui_rx, &ui_to_app_tx, setup, steps, timeout).await
        }
        Command::Recognize {
            image,
            translate,
            save,
        } => {
            let mut steps = vec![Step::new(AppEvent::LoadImage(image), oneshot::is_recognized)];
            if translate {
                steps.push(Step::new(AppEvent::Translate, oneshot::is_translation));
            }
            if save {
                steps.push(Step::new(AppEvent::SaveResult, oneshot::is_info_notice));
            }
            run_steps(&app_to_ui_rx, &ui_to_app_tx, Vec::new(), steps, timeout).await
        }
        Command::History { query } => {
            let event = AppEvent::FetchHistory {
                query: query.unwrap_or_default(),
            };
            let steps = vec![Step::new(event, oneshot::is_history)];
            run_steps(&app_to_ui_rx, &ui_to_app_tx, Vec::new(), steps, timeout).await
        }
        Command::Models => {
            let steps = vec![Step::new(AppEvent::ListModels, oneshot::is_models)];
            run_steps(&app_to_ui_rx, &ui_to_app_tx, Vec::new(), steps, timeout).await
        }
        Command::DeleteModel { language } => {
            let steps = vec![Step::new(
                AppEvent::ReleaseModel(language),
                oneshot::is_models,
            )];
            run_steps(&app_to_ui_rx, &ui_to_app_tx, Vec::new(), steps, timeout).await
        }
        Command::AddProfile { .. } => Ok(()),
    };

    controller.shutdown();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("task exited with error: {e:#}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }

    result
}
