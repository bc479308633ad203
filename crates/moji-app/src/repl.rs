use std::path::PathBuf;

use kanal::{AsyncReceiver, AsyncSender};
use moji_types::{AppEvent, NoticeLevel, TextSource};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

pub const HELP: &str = "\
  <text>            translate text
  :from <code>      set source language
  :to <code>        set target language
  :swap             swap source and target
  :image <path>     recognize text in an image
  :translate        translate the current text again
  :save             save the current result
  :history [query]  list saved results
  :models           list downloaded models
  :delete <code>    delete a downloaded model
  :quit";

#[derive(Debug)]
pub enum ReplInput {
    Send(Vec<AppEvent>),
    Help,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> ReplInput {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }

    let Some(command) = line.strip_prefix(':') else {
        return ReplInput::Send(vec![AppEvent::TextInput(line.to_string()), AppEvent::Translate]);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let event = match (name, arg) {
        ("from", code) if !code.is_empty() => AppEvent::SetSourceLanguage(code.to_string()),
        ("to", code) if !code.is_empty() => AppEvent::SetTargetLanguage(code.to_string()),
        ("swap", "") => AppEvent::SwapLanguages,
        ("image", path) if !path.is_empty() => AppEvent::LoadImage(PathBuf::from(path)),
        ("translate" | "t", "") => AppEvent::Translate,
        ("save", "") => AppEvent::SaveResult,
        ("history", query) => AppEvent::FetchHistory {
            query: query.to_string(),
        },
        ("models", "") => AppEvent::ListModels,
        ("delete", code) if !code.is_empty() => AppEvent::ReleaseModel(code.to_string()),
        ("quit" | "q", "") => AppEvent::Shutdown,
        ("help" | "h", _) => return ReplInput::Help,
        _ => return ReplInput::Invalid(format!("Unknown command ':{command}', try :help")),
    };

    ReplInput::Send(vec![event])
}

/// Text printed for an event coming from the app, if any
pub fn format_event(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::Notice { level, message } => Some(match level {
            NoticeLevel::Info => format!("* {message}"),
            NoticeLevel::Error => format!("! {message}"),
        }),
        AppEvent::RawTextInput { text, source } => {
            let tag = match source {
                TextSource::Ocr => "ocr",
                TextSource::Manual => "input",
            };
            Some(format!("[{tag}] {text}"))
        }
        AppEvent::ShowTranslation {
            text,
            from_lang,
            to_lang,
        } => Some(format!("[{from_lang} -> {to_lang}] {text}")),
        AppEvent::ShowHistory(entries) => {
            let mut out = format!("{} saved result(s)", entries.len());
            for entry in entries {
                out.push_str(&format!("\n  {}  {}", entry.timestamp, entry.text));
                if !entry.translation.is_empty() {
                    out.push_str(&format!(" => {}", entry.translation));
                }
                if !entry.image_url.is_empty() {
                    out.push_str(&format!("\n    {}", entry.image_url));
                }
            }
            Some(out)
        }
        AppEvent::ShowModels(models) if models.is_empty() => {
            Some("models: (none)".to_string())
        }
        AppEvent::ShowModels(models) => Some(format!("models: {}", models.join(", "))),
        _ => None,
    }
}

/// Line-oriented front end on stdin/stdout
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let interactive = atty::is(atty::Stream::Stdin);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_to_ui_rx.recv() => {
                let event = event?;
                if matches!(event, AppEvent::BackendReady) && interactive {
                    println!("moji ready, :help for commands");
                }
                if let Some(text) = format_event(&event) {
                    println!("{text}");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("[REPL] stdin closed");
                    ui_to_app_tx.send(AppEvent::Shutdown).await?;
                    break;
                };

                match parse_line(&line) {
                    ReplInput::Send(events) => {
                        let quit = events.iter().any(|e| matches!(e, AppEvent::Shutdown));
                        for event in events {
                            ui_to_app_tx.send(event).await?;
                        }
                        if quit {
                            break;
                        }
                    }
                    ReplInput::Help => println!("{HELP}"),
                    ReplInput::Empty => {}
                    ReplInput::Invalid(message) => println!("! {message}"),
                }
            }
        }
    }

    Ok(())
}
