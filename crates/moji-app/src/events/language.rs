use moji_types::AppEvent;

use crate::events::EventContext;

/// Bind the configured default pair at startup
pub async fn configure_initial(ctx: &mut EventContext) {
    let (from, to) = {
        let config = ctx.state.config.read().await;
        (
            config.translator.from_lang.clone(),
            config.translator.to_lang.clone(),
        )
    };

    match ctx.session.configure(from.as_str(), to.as_str()) {
        Ok(ticket) => {
            tracing::info!("[LANGUAGE] Initial pair {}", ticket.pair);
            ctx.view.update(|s| {
                s.source_language = ticket.pair.source.to_string();
                s.target_language = ticket.pair.target.to_string();
            });
        }
        Err(e) => {
            tracing::error!("[LANGUAGE] Initial pair {from} -> {to} rejected: {e}");
            ctx.view.update(|s| {
                s.source_language = from;
                s.target_language = to;
            });
            ctx.notify(AppEvent::error(e.to_string())).await;
        }
    }
}

/// Rebind the session to a newly selected pair.
///
/// A rejected pair leaves both the session and the view on the old pair;
/// an accepted one drops the translation made under the old pair.
pub async fn handle_language_change(
    ctx: &mut EventContext,
    source: String,
    target: String,
) -> anyhow::Result<()> {
    match ctx.session.configure(source.as_str(), target.as_str()) {
        Ok(ticket) => {
            let pair = ticket.pair.clone();
            ctx.view.update(|s| {
                s.source_language = pair.source.to_string();
                s.target_language = pair.target.to_string();
                s.translated_text.clear();
                s.last_translation = None;
            });
            ctx.notify(AppEvent::info(format!("Translating {pair}"))).await;
        }
        Err(e) => {
            tracing::warn!("[LANGUAGE] {source} -> {target} rejected: {e}");
            ctx.notify(AppEvent::error(e.to_string())).await;
        }
    }

    Ok(())
}
