//! End-to-end flows through the event loop with in-process collaborators

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kanal::{AsyncReceiver, AsyncSender};
use moji_config::Config;
use moji_ocr::TextRecognizer;
use moji_store::LocalStore;
use moji_translator::{
    Connection, LanguageCode, LanguagePair, MemoryBackend, NetworkPolicy, ProviderMetadata,
    TranslateError, TranslationBackend, TranslatorClient,
};
use moji_types::{AppEvent, HistoryEntry, NoticeLevel, TextSource, ViewState};
use tokio::sync::Notify;
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::controller::AppController;
use crate::services::Services;
use crate::state::AppState;

const WAIT: Duration = Duration::from_secs(2);

struct FixedRecognizer(String);

#[async_trait]
impl TextRecognizer for FixedRecognizer {
    async fn recognize(&self, _image_bytes: &[u8]) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

/// Translations or deletions block until their gate opens
struct GatedBackend {
    inner: MemoryBackend,
    translate_gate: Option<Arc<Notify>>,
    delete_gate: Option<Arc<Notify>>,
}

impl GatedBackend {
    fn translations(gate: Arc<Notify>) -> Self {
        Self {
            inner: MemoryBackend::default(),
            translate_gate: Some(gate),
            delete_gate: None,
        }
    }

    fn deletions(gate: Arc<Notify>) -> Self {
        Self {
            inner: MemoryBackend::default(),
            translate_gate: None,
            delete_gate: Some(gate),
        }
    }
}

struct GatedClient {
    inner: Arc<dyn TranslatorClient>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl TranslationBackend for GatedBackend {
    fn client(&self, pair: &LanguagePair) -> Result<Arc<dyn TranslatorClient>, TranslateError> {
        Ok(Arc::new(GatedClient {
            inner: self.inner.client(pair)?,
            gate: self.translate_gate.clone(),
        }))
    }

    fn is_supported(&self, language: &LanguageCode) -> bool {
        self.inner.is_supported(language)
    }

    async fn delete_model(&self, language: &LanguageCode) -> Result<(), TranslateError> {
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        self.inner.delete_model(language).await
    }

    async fn downloaded_models(&self) -> Result<Vec<LanguageCode>, TranslateError> {
        self.inner.downloaded_models().await
    }

    fn metadata(&self) -> ProviderMetadata {
        self.inner.metadata()
    }
}

#[async_trait]
impl TranslatorClient for GatedClient {
    fn pair(&self) -> &LanguagePair {
        self.inner.pair()
    }

    async fn ensure_model_downloaded(&self, policy: NetworkPolicy) -> Result<(), TranslateError> {
        self.inner.ensure_model_downloaded(policy).await
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.inner.translate(text).await
    }
}

struct Harness {
    controller: AppController,
    _tasks: JoinSet<anyhow::Result<()>>,
    rx: AsyncReceiver<AppEvent>,
    tx: AsyncSender<AppEvent>,
    dir: tempfile::TempDir,
}

impl Harness {
    fn start(
        backend: Arc<dyn TranslationBackend>,
        recognized: &str,
        tweak: impl FnOnce(&mut Config),
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.store.root = dir.path().join("store").display().to_string();
        tweak(&mut config);

        let store = Arc::new(LocalStore::new(&config.store.root));
        let services = Services {
            backend,
            network_policy: NetworkPolicy::WifiOnly,
            recognizer: Arc::new(FixedRecognizer(recognized.to_string())),
            objects: store.clone(),
            documents: store,
        };

        let controller = AppController::new(Arc::new(AppState::new(config)));
        let tasks = controller.spawn_tasks(services);
        let (rx, tx) = controller.ui_handle();

        Self {
            controller,
            _tasks: tasks,
            rx,
            tx,
            dir,
        }
    }

    async fn send(&self, event: AppEvent) {
        self.tx.send(event).await.unwrap();
    }

    /// Next event matching `pred`, skipping anything else
    async fn expect(&self, pred: impl Fn(&AppEvent) -> bool) -> AppEvent {
        timeout(WAIT, async {
            loop {
                let event = self.rx.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("expected event never arrived")
    }

    async fn expect_notice(&self, level: NoticeLevel) -> String {
        match self
            .expect(|e| matches!(e, AppEvent::Notice { level: l, .. } if *l == level))
            .await
        {
            AppEvent::Notice { message, .. } => message,
            _ => unreachable!(),
        }
    }

    async fn ready(&self) {
        self.expect(|e| matches!(e, AppEvent::BackendReady)).await;
    }

    async fn view_until(&self, pred: impl FnMut(&ViewState) -> bool) -> ViewState {
        let mut rx = self.controller.view().subscribe();
        timeout(WAIT, rx.wait_for(pred))
            .await
            .expect("view never reached expected state")
            .unwrap()
            .clone()
    }

    fn write_image(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        image::GrayImage::from_pixel(4, 4, image::Luma([255]))
            .save(&path)
            .unwrap();
        path
    }

    async fn history(&self) -> Vec<HistoryEntry> {
        self.send(AppEvent::FetchHistory {
            query: String::new(),
        })
        .await;
        match self.expect(|e| matches!(e, AppEvent::ShowHistory(_))).await {
            AppEvent::ShowHistory(entries) => entries,
            _ => unreachable!(),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.controller.shutdown();
    }
}

#[tokio::test]
async fn typed_text_is_translated_and_published() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "", |_| {});
    h.ready().await;

    h.send(AppEvent::TextInput("테스트".into())).await;
    h.send(AppEvent::Translate).await;

    match h.expect(|e| matches!(e, AppEvent::ShowTranslation { .. })).await {
        AppEvent::ShowTranslation {
            text,
            from_lang,
            to_lang,
        } => {
            assert_eq!(text, "test");
            assert_eq!(from_lang, "ko");
            assert_eq!(to_lang, "en");
        }
        _ => unreachable!(),
    }

    let view = h.view_until(|s| !s.is_loading).await;
    assert_eq!(view.translated_text, "test");
    assert_eq!(view.last_translation.as_deref(), Some("test"));
    assert_eq!(view.output_source, Some(TextSource::Manual));
}

#[tokio::test]
async fn offline_download_failure_is_shown() {
    let backend = MemoryBackend::default().with_connection(Connection::Offline);
    let h = Harness::start(Arc::new(backend.clone()), "", |_| {});
    h.ready().await;

    h.send(AppEvent::TextInput("안녕".into())).await;
    h.send(AppEvent::Translate).await;

    let message = h.expect_notice(NoticeLevel::Error).await;
    assert_eq!(message, "Model download failed: No network connection");

    let view = h.view_until(|s| !s.is_loading).await;
    assert_eq!(view.translated_text, message);
    assert_eq!(view.last_translation, None);
    assert_eq!(backend.calls().translations, 0);
}

#[tokio::test]
async fn rejected_initial_pair_leaves_session_unconfigured() {
    let backend = MemoryBackend::default();
    let h = Harness::start(Arc::new(backend.clone()), "", |c| {
        c.translator.from_lang = "xx".into();
    });

    assert_eq!(
        h.expect_notice(NoticeLevel::Error).await,
        "Invalid language: xx"
    );
    h.ready().await;

    h.send(AppEvent::TextInput("안녕".into())).await;
    h.send(AppEvent::Translate).await;

    assert_eq!(
        h.expect_notice(NoticeLevel::Error).await,
        "Translation failed: Translator is not configured"
    );
    assert_eq!(backend.calls().translations, 0);
}

#[tokio::test]
async fn invalid_language_change_keeps_previous_pair() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "", |_| {});
    h.ready().await;

    h.send(AppEvent::SetTargetLanguage("zz".into())).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Error).await,
        "Invalid language: zz"
    );
    assert_eq!(h.controller.view().get().target_language, "en");

    h.send(AppEvent::SetTargetLanguage("JA".into())).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Translating ko -> ja"
    );
    assert_eq!(h.controller.view().get().target_language, "ja");

    h.send(AppEvent::SwapLanguages).await;
    h.expect_notice(NoticeLevel::Info).await;
    let view = h.controller.view().get();
    assert_eq!(
        (view.source_language.as_str(), view.target_language.as_str()),
        ("ja", "ko")
    );
}

#[tokio::test]
async fn result_for_superseded_pair_is_dropped() {
    let gate = Arc::new(Notify::new());
    let h = Harness::start(
        Arc::new(GatedBackend::translations(gate.clone())),
        "",
        |_| {},
    );
    h.ready().await;

    h.send(AppEvent::TextInput("안녕".into())).await;
    h.send(AppEvent::Translate).await;
    h.view_until(|s| s.is_loading).await;

    h.send(AppEvent::SetTargetLanguage("ja".into())).await;
    h.expect_notice(NoticeLevel::Info).await;

    gate.notify_one();

    let view = h.view_until(|s| !s.is_loading).await;
    assert_eq!(view.translated_text, "");

    // Nothing about the stale translation reached the front end
    while let Ok(Some(event)) = h.rx.try_recv() {
        assert!(!matches!(event, AppEvent::ShowTranslation { .. }));
    }
}

#[tokio::test]
async fn image_is_recognized_translated_saved_and_listed() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "테스트\n\n", |_| {});
    h.ready().await;

    h.send(AppEvent::LoadImage(h.write_image("sign.png"))).await;
    match h.expect(|e| matches!(e, AppEvent::RawTextInput { .. })).await {
        AppEvent::RawTextInput { text, source } => {
            assert_eq!(text, "테스트");
            assert_eq!(source, TextSource::Ocr);
        }
        _ => unreachable!(),
    }

    h.send(AppEvent::Translate).await;
    h.expect(|e| matches!(e, AppEvent::ShowTranslation { .. }))
        .await;

    h.send(AppEvent::SaveResult).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Uploaded and saved"
    );
    assert!(h.dir.path().join("store/objects/local/sign.png").exists());

    let entries = h.history().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "테스트");
    assert_eq!(entries[0].translation, "test");
    assert!(entries[0].image_url.starts_with("file://"));

    assert_eq!(h.controller.view().get().history.len(), 1);
}

#[tokio::test]
async fn released_model_disappears_from_list() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "", |_| {});
    h.ready().await;

    h.send(AppEvent::ListModels).await;
    match h.expect(|e| matches!(e, AppEvent::ShowModels(_))).await {
        AppEvent::ShowModels(models) => assert_eq!(models, ["en"]),
        _ => unreachable!(),
    }

    h.send(AppEvent::ReleaseModel("en".into())).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Model 'en' deleted"
    );
    match h.expect(|e| matches!(e, AppEvent::ShowModels(_))).await {
        AppEvent::ShowModels(models) => assert!(models.is_empty()),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn disabled_ocr_refuses_images() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "text", |c| {
        c.ocr.enabled = false;
    });
    h.ready().await;

    h.send(AppEvent::LoadImage("anything.png".into())).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Error).await,
        "Text recognition is disabled"
    );
}

#[tokio::test]
async fn failure_message_is_not_saved_as_translation() {
    let backend = MemoryBackend::default().with_connection(Connection::Offline);
    let h = Harness::start(Arc::new(backend), "테스트", |_| {});
    h.ready().await;

    h.send(AppEvent::LoadImage(h.write_image("sign.png"))).await;
    h.expect(|e| matches!(e, AppEvent::RawTextInput { .. }))
        .await;

    h.send(AppEvent::Translate).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Error).await,
        "Model download failed: No network connection"
    );

    h.send(AppEvent::SaveResult).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Uploaded and saved"
    );

    let entries = h.history().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "테스트");
    assert_eq!(entries[0].translation, "");
}

#[tokio::test]
async fn translation_from_previous_pair_is_not_saved() {
    let h = Harness::start(Arc::new(MemoryBackend::default()), "테스트", |_| {});
    h.ready().await;

    h.send(AppEvent::LoadImage(h.write_image("sign.png"))).await;
    h.expect(|e| matches!(e, AppEvent::RawTextInput { .. }))
        .await;
    h.send(AppEvent::Translate).await;
    h.expect(|e| matches!(e, AppEvent::ShowTranslation { .. }))
        .await;

    h.send(AppEvent::SetTargetLanguage("ja".into())).await;
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Translating ko -> ja"
    );
    let view = h.controller.view().get();
    assert_eq!(view.translated_text, "");
    assert_eq!(view.last_translation, None);
    assert_eq!(view.output_text, "테스트");

    h.send(AppEvent::SaveResult).await;
    h.expect_notice(NoticeLevel::Info).await;

    let entries = h.history().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].translation, "");
}

#[tokio::test]
async fn slow_model_deletion_does_not_hold_up_translation() {
    let gate = Arc::new(Notify::new());
    let h = Harness::start(Arc::new(GatedBackend::deletions(gate.clone())), "", |_| {});
    h.ready().await;

    h.send(AppEvent::ReleaseModel("en".into())).await;
    h.send(AppEvent::TextInput("테스트".into())).await;
    h.send(AppEvent::Translate).await;

    match h.expect(|e| matches!(e, AppEvent::ShowTranslation { .. })).await {
        AppEvent::ShowTranslation { text, .. } => assert_eq!(text, "test"),
        _ => unreachable!(),
    }

    gate.notify_one();
    assert_eq!(
        h.expect_notice(NoticeLevel::Info).await,
        "Model 'en' deleted"
    );
    match h.expect(|e| matches!(e, AppEvent::ShowModels(_))).await {
        AppEvent::ShowModels(models) => assert_eq!(models, ["ko"]),
        _ => unreachable!(),
    }
    assert_eq!(h.controller.view().get().downloaded_models, ["ko"]);
}
