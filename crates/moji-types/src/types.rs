use std::path::PathBuf;

/// Messages between the front end and the app loop
#[derive(Debug, Clone)]
pub enum AppEvent {
    // front end -> app
    /// Raw text typed or pasted by the user; becomes the output text
    TextInput(String),
    /// Translate the current output text
    Translate,
    SetSourceLanguage(String),
    SetTargetLanguage(String),
    SwapLanguages,
    /// Pick an image from disk and run text recognition on it
    LoadImage(PathBuf),
    SaveResult,
    FetchHistory {
        query: String,
    },
    ReleaseModel(String),
    ListModels,
    Shutdown,

    // app -> front end
    BackendReady,
    Notice {
        level: NoticeLevel,
        message: String,
    },
    RawTextInput {
        text: String,
        source: TextSource,
    },
    ShowTranslation {
        text: String,
        from_lang: String,
        to_lang: String,
    },
    ShowHistory(Vec<HistoryEntry>),
    ShowModels(Vec<String>),
}

impl AppEvent {
    pub fn info(message: impl Into<String>) -> Self {
        AppEvent::Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        AppEvent::Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Ocr,
    Manual,
}

/// One persisted result, formatted for display
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: String,
    pub text: String,
    pub translation: String,
    pub image_url: String,
}

/// Observable state published by the app loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub output_text: String,
    pub output_source: Option<TextSource>,
    /// Translation or failure message, as displayed
    pub translated_text: String,
    /// Last successful translation of `output_text` under the current pair
    pub last_translation: Option<String>,
    pub image_path: Option<PathBuf>,
    pub is_loading: bool,
    pub source_language: String,
    pub target_language: String,
    pub downloaded_models: Vec<String>,
    pub history: Vec<HistoryEntry>,
}
