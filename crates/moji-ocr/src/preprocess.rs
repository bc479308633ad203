use unicode_normalization::UnicodeNormalization;

/// Tidy recognizer output: NFC (recombines decomposed Hangul jamo),
/// trailing whitespace and blank lines dropped, line breaks kept.
pub fn clean_text(text: &str) -> String {
    let text: String = text.nfc().collect();

    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
