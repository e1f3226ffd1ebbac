//! Caption clean-up: quotes, emoji, hashtags and trailing punctuation.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

#[allow(clippy::unwrap_used)] // literal pattern
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// Normalizes a generated caption before layout.
///
/// Removes surrounding `"` quotes, every emoji grapheme, every `#hashtag`
/// token and a trailing `.` then `!`. Passes repeat until nothing changes, so
/// `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut text = raw.to_string();
    loop {
        // removing one emoji can fuse its neighbours into another
        let next = trim_decorations(&strip_hashtags(&strip_emoji(&text)));
        if next == text {
            return text;
        }
        text = next;
    }
}

fn trim_decorations(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_prefix('"').unwrap_or(text);
    let text = text.strip_suffix('"').unwrap_or(text);
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text);
    let text = text.strip_suffix('!').unwrap_or(text);
    text.trim_end().to_string()
}

fn strip_hashtags(text: &str) -> String {
    HASHTAG.replace_all(text, "").into_owned()
}

fn strip_emoji(text: &str) -> String {
    text.graphemes(true)
        .filter(|grapheme| !is_emoji(grapheme))
        .collect()
}

fn is_emoji(grapheme: &str) -> bool {
    if emojis::get(grapheme).is_some() {
        return true;
    }
    // unqualified forms and sequences the emoji table doesn't list
    let bare = grapheme.trim_end_matches('\u{fe0f}');
    if emojis::get(bare).is_some() {
        return true;
    }
    let mut chars = grapheme.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) if !first.is_ascii() => {
            let mut buf = [0u8; 4];
            emojis::get(first.encode_utf8(&mut buf)).is_some()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes_whitespace_and_exclamation() {
        assert_eq!(clean(" \"Hello world!\" "), "Hello world");
    }

    #[test]
    fn removes_latin_and_cyrillic_hashtags() {
        assert_eq!(clean("Great day #funny #мем"), "Great day");
        assert_eq!(clean("#tbt Monday again"), "Monday again");
    }

    #[test]
    fn removes_emoji_without_replacement() {
        assert_eq!(clean("Nice 😂🔥 day"), "Nice  day");
        assert_eq!(clean("Thumbs 👍🏽 up"), "Thumbs  up");
        assert_eq!(clean("Family 👨‍👩‍👧 time"), "Family  time");
        assert_eq!(clean("Love ❤️"), "Love");
    }

    #[test]
    fn keeps_digits_and_plain_symbols() {
        assert_eq!(clean("404 brain not found"), "404 brain not found");
        assert_eq!(clean("50% done?"), "50% done?");
    }

    #[test]
    fn strips_period_then_exclamation() {
        assert_eq!(clean("Monday again."), "Monday again");
        assert_eq!(clean("Monday again!"), "Monday again");
        assert_eq!(clean("Monday again!."), "Monday again");
        assert_eq!(clean("Wait... what?"), "Wait... what?");
    }

    #[test]
    fn degenerate_input_is_empty() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("\"\""), "");
        assert_eq!(clean("  #only #tags 🎉 "), "");
    }

    #[test]
    fn emoji_fused_by_removal_is_removed_too() {
        assert_eq!(clean("🇺😂🇸"), "");
        assert_eq!(clean("US 🇺😂🇸 flag"), "US  flag");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            " \"Hello world!\" ",
            "\"\"nested quotes\"\"",
            "Wow!!",
            "Really.!",
            "Great day #funny #мем 😂.",
            "  \" \"spaced\" \" ",
            "Мой кот смотрит на тебя!",
            "🇺😂🇸",
            "US 🇺😂🇸 flag",
            "#a#b#c",
            "",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {sample:?}");
        }
    }
}
