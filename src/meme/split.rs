//! Splitting a caption into the top and bottom lines of a meme.

/// The two lines of a meme, top first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextHalves {
    /// Line drawn near the top edge
    pub upper: String,
    /// Line drawn near the bottom edge
    pub lower: String,
}

impl TextHalves {
    fn from_words(upper: &[&str], lower: &[&str]) -> Self {
        Self {
            upper: upper.join(" "),
            lower: lower.join(" "),
        }
    }

    /// Both lines, top first.
    pub fn lines(&self) -> [&str; 2] {
        [self.upper.as_str(), self.lower.as_str()]
    }
}

/// How a caption gets divided between the two lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SplitPolicy {
    /// Half the words on top, the rest below. Ignores word lengths.
    WordCount,
    /// Split at the middle character. A word straddling the middle is glued
    /// back together and handed to the side with fewer words, ties going to
    /// the bottom line.
    #[default]
    CharacterBalanced,
}

impl SplitPolicy {
    /// Splits `text` into two lines.
    ///
    /// A single word always ends up as `("", word)`; empty text gives two
    /// empty lines.
    pub fn split(self, text: &str) -> TextHalves {
        match self {
            Self::WordCount => split_by_words(text),
            Self::CharacterBalanced => split_by_characters(text),
        }
    }
}

/// Splits with the default [`SplitPolicy::CharacterBalanced`] policy.
pub fn split(text: &str) -> TextHalves {
    SplitPolicy::default().split(text)
}

fn split_by_words(text: &str) -> TextHalves {
    let words: Vec<&str> = text.split_whitespace().collect();
    let (upper, lower) = words.split_at(words.len() / 2);
    TextHalves::from_words(upper, lower)
}

fn split_by_characters(text: &str) -> TextHalves {
    let text = text.trim();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    if chars.is_empty() {
        return TextHalves::default();
    }

    let middle = chars.len() / 2;
    let (cut, at_cut) = chars[middle];
    let before_cut = middle.checked_sub(1).map(|idx| chars[idx].1);

    let mut upper: Vec<&str> = text[..cut].split_whitespace().collect();
    let mut lower: Vec<&str> = text[cut..].split_whitespace().collect();

    let straddles = !at_cut.is_whitespace() && before_cut.is_some_and(|c| !c.is_whitespace());
    if !straddles {
        return TextHalves::from_words(&upper, &lower);
    }

    // both sides hold a fragment of the straddling word
    let head = upper.pop().unwrap_or_default();
    let tail = if lower.is_empty() { "" } else { lower.remove(0) };
    let merged = format!("{head}{tail}");

    let mut halves = TextHalves::from_words(&upper, &lower);
    if upper.len() < lower.len() {
        push_word(&mut halves.upper, &merged, false);
    } else {
        push_word(&mut halves.lower, &merged, true);
    }
    halves
}

fn push_word(line: &mut String, word: &str, at_front: bool) {
    if line.is_empty() {
        line.push_str(word);
    } else if at_front {
        *line = format!("{word} {line}");
    } else {
        line.push(' ');
        line.push_str(word);
    }
}
