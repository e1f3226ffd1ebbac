//! Per-chat conversation: collect a photo, a language and a theme.

use super::messages::{
    CANCEL_MSG, LANGUAGE_CLEARED_MSG, LANGUAGE_MSG, START_MSG, THEME_MSG, language_set_msg,
};
use crate::service::MemeRequest;

/// Writing this instead of a theme means "no theme".
const NO_THEME: &str = "-";

/// Something the user sent, already classified.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Inbound<'a> {
    /// `/start`
    Start,
    /// `/cancel`
    Cancel,
    /// `/set_language <language>`; no argument forgets the language
    SetLanguage(Option<&'a str>),
    /// A photo, stored under `image`, with its caption if any
    Photo {
        /// File name the photo was downloaded to
        image: String,
        /// Caption typed under the photo
        caption: Option<&'a str>,
    },
    /// Any other text
    Text(&'a str),
}

/// What the bot should do after a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Send a text message back
    Reply(String),
    /// Delete a downloaded photo that will never be used
    Discard(String),
    /// Make the meme
    Generate(MemeRequest),
}

/// Where the chat is at.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum State {
    /// Nothing pending
    #[default]
    AwaitingImage,
    /// Got a photo, need a language
    AwaitingLanguage {
        /// Downloaded photo
        image: String,
        /// Theme from the photo caption
        theme: Option<String>,
    },
    /// Got a photo and a language, need a theme
    AwaitingTheme {
        /// Downloaded photo
        image: String,
        /// Language to write in
        language: String,
    },
}

impl State {
    fn pending_image(&self) -> Option<&str> {
        match self {
            State::AwaitingImage => None,
            State::AwaitingLanguage { image, .. } | State::AwaitingTheme { image, .. } => {
                Some(image)
            }
        }
    }
}

/// One chat's state plus the language set with `/set_language`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Conversation {
    state: State,
    language: Option<String>,
}

impl Conversation {
    /// Current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Language set with `/set_language`, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Moves the conversation along and says what to do about it.
    pub fn handle(&mut self, inbound: Inbound<'_>) -> Vec<Effect> {
        match inbound {
            Inbound::Start => {
                let mut effects = self.reset();
                effects.push(reply(START_MSG));
                effects
            }
            Inbound::Cancel => {
                let mut effects = self.reset();
                effects.push(reply(CANCEL_MSG));
                effects
            }
            Inbound::SetLanguage(language) => self.set_language(language),
            Inbound::Photo { image, caption } => {
                let mut effects = self.reset();
                effects.extend(self.photo(image, non_blank(caption)));
                effects
            }
            Inbound::Text(text) => self.text(text),
        }
    }

    fn reset(&mut self) -> Vec<Effect> {
        let pending = self.state.pending_image().map(|image| Effect::Discard(image.to_string()));
        self.state = State::AwaitingImage;
        pending.into_iter().collect()
    }

    fn set_language(&mut self, language: Option<&str>) -> Vec<Effect> {
        let Some(language) = non_blank(language) else {
            self.language = None;
            return vec![reply(LANGUAGE_CLEARED_MSG)];
        };
        self.language = Some(language.to_string());
        let mut effects = vec![Effect::Reply(language_set_msg(language))];
        if let State::AwaitingLanguage { .. } = self.state {
            effects.extend(self.text(language));
        }
        effects
    }

    fn photo(&mut self, image: String, caption: Option<&str>) -> Vec<Effect> {
        match (self.language.clone(), caption) {
            (Some(language), Some(theme)) => vec![generate(image, language, theme)],
            (Some(language), None) => {
                self.state = State::AwaitingTheme { image, language };
                vec![reply(THEME_MSG)]
            }
            (None, theme) => {
                self.state = State::AwaitingLanguage {
                    image,
                    theme: theme.map(str::to_string),
                };
                vec![reply(LANGUAGE_MSG)]
            }
        }
    }

    fn text(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim();
        match std::mem::take(&mut self.state) {
            State::AwaitingImage => vec![reply(START_MSG)],
            State::AwaitingLanguage { image, theme } if text.is_empty() => {
                self.state = State::AwaitingLanguage { image, theme };
                vec![reply(LANGUAGE_MSG)]
            }
            State::AwaitingLanguage {
                image,
                theme: Some(theme),
            } => vec![generate(image, text.to_string(), &theme)],
            State::AwaitingLanguage { image, theme: None } => {
                self.state = State::AwaitingTheme {
                    image,
                    language: text.to_string(),
                };
                vec![reply(THEME_MSG)]
            }
            State::AwaitingTheme { image, language } => vec![generate(image, language, text)],
        }
    }
}

fn reply(text: &str) -> Effect {
    Effect::Reply(text.to_string())
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

fn generate(image: String, language: String, theme: &str) -> Effect {
    let theme = theme.trim();
    let theme = (!theme.is_empty() && theme != NO_THEME).then(|| theme.to_string());
    Effect::Generate(MemeRequest {
        image,
        language,
        theme,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(image: &str, caption: Option<&'static str>) -> Inbound<'static> {
        Inbound::Photo {
            image: image.to_string(),
            caption,
        }
    }

    fn request(image: &str, language: &str, theme: Option<&str>) -> Effect {
        Effect::Generate(MemeRequest {
            image: image.to_string(),
            language: language.to_string(),
            theme: theme.map(str::to_string),
        })
    }

    #[test]
    fn full_walk_through() {
        let mut chat = Conversation::default();
        assert_eq!(chat.handle(Inbound::Start), vec![reply(START_MSG)]);

        assert_eq!(chat.handle(photo("1_1.jpg", None)), vec![reply(LANGUAGE_MSG)]);
        assert!(matches!(chat.state(), State::AwaitingLanguage { .. }));

        assert_eq!(chat.handle(Inbound::Text("English")), vec![reply(THEME_MSG)]);
        assert_eq!(
            chat.state(),
            &State::AwaitingTheme {
                image: "1_1.jpg".to_string(),
                language: "English".to_string()
            }
        );

        assert_eq!(
            chat.handle(Inbound::Text("cats at work")),
            vec![request("1_1.jpg", "English", Some("cats at work"))]
        );
        assert_eq!(chat.state(), &State::AwaitingImage);
    }

    #[test]
    fn dash_means_no_theme() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", None));
        chat.handle(Inbound::Text("Русский"));
        assert_eq!(
            chat.handle(Inbound::Text(" - ")),
            vec![request("1_1.jpg", "Русский", None)]
        );
    }

    #[test]
    fn photo_caption_is_the_theme() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", Some("mondays")));
        assert_eq!(
            chat.handle(Inbound::Text("English")),
            vec![request("1_1.jpg", "English", Some("mondays"))]
        );
    }

    #[test]
    fn preset_language_skips_the_question() {
        let mut chat = Conversation::default();
        assert_eq!(
            chat.handle(Inbound::SetLanguage(Some("German"))),
            vec![Effect::Reply(language_set_msg("German"))]
        );
        assert_eq!(chat.language(), Some("German"));

        assert_eq!(chat.handle(photo("1_1.jpg", None)), vec![reply(THEME_MSG)]);
        assert_eq!(
            chat.handle(Inbound::Text("-")),
            vec![request("1_1.jpg", "German", None)]
        );

        // caption and language both known: straight to work
        assert_eq!(
            chat.handle(photo("1_2.jpg", Some("beer"))),
            vec![request("1_2.jpg", "German", Some("beer"))]
        );
        assert_eq!(chat.state(), &State::AwaitingImage);
    }

    #[test]
    fn setting_language_answers_a_pending_question() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", None));
        assert_eq!(
            chat.handle(Inbound::SetLanguage(Some("French"))),
            vec![Effect::Reply(language_set_msg("French")), reply(THEME_MSG)]
        );
    }

    #[test]
    fn blank_language_clears_it() {
        let mut chat = Conversation::default();
        chat.handle(Inbound::SetLanguage(Some("German")));
        assert_eq!(
            chat.handle(Inbound::SetLanguage(Some("  "))),
            vec![reply(LANGUAGE_CLEARED_MSG)]
        );
        assert_eq!(chat.language(), None);
    }

    #[test]
    fn cancel_discards_the_pending_photo() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", None));
        assert_eq!(
            chat.handle(Inbound::Cancel),
            vec![Effect::Discard("1_1.jpg".to_string()), reply(CANCEL_MSG)]
        );
        assert_eq!(chat.state(), &State::AwaitingImage);
        assert_eq!(chat.handle(Inbound::Cancel), vec![reply(CANCEL_MSG)]);
    }

    #[test]
    fn new_photo_replaces_the_pending_one() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", None));
        assert_eq!(
            chat.handle(photo("1_2.jpg", None)),
            vec![Effect::Discard("1_1.jpg".to_string()), reply(LANGUAGE_MSG)]
        );
    }

    #[test]
    fn blank_language_is_asked_again() {
        let mut chat = Conversation::default();
        chat.handle(photo("1_1.jpg", None));
        assert_eq!(chat.handle(Inbound::Text("   ")), vec![reply(LANGUAGE_MSG)]);
        assert!(matches!(chat.state(), State::AwaitingLanguage { .. }));
    }

    #[test]
    fn text_without_a_photo_gets_the_greeting() {
        let mut chat = Conversation::default();
        assert_eq!(chat.handle(Inbound::Text("hello?")), vec![reply(START_MSG)]);
    }
}
