//! What the bot says, in English and Russian.

pub(crate) const START_MSG: &str = "Send me a pic and I will make a meme with it!

Пришли мне картинку и я сделаю из неё мем!";

pub(crate) const LANGUAGE_MSG: &str = "What language should I make a meme in?
(To cancel meme generation, use the /cancel command.)

Введите язык мема.
(Команда /cancel отменяет создание мема.)";

pub(crate) const THEME_MSG: &str = "What it should be about?
(You can leave this field empty if you want – in that case, write \"-\".
To cancel meme creation, use the /cancel command.)

О чём должен быть мем?
(Это поле можно оставить пустым – в таком случае, введите \"-\".
Команда /cancel отменяет создание мема.)";

pub(crate) const CANCEL_MSG: &str = "Meme creation cancelled.
You can send me new pic to generate new meme!

Создание мема отменено.
Ты можешь отправить мне другую картинку, чтобы я сделал из неё мем!";

pub(crate) const ERROR_MSG: &str = "Sorry, something bad happened. 🙁 Try again!

Что-то пошло не так. 🙁 Попробуйте ещё раз!";

pub(crate) const LANGUAGE_CLEARED_MSG: &str = "I'll ask for the language with every pic.

Я буду спрашивать язык для каждой картинки.";

pub(crate) fn language_set_msg(language: &str) -> String {
    format!(
        "Memes will be made in {language} now. Send me a pic!

Теперь мемы будут на языке: {language}. Пришли картинку!"
    )
}
