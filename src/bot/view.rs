use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::{ApiError, RequestError};

use super::action::Action;

/// What a demo wants its message to look like.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

impl Screen {
    pub fn new(text: impl Into<String>, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            text: text.into(),
            keyboard: InlineKeyboardMarkup::new(rows),
        }
    }
}

pub fn button(label: impl Into<String>, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.to_string())
}

pub fn menu_row() -> Vec<InlineKeyboardButton> {
    vec![button("⬅ Menu", Action::MainMenu)]
}

/// Replaces the demo's message with `screen`, or posts a new one when there
/// is nothing to edit. Returns the message now holding the demo.
pub async fn show(
    bot: &Bot,
    chat: ChatId,
    region: Option<MessageId>,
    screen: Screen,
) -> Result<MessageId, RequestError> {
    if let Some(id) = region {
        match bot
            .edit_message_text(chat, id, screen.text.clone())
            .reply_markup(screen.keyboard.clone())
            .await
        {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => return Ok(id),
            Err(err) => log::warn!("cannot edit message {} in chat {}: {}", id.0, chat.0, err),
        }
    }
    let message = bot
        .send_message(chat, screen.text)
        .reply_markup(screen.keyboard)
        .await?;
    Ok(message.id)
}
