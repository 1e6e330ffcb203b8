pub mod action;
pub mod memory;
pub mod quiz;
pub mod session;
pub mod sort;
pub mod view;

use teloxide::{
    dispatching::{dialogue::ErasedStorage, UpdateHandler},
    prelude::*,
};

use action::{Action, Demo};
use session::{ChatHandle, ChatSession, Scores, Sessions};
use view::{button, Screen};

pub type DemoDialogue = Dialogue<State, ErasedStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
pub type DialogueStorage = std::sync::Arc<ErasedStorage<State>>;

/// Which screen the chat is on. Live demo state sits in [`Sessions`].
#[derive(Clone, Default, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Menu,
    Sorting,
    Quiz,
    Memory,
}

impl State {
    fn for_demo(demo: Demo) -> Self {
        match demo {
            Demo::Sort => State::Sorting,
            Demo::Quiz => State::Quiz,
            Demo::Memory => State::Memory,
        }
    }
}

const GREETING_TEXT: &str = "Hi! I host three small teaching demos: a step-by-step bubble sort, a JavaScript quiz and a memory game of web terms.";

pub fn menu_screen() -> Screen {
    Screen::new(
        "What would you like to try?",
        vec![
            vec![button("🔢 Bubble sort", Action::Open(Demo::Sort))],
            vec![button("❓ Quiz", Action::Open(Demo::Quiz))],
            vec![button("🃏 Memory game", Action::Open(Demo::Memory))],
        ],
    )
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let messages = Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(dptree::filter(|msg: Message| is_start_command(&msg)).endpoint(start))
        .branch(dptree::case![State::Start].endpoint(start))
        .branch(dptree::case![State::Quiz].endpoint(quiz_text))
        .branch(dptree::endpoint(show_menu));

    let callbacks = Update::filter_callback_query()
        .enter_dialogue::<CallbackQuery, ErasedStorage<State>, State>()
        .endpoint(callback);

    dptree::entry().branch(messages).branch(callbacks)
}

fn is_start_command(msg: &Message) -> bool {
    msg.text().is_some_and(|text| text.trim() == "/start")
}

async fn start(
    bot: Bot,
    dialogue: DemoDialogue,
    sessions: Sessions,
    msg: Message,
) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    show_menu(bot, dialogue, sessions, msg).await
}

async fn show_menu(
    bot: Bot,
    dialogue: DemoDialogue,
    sessions: Sessions,
    msg: Message,
) -> HandlerResult {
    sessions.with(msg.chat.id, ChatSession::leave).await;
    let menu = menu_screen();
    bot.send_message(msg.chat.id, menu.text)
        .reply_markup(menu.keyboard)
        .await?;
    dialogue.update(State::Menu).await?;
    Ok(())
}

async fn quiz_text(bot: Bot, sessions: Sessions, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please type your answer as text")
            .await?;
        return Ok(());
    };
    let handle = ChatHandle {
        bot,
        sessions,
        chat: msg.chat.id,
    };
    quiz::enter_text(handle, text).await
}

async fn callback(
    bot: Bot,
    dialogue: DemoDialogue,
    sessions: Sessions,
    scores: Scores,
    q: CallbackQuery,
) -> HandlerResult {
    // Telegram keeps a spinner on the button until the query is answered
    bot.answer_callback_query(q.id.clone()).await?;

    let action = match q.data.as_deref().map(str::parse::<Action>) {
        Some(Ok(action)) => action,
        Some(Err(err)) => {
            log::warn!("{}", err);
            return Ok(());
        }
        None => return Ok(()),
    };
    log::debug!("chat {}: {:?}", dialogue.chat_id().0, action);

    let handle = ChatHandle {
        bot,
        sessions,
        chat: dialogue.chat_id(),
    };

    match action {
        Action::Noop => Ok(()),
        Action::MainMenu => {
            handle.sessions.with(handle.chat, ChatSession::leave).await;
            let menu = menu_screen();
            handle
                .bot
                .send_message(handle.chat, menu.text)
                .reply_markup(menu.keyboard)
                .await?;
            dialogue.update(State::Menu).await?;
            Ok(())
        }
        Action::Open(demo) => {
            handle.sessions.with(handle.chat, ChatSession::leave).await;
            dialogue.update(State::for_demo(demo)).await?;
            match demo {
                Demo::Sort => sort::open(handle).await,
                Demo::Quiz => quiz::open(handle).await,
                Demo::Memory => memory::open(handle, scores).await,
            }
        }
        Action::SortStep => sort::step(handle).await,
        Action::QuizStart | Action::QuizRestart => {
            dialogue.update(State::Quiz).await?;
            quiz::start(handle).await
        }
        Action::QuizOption(option) => quiz::select(handle, option).await,
        Action::QuizNext => quiz::next(handle).await,
        Action::QuizReview => quiz::toggle_review(handle).await,
        Action::MemoryStart(difficulty) => {
            dialogue.update(State::Memory).await?;
            memory::start(handle, difficulty).await
        }
        Action::MemoryCard(index) => memory::flip(handle, scores, index).await,
        Action::MemoryAgain => memory::play_again(handle).await,
        Action::MemoryRestart | Action::MemoryHome => memory::back_to_start(handle, scores).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use view::testing::callbacks;

    #[test]
    fn menu_opens_each_demo() {
        assert_eq!(
            callbacks(&menu_screen()),
            vec![vec!["menu:sort"], vec!["menu:quiz"], vec!["menu:memory"]]
        );
    }

    #[test]
    fn dialogue_state_follows_the_open_demo() {
        assert_eq!(State::for_demo(Demo::Sort), State::Sorting);
        assert_eq!(State::for_demo(Demo::Quiz), State::Quiz);
        assert_eq!(State::for_demo(Demo::Memory), State::Memory);
        assert_eq!(State::default(), State::Start);
    }
}
