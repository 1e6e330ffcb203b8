use dotenv::dotenv;
use teloxide::{
    dispatching::dialogue::{serializer::Json, SqliteStorage, Storage},
    prelude::*,
};

use demos_tgbot::bot::{self, session::Scores, session::Sessions, DialogueStorage};
use demos_tgbot::config::Config;
use demos_tgbot::memory::leaderboard::FileStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Err(err) = dotenv() {
        eprintln!("no .env file loaded: {}", err);
    }
    pretty_env_logger::init();
    log::info!("Starting demos bot...");

    let config = Config::from_env();
    let bank = config.load_question_bank()?;
    log::info!("Loaded {} quiz questions", bank.len());

    let bot = Bot::from_env();

    log::info!("Opening dialogue storage at {}", config.db_path.display());
    let db_path = config.db_path.to_string_lossy().into_owned();
    let storage: DialogueStorage = SqliteStorage::open(&db_path, Json).await?.erase();

    let leaderboard = FileStore::open(&config.leaderboard_path);
    log::info!("Leaderboard at {}", leaderboard.path().display());

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![storage, Sessions::new(bank), Scores::new(leaderboard)])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}
