//! CleanBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::{info, warn};

use CleanBuddy::{
    config::{Settings, StorageBackend},
    handlers::{handle_command, handle_message, Command},
    services::TelegramTransport,
    state::{MemoryStorage, RedisStorage, StateStorage},
    turn::TurnDispatcher,
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting CleanBuddy Telegram Bot...");

    // Initialize state storage
    let storage: Arc<dyn StateStorage> = match settings.storage.backend {
        StorageBackend::Redis => {
            info!("Connecting to Redis...");
            let redis = RedisStorage::new(settings.redis.clone()).await?;
            redis.test_connection().await?;
            Arc::new(redis)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory state storage; conversations are lost on restart");
            Arc::new(MemoryStorage::new())
        }
    };

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    info!("Building turn dispatcher...");
    let dispatcher = TurnDispatcher::builder()
        .storage(storage)
        .transport(Arc::new(TelegramTransport::new(bot.clone())))
        .settings(settings.clone())
        .build()?;

    let dispatcher_arc = Arc::new(dispatcher);
    let settings_arc = Arc::new(settings);

    let handler = create_handler();

    let mut bot_dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher_arc, settings_arc])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("CleanBuddy bot is ready! Starting bot with polling mode...");
    bot_dispatcher.dispatch().await;

    info!("CleanBuddy bot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry().branch(
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_commands),
            )
            .branch(dptree::endpoint(handle_messages)),
    )
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<TurnDispatcher>,
    settings: Arc<Settings>,
) -> HandlerResult {
    handle_command(bot, msg, cmd, dispatcher, settings).await?;
    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    msg: Message,
    dispatcher: Arc<TurnDispatcher>,
    settings: Arc<Settings>,
) -> HandlerResult {
    handle_message(msg, dispatcher, settings).await?;
    Ok(())
}
