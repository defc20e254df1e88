use odd_one_out::{
    config::Config, player_registry::local_player_registry::LocalPlayerRegistry,
    session::Session, telegram,
};
use std::error::Error;
use teloxide::prelude::*;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Reads .env first so RUST_LOG from it reaches the logger.
    let config = Config::from_env()?;
    pretty_env_logger::init();
    log::info!("Starting Odd One Out Bot");

    log::info!(
        "Rounds start at {} players, options after {:?}, voting after {:?}",
        config.minimum_players,
        config.options_delay,
        config.voting_delay
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (dispatch_tx, dispatch_rx) = mpsc::unbounded_channel();

    let session = Session::new(
        config,
        LocalPlayerRegistry::new(),
        event_tx.clone(),
        dispatch_tx,
    );
    tokio::spawn(session.run(event_rx));

    let bot = Bot::from_env();
    tokio::spawn(telegram::deliver(bot.clone(), dispatch_rx));

    Dispatcher::builder(bot, telegram::get_handler())
        .dependencies(dptree::deps![event_tx])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
