use deckcheck::adapters::outbound::card_store::{init_cached_card_store, init_card_store};
use deckcheck::ports::outbound::card_store::CardStore;
use deckcheck::App;
use dotenv::dotenv;
use std::env;
use std::process::ExitCode;
use tokio::io::{self, AsyncReadExt};

async fn run<CS>(app: App<CS>, deck: &str) -> ExitCode
where
    CS: CardStore + Send + Sync,
{
    let format = env::var("DECK_FORMAT").ok().filter(|format| !format.trim().is_empty());

    match app.analyse_deck(deck, format.as_deref()).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(why) => {
                log::error!("Failed to render deck report - {why}");
                ExitCode::FAILURE
            }
        },
        Err(why) => {
            log::error!("{why}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let mut deck = String::new();
    if let Err(why) = io::stdin().read_to_string(&mut deck).await {
        log::error!("Failed to read deck list from stdin - {why}");
        return ExitCode::FAILURE;
    }

    if env::var("REDIS_URL").is_ok() {
        run(App::new(init_cached_card_store().await), &deck).await
    } else {
        run(App::new(init_card_store().await), &deck).await
    }
}
