use steam_trade_session::{
    SteamClient,
    Event,
    Notification,
    PollOptions,
    TradeOffer,
    TradeOfferState,
};
use std::time::Duration;
use owo_colors::OwoColorize;

/// Accepts every active offer which gives us items for nothing.
async fn accept_gifts(client: &SteamClient) {
    let offers = match client.api.get_trade_offers().await {
        Ok(offers) => offers,
        Err(error) => return println!("Error getting offers: {}", error.red()),
    };

    for offer in offers {
        if offer.trade_offer_state != TradeOfferState::Active || !offer.items_to_give.is_empty() {
            continue;
        }

        match client.accept_trade(offer.tradeofferid, offer.partner()).await {
            Ok(accepted) => println!("Accepted offer {} (trade {:?})", offer.tradeofferid, accepted.tradeid),
            Err(error) => println!("Error accepting offer {}: {}", offer.tradeofferid, error.red()),
        }
    }
}

fn on_trade_receive(offer: TradeOffer) {
    println!("Offer {} is now {}", offer.tradeofferid, offer.trade_offer_state.bold());

    if offer.trade_offer_state == TradeOfferState::Accepted {
        println!("Received {} items", offer.items_to_receive.len());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let username = std::env::var("STEAM_USERNAME").expect("STEAM_USERNAME missing");
    let password = std::env::var("STEAM_PASSWORD").expect("STEAM_PASSWORD missing");
    let mut builder = SteamClient::builder(username, password)
        .api_key(std::env::var("API_KEY").expect("API_KEY missing"))
        .poll_options(PollOptions {
            poll_interval: Duration::from_secs(30),
            poll_notifications: true,
        });

    // Without a shared secret the code is read from standard input.
    if let Ok(shared_secret) = std::env::var("SHARED_SECRET") {
        builder = builder.shared_secret(shared_secret);
    }

    if let Ok(identity_secret) = std::env::var("IDENTITY_SECRET") {
        builder = builder.identity_secret(identity_secret);
    }

    let (client, mut events) = builder.build()?;

    client.login().await?;

    // Polling only reports offers which changed, so new offers are looked up separately.
    let mut gift_check = tokio::time::interval(Duration::from_secs(60));

    loop {
        let event = tokio::select! {
            _ = gift_check.tick() => {
                accept_gifts(&client).await;
                continue;
            },
            event = events.recv() => event,
        };
        let Some(event) = event else {
            break;
        };

        match event {
            Event::Login => println!("{}", "Logged in".green()),
            Event::Logout => break,
            Event::TradeReceive(offer) => on_trade_receive(offer),
            Event::Notification(Notification::ItemsReceived { count }) => {
                println!("Received {} new items", count.bold());
            },
            Event::Notification(notification) => {
                println!("{} new notifications of kind {:?}", notification.count(), notification.kind());
            },
            Event::PollingFailed(error) => {
                println!("Polling stopped: {}", error.red());
                break;
            },
        }
    }

    Ok(())
}
