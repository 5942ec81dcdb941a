// src/bin/fetch_gold.rs
use gold_pawnshop::config::ServerConfig;
use gold_pawnshop::services::gold::{PriceSource, YahooGoldSource};
use gold_pawnshop::services::history::PriceHistoryStore;
use gold_pawnshop::services::pricing::calculate_rates;
use gold_pawnshop::services::settings::ConfigStore;
use gold_pawnshop::services::volatility::volatility_state;
use log::{error, info};
use dotenv::dotenv;

/// One live fetch, priced against the stored config and history. Nothing is
/// written to the history file.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let server = ServerConfig::from_env()?;
    let config = ConfigStore::new(server.config_path()).load().await;
    let history = PriceHistoryStore::new(server.history_path());

    info!("Testing Yahoo gold price fetching...");
    let source = YahooGoldSource::new()?;
    let price = match source.spot_price().await {
        Ok(price) => {
            info!("SUCCESS: gold spot price {:.2} per troy ounce", price);
            price
        }
        Err(e) => {
            error!("ERROR: failed to fetch gold price: {}", e);
            return Err(e.into());
        }
    };

    let volatility = volatility_state(&history, &config.volatility_thresholds).await;
    let table = calculate_rates(price, &volatility, &config.volatility_margins);

    println!(
        "{} | state {} ({:.2}%) margin {}%",
        config.shop_name, table.meta.state, table.meta.volatility_percent, table.meta.active_margin
    );
    for (karat, entry) in table.rates.iter().rev() {
        println!(
            "{:>4}  melt {:>9.2}/g  buy {:>9.2}/g",
            karat.to_string(),
            entry.melt_value_per_gram,
            entry.buy_pawn_price_per_gram
        );
    }
    Ok(())
}
