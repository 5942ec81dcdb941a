// src/services/pricing.rs
use log::info;
use std::collections::BTreeMap;

use crate::models::{Karat, RateEntry, RateMeta, RateTable, VolatilitySnapshot};
use super::settings::MarginTable;

pub const TROY_OUNCE_TO_GRAMS: f64 = 31.1035;

/// Fraction of melt value the shop pays; an 8% margin pays 0.92.
pub fn discount_multiplier(margin_percent: f64) -> f64 {
    1.0 - margin_percent / 100.0
}

pub fn round_to_quarter(value: f64) -> f64 {
    (value * 4.0).round() / 4.0
}

/// Per-karat melt value and buy/pawn price for a spot price per troy ounce,
/// discounted by the margin the current volatility state selects.
pub fn calculate_rates(
    spot_price_per_ounce: f64,
    volatility: &VolatilitySnapshot,
    margins: &MarginTable,
) -> RateTable {
    let active_margin = margins.margin_for(volatility.state);
    let discount = discount_multiplier(active_margin);

    info!(
        "Dynamic pricing active: state={}, volatility={:.2}%, margin={}%",
        volatility.state, volatility.volatility_percent, active_margin
    );

    let price_per_gram = spot_price_per_ounce / TROY_OUNCE_TO_GRAMS;
    let rates: BTreeMap<Karat, RateEntry> = Karat::ALL
        .into_iter()
        .map(|karat| {
            let melt_value_per_gram = price_per_gram * karat.purity();
            let entry = RateEntry {
                karat,
                melt_value_per_gram,
                buy_pawn_price_per_gram: round_to_quarter(melt_value_per_gram * discount),
            };
            (karat, entry)
        })
        .collect();

    RateTable {
        rates,
        meta: RateMeta {
            state: volatility.state,
            volatility_percent: volatility.volatility_percent,
            active_margin,
        },
    }
}
