// src/services/loan.rs
use chrono::{Duration, Local, NaiveDate};

use crate::error::{PawnError, Result};
use crate::models::{Karat, LoanQuote, RateTable};

pub const LOAN_TERM_DAYS: i64 = 30;

/// Quote a one-month pawn loan for `weight_grams` of `karat` gold, due
/// thirty days from today.
pub fn quote(karat: u32, weight_grams: f64, rates: &RateTable, interest_rate: f64) -> Result<LoanQuote> {
    quote_on(karat, weight_grams, rates, interest_rate, Local::now().date_naive())
}

/// Check a karat/weight pair without pricing it.
pub fn validate(karat: u32, weight_grams: f64) -> Result<Karat> {
    let karat = Karat::try_from(karat)?;
    // NaN fails this check as well
    if !(weight_grams > 0.0) || !weight_grams.is_finite() {
        return Err(PawnError::InvalidWeight(weight_grams));
    }
    Ok(karat)
}

pub fn quote_on(
    karat: u32,
    weight_grams: f64,
    rates: &RateTable,
    interest_rate: f64,
    today: NaiveDate,
) -> Result<LoanQuote> {
    let karat = validate(karat, weight_grams)?;
    let rate = rates.get(karat).ok_or(PawnError::InvalidKarat(karat.value()))?;

    let loan_amount = rate.buy_pawn_price_per_gram * weight_grams;
    let interest_amount = loan_amount * interest_rate;
    let total_melt_value = rate.melt_value_per_gram * weight_grams;
    let total_due = loan_amount + interest_amount;

    // a finite weight can still overflow the totals
    if ![loan_amount, interest_amount, total_melt_value, total_due].iter().all(|v| v.is_finite()) {
        return Err(PawnError::InvalidWeight(weight_grams));
    }

    Ok(LoanQuote {
        karat,
        weight: weight_grams,
        melt_value_per_gram: rate.melt_value_per_gram,
        total_melt_value,
        buy_pawn_price_per_gram: rate.buy_pawn_price_per_gram,
        loan_amount,
        interest_amount,
        total_due,
        due_date: today + Duration::days(LOAN_TERM_DAYS),
    })
}
