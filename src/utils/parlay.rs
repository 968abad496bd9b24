use crate::models::Pick;
use crate::utils::odds::decimal_to_american;
use serde::{Deserialize, Serialize};

/// Placeholder shown wherever a figure has no value
pub const NO_VALUE: &str = "–";

/// Combined line for a set of picks and a wager.
/// Figures are kept at full precision, round only for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlayQuote {
    /// Picks in the parlay
    pub legs: usize,
    /// Picks whose decimal odds were usable
    pub counted_legs: usize,
    pub wager: f64,
    pub combined_decimal: Option<f64>,
    pub combined_american: Option<i32>,
    pub payout: Option<f64>,
    pub profit: Option<f64>,
}

impl ParlayQuote {
    /// "3.00 (Dec), +200 (US)"
    pub fn format_odds(&self) -> String {
        match (self.combined_decimal, self.combined_american) {
            (Some(decimal), Some(american)) => {
                format!("{:.2} (Dec), {:+} (US)", decimal, american)
            }
            _ => NO_VALUE.to_string(),
        }
    }

    pub fn format(&self) -> String {
        format!(
            "Total Picks: {} | Combined Odds: {} | Estimated Payout: {} | Profit: {}",
            self.legs,
            self.format_odds(),
            format_money(self.payout),
            format_money(self.profit)
        )
    }
}

/// Usable decimal odds: a finite multiplier above 1
fn valid_decimal(decimal: Option<f64>) -> Option<f64> {
    decimal.filter(|d| d.is_finite() && *d > 1.0)
}

/// Product of every usable leg, `None` when no leg is usable
pub fn combined_decimal_odds<I>(decimals: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    decimals
        .into_iter()
        .filter_map(valid_decimal)
        .fold(None, |acc, d| Some(acc.unwrap_or(1.0) * d))
}

/// Quote a parlay over `picks` for `wager`.
/// Bad legs are skipped; a bad wager only blanks payout and profit.
pub fn quote_parlay(picks: &[Pick], wager: f64) -> ParlayQuote {
    let counted_legs = picks
        .iter()
        .filter(|pick| valid_decimal(pick.decimal_odds).is_some())
        .count();

    let combined_decimal = combined_decimal_odds(picks.iter().map(|pick| pick.decimal_odds));
    let combined_american = combined_decimal.and_then(decimal_to_american);

    let wager_ok = wager.is_finite() && wager > 0.0;
    let payout = combined_decimal.filter(|_| wager_ok).map(|d| wager * d);
    let profit = payout.map(|p| p - wager);

    ParlayQuote {
        legs: picks.len(),
        counted_legs,
        wager,
        combined_decimal,
        combined_american,
        payout,
        profit,
    }
}

/// Round a monetary figure to cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// "$30.00", or the no-value placeholder
pub fn format_money(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("${:.2}", round_cents(v)),
        None => NO_VALUE.to_string(),
    }
}
