use crate::models::OddsFormat;
use serde::{Deserialize, Serialize};

/// Prices below this magnitude are read as decimal odds when no format is known.
/// Values close to it are ambiguous by construction.
pub const DECIMAL_MAGNITUDE_LIMIT: f64 = 10.0;

/// A price expressed as American odds plus its implied win chance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOdds {
    pub american: i32,
    /// Implied win probability as a percentage (0-100)
    pub probability: f64,
}

/// Convert American odds to decimal odds
/// +150 -> 2.5, -150 -> 1.667. Zero is not a valid quote.
pub fn american_to_decimal(american: i32) -> Option<f64> {
    if american > 0 {
        Some(american as f64 / 100.0 + 1.0)
    } else if american < 0 {
        Some(100.0 / (american as f64).abs() + 1.0)
    } else {
        None
    }
}

/// Convert decimal odds to American odds
/// Anything at or below 1.0 (no payout) is rejected.
pub fn decimal_to_american(decimal: f64) -> Option<i32> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return None;
    }

    if decimal >= 2.0 {
        Some(((decimal - 1.0) * 100.0).round() as i32)
    } else {
        Some(-((100.0 / (decimal - 1.0)).round() as i32))
    }
}

/// Convert American odds to implied probability
/// Positive odds (+150) mean you win $150 on a $100 bet
/// Negative odds (-150) mean you need to bet $150 to win $100
pub fn american_odds_to_probability(odds: i32) -> f64 {
    if odds > 0 {
        // For positive odds: 100 / (odds + 100)
        100.0 / (odds as f64 + 100.0)
    } else {
        // For negative odds: |odds| / (|odds| + 100)
        let abs_odds = (odds as f64).abs();
        abs_odds / (abs_odds + 100.0)
    }
}

/// Normalize a price of unknown format, guessing the format by magnitude
pub fn normalize(price: Option<f64>) -> Option<NormalizedOdds> {
    let price = price.filter(|p| p.is_finite())?;
    if price.abs() < DECIMAL_MAGNITUDE_LIMIT {
        normalize_as(price, OddsFormat::Decimal)
    } else {
        normalize_as(price, OddsFormat::American)
    }
}

/// Normalize a price whose format is known
pub fn normalize_as(price: f64, format: OddsFormat) -> Option<NormalizedOdds> {
    if !price.is_finite() {
        return None;
    }

    match format {
        OddsFormat::Decimal => {
            let american = decimal_to_american(price)?;
            Some(NormalizedOdds {
                american,
                probability: 100.0 / price,
            })
        }
        OddsFormat::American => {
            let american = price.round() as i32;
            if american == 0 {
                return None;
            }
            Some(NormalizedOdds {
                american,
                probability: american_odds_to_probability(american) * 100.0,
            })
        }
    }
}

/// Use the format tag when there is one, otherwise fall back to the magnitude guess
pub fn normalize_tagged(price: Option<f64>, format: Option<OddsFormat>) -> Option<NormalizedOdds> {
    match format {
        Some(format) => normalize_as(price?, format),
        None => normalize(price),
    }
}

/// Decimal value of a price, honoring the format tag when there is one
pub fn to_decimal_tagged(price: Option<f64>, format: Option<OddsFormat>) -> Option<f64> {
    let price = price.filter(|p| p.is_finite())?;
    let format = format.unwrap_or(if price.abs() < DECIMAL_MAGNITUDE_LIMIT {
        OddsFormat::Decimal
    } else {
        OddsFormat::American
    });

    match format {
        OddsFormat::Decimal => Some(price).filter(|d| *d > 1.0),
        OddsFormat::American => american_to_decimal(price.round() as i32),
    }
}

/// Signed display form: +150, -110
pub fn format_american(american: i32) -> String {
    format!("{:+}", american)
}
