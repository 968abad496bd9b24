use crate::models::Game;
use crate::utils::odds::{american_to_decimal, normalize_tagged};
use serde::Serialize;

/// Sportsbooks used for price comparison
pub const PREFERRED_BOOKS: [&str; 3] = ["draftkings", "fanduel", "betmgm"];

/// The most favorable price found for one side of a game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPrice {
    pub team: String,
    pub american: i32,
    pub decimal: Option<f64>,
    pub probability: f64,
    pub book_key: String,
    pub book_title: String,
}

impl BestPrice {
    pub fn format(&self) -> String {
        format!(
            "{} ({:+}) on {} [{:.0}% win chance]",
            self.team, self.american, self.book_title, self.probability
        )
    }
}

/// Best moneyline price for `team` among the preferred books
pub fn find_best_price(game: &Game, team: &str) -> Option<BestPrice> {
    find_best_price_among(game, team, &PREFERRED_BOOKS)
}

/// Best moneyline price for `team` among `books`, in listing order.
/// Ties keep the first book seen.
pub fn find_best_price_among(game: &Game, team: &str, books: &[&str]) -> Option<BestPrice> {
    let mut best: Option<BestPrice> = None;

    for bookmaker in &game.bookmakers {
        if !books.contains(&bookmaker.key.as_str()) {
            continue;
        }

        let Some(outcome) = bookmaker.moneyline().iter().find(|o| o.name == team) else {
            continue;
        };

        let Some(normalized) = normalize_tagged(outcome.price, game.odds_format) else {
            continue;
        };

        if best
            .as_ref()
            .map_or(true, |current| normalized.american > current.american)
        {
            best = Some(BestPrice {
                team: team.to_string(),
                american: normalized.american,
                decimal: american_to_decimal(normalized.american),
                probability: normalized.probability,
                book_key: bookmaker.key.clone(),
                book_title: bookmaker.title.clone(),
            });
        }
    }

    best
}

/// Best prices for both sides of a game, home first
pub fn best_prices_for_game(game: &Game) -> (Option<BestPrice>, Option<BestPrice>) {
    (
        find_best_price(game, &game.home_team),
        find_best_price(game, &game.away_team),
    )
}
