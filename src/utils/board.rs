use crate::api::odds_api::{FetchStatus, SportFetch};
use crate::models::{Game, Sport};
use crate::utils::best_price::{find_best_price, BestPrice, PREFERRED_BOOKS};
use crate::utils::odds::{normalize_tagged, NormalizedOdds};
use crate::utils::schedule::{filter_schedule, ScheduleWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Preferred books listed per game
pub const MAX_BOOK_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeLine {
    pub team: String,
    pub odds: NormalizedOdds,
    /// This book has the best price for the team
    pub is_best: bool,
}

impl OutcomeLine {
    pub fn format(&self) -> String {
        let best = if self.is_best { " Best" } else { "" };
        format!(
            "{} {:+} ({:.0}%){}",
            self.team, self.odds.american, self.odds.probability, best
        )
    }
}

/// One preferred book's moneyline for a game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookLine {
    pub book_key: String,
    pub book_title: String,
    pub outcomes: Vec<OutcomeLine>,
}

/// Moneyline of the first few preferred books, in listing order.
/// Outcomes without a usable price are left out.
pub fn book_lines(game: &Game) -> Vec<BookLine> {
    game.bookmakers
        .iter()
        .filter(|b| PREFERRED_BOOKS.contains(&b.key.as_str()))
        .take(MAX_BOOK_LINES)
        .map(|bookmaker| {
            let outcomes = bookmaker
                .moneyline()
                .iter()
                .filter_map(|outcome| {
                    let odds = normalize_tagged(outcome.price, game.odds_format)?;
                    let is_best = find_best_price(game, &outcome.name)
                        .is_some_and(|best| best.book_key == bookmaker.key);
                    Some(OutcomeLine {
                        team: outcome.name.clone(),
                        odds,
                        is_best,
                    })
                })
                .collect();

            BookLine {
                book_key: bookmaker.key.clone(),
                book_title: bookmaker.title.clone(),
                outcomes,
            }
        })
        .collect()
}

/// A game on the board with the best price for each side
#[derive(Debug, Clone, Serialize)]
pub struct GameRow {
    pub game: Game,
    pub home: Option<BestPrice>,
    pub away: Option<BestPrice>,
    pub books: Vec<BookLine>,
}

impl GameRow {
    pub fn new(game: Game) -> Self {
        let home = find_best_price(&game, &game.home_team);
        let away = find_best_price(&game, &game.away_team);
        let books = book_lines(&game);
        Self {
            game,
            home,
            away,
            books,
        }
    }

    pub fn format(&self) -> String {
        let side = |team: &str, price: &Option<BestPrice>| match price {
            Some(p) => format!("{} {:+} ({})", team, p.american, p.book_title),
            None => format!("{} (no price)", team),
        };
        format!(
            "{} | {} | {} vs {}",
            self.game.commence_time.format("%a %b %e %H:%M UTC"),
            self.game.id,
            side(&self.game.home_team, &self.home),
            side(&self.game.away_team, &self.away)
        )
    }
}

/// Schedule-filtered games for `sport` with best prices attached
pub fn game_rows(games: &[Game], sport: Sport, now: DateTime<Utc>) -> Vec<GameRow> {
    filter_schedule(games, ScheduleWindow::for_sport(sport), now)
        .into_iter()
        .map(GameRow::new)
        .collect()
}

/// Identifies the selection a fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub sport: Sport,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardState {
    Loading,
    Ready,
    Failed(String),
}

/// The currently selected sport and its games.
/// Results for a superseded selection are dropped.
#[derive(Debug)]
pub struct GameBoard {
    sport: Sport,
    generation: u64,
    state: BoardState,
    games: Vec<Game>,
}

impl GameBoard {
    pub fn new(sport: Sport) -> (Self, FetchTicket) {
        let board = Self {
            sport,
            generation: 0,
            state: BoardState::Loading,
            games: Vec::new(),
        };
        let ticket = board.ticket();
        (board, ticket)
    }

    fn ticket(&self) -> FetchTicket {
        FetchTicket {
            sport: self.sport,
            generation: self.generation,
        }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Switch sports; the returned ticket must accompany the fetch result
    pub fn select(&mut self, sport: Sport) -> FetchTicket {
        self.sport = sport;
        self.generation += 1;
        self.state = BoardState::Loading;
        self.games.clear();
        self.ticket()
    }

    /// Take a fetch result, unless a newer selection has been made since
    pub fn accept(&mut self, ticket: FetchTicket, fetch: SportFetch) -> bool {
        if ticket != self.ticket() || fetch.sport != self.sport {
            debug!("Dropping stale {} games", fetch.sport);
            return false;
        }

        self.state = match fetch.status {
            FetchStatus::Ok => BoardState::Ready,
            FetchStatus::Failed(reason) => BoardState::Failed(reason),
        };
        self.games = fetch.games;
        true
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn rows(&self, now: DateTime<Utc>) -> Vec<GameRow> {
        game_rows(&self.games, self.sport, now)
    }
}
