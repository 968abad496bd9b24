use crate::api::odds_api::{fetch_games_or_empty, OddsSource, SportFetch};
use crate::cache::TtlCache;
use crate::models::{Game, OddsFormat, Sport};
use crate::utils::odds::to_decimal_tagged;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

/// Cache key the assembled cheat sheet is stored under
pub const CHEAT_SHEET_CACHE_KEY: &str = "cheatsheet";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub team: String,
    /// Decimal odds
    pub odds: f64,
}

/// A game with at least one underdog price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheatSheetEntry {
    pub sport: String,
    pub matchup: String,
    pub start_time: DateTime<Utc>,
    /// Highest price first
    pub odds: Vec<TeamOdds>,
}

impl CheatSheetEntry {
    pub fn best_price(&self) -> f64 {
        self.odds
            .iter()
            .map(|o| o.odds)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn format(&self) -> String {
        let odds: Vec<String> = self
            .odds
            .iter()
            .map(|o| format!("{} {:.2}", o.team, o.odds))
            .collect();
        format!(
            "[{}] {} | {} | {}",
            self.sport,
            self.matchup,
            self.start_time.format("%a %b %e %H:%M UTC"),
            odds.join(" / ")
        )
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Cheat sheet entry for `game` if its first listed book has a price above `threshold`
pub fn underdog_entry(sport: Sport, game: &Game, threshold: f64) -> Option<CheatSheetEntry> {
    // Only the first book is consulted, preferred or not
    let bookmaker = game.bookmakers.first()?;

    let mut odds: Vec<TeamOdds> = bookmaker
        .moneyline()
        .iter()
        .filter_map(|outcome| {
            Some(TeamOdds {
                team: outcome.name.clone(),
                odds: to_decimal_tagged(outcome.price, game.odds_format)?,
            })
        })
        .collect();

    if !odds.iter().any(|o| o.odds > threshold) {
        return None;
    }

    odds.sort_by(|a, b| descending(a.odds, b.odds));

    Some(CheatSheetEntry {
        sport: sport.label().to_string(),
        matchup: game.matchup(),
        start_time: game.commence_time,
        odds,
    })
}

/// Underdog entries across every fetched sport, biggest best price first
pub fn build_cheat_sheet(fetches: &[SportFetch], threshold: f64) -> Vec<CheatSheetEntry> {
    let mut entries: Vec<CheatSheetEntry> = fetches
        .iter()
        .flat_map(|fetch| {
            fetch
                .games
                .iter()
                .filter_map(move |game| underdog_entry(fetch.sport, game, threshold))
        })
        .collect();

    // Stable, so ties keep sport then upstream order
    entries.sort_by(|a, b| descending(a.best_price(), b.best_price()));
    entries
}

/// Builds the cheat sheet from upstream and serves it from a TTL cache
pub struct CheatSheetService {
    source: Arc<dyn OddsSource>,
    cache: TtlCache<Vec<CheatSheetEntry>>,
    sports: Vec<Sport>,
    threshold: f64,
    refresh: Mutex<()>,
}

impl CheatSheetService {
    pub fn new(source: Arc<dyn OddsSource>, ttl: Duration, threshold: f64) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
            sports: Sport::ALL.to_vec(),
            threshold,
            refresh: Mutex::new(()),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The cached cheat sheet, rebuilt from upstream once the TTL has passed.
    ///
    /// Callers arriving while a rebuild is running wait for it and get its result.
    /// A sheet with some failed sports is served but not cached; if every sport
    /// failed this returns an error.
    pub async fn cheat_sheet(&self) -> Result<Vec<CheatSheetEntry>> {
        if let Some(cached) = self.cache.get(CHEAT_SHEET_CACHE_KEY) {
            info!("Returning cached cheat sheet");
            return Ok(cached);
        }

        let _guard = self.refresh.lock().await;
        if let Some(cached) = self.cache.get(CHEAT_SHEET_CACHE_KEY) {
            return Ok(cached);
        }

        info!("No cached cheat sheet, fetching fresh data");

        let mut fetches = Vec::with_capacity(self.sports.len());
        for &sport in &self.sports {
            fetches.push(fetch_games_or_empty(self.source.as_ref(), sport, OddsFormat::Decimal).await);
        }

        let failed: Vec<&SportFetch> = fetches.iter().filter(|f| f.failed()).collect();
        if !fetches.is_empty() && failed.len() == fetches.len() {
            anyhow::bail!("Error fetching odds: every sport failed");
        }

        let entries = build_cheat_sheet(&fetches, self.threshold);

        if failed.is_empty() {
            self.cache.set(CHEAT_SHEET_CACHE_KEY, entries.clone());
            info!("Fetched and cached {} cheat sheet games", entries.len());
        } else {
            let names: Vec<&str> = failed.iter().map(|f| f.sport.label()).collect();
            info!(
                "Serving partial cheat sheet without caching, failed: {}",
                names.join(", ")
            );
        }

        Ok(entries)
    }
}
