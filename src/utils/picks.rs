use crate::models::{pick_id, Game, Pick, PickStatus};
use crate::utils::best_price::{find_best_price, BestPrice};
use crate::utils::data::KeyValueStore;
use crate::utils::parlay::{quote_parlay, ParlayQuote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

/// Store key the pick collection is saved under
pub const PICKS_STORAGE_KEY: &str = "myPicks";

/// Build a pick for `team` from a game and the best price found for it
pub fn pick_from_selection(game: &Game, team: &str, best: &BestPrice, now: DateTime<Utc>) -> Option<Pick> {
    let opponent = game.opponent_of(team)?;

    Some(Pick {
        id: pick_id(&game.id, team),
        team: team.to_string(),
        opponent: opponent.to_string(),
        sport: game.sport_title.clone(),
        american_odds: Some(best.american),
        decimal_odds: best.decimal,
        book: best.book_title.clone(),
        date_added: Some(now),
        status: PickStatus::Open,
    })
}

/// The user's picks in insertion order, saved to `store` after every change
pub struct PickBook<S: KeyValueStore> {
    picks: Vec<Pick>,
    store: S,
}

impl<S: KeyValueStore> PickBook<S> {
    /// Rehydrate from the store; missing or unreadable data starts empty
    pub fn load(store: S) -> Self {
        let picks = match store.get(PICKS_STORAGE_KEY) {
            Some(json) => match serde_json::from_str::<Vec<Value>>(&json) {
                Ok(values) => {
                    let picks = decode_picks(values);
                    debug!("Loaded {} saved picks", picks.len());
                    dedup_by_id(picks)
                }
                Err(e) => {
                    warn!("Saved picks are unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Self { picks, store }
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Pick> {
        self.picks.iter().find(|p| p.id == id)
    }

    pub fn is_picked(&self, game_id: &str, team: &str) -> bool {
        self.get(&pick_id(game_id, team)).is_some()
    }

    /// Add a pick; a pick with the same id already present makes this a no-op
    pub fn add(&mut self, pick: Pick) -> bool {
        if self.get(&pick.id).is_some() {
            return false;
        }
        self.picks.push(pick);
        self.persist();
        true
    }

    /// Pick `team` in `game` at the best preferred-book price.
    /// Returns the new pick, or `None` if already picked or no price is available.
    pub fn add_from_game(&mut self, game: &Game, team: &str, now: DateTime<Utc>) -> Option<&Pick> {
        if self.is_picked(&game.id, team) {
            return None;
        }
        let best = find_best_price(game, team)?;
        let pick = pick_from_selection(game, team, &best, now)?;
        let id = pick.id.clone();
        self.add(pick);
        self.get(&id)
    }

    /// Remove an open pick. Locked picks stay.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.picks.len();
        self.picks.retain(|p| p.id != id || p.is_locked());
        let removed = self.picks.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Remove every open pick, returning how many went
    pub fn clear(&mut self) -> usize {
        let before = self.picks.len();
        self.picks.retain(Pick::is_locked);
        let removed = before - self.picks.len();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    /// Lock an open pick so user actions no longer change it
    pub fn lock(&mut self, id: &str) -> bool {
        let Some(pick) = self.picks.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if pick.is_locked() {
            return false;
        }
        pick.status = PickStatus::Locked;
        self.persist();
        true
    }

    pub fn quote(&self, wager: f64) -> ParlayQuote {
        quote_parlay(&self.picks, wager)
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.picks)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(PICKS_STORAGE_KEY, &json));

        if let Err(e) = result {
            warn!("Failed to save picks: {}", e);
        }
    }
}

/// Decode each stored pick on its own, skipping any that are unreadable
pub fn decode_picks(values: Vec<Value>) -> Vec<Pick> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value::<Pick>(value) {
            Ok(pick) => Some(pick),
            Err(e) => {
                warn!("Skipping unreadable pick #{}: {}", i, e);
                None
            }
        })
        .collect()
}

/// Deserialize a pick list, dropping malformed entries instead of failing the list
pub(crate) fn lenient_picks<'de, D>(deserializer: D) -> Result<Vec<Pick>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(decode_picks(Vec::<Value>::deserialize(deserializer)?))
}

fn dedup_by_id(picks: Vec<Pick>) -> Vec<Pick> {
    let mut seen = std::collections::HashSet::new();
    picks
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}
