pub mod odds_api;

pub use crate::models::Sport;
pub use odds_api::{fetch_games_or_empty, FetchStatus, OddsApiClient, OddsApiError, OddsSource, SportFetch};
