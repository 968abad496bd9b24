pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;
pub mod web;

pub use api::*;
pub use models::*;
pub use utils::*;

use config::Config;
use std::sync::Arc;
use utils::cheat_sheet::CheatSheetService;
use utils::data::FileStore;
use utils::picks::PickBook;
use web::AppState;

/// Upstream client built from the configured key and base URL
pub fn odds_client(config: &Config) -> OddsApiClient {
    OddsApiClient::with_base_url(config.odds_api_key.clone(), &config.odds_api_base_url)
}

/// Cheat sheet service over the live odds API, constructed once at startup
pub fn cheat_sheet_service(config: &Config) -> CheatSheetService {
    CheatSheetService::new(
        Arc::new(odds_client(config)),
        config.cache_ttl,
        config.underdog_threshold,
    )
}

/// Web handler state sharing one upstream client between the cheat sheet and the board
pub fn app_state(config: &Config) -> AppState {
    AppState::new(
        Arc::new(odds_client(config)),
        config.cache_ttl,
        config.underdog_threshold,
    )
}

/// The user's saved picks from the configured directory
pub fn load_picks(config: &Config) -> PickBook<FileStore> {
    PickBook::load(FileStore::new(&config.picks_dir))
}
