use crate::config::DEFAULT_ODDS_API_BASE_URL;
use crate::models::{Game, OddsFormat, Sport};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

const REGIONS: &str = "us";
const MARKETS: &str = "h2h"; // h2h = head-to-head (moneyline)

#[derive(Debug, Error)]
pub enum OddsApiError {
    #[error("Odds API rejected the credential ({0})")]
    Unauthorized(StatusCode),
    #[error("Odds API returned error: {0}")]
    Status(StatusCode),
    #[error("Failed to reach The Odds API: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to parse Odds API response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything that can produce a sport's games with odds
#[async_trait]
pub trait OddsSource: Send + Sync {
    async fn fetch_games(&self, sport: Sport, format: OddsFormat) -> Result<Vec<Game>, OddsApiError>;
}

/// Whether a sport's games came back empty because of a failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum FetchStatus {
    Ok,
    Failed(String),
}

/// One sport's fetch result; failures carry an empty game list
#[derive(Debug, Clone)]
pub struct SportFetch {
    pub sport: Sport,
    pub status: FetchStatus,
    pub games: Vec<Game>,
}

impl SportFetch {
    pub fn failed(&self) -> bool {
        matches!(self.status, FetchStatus::Failed(_))
    }
}

/// Fetch a sport's games, degrading any failure to an empty list
pub async fn fetch_games_or_empty(source: &dyn OddsSource, sport: Sport, format: OddsFormat) -> SportFetch {
    match source.fetch_games(sport, format).await {
        Ok(games) => {
            debug!("Fetched {} {} games", games.len(), sport);
            SportFetch {
                sport,
                status: FetchStatus::Ok,
                games,
            }
        }
        Err(e) => {
            warn!("Fetching {} odds failed, using no games: {}", sport, e);
            SportFetch {
                sport,
                status: FetchStatus::Failed(e.to_string()),
                games: Vec::new(),
            }
        }
    }
}

pub struct OddsApiClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OddsApiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_ODDS_API_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn odds_url(&self, sport: Sport) -> String {
        format!("{}/sports/{}/odds", self.base_url, sport.key())
    }

    fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// Check how many API requests you have remaining
    pub async fn check_usage(&self) -> Result<ApiUsage, OddsApiError> {
        let url = format!("{}/sports", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key())])
            .send()
            .await
            .map_err(OddsApiError::Request)?;

        check_status(response.status())?;

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        };

        let usage = ApiUsage {
            remaining: header("x-requests-remaining"),
            used: header("x-requests-used"),
        };
        info!(remaining = ?usage.remaining, used = ?usage.used, "Odds API usage");
        Ok(usage)
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    /// Fetch a sport's moneyline odds, tagging every game with the requested format
    async fn fetch_games(&self, sport: Sport, format: OddsFormat) -> Result<Vec<Game>, OddsApiError> {
        let response = self
            .client
            .get(self.odds_url(sport))
            .query(&[
                ("apiKey", self.api_key()),
                ("regions", REGIONS),
                ("markets", MARKETS),
                ("oddsFormat", format.as_str()),
            ])
            .send()
            .await
            .map_err(OddsApiError::Request)?;

        check_status(response.status())?;

        let mut games: Vec<Game> = response.json().await.map_err(OddsApiError::Decode)?;
        for game in &mut games {
            game.odds_format = Some(format);
        }

        Ok(games)
    }
}

/// Remaining and used request counts reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiUsage {
    pub remaining: Option<u64>,
    pub used: Option<u64>,
}

fn check_status(status: StatusCode) -> Result<(), OddsApiError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(OddsApiError::Unauthorized(status));
    }
    if !status.is_success() {
        return Err(OddsApiError::Status(status));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned games per sport; sports without an entry fail
    #[derive(Default)]
    pub(crate) struct StubSource {
        pub(crate) games: HashMap<Sport, Vec<Game>>,
        pub(crate) calls: AtomicUsize,
    }

    impl StubSource {
        pub(crate) fn with(mut self, sport: Sport, games: Vec<Game>) -> Self {
            self.games.insert(sport, games);
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OddsSource for StubSource {
        async fn fetch_games(&self, sport: Sport, format: OddsFormat) -> Result<Vec<Game>, OddsApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut games = self
                .games
                .get(&sport)
                .cloned()
                .ok_or(OddsApiError::Status(StatusCode::BAD_GATEWAY))?;
            for game in &mut games {
                game.odds_format = Some(format);
            }
            Ok(games)
        }
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED),
            Err(OddsApiError::Unauthorized(_))
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(OddsApiError::Status(StatusCode::TOO_MANY_REQUESTS))
        ));
    }

    #[test]
    fn test_odds_url() {
        let client = OddsApiClient::with_base_url(None, "http://localhost:9999/v4/");
        assert_eq!(
            client.odds_url(Sport::Nhl),
            "http://localhost:9999/v4/sports/icehockey_nhl/odds"
        );
        assert_eq!(client.api_key(), "");
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let source = StubSource::default().with(Sport::Mlb, vec![]);

        let ok = fetch_games_or_empty(&source, Sport::Mlb, OddsFormat::Decimal).await;
        assert_eq!(ok.status, FetchStatus::Ok);
        assert!(!ok.failed());

        let failed = fetch_games_or_empty(&source, Sport::Nba, OddsFormat::Decimal).await;
        assert!(failed.failed());
        assert!(failed.games.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_games() {
        dotenv::dotenv().ok();
        let api_key = std::env::var("ODDS_API_KEY").ok();
        let client = OddsApiClient::new(api_key);

        let games = client
            .fetch_games(Sport::Mlb, OddsFormat::American)
            .await
            .unwrap();
        assert!(games.iter().all(|g| g.odds_format == Some(OddsFormat::American)));
    }

    #[tokio::test]
    #[ignore]
    async fn test_missing_key_is_unauthorized() {
        let client = OddsApiClient::new(None);
        let err = client
            .fetch_games(Sport::Nfl, OddsFormat::Decimal)
            .await
            .unwrap_err();
        assert!(matches!(err, OddsApiError::Unauthorized(_)));
    }
}
