use crate::api::odds_api::{fetch_games_or_empty, FetchStatus, OddsSource};
use crate::cache::TtlCache;
use crate::models::{Game, OddsFormat, Pick, Sport};
use crate::utils::board::{game_rows, GameRow};
use crate::utils::cheat_sheet::{CheatSheetEntry, CheatSheetService};
use crate::utils::parlay::quote_parlay;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::error;

// Custom filters for formatting
mod filters {
    use chrono::{DateTime, Utc};

    pub fn decimal(value: &f64) -> ::askama::Result<String> {
        Ok(format!("{:.2}", value))
    }

    pub fn kickoff(dt: &DateTime<Utc>) -> ::askama::Result<String> {
        Ok(dt.format("%a %b %e, %H:%M UTC").to_string())
    }
}

#[derive(Template)]
#[template(path = "cheatsheet.html")]
struct CheatSheetTemplate {
    active_page: String,
    threshold: f64,
    entries: Vec<CheatSheetEntry>,
    has_error: bool,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Shared handler state, built once at startup
pub struct AppState {
    pub cheat_sheet: CheatSheetService,
    pub source: Arc<dyn OddsSource>,
    /// Per-sport game lists for the board
    pub games: TtlCache<Vec<Game>>,
}

impl AppState {
    pub fn new(source: Arc<dyn OddsSource>, ttl: Duration, underdog_threshold: f64) -> Self {
        Self {
            cheat_sheet: CheatSheetService::new(source.clone(), ttl, underdog_threshold),
            source,
            games: TtlCache::new(ttl),
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/cheatsheet", get(cheat_sheet))
        .route("/games/:sport", get(games))
        .route("/parlay", post(parlay))
        .with_state(state)
}

async fn cheat_sheet(State(state): State<SharedState>) -> Response {
    match state.cheat_sheet.cheat_sheet().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            error!("API Error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching odds").into_response()
        }
    }
}

async fn home(State(state): State<SharedState>) -> Response {
    let (entries, has_error) = match state.cheat_sheet.cheat_sheet().await {
        Ok(entries) => (entries, false),
        Err(e) => {
            error!("API Error: {:#}", e);
            (Vec::new(), true)
        }
    };

    let template = CheatSheetTemplate {
        active_page: "cheatsheet".to_string(),
        threshold: state.cheat_sheet.threshold(),
        entries,
        has_error,
    };

    let status = if has_error {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, HtmlTemplate(template)).into_response()
}

#[derive(Debug, Serialize)]
struct GamesResponse {
    sport: String,
    status: FetchStatus,
    games: Vec<GameRow>,
}

async fn games(State(state): State<SharedState>, Path(sport): Path<String>) -> Response {
    let Ok(sport) = sport.parse::<Sport>() else {
        return (StatusCode::NOT_FOUND, format!("Unknown sport: {}", sport)).into_response();
    };

    let (status, games) = match state.games.get(sport.key()) {
        Some(games) => (FetchStatus::Ok, games),
        None => {
            let fetch = fetch_games_or_empty(state.source.as_ref(), sport, OddsFormat::American).await;
            if !fetch.failed() {
                state.games.set(sport.key(), fetch.games.clone());
            }
            (fetch.status, fetch.games)
        }
    };

    Json(GamesResponse {
        sport: sport.label().to_string(),
        status,
        games: game_rows(&games, sport, Utc::now()),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ParlayRequest {
    #[serde(default, deserialize_with = "crate::utils::picks::lenient_picks")]
    picks: Vec<Pick>,
    #[serde(default, deserialize_with = "crate::models::lenient_f64")]
    wager: Option<f64>,
}

async fn parlay(Json(request): Json<ParlayRequest>) -> Response {
    let quote = quote_parlay(&request.picks, request.wager.unwrap_or(f64::NAN));
    Json(quote).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::odds_api::tests::StubSource;
    use crate::utils::best_price::tests::{book, game};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(source: StubSource) -> Router {
        let state = Arc::new(AppState::new(Arc::new(source), Duration::from_secs(300), 2.5));
        router(state)
    }

    fn underdog_source() -> StubSource {
        let nhl = game(
            "nhl1",
            vec![book("fanduel", "FanDuel", &[("Home", Some(1.3)), ("Away", Some(4.1))])],
        );
        StubSource::default()
            .with(Sport::Mlb, vec![])
            .with(Sport::Nba, vec![])
            .with(Sport::Nfl, vec![])
            .with(Sport::CollegeFootball, vec![])
            .with(Sport::Nhl, vec![nhl])
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_cheatsheet_returns_json() {
        let response = app(underdog_source())
            .oneshot(Request::builder().uri("/cheatsheet").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let entries: Vec<CheatSheetEntry> = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].matchup, "Away @ Home");
        assert_eq!(entries[0].odds[0].odds, 4.1);
    }

    #[tokio::test]
    async fn test_cheatsheet_upstream_failure_is_server_error() {
        let response = app(StubSource::default())
            .oneshot(Request::builder().uri("/cheatsheet").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "Error fetching odds");
    }

    #[tokio::test]
    async fn test_home_renders_cheat_sheet() {
        let response = app(underdog_source())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Away @ Home"));
        assert!(html.contains("4.10"));
    }

    #[tokio::test]
    async fn test_unknown_sport_is_not_found() {
        let response = app(underdog_source())
            .oneshot(Request::builder().uri("/games/cricket").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_games_reports_failed_fetch() {
        let response = app(StubSource::default())
            .oneshot(Request::builder().uri("/games/nba").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["status"]["status"], "failed");
        assert_eq!(body["games"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_parlay_quote() {
        let body = r#"{
            "wager": "10",
            "picks": [
                {"id":"g1-A","team":"A","opponent":"B","sport":"MLB","americanOdds":100,"decimalOdds":2.0},
                {"id":"g2-C","team":"C","opponent":"D","sport":"MLB","americanOdds":-200,"decimalOdds":1.5},
                {"id":"g3-E","team":"E","opponent":"F","sport":"MLB","americanOdds":null,"decimalOdds":"oops"},
                {"id":"g4-G","sport":"MLB"}
            ]
        }"#;
        let response = app(StubSource::default())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/parlay")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let quote: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(quote["combined_american"], 200);
        // the unpriced leg is kept but not counted, the malformed one is dropped
        assert_eq!(quote["legs"], 3);
        assert_eq!(quote["counted_legs"], 2);
        assert!((quote["payout"].as_f64().unwrap() - 30.0).abs() < 1e-9);
    }
}
