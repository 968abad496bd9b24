use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market key for moneyline (head-to-head) odds
pub const MONEYLINE_MARKET: &str = "h2h";

/// Sports the dashboard and cheat sheet know about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    Mlb,
    Nba,
    Nfl,
    CollegeFootball,
    Nhl,
}

impl Sport {
    /// Every sport covered by the cheat sheet, in fetch order
    pub const ALL: [Sport; 5] = [
        Sport::Mlb,
        Sport::Nba,
        Sport::Nfl,
        Sport::CollegeFootball,
        Sport::Nhl,
    ];

    /// Sports offered on the game board
    pub const BOARD: [Sport; 4] = [Sport::Mlb, Sport::Nba, Sport::Nfl, Sport::Nhl];

    /// The Odds API sport key
    pub fn key(&self) -> &'static str {
        match self {
            Sport::Mlb => "baseball_mlb",
            Sport::Nba => "basketball_nba",
            Sport::Nfl => "americanfootball_nfl",
            Sport::CollegeFootball => "americanfootball_ncaaf",
            Sport::Nhl => "icehockey_nhl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sport::Mlb => "MLB",
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::CollegeFootball => "College Football",
            Sport::Nhl => "NHL",
        }
    }

    pub fn from_key(key: &str) -> Option<Sport> {
        Sport::ALL.into_iter().find(|sport| sport.key() == key)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sport {
    type Err = String;

    /// Accepts either the API key (`baseball_mlb`) or a short name (`mlb`, `ncaaf`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(sport) = Sport::from_key(s) {
            return Ok(sport);
        }
        match s.to_ascii_lowercase().as_str() {
            "mlb" => Ok(Sport::Mlb),
            "nba" => Ok(Sport::Nba),
            "nfl" => Ok(Sport::Nfl),
            "ncaaf" | "cfb" => Ok(Sport::CollegeFootball),
            "nhl" => Ok(Sport::Nhl),
            other => Err(format!("unknown sport: {}", other)),
        }
    }
}

/// Format the upstream was asked to quote prices in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    American,
    Decimal,
}

impl OddsFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsFormat::American => "american",
            OddsFormat::Decimal => "decimal",
        }
    }
}

/// A single team's price in one book's market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

/// One sportsbook's listing for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<Market>,
}

impl Bookmaker {
    /// Outcomes of this book's moneyline market, empty when it has none
    pub fn moneyline(&self) -> &[Outcome] {
        self.markets
            .iter()
            .find(|m| m.key == MONEYLINE_MARKET)
            .map(|m| m.outcomes.as_slice())
            .unwrap_or(&[])
    }
}

/// A game with every book's listing, as returned by The Odds API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub sport_key: String,
    #[serde(default)]
    pub sport_title: String,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
    /// Set by the fetch boundary from the requested `oddsFormat`
    #[serde(default, skip_deserializing)]
    pub odds_format: Option<OddsFormat>,
}

impl Game {
    /// The other side of the matchup, or `None` if `team` isn't playing
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if team == self.home_team {
            Some(&self.away_team)
        } else if team == self.away_team {
            Some(&self.home_team)
        } else {
            None
        }
    }

    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    #[default]
    Open,
    /// Pending a result; user actions no longer change it
    Locked,
}

/// A user's selected outcome with its price frozen at pick time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub id: String,
    pub team: String,
    pub opponent: String,
    pub sport: String,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub american_odds: Option<i32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub decimal_odds: Option<f64>,
    #[serde(default)]
    pub book: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: PickStatus,
}

impl Pick {
    pub fn is_locked(&self) -> bool {
        self.status == PickStatus::Locked
    }
}

/// Composite pick identifier, unique per game and side
pub fn pick_id(game_id: &str, team: &str) -> String {
    format!("{}-{}", game_id, team)
}

/// Accepts numbers and numeric strings, anything else becomes `None`
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Whole American odds from a number or numeric string, rounding fractions
fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && v.abs() <= i32::MAX as f64)
        .map(|v| v.round() as i32))
}

/// Older stores wrote a locale string here, which is dropped
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s.parse::<DateTime<Utc>>().ok(),
        _ => None,
    })
}
