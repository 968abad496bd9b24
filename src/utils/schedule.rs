use crate::models::{Game, Sport};
use chrono::{DateTime, Duration, Utc};

/// How far around "now" a sport's games stay on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleWindow {
    /// Daily sports: started up to 6 hours ago through the next 2 days
    FastTurnover,
    /// Weekly sports: not yet started, within the next 7 days
    LongLead,
    /// Keep everything
    Unbounded,
}

impl ScheduleWindow {
    pub fn for_sport(sport: Sport) -> Self {
        match sport {
            Sport::Mlb | Sport::Nba | Sport::Nhl => ScheduleWindow::FastTurnover,
            Sport::Nfl | Sport::CollegeFootball => ScheduleWindow::LongLead,
        }
    }

    /// Unknown sport keys get no window
    pub fn from_sport_key(key: &str) -> Self {
        Sport::from_key(key)
            .map(Self::for_sport)
            .unwrap_or(ScheduleWindow::Unbounded)
    }

    /// Inclusive `[start, end]` bounds, `None` when unbounded
    pub fn bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            ScheduleWindow::FastTurnover => {
                Some((now - Duration::hours(6), now + Duration::days(2)))
            }
            ScheduleWindow::LongLead => Some((now, now + Duration::days(7))),
            ScheduleWindow::Unbounded => None,
        }
    }

    pub fn contains(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.bounds(now) {
            Some((from, to)) => start >= from && start <= to,
            None => true,
        }
    }
}

/// Games inside `window`, earliest first
pub fn filter_schedule(games: &[Game], window: ScheduleWindow, now: DateTime<Utc>) -> Vec<Game> {
    let mut upcoming: Vec<Game> = games
        .iter()
        .filter(|game| window.contains(game.commence_time, now))
        .cloned()
        .collect();

    upcoming.sort_by_key(|game| game.commence_time);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::best_price::tests::game;
    use chrono::TimeZone;

    fn game_at(id: &str, start: DateTime<Utc>) -> Game {
        let mut game = game(id, vec![]);
        game.commence_time = start;
        game
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_fast_turnover_window() {
        let now = now();
        let games = vec![
            game_at("in_three_days", now + Duration::days(3)),
            game_at("eight_hours_ago", now - Duration::hours(8)),
            game_at("tomorrow", now + Duration::days(1)),
            game_at("five_hours_ago", now - Duration::hours(5)),
        ];

        let kept = filter_schedule(&games, ScheduleWindow::for_sport(Sport::Mlb), now);
        let ids: Vec<&str> = kept.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["five_hours_ago", "tomorrow"]);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let now = now();
        let window = ScheduleWindow::FastTurnover;
        assert!(window.contains(now - Duration::hours(6), now));
        assert!(window.contains(now + Duration::days(2), now));
        assert!(!window.contains(now + Duration::days(2) + Duration::seconds(1), now));
    }

    #[test]
    fn test_long_lead_window() {
        let now = now();
        let games = vec![
            game_at("next_week", now + Duration::days(8)),
            game_at("sunday", now + Duration::days(4)),
            game_at("started", now - Duration::minutes(1)),
            game_at("kickoff_now", now),
        ];

        let kept = filter_schedule(&games, ScheduleWindow::from_sport_key("americanfootball_nfl"), now);
        let ids: Vec<&str> = kept.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["kickoff_now", "sunday"]);
    }

    #[test]
    fn test_unknown_sport_keeps_everything_sorted() {
        let now = now();
        let games = vec![
            game_at("later", now + Duration::days(30)),
            game_at("earlier", now - Duration::days(30)),
        ];

        let window = ScheduleWindow::from_sport_key("soccer_epl");
        assert_eq!(window, ScheduleWindow::Unbounded);
        let kept = filter_schedule(&games, window, now);
        let ids: Vec<&str> = kept.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["earlier", "later"]);
    }
}
