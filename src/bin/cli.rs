use anyhow::{bail, Context, Result};
use betting_tracker::api::odds_api::{fetch_games_or_empty, OddsSource};
use betting_tracker::board::{BoardState, GameBoard};
use betting_tracker::config::Config;
use betting_tracker::data::{save_cheat_sheet_to_csv, save_json};
use betting_tracker::models::{OddsFormat, Pick, Sport};
use betting_tracker::odds::format_american;
use betting_tracker::parlay::{format_money, NO_VALUE};
use betting_tracker::{cheat_sheet_service, load_picks, odds_client};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cli", about = "Moneyline odds, underdogs and parlay picks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Underdog games across every sport
    Cheatsheet {
        /// Also write the sheet to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Upcoming games for a sport with the best price per side
    Games {
        sport: Sport,
        /// Also write the raw games to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Manage saved picks
    Picks {
        #[command(subcommand)]
        action: PicksAction,
    },
    /// Quote a parlay over the saved picks
    Parlay {
        #[arg(long)]
        wager: f64,
    },
    /// Remaining Odds API requests
    Usage,
}

#[derive(Subcommand)]
enum PicksAction {
    List,
    /// Pick a team at the best preferred-book price
    Add {
        #[arg(long)]
        sport: Sport,
        /// Game id as shown by `games`
        #[arg(long)]
        game: String,
        #[arg(long)]
        team: String,
    },
    Remove {
        id: String,
    },
    /// Remove every open pick
    Clear,
    Lock {
        id: String,
    },
}

fn format_pick(pick: &Pick) -> String {
    let decimal = pick
        .decimal_odds
        .map(|d| format!("{:.2}", d))
        .unwrap_or_else(|| NO_VALUE.to_string());
    let locked = if pick.is_locked() { " [locked]" } else { "" };
    format!(
        "{} vs {} ({}) | {} / {} @ {} | id: {}{}",
        pick.team,
        pick.opponent,
        pick.sport,
        pick.american_odds
            .map(format_american)
            .unwrap_or_else(|| NO_VALUE.to_string()),
        decimal,
        pick.book,
        pick.id,
        locked
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Cheatsheet { csv } => {
            println!("Underdog Cheat Sheet (decimal > {:.2})\n", config.underdog_threshold);
            let entries = cheat_sheet_service(&config)
                .cheat_sheet()
                .await
                .context("Failed to build cheat sheet")?;

            if entries.is_empty() {
                println!("No underdog games found.");
            } else {
                for (i, entry) in entries.iter().enumerate() {
                    println!("{}. {}", i + 1, entry.format());
                }
            }

            if let Some(path) = csv {
                save_cheat_sheet_to_csv(&entries, &path)?;
                println!("\nSaved cheat sheet to {}", path.display());
            }
        }
        Command::Games { sport, json } => {
            let client = odds_client(&config);
            let (mut board, ticket) = GameBoard::new(sport);
            let fetch = fetch_games_or_empty(&client, sport, OddsFormat::American).await;
            board.accept(ticket, fetch);

            if let BoardState::Failed(reason) = board.state() {
                bail!("Failed to fetch {} odds: {}", sport, reason);
            }

            let rows = board.rows(Utc::now());
            println!("{} GAMES\n", sport.label());
            if rows.is_empty() {
                println!("No upcoming {} games.", sport);
            } else {
                for (i, row) in rows.iter().enumerate() {
                    println!("{}. {}", i + 1, row.format());
                    for line in &row.books {
                        let outcomes: Vec<String> = line.outcomes.iter().map(|o| o.format()).collect();
                        println!("     {}: {}", line.book_title, outcomes.join(" | "));
                    }
                }
            }

            if let Some(path) = json {
                save_json(board.games(), &path)?;
                println!("\nSaved {} games to {}", board.games().len(), path.display());
            }
        }
        Command::Picks { action } => {
            let mut picks = load_picks(&config);
            match action {
                PicksAction::List => {
                    if picks.is_empty() {
                        println!("No picks saved.");
                    }
                    for (i, pick) in picks.picks().iter().enumerate() {
                        println!("{}. {}", i + 1, format_pick(pick));
                    }
                }
                PicksAction::Add { sport, game, team } => {
                    let client = odds_client(&config);
                    let games = client
                        .fetch_games(sport, OddsFormat::American)
                        .await
                        .with_context(|| format!("Failed to fetch {} odds", sport))?;
                    let Some(found) = games.iter().find(|g| g.id == game) else {
                        bail!("No {} game with id {}", sport, game);
                    };

                    match picks.add_from_game(found, &team, Utc::now()) {
                        Some(pick) => println!("Added {}", format_pick(pick)),
                        None => println!(
                            "Nothing added: {} is already picked or has no preferred-book price",
                            team
                        ),
                    }
                }
                PicksAction::Remove { id } => {
                    if picks.remove(&id) {
                        println!("Removed {}", id);
                    } else {
                        println!("No open pick {}", id);
                    }
                }
                PicksAction::Clear => {
                    let removed = picks.clear();
                    println!("Removed {} picks, {} locked picks kept", removed, picks.len());
                }
                PicksAction::Lock { id } => {
                    if picks.lock(&id) {
                        println!("Locked {}", id);
                    } else {
                        println!("No open pick {}", id);
                    }
                }
            }
        }
        Command::Parlay { wager } => {
            let picks = load_picks(&config);
            let quote = picks.quote(wager);
            println!("{}", quote.format());
            if quote.counted_legs < quote.legs {
                println!(
                    "{} picks had no usable decimal odds and were left out",
                    quote.legs - quote.counted_legs
                );
            }
            println!("Wager: {}", format_money(Some(wager)));
        }
        Command::Usage => {
            let usage = odds_client(&config).check_usage().await?;
            let show = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "unknown".to_string());
            println!("Requests remaining: {}", show(usage.remaining));
            println!("Requests used: {}", show(usage.used));
        }
    }

    Ok(())
}

