pub mod best_price;
pub mod board;
pub mod cheat_sheet;
pub mod data;
pub mod odds;
pub mod parlay;
pub mod picks;
pub mod schedule;
