pub mod ledger;
pub mod recommendation;
pub mod seed;
pub mod solar_yield;
pub mod streak;
pub mod sustainability;
pub mod weather;
