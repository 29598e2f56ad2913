pub mod db;
pub mod race;

pub use db::TestDb;
pub use race::{BarrierWindow, run_concurrently};
