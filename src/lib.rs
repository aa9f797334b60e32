pub mod app;
pub mod cache;
pub mod categories;
pub mod config;
pub mod dates;
pub mod errors;
pub mod goals;
pub mod handlers;
pub mod heatmap;
pub mod identity;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use heatmap::{build_daily_grid, DailyGrid, HeatmapCell, MonthLabel};
pub use state::AppState;
pub use storage::load_data;
