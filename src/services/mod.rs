pub mod blend;
pub mod dedup;
pub mod offline;
pub mod online;
pub mod providers;
pub mod recommendations;

pub use offline::OfflineStore;
pub use online::OnlineAggregator;
pub use recommendations::RecommendationService;
