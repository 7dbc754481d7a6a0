use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use podium_core::{
    AwardCycle, CycleState, Leaderboard, MemoryProfileStore, MemoryRankStore, Result,
};

use crate::config::ServerConfig;

pub type SharedCycle = Arc<RwLock<CycleState>>;
pub type SharedAward = Arc<Mutex<AwardCycle>>;

#[derive(Clone)]
pub struct AppState {
    pub leaderboard: Arc<Leaderboard<MemoryRankStore, MemoryProfileStore>>,
    pub profiles: Arc<MemoryProfileStore>,
    pub cycle: SharedCycle,
    pub award: SharedAward,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the board against the in-memory substrate, which includes
    /// script registration and the initial snapshot rotation.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let store = Arc::new(MemoryRankStore::new());
        let profiles = Arc::new(MemoryProfileStore::new());
        let leaderboard = Leaderboard::create(
            store,
            config.board.name.clone(),
            Arc::clone(&profiles),
            Utc::now(),
        )
        .await?;
        Ok(Self {
            leaderboard: Arc::new(leaderboard),
            profiles,
            cycle: Arc::new(RwLock::new(CycleState::new())),
            award: Arc::new(Mutex::new(AwardCycle::new())),
            config: Arc::new(config),
        })
    }
}
