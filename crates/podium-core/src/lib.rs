pub mod awards;
pub mod board;
pub mod error;
pub mod leaderboard;
pub mod memory;
pub mod profile;
pub mod store;
pub mod time;

pub use awards::{AwardCycle, AwardOutcome, CyclePhase, CycleState, calc_prize};
pub use board::{ListPage, RankedBoard, RankedEntry};
pub use error::{RankError, Result};
pub use leaderboard::{Leaderboard, RankedProfileEntry, TopListView, WEEK_AWARDS_KEY};
pub use memory::MemoryRankStore;
pub use profile::{MemoryProfileStore, Profile, ProfileStore};
pub use store::{Order, RankStore, ScoredMember};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::profile::{MemoryProfileStore, Profile};

    /// Insert zero-balance profiles for the given `(id, age)` pairs.
    pub fn seed_profiles(store: &MemoryProfileStore, members: &[(&str, u32)]) {
        for (id, age) in members {
            store.insert(Profile {
                id: (*id).to_string(),
                name: format!("{id} the Great"),
                age: *age,
                balance: 0,
            });
        }
    }
}
