use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::LessonId;

/// Persisted learner progress for one track.
///
/// Created empty on first use and only mutated by lesson completions (plus the
/// idle streak reset at session start).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(default)]
    pub completed: BTreeSet<LessonId>,
    #[serde(default)]
    pub xp: u64,
    /// Lessons completed for the first time; feeds the leaderboard bar.
    #[serde(default)]
    pub leaderboard_progress: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_activity: Option<NaiveDate>,
    #[serde(default)]
    pub current_lesson: Option<LessonId>,
}

impl ProgressState {
    pub fn is_completed(&self, id: LessonId) -> bool {
        self.completed.contains(&id)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn daily_goal(&self, target: u32) -> DailyGoal {
        DailyGoal {
            done: self.leaderboard_progress,
            target,
        }
    }
}

/// Completion counter measured against the configured lesson goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyGoal {
    pub done: u32,
    pub target: u32,
}

impl DailyGoal {
    pub fn is_reached(&self) -> bool {
        self.done >= self.target
    }

    /// Whole percent, capped at 100. A zero target counts as reached.
    pub fn percent(&self) -> u32 {
        if self.target == 0 {
            return 100;
        }
        let pct = u64::from(self.done) * 100 / u64::from(self.target);
        pct.min(100) as u32
    }
}
