use serde::{Deserialize, Serialize};

/// Proficiency level shown on an evaluation result. `Pending` is reserved
/// for sessions persisted through the legacy custom-field path where no
/// scoring ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreLevel {
    Novice,
    Good,
    Expert,
    Pending,
}

impl ScoreLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreLevel::Novice => "Novice",
            ScoreLevel::Good => "Good",
            ScoreLevel::Expert => "Expert",
            ScoreLevel::Pending => "Pending",
        }
    }
}

/// Level and badge pair assigned from an overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreTier {
    pub level: ScoreLevel,
    pub badge: &'static str,
}

impl ScoreTier {
    /// Band table applied to the overall percentage. The two middle bands
    /// deliberately share the `Good` level while awarding different badges.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self {
                level: ScoreLevel::Expert,
                badge: "Property Master",
            }
        } else if percentage >= 60.0 {
            Self {
                level: ScoreLevel::Good,
                badge: "Property Expert",
            }
        } else if percentage >= 30.0 {
            Self {
                level: ScoreLevel::Good,
                badge: "Property Learner",
            }
        } else {
            Self {
                level: ScoreLevel::Novice,
                badge: "Beginner",
            }
        }
    }
}
