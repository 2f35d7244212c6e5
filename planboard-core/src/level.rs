//! Experience scale shared by engineers (capability) and tasks (complexity).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Beginner = 0,
    AdvancedBeginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::AdvancedBeginner => "advanced-beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
            ExperienceLevel::Expert => "expert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(ExperienceLevel::Beginner < ExperienceLevel::Advanced);
        assert!(ExperienceLevel::Advanced < ExperienceLevel::Expert);
    }
}
