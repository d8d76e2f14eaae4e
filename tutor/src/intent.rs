use serde::Serialize;

/// What the controller prompt decided the student wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ExplainConcept,
    CheckWork,
    Clarify,
    PracticeProblems,
    General,
}

impl Intent {
    /// Classifies the controller reply by case-insensitive substring match.
    ///
    /// The checks run in a fixed order, so a reply mentioning several labels
    /// resolves to the earliest one in that order.
    pub fn from_controller_reply(reply: &str) -> Self {
        let r = reply.to_lowercase();
        if r.contains("explain concept") {
            Intent::ExplainConcept
        } else if r.contains("check work") {
            Intent::CheckWork
        } else if r.contains("need help/clarification") {
            Intent::Clarify
        } else if r.contains("practice problems") {
            Intent::PracticeProblems
        } else {
            Intent::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_matched_case_insensitively() {
        assert_eq!(Intent::from_controller_reply("EXPLAIN CONCEPT"), Intent::ExplainConcept);
        assert_eq!(Intent::from_controller_reply("Action: Check Work."), Intent::CheckWork);
        assert_eq!(
            Intent::from_controller_reply("need help/clarification"),
            Intent::Clarify
        );
        assert_eq!(
            Intent::from_controller_reply("Generate practice problems"),
            Intent::PracticeProblems
        );
        assert_eq!(Intent::from_controller_reply("Hi there!"), Intent::General);
    }

    #[test]
    fn earlier_label_wins() {
        assert_eq!(
            Intent::from_controller_reply("practice problems, then check work"),
            Intent::CheckWork
        );
    }
}
