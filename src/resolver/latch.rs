use crate::state::Decision;

/// Commit-once holder for a session's backend decision.
///
/// `Pending` moves to `Real` or `Fallback` exactly once. The only later
/// move is `Real -> Fallback` through [`DecisionLatch::demote`], used when
/// the media handle itself fails. `Fallback` is absorbing.
#[derive(Debug, Default)]
pub struct DecisionLatch {
    decision: Decision,
}

impl DecisionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn is_committed(&self) -> bool {
        self.decision != Decision::Pending
    }

    pub fn commit_real(&mut self) -> bool {
        self.commit(Decision::Real)
    }

    pub fn commit_fallback(&mut self) -> bool {
        self.commit(Decision::Fallback)
    }

    pub fn demote(&mut self) -> bool {
        if self.decision == Decision::Fallback {
            return false;
        }
        self.decision = Decision::Fallback;
        true
    }

    fn commit(&mut self, decision: Decision) -> bool {
        if self.is_committed() {
            return false;
        }
        self.decision = decision;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_commit_wins() {
        let mut latch = DecisionLatch::new();
        assert!(latch.commit_fallback());
        assert!(!latch.commit_real());
        assert_eq!(latch.decision(), Decision::Fallback);

        let mut latch = DecisionLatch::new();
        assert!(latch.commit_real());
        assert!(!latch.commit_fallback());
        assert_eq!(latch.decision(), Decision::Real);
    }

    #[test]
    fn demote_moves_real_to_fallback_once() {
        let mut latch = DecisionLatch::new();
        latch.commit_real();
        assert!(latch.demote());
        assert!(!latch.demote());
        assert!(!latch.commit_real());
        assert_eq!(latch.decision(), Decision::Fallback);
    }

    #[test]
    fn demote_from_pending_commits_fallback() {
        let mut latch = DecisionLatch::new();
        assert!(latch.demote());
        assert_eq!(latch.decision(), Decision::Fallback);
    }
}
