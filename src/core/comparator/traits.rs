//! Trait definitions for match policies.

use super::matrix::PairDistance;

/// Decides whether two fingerprint pairs are close enough to be duplicates
pub trait MatchPolicy: Send + Sync {
    /// Whether a pair at these distances belongs in the same group
    fn is_match(&self, distance: PairDistance) -> bool;

    /// Get the threshold used
    fn threshold(&self) -> u32;

    /// Human-readable description of the policy
    fn description(&self) -> String;
}

/// Threshold on the Hamming distance of both hash families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    /// Maximum distance (inclusive) to consider as duplicate
    threshold: u32,
    /// Require both families within threshold, rather than either
    require_both_hashes: bool,
}

impl ThresholdPolicy {
    /// Default similarity threshold for 64-bit codes
    pub const DEFAULT_THRESHOLD: u32 = 10;

    pub fn new(threshold: u32, require_both_hashes: bool) -> Self {
        Self {
            threshold,
            require_both_hashes,
        }
    }
}

impl MatchPolicy for ThresholdPolicy {
    fn is_match(&self, distance: PairDistance) -> bool {
        let primary = distance.primary <= self.threshold;
        let secondary = distance
            .secondary
            .is_some_and(|d| d <= self.threshold);

        if self.require_both_hashes {
            primary && secondary
        } else {
            primary || secondary
        }
    }

    fn threshold(&self) -> u32 {
        self.threshold
    }

    fn description(&self) -> String {
        let rule = if self.require_both_hashes { "both" } else { "either" };
        format!(
            "Threshold policy: photos whose {} hash distances are <= {} are duplicates",
            rule, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> ThresholdPolicy {
        ThresholdPolicy::new(ThresholdPolicy::DEFAULT_THRESHOLD, true)
    }

    fn either() -> ThresholdPolicy {
        ThresholdPolicy::new(ThresholdPolicy::DEFAULT_THRESHOLD, false)
    }

    fn pair(primary: u32, secondary: u32) -> PairDistance {
        PairDistance {
            primary,
            secondary: Some(secondary),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let policy = ThresholdPolicy::new(5, true);

        assert!(policy.is_match(pair(4, 4)));
        assert!(policy.is_match(pair(5, 5)));
        assert!(!policy.is_match(pair(6, 5)));
    }

    #[test]
    fn both_rule_requires_both() {
        let policy = both();
        assert!(!policy.is_match(pair(3, 40)));
        assert!(!policy.is_match(pair(40, 3)));
        assert!(policy.is_match(pair(3, 3)));
    }

    #[test]
    fn either_rule_accepts_either() {
        let policy = either();
        assert!(policy.is_match(pair(3, 40)));
        assert!(policy.is_match(pair(40, 3)));
        assert!(!policy.is_match(pair(40, 40)));
    }

    #[test]
    fn missing_secondary_never_satisfies_both_rule() {
        let distance = PairDistance {
            primary: 0,
            secondary: None,
        };
        assert!(!both().is_match(distance));
        assert!(either().is_match(distance));
    }

    #[test]
    fn description_includes_threshold() {
        let desc = ThresholdPolicy::new(7, false).description();
        assert!(desc.contains('7'));
        assert!(desc.contains("either"));
    }
}
