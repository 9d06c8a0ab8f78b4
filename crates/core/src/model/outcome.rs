use serde::{Deserialize, Serialize};

/// Qualitative bucket for a finished quiz, derived from the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    NeedsWork,
}

impl Tier {
    /// Classify a final score against the total number of questions.
    ///
    /// Thresholds: `Excellent` at 90%, `Good` at 70%, `Fair` at 50%,
    /// `NeedsWork` below that. The percentage is rounded half-up.
    #[must_use]
    pub fn classify(score: u32, total: u32) -> Self {
        Self::from_percentage(percentage(score, total))
    }

    #[must_use]
    pub fn from_percentage(pct: u8) -> Self {
        match pct {
            90..=u8::MAX => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::NeedsWork,
        }
    }
}

/// Rounded percentage of `score` over `total`.
///
/// A zero `total` yields 0 rather than dividing by zero; sessions guarantee a
/// non-empty question list before any score exists.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (200 * u64::from(score) + u64::from(total)) / (2 * u64::from(total));
    u8::try_from(pct.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(0, 5), 0);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn percentage_tolerates_zero_total() {
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(Tier::from_percentage(100), Tier::Excellent);
        assert_eq!(Tier::from_percentage(90), Tier::Excellent);
        assert_eq!(Tier::from_percentage(89), Tier::Good);
        assert_eq!(Tier::from_percentage(70), Tier::Good);
        assert_eq!(Tier::from_percentage(69), Tier::Fair);
        assert_eq!(Tier::from_percentage(50), Tier::Fair);
        assert_eq!(Tier::from_percentage(49), Tier::NeedsWork);
        assert_eq!(Tier::from_percentage(0), Tier::NeedsWork);
    }

    #[test]
    fn two_of_three_is_fair() {
        assert_eq!(Tier::classify(2, 3), Tier::Fair);
    }

    #[test]
    fn nine_of_ten_is_excellent() {
        assert_eq!(Tier::classify(9, 10), Tier::Excellent);
    }
}
