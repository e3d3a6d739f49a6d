//! Session-level agreement statistics
//!
//! Reduces the classified pieces of one scanner session into counts and the
//! two derived rates used on the shop floor: assertiveness (share the scanner
//! got right) and error (share it got wrong).

use serde::Serialize;

use crate::grading::classify::Classification;

/// Summary of one scanner session's classified pieces
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub pieces_evaluated: u32,
    pub pieces_in_grade: u32,
    pub pieces_over_grade: u32,
    pub pieces_under_grade: u32,
    /// pieces_in_grade / pieces_evaluated, in [0, 1]
    pub assertiveness: f64,
    /// (over + under) / pieces_evaluated, in [0, 1]
    pub error: f64,
}

impl SessionStats {
    /// Reduce a sequence of classifications into summary statistics.
    ///
    /// Commutative and associative over the input: item order never affects
    /// the result. An empty session yields zero counts and rates of exactly
    /// 0.0 by policy, not a division error.
    pub fn from_classifications(items: impl IntoIterator<Item = Classification>) -> Self {
        let mut stats = SessionStats::default();

        for item in items {
            stats.pieces_evaluated += 1;
            match item {
                Classification::Match => stats.pieces_in_grade += 1,
                Classification::Overgrade => stats.pieces_over_grade += 1,
                Classification::Undergrade => stats.pieces_under_grade += 1,
            }
        }

        if stats.pieces_evaluated > 0 {
            let total = f64::from(stats.pieces_evaluated);
            stats.assertiveness = f64::from(stats.pieces_in_grade) / total;
            stats.error =
                f64::from(stats.pieces_over_grade + stats.pieces_under_grade) / total;
        }

        stats
    }

    /// Pool several summaries into one, recomputing the rates over the
    /// combined counts (used by the cross-session agreement report).
    pub fn pooled(all: impl IntoIterator<Item = SessionStats>) -> Self {
        let mut sum = SessionStats::default();
        for s in all {
            sum.pieces_evaluated += s.pieces_evaluated;
            sum.pieces_in_grade += s.pieces_in_grade;
            sum.pieces_over_grade += s.pieces_over_grade;
            sum.pieces_under_grade += s.pieces_under_grade;
        }
        if sum.pieces_evaluated > 0 {
            let total = f64::from(sum.pieces_evaluated);
            sum.assertiveness = f64::from(sum.pieces_in_grade) / total;
            sum.error = f64::from(sum.pieces_over_grade + sum.pieces_under_grade) / total;
        }
        sum
    }
}

impl FromIterator<Classification> for SessionStats {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        SessionStats::from_classifications(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::classify::Classification::{Match, Overgrade, Undergrade};

    #[test]
    fn test_example_session() {
        let stats =
            SessionStats::from_classifications([Match, Match, Overgrade, Undergrade, Match]);

        assert_eq!(stats.pieces_evaluated, 5);
        assert_eq!(stats.pieces_in_grade, 3);
        assert_eq!(stats.pieces_over_grade, 1);
        assert_eq!(stats.pieces_under_grade, 1);
        assert_eq!(stats.assertiveness, 0.6);
        assert_eq!(stats.error, 0.4);
    }

    #[test]
    fn test_empty_session_rates_are_zero() {
        let stats = SessionStats::from_classifications([]);

        assert_eq!(stats.pieces_evaluated, 0);
        assert_eq!(stats.assertiveness, 0.0);
        assert_eq!(stats.error, 0.0);
        assert!(!stats.assertiveness.is_nan());
        assert!(!stats.error.is_nan());
    }

    #[test]
    fn test_order_independence() {
        let base = [Match, Overgrade, Undergrade, Match, Overgrade, Match];
        let reference = SessionStats::from_classifications(base);

        let mut rotated = base;
        for _ in 0..base.len() {
            rotated.rotate_left(1);
            assert_eq!(SessionStats::from_classifications(rotated), reference);
        }

        let mut reversed = base;
        reversed.reverse();
        assert_eq!(SessionStats::from_classifications(reversed), reference);
    }

    #[test]
    fn test_counts_are_conserved() {
        let items = [Match, Undergrade, Undergrade, Overgrade, Match, Undergrade];
        let stats = SessionStats::from_classifications(items);

        assert_eq!(
            stats.pieces_in_grade + stats.pieces_over_grade + stats.pieces_under_grade,
            stats.pieces_evaluated
        );
    }

    #[test]
    fn test_rates_sum_to_one() {
        let stats = SessionStats::from_classifications([Match, Overgrade, Undergrade, Overgrade]);
        assert!((stats.assertiveness + stats.error - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_matches() {
        let stats = SessionStats::from_classifications([Match, Match, Match]);
        assert_eq!(stats.assertiveness, 1.0);
        assert_eq!(stats.error, 0.0);
    }

    #[test]
    fn test_from_iterator() {
        let stats: SessionStats = [Match, Undergrade].into_iter().collect();
        assert_eq!(stats.pieces_evaluated, 2);
        assert_eq!(stats.pieces_under_grade, 1);
    }

    #[test]
    fn test_pooled_recomputes_rates() {
        let a = SessionStats::from_classifications([Match, Match, Overgrade, Undergrade, Match]);
        let b = SessionStats::from_classifications([Undergrade, Undergrade, Match, Match, Match]);

        let pooled = SessionStats::pooled([a, b]);
        assert_eq!(pooled.pieces_evaluated, 10);
        assert_eq!(pooled.pieces_in_grade, 6);
        assert_eq!(pooled.assertiveness, 0.6);
        assert_eq!(pooled.error, 0.4);
    }

    #[test]
    fn test_pooled_empty() {
        let pooled = SessionStats::pooled([]);
        assert_eq!(pooled, SessionStats::default());
    }
}
