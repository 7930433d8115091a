use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::voting::Tally;

/// Quorum arithmetic for a closed voting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuorumOutcome {
    pub quorum_percentage: Decimal,
    pub total_voters: u64,
    pub required_voters: u64,
    pub is_quorum_reached: bool,
}

/// Computes participation against the eligible electorate.
///
/// With no eligible voters there is nothing to divide by: participation is
/// reported as zero and the quorum is never reached. Participation is
/// capped at 100% since the electorate is counted at close time and may
/// have shrunk after ballots were cast. `required_voters` is the smallest
/// ballot count whose rounded participation meets the requirement, so a
/// reached quorum never reports fewer ballots than it requires.
pub fn compute(votes_cast: u64, eligible_voters: u64, quorum_required: Decimal) -> QuorumOutcome {
    assert!(
        quorum_required >= Decimal::ZERO && quorum_required <= Decimal::ONE_HUNDRED,
        "Quorum requirement must be a percentage"
    );

    if eligible_voters == 0 {
        return QuorumOutcome {
            quorum_percentage: two_places(Decimal::ZERO),
            total_voters: votes_cast,
            required_voters: 0,
            is_quorum_reached: false,
        };
    }

    let quorum_percentage = participation(votes_cast, eligible_voters);
    let required_voters = required_voters(eligible_voters, quorum_required);
    let is_quorum_reached = quorum_percentage >= quorum_required;
    assert!(
        !is_quorum_reached || votes_cast.min(eligible_voters) >= required_voters,
        "Reached quorum must cover the required ballots"
    );

    QuorumOutcome {
        quorum_percentage,
        total_voters: votes_cast,
        required_voters,
        is_quorum_reached,
    }
}

/// Rounded participation percentage, capped at 100.
fn participation(votes_cast: u64, eligible_voters: u64) -> Decimal {
    let raw = Decimal::from(votes_cast) * Decimal::ONE_HUNDRED / Decimal::from(eligible_voters);
    two_places(raw.min(Decimal::ONE_HUNDRED))
}

/// Smallest ballot count whose rounded participation reaches `quorum_required`.
///
/// The exact ceiling is an upper bound; rounding can only admit a few
/// ballots less, so the walk down is short.
fn required_voters(eligible_voters: u64, quorum_required: Decimal) -> u64 {
    let exact = (Decimal::from(eligible_voters) * quorum_required / Decimal::ONE_HUNDRED).ceil();
    let mut required = exact.to_u64().unwrap_or(eligible_voters).min(eligible_voters);
    while required > 0 && participation(required - 1, eligible_voters) >= quorum_required {
        required -= 1;
    }
    required
}

fn two_places(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Whether the closed voting produced a decision, and a human-readable account of it.
///
/// A decision requires the quorum and a single option leading the tally.
pub fn decide(outcome: &QuorumOutcome, tally: &Tally) -> (bool, String) {
    if !outcome.is_quorum_reached {
        return (
            false,
            format!(
                "Quorum not reached: {}% participation, {} of {} required ballots",
                outcome.quorum_percentage, outcome.total_voters, outcome.required_voters
            ),
        );
    }

    let top = tally.options.iter().map(|o| o.votes).max().unwrap_or(0);
    let leaders: Vec<_> = tally.options.iter().filter(|o| o.votes == top).collect();
    match leaders.as_slice() {
        [leader] if top > 0 => (
            true,
            format!("Decision: \"{}\" with {} votes", leader.text, leader.votes),
        ),
        _ if top == 0 => (false, "No votes were cast for any option".to_string()),
        _ => (
            false,
            format!("Tie between {} options with {} votes each", leaders.len(), top),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::voting::OptionCount;
    use uuid::Uuid;

    fn tally_of(counts: &[(&str, u64)]) -> Tally {
        Tally {
            total_ballots: counts.iter().map(|(_, c)| c).sum(),
            options: counts
                .iter()
                .enumerate()
                .map(|(i, (text, votes))| OptionCount {
                    option_id: Uuid::new_v4(),
                    text: text.to_string(),
                    order: i as i32 + 1,
                    votes: *votes,
                })
                .collect(),
            mean_score: None,
        }
    }

    #[test]
    fn six_of_ten_meets_fifty_percent() {
        let outcome = compute(6, 10, Decimal::from(50));
        assert_eq!(outcome.quorum_percentage, Decimal::new(6000, 2));
        assert_eq!(outcome.quorum_percentage.to_string(), "60.00");
        assert_eq!(outcome.required_voters, 5);
        assert!(outcome.is_quorum_reached);
    }

    #[test]
    fn zero_eligible_never_reaches_quorum() {
        let outcome = compute(0, 0, Decimal::from(50));
        assert_eq!(outcome.quorum_percentage, Decimal::ZERO);
        assert!(!outcome.is_quorum_reached);

        let outcome = compute(3, 0, Decimal::ZERO);
        assert!(!outcome.is_quorum_reached);
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(compute(5, 10, Decimal::from(50)).is_quorum_reached);
        assert!(!compute(4, 10, Decimal::from(50)).is_quorum_reached);
    }

    #[test]
    fn percentage_rounds_to_two_places() {
        let outcome = compute(1, 3, Decimal::from(30));
        assert_eq!(outcome.quorum_percentage, Decimal::new(3333, 2));
        assert_eq!(outcome.required_voters, 1);
        let outcome = compute(2, 3, Decimal::from(30));
        assert_eq!(outcome.quorum_percentage, Decimal::new(6667, 2));
    }

    #[test]
    fn rounded_participation_and_required_ballots_agree() {
        let outcome = compute(2, 3, Decimal::new(6667, 2));
        assert_eq!(outcome.quorum_percentage, Decimal::new(6667, 2));
        assert!(outcome.is_quorum_reached);
        assert_eq!(outcome.required_voters, 2);

        let outcome = compute(1, 3, Decimal::new(6667, 2));
        assert!(!outcome.is_quorum_reached);
        assert_eq!(outcome.required_voters, 2);
    }

    #[test]
    fn reached_quorum_never_reports_missing_ballots() {
        for eligible in 1..=40u64 {
            for required in [1, 33, 50, 66, 75, 99, 100] {
                let required = Decimal::from(required);
                for cast in 0..=eligible {
                    let outcome = compute(cast, eligible, required);
                    assert_eq!(outcome.is_quorum_reached, cast >= outcome.required_voters);
                }
            }
        }
    }

    #[test]
    fn participation_is_capped() {
        let outcome = compute(12, 10, Decimal::from(90));
        assert_eq!(outcome.quorum_percentage, Decimal::ONE_HUNDRED);
        assert!(outcome.is_quorum_reached);
    }

    #[test]
    fn decision_needs_single_leader() {
        let reached = compute(6, 10, Decimal::from(50));
        let (made, description) = decide(&reached, &tally_of(&[("yes", 4), ("no", 2)]));
        assert!(made);
        assert!(description.contains("yes"));

        let (made, _) = decide(&reached, &tally_of(&[("yes", 3), ("no", 3)]));
        assert!(!made);

        let missed = compute(2, 10, Decimal::from(50));
        let (made, description) = decide(&missed, &tally_of(&[("yes", 2), ("no", 0)]));
        assert!(!made);
        assert!(description.starts_with("Quorum not reached"));
    }
}
