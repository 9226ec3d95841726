use std::cmp::Ordering;

use crate::models::{JudgeRound, RoundKey, RoundSchedule};

fn compare_rounds(a: &JudgeRound, b: &JudgeRound) -> Ordering {
    a.event_name()
        .cmp(b.event_name())
        .then(a.event_id.cmp(&b.event_id))
        .then(a.round_no.cmp(&b.round_no))
}

/// Order rounds by event name, then round number.
///
/// Distinct events sharing a name are kept apart by event id so each event's
/// rounds stay contiguous.
pub fn sort_rounds(rounds: &mut [JudgeRound]) {
    rounds.sort_by(compare_rounds);
}

pub fn sorted_rounds(mut rounds: Vec<JudgeRound>) -> Vec<JudgeRound> {
    sort_rounds(&mut rounds);
    rounds
}

/// A round is final iff no round of the same event has a greater round number.
///
/// Always evaluated against the latest fetched list; there is no stored flag.
pub fn is_final_round(rounds: &[JudgeRound], key: RoundKey) -> bool {
    !rounds
        .iter()
        .any(|r| r.event_id == key.event_id && r.round_no > key.round_no)
}

pub fn find_round(rounds: &[JudgeRound], key: RoundKey) -> Option<&JudgeRound> {
    rounds.iter().find(|r| r.key() == key)
}

pub fn sorted_schedule(rounds: &[RoundSchedule]) -> Vec<RoundSchedule> {
    let mut sorted = rounds.to_vec();
    sorted.sort_by_key(|r| r.round_no);
    sorted
}

/// Index of the round tab to open first: the first round still in progress
/// once the event has started, otherwise the first round.
pub fn default_round_index(sorted: &[RoundSchedule], is_started: bool) -> usize {
    if !is_started {
        return 0;
    }
    sorted.iter().position(|r| !r.is_completed).unwrap_or(0)
}
