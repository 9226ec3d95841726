use std::collections::HashMap;
use std::str::FromStr;

use judging::services::scoring::parse_score;
use judging::{Criteria, RoundKey, Team};
use rust_decimal::Decimal;

use crate::Result;

/// One editable score cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub round: RoundKey,
    pub team_id: i32,
    pub criteria_id: i32,
}

impl FieldKey {
    pub fn new(round: RoundKey, team_id: i32, criteria_id: i32) -> Self {
        Self {
            round,
            team_id,
            criteria_id,
        }
    }
}

#[derive(Debug, Default)]
struct FieldState {
    draft: String,
    confirmed: Option<Decimal>,
    latest_seq: u64,
    in_flight: usize,
}

/// A submission that has been handed a sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommit {
    pub field: FieldKey,
    pub value: Decimal,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing to send: the draft is empty or matches the saved value.
    Unchanged,
    Saved,
    /// The submission failed and the draft went back to the saved value.
    RolledBack,
    /// A newer submission for the same field was issued; this result is ignored.
    Superseded,
}

fn format_value(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Per-field score drafts with last-write-wins sequencing.
#[derive(Debug, Default)]
pub struct ScoreDrafts {
    fields: HashMap<FieldKey, FieldState>,
    next_seq: u64,
}

impl ScoreDrafts {
    /// Take saved values from freshly fetched teams. Fields with a
    /// submission in flight keep their draft.
    pub fn seed(&mut self, round: RoundKey, teams: &[Team]) {
        for team in teams {
            for score in &team.scores {
                let field = FieldKey::new(round, team.id, score.criteria_id);
                let state = self.fields.entry(field).or_default();
                state.confirmed = Some(score.score);
                if state.in_flight == 0 {
                    state.draft = format_value(score.score);
                }
            }
        }
    }

    pub fn draft(&self, field: &FieldKey) -> &str {
        self.fields.get(field).map_or("", |s| s.draft.as_str())
    }

    pub fn confirmed(&self, field: &FieldKey) -> Option<Decimal> {
        self.fields.get(field).and_then(|s| s.confirmed)
    }

    /// Apply a keystroke-level edit. Values above the criteria maximum are
    /// refused and leave the draft as it was.
    pub fn edit(&mut self, field: FieldKey, input: &str, criteria: &Criteria) -> bool {
        let input = input.trim();
        if !input.is_empty() {
            match Decimal::from_str(input) {
                Ok(value) if value <= criteria.max_decimal() => {}
                _ => return false,
            }
        }
        self.fields.entry(field).or_default().draft = input.to_string();
        true
    }

    /// Start submitting the field's draft. `Ok(None)` when there is nothing
    /// to send; a draft that fails validation is rolled back.
    pub fn begin_commit(
        &mut self,
        field: FieldKey,
        criteria: &Criteria,
    ) -> Result<Option<PendingCommit>> {
        let state = self.fields.entry(field).or_default();
        if state.draft.is_empty() {
            return Ok(None);
        }

        let value = match parse_score(&state.draft, criteria) {
            Ok(value) => value,
            Err(e) => {
                state.draft = state.confirmed.map(format_value).unwrap_or_default();
                return Err(e.into());
            }
        };
        if state.confirmed == Some(value) {
            return Ok(None);
        }

        self.next_seq += 1;
        state.latest_seq = self.next_seq;
        state.in_flight += 1;

        Ok(Some(PendingCommit {
            field,
            value,
            seq: self.next_seq,
        }))
    }

    pub fn complete(&mut self, pending: PendingCommit, succeeded: bool) -> CommitOutcome {
        let state = self.fields.entry(pending.field).or_default();
        state.in_flight = state.in_flight.saturating_sub(1);

        if pending.seq < state.latest_seq {
            return CommitOutcome::Superseded;
        }

        if succeeded {
            state.confirmed = Some(pending.value);
            state.draft = format_value(pending.value);
            CommitOutcome::Saved
        } else {
            state.draft = state.confirmed.map(format_value).unwrap_or_default();
            CommitOutcome::RolledBack
        }
    }
}
