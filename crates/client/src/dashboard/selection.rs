use judging::{JudgingError, RoundKey};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    NoRoundSelected,
    RoundSelected(RoundKey),
    TeamSelected { round: RoundKey, team_id: i32 },
}

/// What the judge is looking at: a round, optionally a team within it, and
/// whether winner selection mode is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    state: SelectionState,
    selection_mode: bool,
}

impl Selection {
    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn round(&self) -> Option<RoundKey> {
        match self.state {
            SelectionState::NoRoundSelected => None,
            SelectionState::RoundSelected(round) | SelectionState::TeamSelected { round, .. } => {
                Some(round)
            }
        }
    }

    pub fn team(&self) -> Option<i32> {
        match self.state {
            SelectionState::TeamSelected { team_id, .. } => Some(team_id),
            _ => None,
        }
    }

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Always clears the team and leaves selection mode, even when
    /// re-selecting the current round.
    pub fn select_round(&mut self, round: RoundKey) {
        self.state = SelectionState::RoundSelected(round);
        self.selection_mode = false;
    }

    /// Needs a selected round. Selecting while a team is already selected
    /// replaces that team.
    pub fn select_team(&mut self, team_id: i32) -> Result<()> {
        let round = self.round().ok_or_else(|| {
            JudgingError::InvalidSelection("select a round before selecting a team".to_string())
        })?;
        self.state = SelectionState::TeamSelected { round, team_id };
        Ok(())
    }

    pub fn clear_team(&mut self) {
        if let SelectionState::TeamSelected { round, .. } = self.state {
            self.state = SelectionState::RoundSelected(round);
        }
    }

    pub fn toggle_selection_mode(&mut self) -> Result<bool> {
        if self.round().is_none() {
            return Err(JudgingError::InvalidSelection(
                "selection mode needs a selected round".to_string(),
            )
            .into());
        }
        self.selection_mode = !self.selection_mode;
        Ok(self.selection_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_requires_round() {
        let mut selection = Selection::default();
        assert_eq!(selection.state(), SelectionState::NoRoundSelected);
        assert!(selection.select_team(3).is_err());
        assert!(selection.toggle_selection_mode().is_err());

        selection.select_round(RoundKey::new(1, 1));
        selection.select_team(3).unwrap();
        assert_eq!(
            selection.state(),
            SelectionState::TeamSelected {
                round: RoundKey::new(1, 1),
                team_id: 3
            }
        );

        selection.select_team(5).unwrap();
        assert_eq!(selection.team(), Some(5));
        assert_eq!(selection.round(), Some(RoundKey::new(1, 1)));

        selection.clear_team();
        assert_eq!(selection.state(), SelectionState::RoundSelected(RoundKey::new(1, 1)));
    }

    #[test]
    fn test_selecting_round_resets_team_and_mode() {
        let mut selection = Selection::default();
        selection.select_round(RoundKey::new(1, 1));
        selection.select_team(3).unwrap();
        assert!(selection.toggle_selection_mode().unwrap());

        selection.select_round(RoundKey::new(2, 1));
        assert_eq!(selection.team(), None);
        assert!(!selection.selection_mode());
        assert_eq!(selection.round(), Some(RoundKey::new(2, 1)));

        // same round again still resets
        selection.select_team(4).unwrap();
        selection.toggle_selection_mode().unwrap();
        selection.select_round(RoundKey::new(2, 1));
        assert_eq!(selection.team(), None);
        assert!(!selection.selection_mode());
    }

    #[test]
    fn test_selection_mode_is_orthogonal_to_team() {
        let mut selection = Selection::default();
        selection.select_round(RoundKey::new(1, 1));
        selection.toggle_selection_mode().unwrap();
        selection.select_team(9).unwrap();
        assert!(selection.selection_mode());
        assert!(!selection.toggle_selection_mode().unwrap());
        assert_eq!(selection.team(), Some(9));
    }
}
