use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::dto::judging::{ScoreSheetResponse, ScoreSheetTeam, SheetScore};
use crate::models::{Criteria, Judge};

/// Judges present in the sheet, de-duplicated by id, in order of first appearance.
pub fn judges(sheet: &ScoreSheetResponse) -> Vec<Judge> {
    let mut seen = HashSet::new();
    sheet
        .teams
        .iter()
        .flat_map(|t| t.scores.iter())
        .filter(|s| seen.insert(s.judge.id))
        .map(|s| s.judge.clone())
        .collect()
}

/// Criteria scored by `judge_id`, in order of first appearance across teams.
pub fn judge_criteria(sheet: &ScoreSheetResponse, judge_id: i32) -> Vec<Criteria> {
    let mut seen = HashSet::new();
    sheet
        .teams
        .iter()
        .flat_map(|t| t.scores.iter())
        .filter(|s| s.judge.id == judge_id && seen.insert(s.criteria.id))
        .map(|s| s.criteria.clone())
        .collect()
}

/// One judge's scores for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeTally<'a> {
    pub scores: Vec<&'a SheetScore>,
    pub total: Decimal,
    pub max_total: Decimal,
}

pub fn judge_tally(team: &ScoreSheetTeam, judge_id: i32) -> JudgeTally<'_> {
    let scores: Vec<&SheetScore> = team
        .scores
        .iter()
        .filter(|s| s.judge.id == judge_id)
        .collect();
    let total = scores.iter().map(|s| s.score).sum();
    let max_total = scores.iter().map(|s| s.criteria.max_decimal()).sum();

    JudgeTally {
        scores,
        total,
        max_total,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn entry(judge: (i32, &str), criteria: (i32, &str, Option<i32>), score: &str) -> SheetScore {
        SheetScore {
            score: score.parse().unwrap(),
            judge: Judge {
                id: judge.0,
                name: judge.1.to_string(),
            },
            criteria: Criteria::new(criteria.0, criteria.1, criteria.2),
        }
    }

    pub fn sheet() -> ScoreSheetResponse {
        ScoreSheetResponse {
            teams: vec![
                ScoreSheetTeam {
                    id: 1,
                    name: "Alpha".to_string(),
                    code: "T-1".to_string(),
                    scores: vec![
                        entry((10, "Rao"), (100, "Idea", Some(20)), "15"),
                        entry((10, "Rao"), (101, "Demo", None), "7.5"),
                        entry((11, "Shetty"), (100, "Idea", Some(20)), "12"),
                    ],
                },
                ScoreSheetTeam {
                    id: 2,
                    name: "Beta".to_string(),
                    code: "T-2".to_string(),
                    scores: vec![
                        entry((11, "Shetty"), (101, "Demo", None), "9"),
                        entry((10, "Rao"), (101, "Demo", None), "6"),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sheet;
    use super::*;

    #[test]
    fn test_judges_in_first_appearance_order() {
        let judges = judges(&sheet());
        let names: Vec<_> = judges.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["Rao", "Shetty"]);
    }

    #[test]
    fn test_judge_criteria() {
        let sheet = sheet();
        let ids: Vec<_> = judge_criteria(&sheet, 10).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 101]);
        let ids: Vec<_> = judge_criteria(&sheet, 11).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 101]);
        assert!(judge_criteria(&sheet, 99).is_empty());
    }

    #[test]
    fn test_judge_tally() {
        let sheet = sheet();
        let tally = judge_tally(&sheet.teams[0], 10);
        assert_eq!(tally.scores.len(), 2);
        assert_eq!(tally.total, Decimal::new(225, 1));
        assert_eq!(tally.max_total, Decimal::from(30));

        let tally = judge_tally(&sheet.teams[1], 99);
        assert!(tally.scores.is_empty());
        assert_eq!(tally.total, Decimal::ZERO);
    }
}
