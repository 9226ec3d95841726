use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;

use super::score_sheet::{judge_criteria, judge_tally};
use crate::dto::judging::ScoreSheetResponse;
use crate::dto::winners::WinnerRecord;
use crate::models::{Judge, fest_offset};
use crate::{JudgingError, Result};

pub const WINNERS_FILE_NAME: &str = "Incridea_Winners.csv";

const WINNERS_HEADER: [&str; 7] = [
    "Event Name",
    "Branch",
    "Participant Name",
    "Position",
    "Phone",
    "Category",
    "Day",
];

const NOT_AVAILABLE: &str = "N/A";

pub fn score_sheet_file_name(judge_name: &str, round_no: i32) -> String {
    format!("ScoreSheet_{}_Round{}.csv", judge_name, round_no)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| JudgingError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| JudgingError::CsvBuffer(e.to_string()))
}

fn format_number(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Flatten winners into one row per participant of each winning team.
pub fn winners_csv(winners: &[WinnerRecord]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(WINNERS_HEADER)?;

    for winner in winners {
        let branch = winner
            .event
            .branch
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or(NOT_AVAILABLE);
        let day = winner
            .event
            .rounds
            .first()
            .and_then(|r| r.date.as_ref())
            .map(|d| d.with_timezone(&fest_offset()).format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        for member in &winner.team.members {
            writer.write_record([
                winner.event.name.as_str(),
                branch,
                member.user.name.as_str(),
                winner.kind.as_str(),
                member.user.phone_number.as_deref().unwrap_or(""),
                winner.event.category.as_str(),
                day.as_str(),
            ])?;
        }
    }

    finish(writer)
}

/// Score sheet of one judge: a `Judge: <name>` line, then one row per team
/// with a column per criteria the judge scored and a total. Missing scores
/// count as zero.
pub fn score_sheet_csv(sheet: &ScoreSheetResponse, judge: &Judge) -> Result<String> {
    let criteria = judge_criteria(sheet, judge.id);

    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record([format!("Judge: {}", judge.name)])?;

    let mut header = vec!["Team Name".to_string()];
    header.extend(criteria.iter().map(|c| c.column_label()));
    header.push("Total".to_string());
    writer.write_record(&header)?;

    for team in &sheet.teams {
        let tally = judge_tally(team, judge.id);
        let mut row = vec![team.name.clone()];
        let mut total = Decimal::ZERO;

        for c in &criteria {
            let value = tally
                .scores
                .iter()
                .find(|s| s.criteria.id == c.id)
                .map(|s| s.score)
                .unwrap_or(Decimal::ZERO);
            total += value;
            row.push(format_number(value));
        }

        row.push(format_number(total));
        writer.write_record(&row)?;
    }

    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::score_sheet::fixtures::sheet;

    fn winner(event: &str, kind: &str, members: &[(&str, &str)]) -> WinnerRecord {
        let members: Vec<_> = members
            .iter()
            .enumerate()
            .map(|(i, (name, phone))| {
                serde_json::json!({"User": {"id": i, "name": name, "phoneNumber": phone}})
            })
            .collect();

        serde_json::from_value(serde_json::json!({
            "type": kind,
            "Event": {
                "name": event,
                "category": "TECHNICAL",
                "Branch": {"name": "CSE"},
                "Rounds": [{"roundNo": 1, "date": "2025-03-06T20:00:00Z"}]
            },
            "Team": {"id": 1, "name": "Team", "TeamMembers": members}
        }))
        .unwrap()
    }

    #[test]
    fn test_winners_csv_has_one_row_per_participant() {
        let winners = vec![
            winner("Hackathon", "WINNER", &[("Asha", "900"), ("Ravi", "901")]),
            winner("Hackathon", "RUNNER_UP", &[("Meera", "902"), ("Kiran", "903")]),
        ];

        let csv = winners_csv(&winners).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Event Name,Branch,Participant Name,Position,Phone,Category,Day"
        );
        assert_eq!(lines[1], "Hackathon,CSE,Asha,WINNER,900,TECHNICAL,07/03/2025");
        assert_eq!(lines[4], "Hackathon,CSE,Kiran,RUNNER_UP,903,TECHNICAL,07/03/2025");
    }

    #[test]
    fn test_winners_csv_defaults() {
        let mut record = winner("Quiz", "WINNER", &[("Asha", "900")]);
        record.event.branch = None;
        record.event.rounds.clear();

        let csv = winners_csv(&[record]).unwrap();
        assert_eq!(csv.lines().nth(1), Some("Quiz,N/A,Asha,WINNER,900,TECHNICAL,N/A"));
    }

    #[test]
    fn test_score_sheet_csv() {
        let judge = Judge {
            id: 10,
            name: "Rao".to_string(),
        };
        let csv = score_sheet_csv(&sheet(), &judge).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "Judge: Rao");
        assert_eq!(lines[1], "Team Name,Idea (Max 20),Demo (Max 10),Total");
        assert_eq!(lines[2], "Alpha,15,7.5,22.5");
        assert_eq!(lines[3], "Beta,0,6,6");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_score_sheet_file_name() {
        assert_eq!(score_sheet_file_name("Rao", 2), "ScoreSheet_Rao_Round2.csv");
    }
}
