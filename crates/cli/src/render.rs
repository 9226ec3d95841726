use client::dashboard::{RoundTabs, ScoreSheetView};
use judging::dto::winners::{EventWinner, WinnerRecord};
use judging::{JudgeRound, PublicEvent, Team, User};

pub fn user(user: &User) {
    println!("{} (#{})", user.name, user.id);
    if let Some(email) = &user.email {
        println!("  email:   {}", email);
    }
    if let Some(phone) = &user.phone_number {
        println!("  phone:   {}", phone);
    }
    if let Some(college) = &user.college {
        println!("  college: {}", college);
    }
}

pub fn rounds(rounds: &[JudgeRound], is_final: impl Fn(&JudgeRound) -> bool) {
    for round in rounds {
        let mut flags = Vec::new();
        if round.is_completed {
            flags.push("completed");
        }
        if is_final(round) {
            flags.push("final");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "{:>4} {:>2}  {}{}",
            round.event_id,
            round.round_no,
            round.event_name(),
            flags
        );
        for criteria in &round.criteria {
            println!("          #{} {}", criteria.id, criteria.column_label());
        }
    }
}

pub fn teams(teams: &[&Team], round: &JudgeRound) {
    for team in teams {
        println!("{:>5}  {}  {}", team.id, team.code, team.name);
        for criteria in &round.criteria {
            let score = team
                .score_for(criteria.id)
                .map(|s| s.score.normalize().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("         {}: {}", criteria.column_label(), score);
        }
    }
}

pub fn score_sheet(view: &ScoreSheetView) {
    let Some(judge) = view.selected_judge() else {
        println!("No scores have been submitted for {} yet", view.key());
        return;
    };

    let others: Vec<&str> = view
        .judges()
        .iter()
        .filter(|j| j.id != judge.id)
        .map(|j| j.name.as_str())
        .collect();
    println!("Judge: {}", judge.name);
    if !others.is_empty() {
        println!("Other judges: {}", others.join(", "));
    }

    let criteria = view.criteria();
    for (team, tally) in view.tallies() {
        let cells: Vec<String> = criteria
            .iter()
            .map(|c| {
                let score = tally
                    .scores
                    .iter()
                    .find(|s| s.criteria.id == c.id)
                    .map(|s| s.score.normalize().to_string())
                    .unwrap_or_else(|| "0".to_string());
                format!("{} {}", c.name, score)
            })
            .collect();
        println!(
            "  {:<24} {:>6} / {:<4} {}",
            team.name,
            tally.total.normalize().to_string(),
            tally.max_total.normalize().to_string(),
            cells.join(" | ")
        );
    }
}

pub fn events(events: &[PublicEvent]) {
    for event in events {
        let branch = event
            .branch
            .as_ref()
            .map(|b| b.name.as_str())
            .unwrap_or("N/A");
        println!(
            "{:>4}  {:<32} {:<14} {:<20} {}",
            event.id,
            event.name,
            event.category.as_str(),
            event.event_type_label(),
            branch
        );
    }
}

pub fn event(event: &PublicEvent, tabs: &RoundTabs) {
    println!("{} ({})", event.name, event.category);
    if let Some(description) = &event.description {
        println!("{}", description);
    }
    for (index, round) in tabs.rounds.iter().enumerate() {
        let marker = if index == tabs.default_index { ">" } else { " " };
        let date = round
            .date
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "unscheduled".to_string());
        let status = if round.is_completed { "completed" } else { "open" };
        println!("{} Round {}  {}  {}", marker, round.round_no, date, status);
    }
}

pub fn event_winners(winners: &[EventWinner]) {
    if winners.is_empty() {
        println!("No winners declared");
        return;
    }
    for winner in winners {
        println!(
            "{:<18} {} ({})",
            winner.kind.label(),
            winner.team.name,
            winner.team.code
        );
    }
}

pub fn all_winners(winners: &[WinnerRecord]) {
    if winners.is_empty() {
        println!("No winners declared");
        return;
    }
    for winner in winners {
        println!(
            "{:<32} {:<18} {}",
            winner.event.name,
            winner.kind.label(),
            winner.team.name
        );
    }
}
