use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::model::{EntrantProfile, Lane, Points, Roster};
use crate::scoring::{Leaderboard, Scored};
use crate::tabulator::{JudgeSheet, LaneResult, PairStanding, ScoreCard};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with two decimals.
/// If incomplete is true, appends asterisk to indicate partial scoring
pub fn format_score(score: Points, incomplete: bool) -> String {
    if incomplete {
        format!("{}*", score)
    } else {
        score.to_string()
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Fit a name into what is left of the terminal after `fixed_width` columns
fn fit_name(name: &str, fixed_width: usize, term_width: Option<usize>) -> String {
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        // Very narrow terminal, show truncated
        Some(_) => truncate_name(name, 20),
        // No terminal (pipe), don't truncate
        None => name.to_string(),
    }
}

/// Format a leaderboard as a table: Rank, Score, Name, Entrant
/// Unscored entrants follow the ranked ones, without a rank.
/// Rank column: 4 chars (fits "999."), right-aligned
/// Score column is right-aligned, 8 chars wide (fits "100.00*")
pub fn format_leaderboard<T: Scored>(
    board: &Leaderboard<T>,
    roster: &Roster,
    use_colors: bool,
) -> String {
    let title = board.scope.to_string();
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    if board.standings.is_empty() && board.unscored.is_empty() {
        lines.push("No entrants.".to_string());
        return lines.join("\n");
    }

    let term_width = get_terminal_width();
    let rank_width = 4;
    let score_width = 8;
    let separator = "  ";

    for standing in &board.standings {
        let entrant = standing.entry.entrant();
        let rank_str = format!("{:>3}.", standing.rank);
        let score_str = format_score(standing.entry.score(), standing.entry.incomplete());
        let score_padded = format!("{:>width$}", score_str, width = score_width);

        let id = entrant.to_string();
        let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + id.len();
        let name = fit_name(&roster.display_name(entrant), fixed_width, term_width);

        lines.push(if use_colors {
            format!(
                "{} {}{}{}{}{}",
                rank_str.dimmed(),
                score_padded.bold(),
                separator,
                name,
                separator,
                id.cyan()
            )
        } else {
            format!(
                "{} {}{}{}{}{}",
                rank_str, score_padded, separator, name, separator, id
            )
        });
    }

    for unscored in &board.unscored {
        let id = unscored.entrant.to_string();
        let marker = format!("{:>4} {:>width$}", "-", "unscored", width = score_width);
        let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + id.len();
        let name = fit_name(&roster.display_name(&unscored.entrant), fixed_width, term_width);

        lines.push(if use_colors {
            format!("{}{}{}{}{}", marker.dimmed(), separator, name.dimmed(), separator, id.dimmed())
        } else {
            format!("{}{}{}{}{}", marker, separator, name, separator, id)
        });
    }

    lines.join("\n")
}

/// Format a leaderboard as tab-separated values for scripting
/// Columns: rank, score, entrant, name (no headers, no colors)
/// Unscored entrants have "-" for rank and score.
pub fn format_leaderboard_tsv<T: Scored>(board: &Leaderboard<T>, roster: &Roster) -> String {
    let ranked = board.standings.iter().map(|s| {
        let entrant = s.entry.entrant();
        format!(
            "{}\t{}\t{}\t{}",
            s.rank,
            s.entry.score(),
            entrant,
            roster.display_name(entrant)
        )
    });
    let unscored = board
        .unscored
        .iter()
        .map(|u| format!("-\t-\t{}\t{}", u.entrant, roster.display_name(&u.entrant)));

    ranked.chain(unscored).collect::<Vec<_>>().join("\n")
}

/// Format the raw scores behind one entrant's segment score
pub fn format_score_card(card: &ScoreCard, roster: &Roster, use_colors: bool) -> String {
    let title = format!(
        "{} ({}) in {}",
        roster.display_name(&card.entrant),
        card.entrant,
        card.context
    );
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    if let Some(reason) = &card.not_ready {
        lines.push(format!("  Not ready: {}", reason));
    }

    if card.judges.is_empty() {
        lines.push("  No scores submitted.".to_string());
    }

    for judge in &card.judges {
        let weighted = judge
            .weighted
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(if use_colors {
            format!("  {}: {}", judge.judge.yellow(), weighted.bold())
        } else {
            format!("  {}: {}", judge.judge, weighted)
        });

        for score in &judge.scores {
            let weight = match score.weight {
                Some(w) => format!("weight {}", w),
                None => "not weighted".to_string(),
            };
            lines.push(format!(
                "    {:<20} {:>7}  ({}, {})",
                truncate_name(&roster.criterion_name(&card.context, &score.criterion), 20),
                score.value,
                weight,
                score.submitted_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }
    }

    let total = match card.segment_score {
        Some(score) => format!("Segment score: {}", score),
        None => "Segment score: not yet scored".to_string(),
    };
    lines.push(if use_colors {
        total.bold().to_string()
    } else {
        total
    });

    lines.join("\n")
}

/// Columns: judge, criterion, weight, value, submitted_at
pub fn format_score_card_tsv(card: &ScoreCard) -> String {
    card.judges
        .iter()
        .flat_map(|judge| {
            judge.scores.iter().map(move |score| {
                format!(
                    "{}\t{}\t{}\t{}\t{}",
                    judge.judge,
                    score.criterion,
                    score
                        .weight
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    score.value,
                    score.submitted_at.to_rfc3339()
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_lane_result(result: &LaneResult) -> String {
    match result {
        LaneResult::Ranked { rank, score } => format!("#{} {}", rank, score),
        LaneResult::Unscored => "unscored".to_string(),
        LaneResult::NotReady { .. } => "not ready".to_string(),
    }
}

/// Format pairs with both lanes side by side
pub fn format_pair_summary(
    title: &str,
    standings: &[PairStanding],
    roster: &Roster,
    use_colors: bool,
) -> String {
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    }];

    if standings.is_empty() {
        lines.push("No pairs.".to_string());
        return lines.join("\n");
    }

    for standing in standings {
        let lanes: Vec<String> = Lane::ALL
            .iter()
            .map(|lane| {
                let name = roster
                    .pairs()
                    .iter()
                    .find(|p| p.id == standing.pair)
                    .map(|p| p.member(*lane).name.clone())
                    .unwrap_or_default();
                format!("{}: {} {}", lane, name, format_lane_result(standing.lane(*lane)))
            })
            .collect();

        lines.push(if use_colors {
            format!("  {}  {}", standing.pair.cyan(), lanes.join(" | "))
        } else {
            format!("  {}  {}", standing.pair, lanes.join(" | "))
        });
    }

    for lane in Lane::ALL {
        if let Some(LaneResult::NotReady { reason }) = standings.first().map(|s| s.lane(lane)) {
            lines.push(format!("  {} lane not ready: {}", lane, reason));
        }
    }

    lines.join("\n")
}

/// Columns: pair, male rank, male score, female rank, female score
/// Missing values are "-".
pub fn format_pair_summary_tsv(standings: &[PairStanding]) -> String {
    fn cells(result: &LaneResult) -> (String, String) {
        match result {
            LaneResult::Ranked { rank, score } => (rank.to_string(), score.to_string()),
            _ => ("-".to_string(), "-".to_string()),
        }
    }

    standings
        .iter()
        .map(|s| {
            let (male_rank, male_score) = cells(&s.male);
            let (female_rank, female_score) = cells(&s.female);
            format!(
                "{}\t{}\t{}\t{}\t{}",
                s.pair, male_rank, male_score, female_rank, female_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a judge's assignments and progress
pub fn format_judge_sheet(sheet: &JudgeSheet, roster: &Roster, use_colors: bool) -> String {
    let title = format!("{} ({})", sheet.name, sheet.judge);
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    if sheet.lines.is_empty() {
        lines.push("  Nothing assigned.".to_string());
        return lines.join("\n");
    }

    for line in &sheet.lines {
        let progress = match &line.not_ready {
            Some(reason) => format!("not ready: {}", reason),
            None => format!("{}/{}", line.criteria_scored, line.criteria_total),
        };
        let score = line
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let row = format!(
            "  {:<24} {:<20} {:>7}  {}",
            truncate_name(&line.context.to_string(), 24),
            truncate_name(&roster.display_name(&line.entrant), 20),
            score,
            progress
        );

        lines.push(if !use_colors {
            row
        } else if line.is_complete() {
            row.green().to_string()
        } else if line.not_ready.is_some() {
            row.red().to_string()
        } else {
            row
        });
    }

    let done = sheet.lines.iter().filter(|l| l.is_complete()).count();
    lines.push(format!("{} of {} complete", done, sheet.lines.len()));

    lines.join("\n")
}

/// Columns: segment, lane, entrant, scored, total, score
pub fn format_judge_sheet_tsv(sheet: &JudgeSheet) -> String {
    sheet
        .lines
        .iter()
        .map(|line| {
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                line.context.segment,
                line.context.lane.map(|l| l.as_str()).unwrap_or("-"),
                line.entrant,
                line.criteria_scored,
                line.criteria_total,
                line.score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one lane of the roster: Age, Vital stats, Name, Entrant
/// Missing details show as "-". Pictures are only listed in TSV and JSON.
pub fn format_entrants(title: &str, profiles: &[EntrantProfile], use_colors: bool) -> String {
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    }];

    if profiles.is_empty() {
        lines.push("No entrants.".to_string());
        return lines.join("\n");
    }

    let term_width = get_terminal_width();
    let separator = "  ";

    for row in profiles {
        let id = row.entrant.to_string();
        let age = row
            .profile
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let stats = row.profile.vital_stats.as_deref().unwrap_or("-");
        let details = format!("{:>4}{}{:<12}", age, separator, stats);
        let fixed_width = details.chars().count() + separator.len() * 2 + id.len();
        let name = fit_name(&row.profile.name, fixed_width, term_width);

        lines.push(if use_colors {
            format!("{}{}{}{}{}", details.dimmed(), separator, name, separator, id.cyan())
        } else {
            format!("{}{}{}{}{}", details, separator, name, separator, id)
        });
    }

    lines.join("\n")
}

/// Columns: entrant, name, age, vital_stats, picture
pub fn format_entrants_tsv(profiles: &[EntrantProfile]) -> String {
    profiles
        .iter()
        .map(|row| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                row.entrant,
                row.profile.name,
                row.profile
                    .age
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                row.profile.vital_stats.as_deref().unwrap_or("-"),
                row.profile.picture.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
