//! Spoken team-name matching

use crate::api::TeamSummary;

/// Outcome of matching a spoken name against the team roster.
pub enum TeamMatch<'a> {
    None,
    Unique(&'a TeamSummary),
    Ambiguous(Vec<&'a TeamSummary>),
}

/// Lowercase, trim, and strip a spoken leading "team" so "Team Kitchen"
/// matches a team named "kitchen".
pub fn normalize_spoken(spoken: &str) -> String {
    let lowered = spoken.trim().to_lowercase();
    lowered
        .strip_prefix("team ")
        .map(str::to_string)
        .unwrap_or(lowered)
}

/// Case-insensitive substring match in either direction, since users say
/// both fragments ("kitchen" for "kitchen windowsill") and decorated names.
pub fn match_team<'a>(spoken: &str, teams: &'a [TeamSummary]) -> TeamMatch<'a> {
    let needle = normalize_spoken(spoken);
    if needle.is_empty() {
        return TeamMatch::None;
    }

    let mut hits: Vec<&TeamSummary> = teams
        .iter()
        .filter(|t| {
            let name = t.name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        })
        .collect();

    match hits.len() {
        0 => TeamMatch::None,
        1 => TeamMatch::Unique(hits.remove(0)),
        _ => TeamMatch::Ambiguous(hits),
    }
}
