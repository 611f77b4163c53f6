//! Intent handlers and the canned speech they produce

use anyhow::anyhow;

use super::matching::{self, TeamMatch};
use super::watering;
use super::SkillContext;
use crate::api::{ApiError, GardenClient, HealthReport, TeamSummary};
use crate::auth::AuthError;
use crate::event::{Intent, SkillEvent};
use crate::response::SkillResponse;

pub(crate) const WELCOME: &str = "Welcome to Plant Ranger Check. You can ask me how the garden \
     service is doing, or say, check my plants.";
const WELCOME_REPROMPT: &str =
    "Try saying, check my plants, or ask me to check a team by name.";
const HELP_TEXT: &str = "I can check on your plants. Say, check my plants, for the whole garden, \
     or name a team, like, check team kitchen. You can also ask, is the garden service okay?";
const HELP_REPROMPT: &str = "What would you like me to check?";
const GOODBYE: &str = "Goodbye. Keep those plants watered!";
const LINK_ACCOUNT_TEXT: &str = "To check on your plants, please link your garden account using \
     the companion app.";
const GENERIC_ERROR: &str =
    "Sorry, I had trouble with that request. Please try again in a moment.";
const FALLBACK_TEXT: &str =
    "Sorry, I didn't catch that. You can say, check my plants.";
const FALLBACK_REPROMPT: &str = "What would you like me to check?";
pub(crate) const APOLOGY: &str =
    "Sorry, something went wrong talking to the garden service. Please try again later.";

pub fn launch() -> SkillResponse {
    SkillResponse::ask(WELCOME, WELCOME_REPROMPT)
}

pub fn help() -> SkillResponse {
    SkillResponse::ask(HELP_TEXT, HELP_REPROMPT)
}

pub fn stop() -> SkillResponse {
    SkillResponse::tell(GOODBYE)
}

pub fn unknown() -> SkillResponse {
    SkillResponse::tell(GENERIC_ERROR)
}

/// Resolve a credential, turning auth failures into the link-account
/// prompt. Store errors bubble up to the top-level catch.
async fn resolve_or_prompt(
    ctx: &SkillContext<'_>,
    event: &SkillEvent,
) -> anyhow::Result<Result<Option<String>, SkillResponse>> {
    match ctx.resolve_token(event).await {
        Ok(token) => Ok(Ok(token)),
        Err(AuthError::Store(e)) => Err(anyhow!("token store failure: {}", e)),
        Err(e) => {
            tracing::warn!("Credential resolution failed: {}", e);
            Ok(Err(SkillResponse::link_account(LINK_ACCOUNT_TEXT)))
        }
    }
}

fn health_speech(report: &HealthReport) -> String {
    let mut text = match report.status.to_lowercase().as_str() {
        "ok" | "healthy" | "green" => "The garden service is healthy.".to_string(),
        "degraded" => "The garden service is up, but running in a degraded state.".to_string(),
        other => format!("The garden service reports status {}.", other),
    };
    if !report.recommendations.is_empty() {
        text.push_str(" Recommendations: ");
        text.push_str(&report.recommendations.join(", "));
        text.push('.');
    }
    text
}

/// Health check. The endpoint is optionally authenticated, so a missing
/// credential still produces a call; a 401 answer becomes the
/// account-linking prompt.
pub async fn health_check(
    ctx: &SkillContext<'_>,
    event: &SkillEvent,
) -> anyhow::Result<SkillResponse> {
    let token = match resolve_or_prompt(ctx, event).await? {
        Ok(token) => token,
        Err(prompt) => return Ok(prompt),
    };

    match ctx.client.health(token.as_deref()).await {
        Ok(report) => Ok(SkillResponse::tell(&health_speech(&report))),
        Err(ApiError::Unauthorized(_)) => Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT)),
        Err(e @ ApiError::ServiceUnavailable { .. }) | Err(e @ ApiError::Timeout(_)) => {
            tracing::warn!("Health check failed: {}", e);
            Ok(SkillResponse::tell(APOLOGY))
        }
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Ok(SkillResponse::tell(GENERIC_ERROR))
        }
    }
}

/// Watering status for one plant on one team.
pub struct PlantStatus {
    pub name: String,
    pub needs_water: bool,
}

/// Survey one team. Plants whose team-summary entry is conclusive cost no
/// extra fetch; inconclusive ones get a detail lookup, and a failed lookup
/// skips the plant rather than failing the survey.
pub async fn survey_team(
    client: &GardenClient,
    token: &str,
    team_id: &str,
) -> Result<Vec<PlantStatus>, ApiError> {
    let detail = client.team_detail(token, team_id).await?;

    let mut plants = Vec::new();
    for plant in detail.plants {
        let needs_water = match watering::from_summary(&plant) {
            Some(v) => v,
            None => match client.plant_detail(token, &plant.id).await {
                Ok(d) => watering::from_detail(&d).unwrap_or(false),
                Err(e) => {
                    tracing::warn!("Skipping plant {}: {}", plant.name, e);
                    continue;
                }
            },
        };
        plants.push(PlantStatus {
            name: plant.name,
            needs_water,
        });
    }
    Ok(plants)
}

fn thirsty_names(plants: &[PlantStatus]) -> Vec<&str> {
    plants
        .iter()
        .filter(|p| p.needs_water)
        .map(|p| p.name.as_str())
        .collect()
}

fn garden_speech(plants: &[PlantStatus], teams_counted: usize) -> String {
    let thirsty = thirsty_names(plants);
    let base = format!(
        "I checked {} plant{} across {} team{}.",
        plants.len(),
        plural(plants.len()),
        teams_counted,
        plural(teams_counted),
    );
    if thirsty.is_empty() {
        format!("{} None of them need water right now.", base)
    } else {
        format!(
            "{} {} need{} water: {}.",
            base,
            thirsty.len(),
            if thirsty.len() == 1 { "s" } else { "" },
            thirsty.join(", ")
        )
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn team_names(teams: &[TeamSummary]) -> String {
    teams
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// List-all-plants: full-garden aggregation. Per-team failures are logged
/// and the team excluded; the response covers whatever survived.
pub async fn list_all_plants(
    ctx: &SkillContext<'_>,
    event: &SkillEvent,
) -> anyhow::Result<SkillResponse> {
    let token = match resolve_or_prompt(ctx, event).await? {
        Ok(Some(token)) => token,
        Ok(None) => return Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT)),
        Err(prompt) => return Ok(prompt),
    };

    let teams = match ctx.client.list_teams(&token).await {
        Ok(teams) => teams,
        Err(ApiError::Unauthorized(_)) => {
            return Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT))
        }
        Err(e @ ApiError::ServiceUnavailable { .. }) | Err(e @ ApiError::Timeout(_)) => {
            tracing::warn!("Team list failed: {}", e);
            return Ok(SkillResponse::tell(APOLOGY));
        }
        Err(e) => {
            tracing::warn!("Team list failed: {}", e);
            return Ok(SkillResponse::tell(GENERIC_ERROR));
        }
    };

    let mut surveyed = 0usize;
    let mut plants = Vec::new();
    for team in &teams {
        match survey_team(ctx.client, &token, &team.id).await {
            Ok(mut team_plants) => {
                surveyed += 1;
                plants.append(&mut team_plants);
            }
            Err(e) => tracing::warn!("Skipping team {}: {}", team.name, e),
        }
    }

    if plants.is_empty() {
        return Ok(SkillResponse::tell(
            "I couldn't find any plants to check right now.",
        ));
    }

    let speech = garden_speech(&plants, surveyed);
    Ok(SkillResponse::tell(&speech).with_card("Plant Ranger Check", &speech))
}

fn team_speech(team_name: &str, plants: &[PlantStatus]) -> String {
    if plants.is_empty() {
        return format!("Team {} has no plants on record.", team_name);
    }
    let thirsty = thirsty_names(plants);
    let base = format!(
        "Team {} has {} plant{}.",
        team_name,
        plants.len(),
        plural(plants.len())
    );
    if thirsty.is_empty() {
        format!("{} None of them need water right now.", base)
    } else {
        format!("{} Needing water: {}.", base, thirsty.join(", "))
    }
}

/// Check one team's plants, matched by spoken name.
pub async fn team_plants(
    ctx: &SkillContext<'_>,
    event: &SkillEvent,
    intent: &Intent,
) -> anyhow::Result<SkillResponse> {
    let spoken = match intent.slot_value("team") {
        Some(s) => s.to_string(),
        None => {
            return Ok(SkillResponse::ask(
                "Which team would you like me to check?",
                "Say a team name, like, team kitchen.",
            ))
        }
    };

    let token = match resolve_or_prompt(ctx, event).await? {
        Ok(Some(token)) => token,
        Ok(None) => return Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT)),
        Err(prompt) => return Ok(prompt),
    };

    let teams = match ctx.client.list_teams(&token).await {
        Ok(teams) => teams,
        Err(ApiError::Unauthorized(_)) => {
            return Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT))
        }
        Err(e) => {
            tracing::warn!("Team list failed: {}", e);
            return Ok(SkillResponse::tell(APOLOGY));
        }
    };

    match matching::match_team(&spoken, &teams) {
        TeamMatch::Unique(team) => match survey_team(ctx.client, &token, &team.id).await {
            Ok(plants) => {
                let speech = team_speech(&team.name, &plants);
                Ok(SkillResponse::tell(&speech).with_card("Plant Ranger Check", &speech))
            }
            Err(ApiError::Unauthorized(_)) => Ok(SkillResponse::link_account(LINK_ACCOUNT_TEXT)),
            Err(e) => {
                tracing::warn!("Survey of team {} failed: {}", team.name, e);
                Ok(SkillResponse::tell(APOLOGY))
            }
        },
        TeamMatch::None => Ok(SkillResponse::ask(
            &format!(
                "I couldn't find a team matching {}. I know these teams: {}. Which one?",
                spoken,
                team_names(&teams)
            ),
            "Which team would you like?",
        )),
        TeamMatch::Ambiguous(hits) => {
            let names = hits
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Ok(SkillResponse::ask(
                &format!("That matches more than one team: {}. Which one?", names),
                "Which team would you like?",
            ))
        }
    }
}

/// Fallback intent: best effort. With a credential we can at least list
/// the team names; without one, a generic reprompt.
pub async fn fallback(
    ctx: &SkillContext<'_>,
    event: &SkillEvent,
) -> anyhow::Result<SkillResponse> {
    let token = match ctx.resolve_token(event).await {
        Ok(token) => token,
        Err(e) => {
            tracing::debug!("Fallback credential resolution failed: {}", e);
            None
        }
    };

    if let Some(token) = token {
        match ctx.client.list_teams(&token).await {
            Ok(teams) if !teams.is_empty() => {
                return Ok(SkillResponse::ask(
                    &format!(
                        "Sorry, I didn't catch that. You can ask about one of these teams: {}.",
                        team_names(&teams)
                    ),
                    FALLBACK_REPROMPT,
                ));
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Fallback team list failed: {}", e),
        }
    }

    Ok(SkillResponse::ask(FALLBACK_TEXT, FALLBACK_REPROMPT))
}
