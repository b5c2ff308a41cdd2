//! Team selection: hand the retrieved candidate pool to the chat model and
//! hold its answer to the pool.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Write;

use crate::config::LlmConfig;
use crate::llm::completion::complete;
use crate::models::{CandidateMatch, ChatMessage, TeamMember};

/// Profile characters included per candidate in the prompt.
const MAX_PROFILE_CHARS: usize = 1_200;

const SELECTION_TEMPERATURE: f32 = 0.2;

/// The model's reply, before it is checked against the pool.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamReply {
    #[serde(default)]
    pub team: Vec<TeamPick>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamPick {
    #[serde(deserialize_with = "crate::models::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, alias = "rationale")]
    pub reason: String,
}

/// Build the system + user messages asking for a team of `team_size`.
pub fn build_team_prompt(query: &str, pool: &[CandidateMatch], team_size: usize) -> Vec<ChatMessage> {
    let wanted = team_size.min(pool.len()).max(1);

    let system = format!(
        "You are a recruiting assistant. From the candidates provided, assemble a diverse team \
         of exactly {wanted} people for the recruiter's request. Favour complementary skills, \
         a mix of seniority, and varied backgrounds and locations over picking the {wanted} \
         most similar profiles. Only choose candidates from the list, referring to them by id.\n\n\
         Respond with ONLY a JSON object, no explanation:\n\
         {{\"team\": [{{\"id\": \"<candidate id>\", \"role\": \"<role on the team>\", \
         \"reason\": \"<one sentence>\"}}], \"summary\": \"<why this team works>\"}}"
    );

    let mut user = format!("Request: {}\n\nCandidates:\n", query.trim());
    for m in pool {
        let profile = m.candidate.profile_text();
        let _ = write!(
            user,
            "\n[id: {} | similarity: {:.3}]\n{}\n",
            m.candidate.id,
            m.score,
            truncate_chars(&profile, MAX_PROFILE_CHARS)
        );
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Parse the model reply, tolerating prose or markdown fences around the JSON object.
pub fn parse_team_reply(content: &str) -> Result<TeamReply> {
    if let Ok(reply) = serde_json::from_str::<TeamReply>(content.trim()) {
        return Ok(reply);
    }

    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if start < end {
            if let Ok(reply) = serde_json::from_str::<TeamReply>(&content[start..=end]) {
                return Ok(reply);
            }
        }
    }

    anyhow::bail!("Team selection reply is not a JSON object: {content}")
}

/// Keep picks that exist in the pool, drop repeats, cap at `team_size`.
pub fn resolve_picks(reply: &TeamReply, pool: &[CandidateMatch], team_size: usize) -> Vec<TeamMember> {
    let mut seen = HashSet::new();
    let mut team = Vec::with_capacity(team_size);

    for pick in &reply.team {
        if team.len() >= team_size {
            break;
        }
        let Some(m) = pool.iter().find(|m| m.candidate.id == pick.id) else {
            tracing::warn!("Team selection picked id {} outside the candidate pool", pick.id);
            continue;
        };
        if !seen.insert(pick.id.as_str()) {
            continue;
        }
        team.push(TeamMember {
            candidate: m.candidate.clone(),
            score: m.score,
            role: pick.role.trim().to_string(),
            reason: pick.reason.trim().to_string(),
        });
    }

    team
}

/// Ask the chat model to pick a team from `pool`. Returns the members and
/// the model's summary.
pub async fn select_team(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
    pool: &[CandidateMatch],
    team_size: usize,
) -> Result<(Vec<TeamMember>, String)> {
    let messages = build_team_prompt(query, pool, team_size);
    let content = complete(client, config, &messages, SELECTION_TEMPERATURE).await?;
    let reply = parse_team_reply(&content)?;

    let team = resolve_picks(&reply, pool, team_size);
    if team.is_empty() {
        anyhow::bail!("Team selection returned no candidates from the pool");
    }
    if team.len() < team_size.min(pool.len()) {
        tracing::warn!(
            "Team selection returned {} usable picks, wanted {}",
            team.len(),
            team_size.min(pool.len())
        );
    }

    Ok((team, reply.summary.trim().to_string()))
}
