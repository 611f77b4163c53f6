//! Inbound skill event envelope
//!
//! User identity and the embedded access token can live in more than one
//! place depending on the channel, so extraction is an ordered list of
//! strategies tried in sequence.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct SkillEvent {
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<EventContext>,
    pub request: Request,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user: Option<EventUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventContext {
    #[serde(default, rename = "System")]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemContext {
    #[serde(default)]
    pub user: Option<EventUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventUser {
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    LaunchRequest,
    IntentRequest {
        intent: Intent,
    },
    SessionEndedRequest {
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub resolutions: Option<Resolutions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resolutions {
    #[serde(default, rename = "resolutionsPerAuthority")]
    pub per_authority: Vec<Authority>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Authority {
    #[serde(default)]
    pub values: Vec<AuthorityValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityValue {
    pub value: NamedValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedValue {
    pub name: String,
}

impl SkillEvent {
    /// User id: session user first, then the context system user.
    pub fn user_id(&self) -> Option<&str> {
        let strategies: [fn(&SkillEvent) -> Option<&str>; 2] = [
            |e| e.session.as_ref()?.user.as_ref()?.user_id.as_deref(),
            |e| e.context.as_ref()?.system.as_ref()?.user.as_ref()?.user_id.as_deref(),
        ];
        strategies.iter().find_map(|s| s(self))
    }

    /// Access token embedded by a pre-authenticated channel, if any.
    pub fn access_token(&self) -> Option<&str> {
        let strategies: [fn(&SkillEvent) -> Option<&str>; 2] = [
            |e| e.session.as_ref()?.user.as_ref()?.access_token.as_deref(),
            |e| {
                e.context
                    .as_ref()?
                    .system
                    .as_ref()?
                    .user
                    .as_ref()?
                    .access_token
                    .as_deref()
            },
        ];
        strategies.iter().find_map(|s| s(self))
    }
}

impl Intent {
    /// Spoken slot value: the literal value first, then the first
    /// resolution authority match.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        let slot = self.slots.get(name)?;
        if let Some(value) = slot.value.as_deref().filter(|v| !v.is_empty()) {
            return Some(value);
        }
        slot.resolutions
            .as_ref()?
            .per_authority
            .iter()
            .flat_map(|a| a.values.iter())
            .map(|v| v.value.name.as_str())
            .next()
    }
}
