//! Outbound skill response envelope and builders

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseBody {
    #[serde(rename = "outputSpeech")]
    pub output_speech: OutputSpeech,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(rename = "shouldEndSession")]
    pub should_end_session: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    PlainText { text: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    Simple { title: String, content: String },
    LinkAccount,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reprompt {
    #[serde(rename = "outputSpeech")]
    pub output_speech: OutputSpeech,
}

impl SkillResponse {
    fn build(text: &str, should_end_session: bool) -> Self {
        Self {
            version: "1.0".to_string(),
            response: ResponseBody {
                output_speech: OutputSpeech::PlainText {
                    text: text.to_string(),
                },
                card: None,
                reprompt: None,
                should_end_session,
            },
        }
    }

    /// Speech only, session ends.
    pub fn tell(text: &str) -> Self {
        Self::build(text, true)
    }

    /// Speech plus reprompt, session stays open.
    pub fn ask(text: &str, reprompt: &str) -> Self {
        let mut resp = Self::build(text, false);
        resp.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::PlainText {
                text: reprompt.to_string(),
            },
        });
        resp
    }

    pub fn with_card(mut self, title: &str, content: &str) -> Self {
        self.response.card = Some(Card::Simple {
            title: title.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Account-linking prompt: speech, LinkAccount card, session ends.
    pub fn link_account(text: &str) -> Self {
        let mut resp = Self::build(text, true);
        resp.response.card = Some(Card::LinkAccount);
        resp
    }

    pub fn speech_text(&self) -> &str {
        let OutputSpeech::PlainText { text } = &self.response.output_speech;
        text
    }
}
