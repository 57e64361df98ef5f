use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ContentScriptError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display, strum_macros::EnumString)]
pub enum Tone {
    Informative,
    Casual,
    Comedic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display, strum_macros::EnumString)]
pub enum Length {
    #[strum(serialize = "30s")]
    #[serde(rename = "30s")]
    Short,
    #[strum(serialize = "45s")]
    #[serde(rename = "45s")]
    Medium,
    #[strum(serialize = "60s")]
    #[serde(rename = "60s")]
    Long,
}

/// Raw body of `POST /api/generate-script`.
///
/// Fields are kept optional and untyped so that a missing or unknown value is
/// reported as a 400 with the offending field instead of a generic parse error.
#[derive(Default, Deserialize)]
pub struct ScriptRequest {
    pub topic: Option<String>,
    pub tone: Option<String>,
    pub length: Option<String>,
}

pub struct ValidScriptRequest {
    pub topic: String,
    pub tone: Tone,
    pub length: Length,
}

impl ScriptRequest {
    /// An empty body is treated as a request with every field missing.
    pub fn from_body(body: &[u8]) -> Result<Self, ContentScriptError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice::<Self>(body).map_err(|e| {
            log::debug!("Invalid script request body: {}", e);

            ContentScriptError::BadRequest("Invalid JSON body".to_string())
        })
    }

    pub fn validate(self) -> Result<ValidScriptRequest, ContentScriptError> {
        let topic = self.topic.filter(|t| !t.trim().is_empty());
        let tone = self.tone.filter(|t| !t.is_empty());
        let length = self.length.filter(|l| !l.is_empty());

        let mut missing = vec![];
        if topic.is_none() {
            missing.push("topic");
        }
        if tone.is_none() {
            missing.push("tone");
        }
        if length.is_none() {
            missing.push("length");
        }

        match (topic, tone, length) {
            (Some(topic), Some(tone), Some(length)) => {
                let tone = Tone::from_str(&tone).map_err(|_| {
                    ContentScriptError::ValidationError((
                        "tone".to_string(),
                        format!("must be one of Informative, Casual, Comedic, got {}", tone),
                    ))
                })?;
                let length = Length::from_str(&length).map_err(|_| {
                    ContentScriptError::ValidationError((
                        "length".to_string(),
                        format!("must be one of 30s, 45s, 60s, got {}", length),
                    ))
                })?;

                Ok(ValidScriptRequest {
                    topic: topic.trim().to_string(),
                    tone,
                    length,
                })
            }
            _ => Err(ContentScriptError::MissingFields(missing)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Script {
    pub hook: String,
    pub body: String,
    pub cta: String,
}

impl Script {
    /// Fills the fixed template for `tone` with `topic`. Length does not affect the output.
    pub fn generate(topic: &str, tone: Tone) -> Self {
        match tone {
            Tone::Informative => Self {
                hook: format!("Here's something most people don't know about {}...", topic),
                body: format!(
                    "When it comes to {}, there are three key things you need to understand. \
                     First, the fundamentals matter more than you think. Second, consistency beats \
                     intensity every single time. And third, the best time to start was yesterday, \
                     but the second best time is right now.",
                    topic
                ),
                cta: format!(
                    "Follow for more insights on {}. Save this for later and share with someone who \
                     needs to hear this.",
                    topic
                ),
            },
            Tone::Casual => Self {
                hook: format!("Okay so let's talk about {} real quick...", topic),
                body: format!(
                    "So here's the deal with {}. I've been doing this for a while now and honestly? \
                     It's not as hard as people make it seem. The trick is to just start small and \
                     build from there. Don't overthink it.",
                    topic
                ),
                cta: format!(
                    "If this was helpful, smash that follow button. Drop a comment if you want more {} content!",
                    topic
                ),
            },
            Tone::Comedic => Self {
                hook: format!("I tried {} so you don't have to. Here's what happened...", topic),
                body: format!(
                    "{} is like my love life - confusing, occasionally rewarding, and my mom keeps \
                     asking me about it. But seriously, once you get past the initial awkwardness, \
                     it's actually pretty great.",
                    topic
                ),
                cta: "Follow if you laughed. Or don't. I'm not your mom. But she'd want you to follow. Call your mom."
                    .to_string(),
            },
        }
    }
}
