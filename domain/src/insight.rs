//! AI-generated insights attached to a case recording.
//!
//! The insights pipeline stores its result as a JSON document in the record's
//! `insight_payload` column. It emits snake_case keys (`detailed_summary`,
//! `raw_transcript`, ...); the camelCase spellings are accepted too. Any field the
//! document leaves out falls back to the same placeholder used when there is no
//! document at all.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::error::Error;

pub const SUMMARY_PLACEHOLDER: &str = "Summary Not Found";
pub const UNKNOWN: &str = "Unknown";

/// Customer sentiment on a 0 to 10 scale, or `"Unknown"` when the pipeline gave none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SentimentScore {
    Score(f64),
    #[default]
    Unknown,
}

impl Serialize for SentimentScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            SentimentScore::Score(score) if score.fract() == 0.0 => {
                serializer.serialize_i64(score as i64)
            }
            SentimentScore::Score(score) => serializer.serialize_f64(score),
            SentimentScore::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

/// The score as found in stored documents: usually a number, occasionally quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredScore {
    Number(f64),
    Text(String),
}

impl From<StoredScore> for SentimentScore {
    fn from(stored: StoredScore) -> Self {
        let score = match stored {
            StoredScore::Number(score) => Some(score),
            StoredScore::Text(text) => text.trim().parse::<f64>().ok(),
        };
        match score {
            Some(score) if score.is_finite() => SentimentScore::Score(score),
            _ => SentimentScore::Unknown,
        }
    }
}

/// Reads a string field that may be absent or `null`; both become empty.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct ActionItem {
    #[serde(default, alias = "action_item", deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub owner: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct TranscriptEntry {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub speaker: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
struct StoredInsight {
    #[serde(default, alias = "detailed_summary")]
    summary: Option<String>,
    #[serde(default, rename = "sentimentScore", alias = "sentiment_score")]
    sentiment_score: Option<StoredScore>,
    #[serde(
        default,
        rename = "sentimentDescription",
        alias = "sentiment_description"
    )]
    sentiment_description: Option<String>,
    #[serde(default, rename = "actionItems", alias = "action_items")]
    action_items: Option<Vec<ActionItem>>,
    #[serde(default, alias = "raw_transcript")]
    transcript: Option<Vec<TranscriptEntry>>,
}

/// Insights for one recording, with placeholders filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub summary: String,
    pub sentiment_score: SentimentScore,
    pub sentiment_description: String,
    pub action_items: Vec<ActionItem>,
    pub transcript: Vec<TranscriptEntry>,
}

impl Default for Insight {
    fn default() -> Self {
        Self {
            summary: SUMMARY_PLACEHOLDER.to_string(),
            sentiment_score: SentimentScore::Unknown,
            sentiment_description: UNKNOWN.to_string(),
            action_items: vec![],
            transcript: vec![],
        }
    }
}

impl Insight {
    /// Reads a stored payload. A missing or blank payload yields placeholders; a payload
    /// that isn't valid JSON is an error.
    pub fn from_payload(payload: Option<&str>) -> Result<Self, Error> {
        let payload = match payload.map(str::trim) {
            Some(payload) if !payload.is_empty() => payload,
            _ => return Ok(Self::default()),
        };

        let stored: StoredInsight = serde_json::from_str(payload)?;
        let placeholder = Self::default();

        Ok(Self {
            summary: stored.summary.unwrap_or(placeholder.summary),
            sentiment_score: stored
                .sentiment_score
                .map(SentimentScore::from)
                .unwrap_or_default(),
            sentiment_description: stored
                .sentiment_description
                .unwrap_or(placeholder.sentiment_description),
            action_items: stored.action_items.unwrap_or_default(),
            transcript: stored.transcript.unwrap_or_default(),
        })
    }
}

/// Response body for a recording's insights: a playback URL plus the insight fields.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
    /// Time-limited URL for reading the audio.
    pub signed_url: String,
    pub summary: String,
    /// A number from 0 to 10, or the string `"Unknown"`.
    #[schema(value_type = Object)]
    pub sentiment_score: SentimentScore,
    pub sentiment_description: String,
    pub action_items: Vec<ActionItem>,
    pub transcript: Vec<TranscriptEntry>,
}

impl InsightReport {
    pub fn new(signed_url: String, insight: Insight) -> Self {
        Self {
            signed_url,
            summary: insight.summary,
            sentiment_score: insight.sentiment_score,
            sentiment_description: insight.sentiment_description,
            action_items: insight.action_items,
            transcript: insight.transcript,
        }
    }
}
