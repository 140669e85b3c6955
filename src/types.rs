//! Core data model shared by the oracle client, planner and accumulator.

use crate::error::ApiError;
use crate::schedule::PostingDate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social platform a content idea targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    Linkedin,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::Linkedin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
        }
    }
}

impl FromStr for Platform {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "facebook" => Ok(Platform::Facebook),
            "twitter" | "x" => Ok(Platform::Twitter),
            "linkedin" => Ok(Platform::Linkedin),
            other => Err(ApiError::InvalidRequest(format!(
                "Unknown platform '{}' (must be instagram, facebook, twitter or linkedin)",
                other
            ))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::Linkedin => "LinkedIn",
        };
        f.write_str(label)
    }
}

/// What the oracle is told about the business for every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    pub description: String,
    pub platforms: Vec<Platform>,
}

/// Thematic category the calendar is organised around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPillar {
    Structured {
        name: String,
        keyword: String,
        questions: Vec<String>,
    },
    Label(String),
}

impl ContentPillar {
    pub fn name(&self) -> &str {
        match self {
            ContentPillar::Structured { name, .. } => name,
            ContentPillar::Label(name) => name,
        }
    }
}

/// One generated, dated unit of content for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentIdea {
    pub date: NaiveDate,
    pub platform: String,
    pub pillar: String,
    pub content_type: String,
    pub summary: String,
    pub question: String,
    pub content_idea: String,
}

/// Final artifact of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCalendar {
    pub content_pillars: Vec<ContentPillar>,
    pub content_ideas: Vec<ContentIdea>,
}

/// Contiguous slice of posting dates sent to the oracle in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub dates: Vec<PostingDate>,
    /// Size the planner asked for; `dates` is shorter only at the tail.
    pub requested_size: usize,
}

impl Batch {
    pub fn new(dates: Vec<PostingDate>, requested_size: usize) -> Self {
        Self {
            dates,
            requested_size,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> Option<PostingDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<PostingDate> {
        self.dates.last().copied()
    }

    pub fn iso_dates(&self) -> Vec<String> {
        self.dates.iter().map(PostingDate::iso).collect()
    }

    /// `first..last` label used in logs and audit entries.
    pub fn span(&self) -> String {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if first == last => first.iso(),
            (Some(first), Some(last)) => format!("{}..{}", first, last),
            _ => "empty".to_string(),
        }
    }
}

/// Validated payload of one successful oracle attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutput {
    pub pillars: Vec<ContentPillar>,
    pub ideas: Vec<ContentIdea>,
}
