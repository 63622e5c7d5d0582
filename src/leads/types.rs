use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Interest {
    #[default]
    Buying,
    Selling,
    Renting,
    Other,
}

impl Interest {
    pub fn label(self) -> &'static str {
        match self {
            Self::Buying => "Buying",
            Self::Selling => "Selling",
            Self::Renting => "Renting",
            Self::Other => "Other",
        }
    }

    /// Lenient parse used for form input: anything unrecognised is `Other`.
    pub fn from_form_value(value: &str) -> Self {
        value.parse().unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for Interest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buying => write!(f, "buying"),
            Self::Selling => write!(f, "selling"),
            Self::Renting => write!(f, "renting"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Interest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buying" => Ok(Self::Buying),
            "selling" => Ok(Self::Selling),
            "renting" => Ok(Self::Renting),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown interest '{other}'")),
        }
    }
}

/// Follow-up stage of a lead captured through a QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStage {
    #[default]
    New,
    Contacted,
    Qualified,
    Showing,
    Offer,
    Negotiating,
    Closed,
}

impl CaptureStage {
    pub const ALL: [CaptureStage; 7] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Showing,
        Self::Offer,
        Self::Negotiating,
        Self::Closed,
    ];
}

impl std::fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Contacted => write!(f, "contacted"),
            Self::Qualified => write!(f, "qualified"),
            Self::Showing => write!(f, "showing"),
            Self::Offer => write!(f, "offer"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for CaptureStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.to_string() == s.trim())
            .ok_or_else(|| format!("unknown capture stage '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Buyers and sellers are worked first, renters next, everything else last.
    pub fn for_interest(interest: Interest) -> Self {
        match interest {
            Interest::Buying | Interest::Selling => Self::High,
            Interest::Renting => Self::Medium,
            Interest::Other => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedLead {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub interested_in: Interest,
    pub message: String,
    pub stage: CaptureStage,
    pub priority: Priority,
    pub captured_at: DateTime<Utc>,
    pub agent_email: String,
}

impl CapturedLead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStageRequest {
    pub stage: CaptureStage,
}
