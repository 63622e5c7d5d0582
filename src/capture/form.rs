use super::params::AgentContext;
use crate::leads::{CaptureStage, CapturedLead, Interest, Priority};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} is not a valid email address")]
    InvalidEmail(String),
    #[error("Your details could not be saved, please try again")]
    NotSaved,
}

/// Fields posted by the capture form. The agent fields travel as hidden
/// inputs so the lead is attributed to whoever shared the link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaptureSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub interested_in: String,
    pub message: String,
    pub agent_name: String,
    pub agent_email: String,
    pub agent_phone: String,
    pub agent_company: String,
}

impl CaptureSubmission {
    pub fn agent(&self) -> AgentContext {
        AgentContext {
            agent_name: self.agent_name.trim().to_string(),
            agent_email: self.agent_email.trim().to_string(),
            agent_phone: self.agent_phone.trim().to_string(),
            agent_company: self.agent_company.trim().to_string(),
        }
    }

    pub fn interest(&self) -> Interest {
        Interest::from_form_value(self.interested_in.trim())
    }

    /// Presence checks only. Returns every problem found, in form order.
    pub fn validate(&self) -> Vec<CaptureError> {
        let mut errors = Vec::new();
        for (value, label) in [
            (&self.first_name, "First name"),
            (&self.last_name, "Last name"),
            (&self.email, "Email"),
        ] {
            if value.trim().is_empty() {
                errors.push(CaptureError::MissingField(label));
            }
        }

        let email = self.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.push(CaptureError::InvalidEmail(email.to_string()));
        }
        errors
    }

    pub fn into_lead(self, at: DateTime<Utc>) -> Result<CapturedLead, Vec<CaptureError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let interested_in = self.interest();
        Ok(CapturedLead {
            id: Uuid::new_v4().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            interested_in,
            message: self.message.trim().to_string(),
            stage: CaptureStage::New,
            priority: Priority::for_interest(interested_in),
            captured_at: at,
            agent_email: self.agent_email.trim().to_string(),
        })
    }
}
