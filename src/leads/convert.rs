use super::types::{CaptureStage, CapturedLead};
use crate::pipeline::{Activity, ActivityKind, Lead, PipelineStage};
use chrono::{DateTime, Utc};

pub const QR_CAPTURE_SOURCE: &str = "QR Code";
pub const QR_CAPTURE_TAG: &str = "qr-capture";

impl From<CaptureStage> for PipelineStage {
    fn from(stage: CaptureStage) -> Self {
        match stage {
            CaptureStage::New => Self::New,
            CaptureStage::Contacted => Self::Contacted,
            CaptureStage::Qualified => Self::Qualified,
            CaptureStage::Showing => Self::Showing,
            CaptureStage::Offer => Self::Offer,
            CaptureStage::Negotiating => Self::Negotiating,
            CaptureStage::Closed => Self::Closed,
        }
    }
}

/// Maps a captured lead onto a pipeline lead owned by `owner_id`.
///
/// The capture form does not ask for a budget, so `value` starts at zero and
/// `probability` is the stage default. The pipeline id is fresh; the captured
/// lead's id is kept in the notes trail.
pub fn convert_to_pipeline_lead(
    captured: &CapturedLead,
    owner_id: &str,
    at: DateTime<Utc>,
) -> Lead {
    let stage = PipelineStage::from(captured.stage);
    let mut notes = captured.message.trim().to_string();
    if !notes.is_empty() {
        notes.push_str("\n\n");
    }
    notes.push_str(&format!(
        "Captured via QR code on {} (capture id {})",
        captured.captured_at.format("%Y-%m-%d"),
        captured.id
    ));

    Lead {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        name: captured.full_name(),
        email: captured.email.clone(),
        phone: captured.phone.clone(),
        source: QR_CAPTURE_SOURCE.to_string(),
        stage,
        value: 0.0,
        probability: stage.default_probability(),
        notes,
        created_at: at,
        updated_at: at,
        tags: vec![
            QR_CAPTURE_TAG.to_string(),
            captured.interested_in.to_string(),
        ],
        priority: captured.priority,
        property_interest: captured.interested_in.label().to_string(),
        activities: vec![Activity::new(
            ActivityKind::Created,
            format!("Converted from QR capture for {}", captured.agent_email),
            at,
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::types::{Interest, Priority};
    use chrono::TimeZone;

    fn captured() -> CapturedLead {
        CapturedLead {
            id: "cap-1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "555-0000".to_string(),
            interested_in: Interest::Selling,
            message: "Looking to list in June".to_string(),
            stage: CaptureStage::Offer,
            priority: Priority::High,
            captured_at: Utc.with_ymd_and_hms(2026, 4, 2, 10, 30, 0).unwrap(),
            agent_email: "agent@x.com".to_string(),
        }
    }

    #[test]
    fn test_conversion_maps_fields_and_fills_defaults() {
        let at = Utc.with_ymd_and_hms(2026, 4, 3, 8, 0, 0).unwrap();
        let lead = convert_to_pipeline_lead(&captured(), "user-7", at);

        assert_eq!(lead.owner_id, "user-7");
        assert_eq!(lead.name, "Jane Doe");
        assert_eq!(lead.email, "jane@x.com");
        assert_eq!(lead.phone, "555-0000");
        assert_eq!(lead.source, QR_CAPTURE_SOURCE);
        assert_eq!(lead.stage, PipelineStage::Offer);
        assert_eq!(lead.value, 0.0);
        assert_eq!(lead.probability, 70);
        assert_eq!(lead.tags, vec!["qr-capture".to_string(), "selling".to_string()]);
        assert_eq!(lead.priority, Priority::High);
        assert_eq!(lead.property_interest, "Selling");
        assert_eq!(lead.created_at, at);
        assert!(lead.notes.starts_with("Looking to list in June"));
        assert!(lead.notes.contains("capture id cap-1"));
        assert_eq!(lead.activities.len(), 1);
    }

    #[test]
    fn test_closed_capture_lands_in_closed_column() {
        let mut lead = captured();
        lead.stage = CaptureStage::Closed;
        lead.message.clear();
        let converted = convert_to_pipeline_lead(&lead, "user-7", Utc::now());
        assert_eq!(converted.stage, PipelineStage::Closed);
        assert!(converted.notes.starts_with("Captured via QR code"));
    }
}
