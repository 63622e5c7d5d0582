//! Payload builders for agent QR codes.

use serde::{Deserialize, Serialize};

/// Contact details typed into the QR generator form. All fields are free
/// text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub title: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        [
            &self.name,
            &self.title,
            &self.company,
            &self.phone,
            &self.email,
            &self.website,
            &self.address,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayloadMode {
    /// vCard text that phones import straight into their address book.
    #[default]
    ContactCard,
    /// Link to the public capture form, carrying the agent's identity.
    CaptureUrl,
}

pub const CAPTURE_PATH: &str = "/capture";

/// Builds the payload for `mode`. `base_origin` is only used for capture URLs.
pub fn encode_payload(info: &ContactInfo, mode: PayloadMode, base_origin: &str) -> String {
    match mode {
        PayloadMode::ContactCard => encode_contact_card(info),
        PayloadMode::CaptureUrl => encode_capture_url(info, base_origin),
    }
}

/// vCard 3.0 with one property line per non-empty field.
///
/// Values are escaped as vCard text, so a comma, semicolon or line break typed
/// into a field cannot split it into extra properties.
pub fn encode_contact_card(info: &ContactInfo) -> String {
    let fields: [(&str, &str); 7] = [
        ("FN", info.name.as_str()),
        ("TITLE", info.title.as_str()),
        ("ORG", info.company.as_str()),
        ("TEL", info.phone.as_str()),
        ("EMAIL", info.email.as_str()),
        ("URL", info.website.as_str()),
        ("ADR", info.address.as_str()),
    ];

    let mut lines = vec!["BEGIN:VCARD".to_string(), "VERSION:3.0".to_string()];
    for (property, value) in fields {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let escaped = escape_vcard_text(value);
        let line = match property {
            "TEL" => format!("TEL;TYPE=CELL:{escaped}"),
            "EMAIL" => format!("EMAIL;TYPE=INTERNET:{escaped}"),
            // street component of the structured address
            "ADR" => format!("ADR;TYPE=WORK:;;{escaped};;;;"),
            _ => format!("{property}:{escaped}"),
        };
        lines.push(line);
    }
    lines.push("END:VCARD".to_string());
    lines.join("\r\n")
}

fn escape_vcard_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// `<base_origin>/capture?agent_name=..&agent_email=..&agent_phone=..&agent_company=..`
///
/// Values are percent-encoded as typed; the capture form parses them back
/// byte for byte.
pub fn encode_capture_url(info: &ContactInfo, base_origin: &str) -> String {
    let params = [
        ("agent_name", info.name.as_str()),
        ("agent_email", info.email.as_str()),
        ("agent_phone", info.phone.as_str()),
        ("agent_company", info.company.as_str()),
    ];
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}{CAPTURE_PATH}?{query}",
        base_origin.trim().trim_end_matches('/')
    )
}
