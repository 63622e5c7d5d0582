use serde::{Deserialize, Serialize};

/// Agent identity carried on the capture link. Every field may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentContext {
    pub agent_name: String,
    pub agent_email: String,
    pub agent_phone: String,
    pub agent_company: String,
}

impl AgentContext {
    /// Lenient query-string parse. Unknown keys are ignored and a value that
    /// fails to percent-decode is left blank, so a mangled link still opens
    /// the form.
    pub fn from_query(raw: Option<&str>) -> Self {
        let mut context = Self::default();
        let Some(raw) = raw else {
            return context;
        };

        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match key {
                "agent_name" => &mut context.agent_name,
                "agent_email" => &mut context.agent_email,
                "agent_phone" => &mut context.agent_phone,
                "agent_company" => &mut context.agent_company,
                _ => continue,
            };
            *slot = decode_component(value).unwrap_or_default();
        }
        context
    }

    /// "You were referred by ..." line, or `None` without an agent name.
    pub fn referral_text(&self) -> Option<String> {
        let name = self.agent_name.trim();
        if name.is_empty() {
            return None;
        }
        let company = self.agent_company.trim();
        if company.is_empty() {
            Some(format!("You were referred by {name}"))
        } else {
            Some(format!("You were referred by {name} of {company}"))
        }
    }
}

fn decode_component(value: &str) -> Option<String> {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_agent_fields() {
        let ctx = AgentContext::from_query(Some(
            "agent_name=Alex%20Rivera&agent_email=alex%40example.com&agent_phone=555+0100&agent_company=Rivera%20Realty",
        ));
        assert_eq!(ctx.agent_name, "Alex Rivera");
        assert_eq!(ctx.agent_email, "alex@example.com");
        assert_eq!(ctx.agent_phone, "555 0100");
        assert_eq!(ctx.agent_company, "Rivera Realty");
        assert_eq!(
            ctx.referral_text().as_deref(),
            Some("You were referred by Alex Rivera of Rivera Realty")
        );
    }

    #[test]
    fn test_missing_query_gives_blank_context() {
        let ctx = AgentContext::from_query(None);
        assert_eq!(ctx, AgentContext::default());
        assert_eq!(ctx.referral_text(), None);
        assert_eq!(AgentContext::from_query(Some("")), AgentContext::default());
    }

    #[test]
    fn test_values_keep_surrounding_whitespace() {
        let ctx = AgentContext::from_query(Some("agent_name=%20Alex%20&agent_phone=555%20"));
        assert_eq!(ctx.agent_name, " Alex ");
        assert_eq!(ctx.agent_phone, "555 ");
        assert_eq!(ctx.referral_text().as_deref(), Some("You were referred by Alex"));
    }

    #[test]
    fn test_malformed_values_are_blank() {
        let ctx = AgentContext::from_query(Some("agent_name=%FF%FE&agent_email&utm=x&agent_phone=555"));
        assert_eq!(ctx.agent_name, "");
        assert_eq!(ctx.agent_email, "");
        assert_eq!(ctx.agent_phone, "555");
        assert_eq!(ctx.referral_text(), None);
    }
}
