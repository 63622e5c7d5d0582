use super::form::{CaptureError, CaptureSubmission};
use super::params::AgentContext;
use crate::core::shared::utils::html_escape;
use crate::leads::{CapturedLead, Interest};

const CSS: &str = r#"
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",sans-serif;background:#f6f8fa;color:#1f2328;margin:0}
.card{max-width:480px;margin:2rem auto;background:#fff;border:1px solid #d0d7de;border-radius:12px;padding:1.5rem}
h1{font-size:1.4rem;margin:0 0 .5rem}
.referral{color:#57606a;margin-bottom:1rem}
.form-group{margin-bottom:.75rem}
.form-group label{display:block;font-size:.85rem;color:#57606a;margin-bottom:.25rem}
input,select,textarea{width:100%;box-sizing:border-box;padding:.5rem;border:1px solid #d0d7de;border-radius:6px;font:inherit}
.btn{width:100%;padding:.6rem;border:0;border-radius:6px;background:#1f6feb;color:#fff;font-weight:600}
.errors{background:#ffebe9;border:1px solid #ff8182;color:#82071e;padding:.75rem;border-radius:6px;margin-bottom:1rem}
.success-msg{background:#dafbe1;border:1px solid #4ac26b;color:#116329;padding:1rem;border-radius:8px}
"#;

fn wrap(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title><style>{CSS}</style></head>
<body><div class="card">{body}</div></body></html>"#,
        title = html_escape(title),
    )
}

fn referral_html(agent: &AgentContext) -> String {
    agent
        .referral_text()
        .map(|text| format!(r#"<p class="referral">{}</p>"#, html_escape(&text)))
        .unwrap_or_default()
}

fn hidden(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{name}" value="{}">"#,
        html_escape(value)
    )
}

fn interest_options(selected: Interest) -> String {
    [
        Interest::Buying,
        Interest::Selling,
        Interest::Renting,
        Interest::Other,
    ]
    .iter()
    .map(|i| {
        let mark = if *i == selected { " selected" } else { "" };
        format!(r#"<option value="{i}"{mark}>{}</option>"#, i.label())
    })
    .collect()
}

/// Capture form, optionally pre-filled with a rejected submission and its
/// validation errors.
pub fn render_form(
    agent: &AgentContext,
    previous: Option<&CaptureSubmission>,
    errors: &[CaptureError],
) -> String {
    let blank = CaptureSubmission::default();
    let values = previous.unwrap_or(&blank);
    let selected = if previous.is_some() {
        values.interest()
    } else {
        Interest::default()
    };

    let errors_html = if errors.is_empty() {
        String::new()
    } else {
        let items: String = errors
            .iter()
            .map(|e| format!("<li>{}</li>", html_escape(&e.to_string())))
            .collect();
        format!(r#"<div class="errors"><ul>{items}</ul></div>"#)
    };

    let body = format!(
        r#"<h1>Get in touch</h1>
{referral}{errors_html}
<form method="POST" action="/capture">
{h_name}{h_email}{h_phone}{h_company}
<div class="form-group"><label>First name</label><input type="text" name="first_name" value="{first}" required></div>
<div class="form-group"><label>Last name</label><input type="text" name="last_name" value="{last}" required></div>
<div class="form-group"><label>Email</label><input type="email" name="email" value="{email}" required></div>
<div class="form-group"><label>Phone</label><input type="tel" name="phone" value="{phone}"></div>
<div class="form-group"><label>I'm interested in</label><select name="interested_in">{options}</select></div>
<div class="form-group"><label>Message</label><textarea name="message" rows="3">{message}</textarea></div>
<button class="btn" type="submit">Send</button>
</form>"#,
        referral = referral_html(agent),
        h_name = hidden("agent_name", &agent.agent_name),
        h_email = hidden("agent_email", &agent.agent_email),
        h_phone = hidden("agent_phone", &agent.agent_phone),
        h_company = hidden("agent_company", &agent.agent_company),
        first = html_escape(&values.first_name),
        last = html_escape(&values.last_name),
        email = html_escape(&values.email),
        phone = html_escape(&values.phone),
        options = interest_options(selected),
        message = html_escape(&values.message),
    );
    wrap("Contact an agent", &body)
}

pub fn render_confirmation(lead: &CapturedLead, agent: &AgentContext) -> String {
    let follow_up = match agent.agent_name.trim() {
        "" => "An agent will be in touch soon.".to_string(),
        name => format!("{} will be in touch soon.", html_escape(name)),
    };
    let body = format!(
        r#"<div class="success-msg"><h1>Thanks, {first}!</h1><p>We received your details. {follow_up}</p></div>"#,
        first = html_escape(&lead.first_name),
    );
    wrap("Thank you", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_shows_referral_and_hidden_agent() {
        let agent = AgentContext {
            agent_name: "Alex <Rivera>".to_string(),
            agent_email: "alex@example.com".to_string(),
            ..AgentContext::default()
        };
        let html = render_form(&agent, None, &[]);
        assert!(html.contains("You were referred by Alex &lt;Rivera&gt;"));
        assert!(html.contains(r#"name="agent_email" value="alex@example.com""#));
        assert!(html.contains(r#"<option value="buying" selected>"#));
        assert!(!html.contains("class=\"errors\""));
    }

    #[test]
    fn test_form_without_agent_has_no_referral() {
        let html = render_form(&AgentContext::default(), None, &[]);
        assert!(!html.contains("referred by"));
        assert!(html.contains(r#"name="agent_name" value="""#));
    }

    #[test]
    fn test_form_redisplays_errors_and_values() {
        let previous = CaptureSubmission {
            first_name: "Jane".to_string(),
            interested_in: "renting".to_string(),
            ..CaptureSubmission::default()
        };
        let errors = previous.validate();
        let html = render_form(&AgentContext::default(), Some(&previous), &errors);
        assert!(html.contains("<li>Last name is required</li>"));
        assert!(html.contains(r#"name="first_name" value="Jane""#));
        assert!(html.contains(r#"<option value="renting" selected>"#));
    }
}
