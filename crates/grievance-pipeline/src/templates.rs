//! Reply template engine
//!
//! One template per category. Templates carry `{id}` (required) and
//! `{customer}` (optional) tokens which are replaced literally in one pass, so
//! substituted values are never scanned again; there is no conditional logic. Coverage of the taxonomy is checked once through
//! [`ReplyTemplates::validate_against`], not on every render.

use grievance_core::{CategoryLabel, Error, Result, Taxonomy};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

pub const ID_TOKEN: &str = "{id}";
pub const CUSTOMER_TOKEN: &str = "{customer}";

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

/// `{name}` tokens, compiled once
fn placeholder_pattern() -> Result<&'static Regex> {
    if let Some(pattern) = PLACEHOLDER.get() {
        return Ok(pattern);
    }
    let pattern = Regex::new(r"\{([A-Za-z_]+)\}")
        .map_err(|e| Error::internal(format!("placeholder pattern: {e}")))?;
    Ok(PLACEHOLDER.get_or_init(|| pattern))
}

const DELIVERY_DELAY: &str = "Subject: Update on your consignment delay - India Post

Dear {customer},

We sincerely apologize for the delay in your shipment. We have escalated this ticket (ID: #TKT-{id}) to the logistics manager.

Your updated delivery estimate is 24-48 hours. You can track it live on indiapost.gov.in using your consignment number.

Regards,
Central Support Team, India Post";

const STAFF_BEHAVIOR: &str = "Subject: Formal acknowledgment of your complaint - India Post

Dear {customer},

We take reports of staff misconduct very seriously. This incident (ID: #TKT-{id}) has been flagged for immediate disciplinary review by the Regional Superintendent.

We are committed to respectful service. A supervisor will contact you within 4 hours to resolve this.

Regards,
Vigilance Department, India Post";

const DAMAGED_LOST: &str = "Subject: Insurance Claim Process Initiated - India Post

Dear {customer},

We regret to hear about the damage. As per policy, we have activated the insurance protocol for your shipment under ticket ID: #TKT-{id}.

Please reply to this email with photos of the damaged package. Our claims team will process your refund (Form-12B) within 3 working days.

Regards,
Claims Division, India Post";

const GENERAL_INQUIRY: &str = "Subject: Information Request - India Post Support

Dear {customer},

Thank you for contacting India Post (ticket ID: #TKT-{id}). Regarding your inquiry, you can find detailed service guidelines on our official portal.

If you need specific branch details, please visit: https://www.indiapost.gov.in/locate

Regards,
Customer Care, India Post";

const FINANCIAL_SERVICES: &str = "Subject: Investment Services Assistance - India Post

Dear {customer},

India Post offers sovereign-backed interest rates on savings schemes. We have forwarded your interest (ticket ID: #TKT-{id}) to the nearest Relationship Manager.

They will reach out shortly to guide you through the PLI/RD account opening process.

Regards,
Financial Services Division, India Post";

/// Values substituted into a template
#[derive(Debug, Clone, Copy)]
pub struct ReplyParams<'a> {
    pub ticket_id: &'a str,
    pub customer_name: &'a str,
}

impl<'a> ReplyParams<'a> {
    pub fn new(ticket_id: &'a str, customer_name: &'a str) -> Self {
        Self {
            ticket_id,
            customer_name,
        }
    }
}

/// Category to template mapping
#[derive(Debug, Clone, Default)]
pub struct ReplyTemplates {
    templates: HashMap<CategoryLabel, String>,
}

impl ReplyTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full e-mail drafts for the postal categories
    pub fn postal_default() -> Self {
        Self::new()
            .with_template("Delivery Delay", DELIVERY_DELAY)
            .with_template("Staff Behavior", STAFF_BEHAVIOR)
            .with_template("Damaged/Lost", DAMAGED_LOST)
            .with_template("General Inquiry", GENERAL_INQUIRY)
            .with_template("Financial Services", FINANCIAL_SERVICES)
    }

    /// Add or replace the template for a category
    pub fn with_template(
        mut self,
        label: impl Into<CategoryLabel>,
        template: impl Into<String>,
    ) -> Self {
        self.templates.insert(label.into(), template.into());
        self
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.templates.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render the reply for `label`
    pub fn render(&self, label: &str, params: ReplyParams<'_>) -> Result<String> {
        let template = self
            .get(label)
            .ok_or_else(|| Error::TemplateMissing(label.to_string()))?;

        let pattern = placeholder_pattern()?;
        let rendered = pattern.replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "id" => params.ticket_id.to_string(),
            "customer" => params.customer_name.to_string(),
            _ => caps[0].to_string(),
        });
        Ok(rendered.into_owned())
    }

    /// Check that every taxonomy label has a template, that each template
    /// references the ticket id, and that no unknown tokens are present.
    pub fn validate_against(&self, taxonomy: &Taxonomy) -> Result<()> {
        let token = placeholder_pattern()?;

        for label in taxonomy.labels() {
            let template = self
                .get(label.as_str())
                .ok_or_else(|| Error::TemplateMissing(label.to_string()))?;

            if !template.contains(ID_TOKEN) {
                return Err(Error::config(format!(
                    "template for '{label}' does not reference {ID_TOKEN}"
                )));
            }

            for capture in token.captures_iter(template) {
                let name = &capture[1];
                if name != "id" && name != "customer" {
                    return Err(Error::config(format!(
                        "template for '{label}' uses unknown placeholder {{{name}}}"
                    )));
                }
            }
        }

        for label in self.templates.keys() {
            if !taxonomy.contains(label.as_str()) {
                warn!("Template for '{}' has no matching category", label);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_templates_cover_taxonomy() {
        let taxonomy = Taxonomy::postal_default();
        let templates = ReplyTemplates::postal_default();
        templates.validate_against(&taxonomy).unwrap();

        for label in taxonomy.labels() {
            assert!(templates.render(label.as_str(), ReplyParams::new("X", "Y")).is_ok());
        }
    }

    #[test]
    fn test_render_substitutes_tokens() {
        let templates = ReplyTemplates::postal_default();
        let reply = templates
            .render("Delivery Delay", ReplyParams::new("T1", "Asha"))
            .unwrap();

        assert!(reply.contains("#TKT-T1"));
        assert!(reply.contains("Dear Asha,"));
        assert!(!reply.contains(ID_TOKEN));
        assert!(!reply.contains(CUSTOMER_TOKEN));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let templates = ReplyTemplates::postal_default();
        let reply = templates
            .render("Delivery Delay", ReplyParams::new("{customer}", "Asha"))
            .unwrap();

        assert!(reply.contains("#TKT-{customer}"));
        assert!(reply.contains("Dear Asha,"));

        let reply = templates
            .render("Delivery Delay", ReplyParams::new("T9", "{id}"))
            .unwrap();
        assert!(reply.contains("Dear {id},"));
        assert!(reply.contains("#TKT-T9"));
    }

    #[test]
    fn test_every_default_template_carries_ticket_id() {
        let templates = ReplyTemplates::postal_default();
        for label in Taxonomy::postal_default().labels() {
            let reply = templates
                .render(label.as_str(), ReplyParams::new("ZX-42", "Customer"))
                .unwrap();
            assert!(reply.contains("ZX-42"), "{label} reply lacks ticket id");
        }
    }

    #[test]
    fn test_missing_template() {
        let templates = ReplyTemplates::new().with_template("Delivery Delay", "Ref {id}");
        let err = templates
            .render("Damaged/Lost", ReplyParams::new("T1", "A"))
            .unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(label) if label == "Damaged/Lost"));

        let err = templates
            .validate_against(&Taxonomy::postal_default())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(_)));
    }

    #[test]
    fn test_validation_rejects_bad_placeholders() {
        let taxonomy = Taxonomy::new(vec![grievance_core::CategorySpec::new(
            "Delivery Delay",
            grievance_core::PriorityLevel::Medium,
            grievance_core::SentimentLevel::Negative,
        )])
        .unwrap();

        let no_id = ReplyTemplates::new().with_template("Delivery Delay", "Dear {customer}");
        assert!(matches!(no_id.validate_against(&taxonomy), Err(Error::Config(_))));

        let unknown = ReplyTemplates::new().with_template("Delivery Delay", "{id} {branch}");
        assert!(matches!(unknown.validate_against(&taxonomy), Err(Error::Config(_))));
    }
}
