use crate::domain::forms::{FieldKind, FormField, DATETIME_STORAGE_FORMAT, DATE_INPUT_FORMAT};
use crate::domain::model::EmailMessage;
use crate::domain::pages::ContactPage;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

const SHORT_DATE_FORMAT: &str = "%d/%m/%Y";
const SHORT_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Human-readable form of one cleaned value.
pub fn display_value(field: &FormField, value: &Value) -> String {
    match (field.field_type, value) {
        (FieldKind::Date, Value::String(s)) => NaiveDate::parse_from_str(s, DATE_INPUT_FORMAT)
            .map(|d| d.format(SHORT_DATE_FORMAT).to_string())
            .unwrap_or_else(|_| s.clone()),
        (FieldKind::DateTime, Value::String(s)) => {
            NaiveDateTime::parse_from_str(s, DATETIME_STORAGE_FORMAT)
                .map(|d| d.format(SHORT_DATETIME_FORMAT).to_string())
                .unwrap_or_else(|_| s.clone())
        }
        (_, Value::String(s)) => s.clone(),
        (_, Value::Bool(true)) => "True".to_string(),
        (_, Value::Bool(false)) => "False".to_string(),
        (_, Value::Null) => String::new(),
        (_, Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        (_, other) => other.to_string(),
    }
}

/// One `Label: value` line per field, in form order.
pub fn render_email_body(page: &ContactPage, form_data: &Map<String, Value>) -> String {
    page.fields()
        .into_iter()
        .filter_map(|field| {
            form_data
                .get(&field.key())
                .map(|value| format!("{}: {}", field.label, display_value(field, value)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn compose_email(page: &ContactPage, form_data: &Map<String, Value>) -> EmailMessage {
    EmailMessage {
        from: page.from_address.trim().to_string(),
        to: page.recipients(),
        subject: page.subject.clone(),
        body: render_email_body(page, form_data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> ContactPage {
        ContactPage {
            to_address: "hello@agence.fr, team@agence.fr".to_string(),
            ..Default::default()
        }
        .with_field(FormField::new("Nom", FieldKind::SingleLine))
        .with_field(FormField::new("Services", FieldKind::Checkboxes).with_choices(&["Site", "SEO"]))
        .with_field(FormField::new("Newsletter", FieldKind::Checkbox).optional())
        .with_field(FormField::new("Date souhaitée", FieldKind::Date).optional())
        .with_field(FormField::new("Rappel", FieldKind::DateTime).optional())
    }

    #[test]
    fn test_render_email_body() {
        let data = json!({
            "nom": "Jeanne",
            "services": ["Site", "SEO"],
            "newsletter": true,
            "date_souhaitée": "2025-03-01",
            "rappel": "2025-03-01T14:30:00"
        });
        let body = render_email_body(&page(), data.as_object().unwrap());
        assert_eq!(
            body,
            "Nom: Jeanne\nServices: Site, SEO\nNewsletter: True\nDate souhaitée: 01/03/2025\nRappel: 01/03/2025 14:30"
        );
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let data = json!({ "nom": "Jeanne" });
        let body = render_email_body(&page(), data.as_object().unwrap());
        assert_eq!(body, "Nom: Jeanne");
    }

    #[test]
    fn test_compose_email_routing() {
        let data = json!({ "nom": "Jeanne" });
        let message = compose_email(&page(), data.as_object().unwrap());
        assert_eq!(message.from, "noreply@monsite.com");
        assert_eq!(message.to, vec!["hello@agence.fr", "team@agence.fr"]);
        assert_eq!(message.subject, "Nouveau message depuis votre site vitrine");
    }
}
