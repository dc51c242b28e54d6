//! Editor-defined form schemas and the generic validation applied to
//! visitor submissions.
//!
//! Each `FieldKind` maps to a `FieldRule` (blank check + parser) in a static
//! table. Nothing here knows about a particular page's fields; the list of
//! `FormField` rows is the schema.

use crate::utils::error::FieldError;
use crate::utils::validation::{check_char_field, is_valid_email, parse_http_url};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LABEL_MAX_LENGTH: usize = 255;
pub const HELP_TEXT_MAX_LENGTH: usize = 255;

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[serde(rename = "singleline")]
    SingleLine,
    #[serde(rename = "multiline")]
    MultiLine,
    Email,
    Number,
    Url,
    Checkbox,
    Checkboxes,
    Dropdown,
    #[serde(rename = "multiselect")]
    MultiSelect,
    Radio,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Hidden,
}

impl FieldKind {
    pub const ALL: [FieldKind; 13] = [
        FieldKind::SingleLine,
        FieldKind::MultiLine,
        FieldKind::Email,
        FieldKind::Number,
        FieldKind::Url,
        FieldKind::Checkbox,
        FieldKind::Checkboxes,
        FieldKind::Dropdown,
        FieldKind::MultiSelect,
        FieldKind::Radio,
        FieldKind::Date,
        FieldKind::DateTime,
        FieldKind::Hidden,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::SingleLine => "Single line text",
            FieldKind::MultiLine => "Multi-line text",
            FieldKind::Email => "Email",
            FieldKind::Number => "Number",
            FieldKind::Url => "URL",
            FieldKind::Checkbox => "Checkbox",
            FieldKind::Checkboxes => "Checkboxes",
            FieldKind::Dropdown => "Drop down",
            FieldKind::MultiSelect => "Multiple select",
            FieldKind::Radio => "Radio buttons",
            FieldKind::Date => "Date",
            FieldKind::DateTime => "Date/time",
            FieldKind::Hidden => "Hidden field",
        }
    }

    /// Kinds whose values must come from the field's `choices`.
    pub fn uses_choices(&self) -> bool {
        matches!(
            self,
            FieldKind::Checkboxes | FieldKind::Dropdown | FieldKind::MultiSelect | FieldKind::Radio
        )
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, FieldKind::Checkboxes | FieldKind::MultiSelect)
    }

    pub fn rule(&self) -> &'static FieldRule {
        RULES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, rule)| rule)
            .unwrap_or(&RULES[0].1)
    }
}

type Parser = fn(&FormField, &[String]) -> Result<Value, String>;

/// Blank check and parser for one field kind.
pub struct FieldRule {
    pub is_blank: fn(&[String]) -> bool,
    pub parse: Parser,
    /// Stored for optional fields left empty.
    pub blank_value: fn() -> Value,
}

const TEXT_RULE: FieldRule = FieldRule {
    is_blank: blank_text,
    parse: parse_text,
    blank_value: empty_string,
};

static RULES: [(FieldKind, FieldRule); 13] = [
    (FieldKind::SingleLine, TEXT_RULE),
    (FieldKind::MultiLine, TEXT_RULE),
    (FieldKind::Hidden, TEXT_RULE),
    (
        FieldKind::Email,
        FieldRule {
            is_blank: blank_text,
            parse: parse_email,
            blank_value: empty_string,
        },
    ),
    (
        FieldKind::Number,
        FieldRule {
            is_blank: blank_text,
            parse: parse_number,
            blank_value: null,
        },
    ),
    (
        FieldKind::Url,
        FieldRule {
            is_blank: blank_text,
            parse: parse_url,
            blank_value: empty_string,
        },
    ),
    (
        FieldKind::Checkbox,
        FieldRule {
            is_blank: blank_checkbox,
            parse: parse_checkbox,
            blank_value: unchecked,
        },
    ),
    (
        FieldKind::Checkboxes,
        FieldRule {
            is_blank: blank_text,
            parse: parse_multi_choice,
            blank_value: empty_list,
        },
    ),
    (
        FieldKind::MultiSelect,
        FieldRule {
            is_blank: blank_text,
            parse: parse_multi_choice,
            blank_value: empty_list,
        },
    ),
    (
        FieldKind::Dropdown,
        FieldRule {
            is_blank: blank_text,
            parse: parse_single_choice,
            blank_value: empty_string,
        },
    ),
    (
        FieldKind::Radio,
        FieldRule {
            is_blank: blank_text,
            parse: parse_single_choice,
            blank_value: empty_string,
        },
    ),
    (
        FieldKind::Date,
        FieldRule {
            is_blank: blank_text,
            parse: parse_date,
            blank_value: null,
        },
    ),
    (
        FieldKind::DateTime,
        FieldRule {
            is_blank: blank_text,
            parse: parse_datetime,
            blank_value: null,
        },
    ),
];

fn empty_string() -> Value {
    Value::String(String::new())
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn null() -> Value {
    Value::Null
}

fn unchecked() -> Value {
    Value::Bool(false)
}

fn blank_text(values: &[String]) -> bool {
    values.iter().all(|v| v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "off" | "no"
    )
}

fn blank_checkbox(values: &[String]) -> bool {
    !values.iter().any(|v| is_truthy(v))
}

fn first(values: &[String]) -> &str {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

fn parse_text(_field: &FormField, values: &[String]) -> Result<Value, String> {
    Ok(Value::String(first(values).to_string()))
}

fn parse_email(_field: &FormField, values: &[String]) -> Result<Value, String> {
    let value = first(values);
    if is_valid_email(value) {
        Ok(Value::String(value.to_string()))
    } else {
        Err("Enter a valid email address.".to_string())
    }
}

fn parse_number(_field: &FormField, values: &[String]) -> Result<Value, String> {
    let value = first(values);
    if let Ok(int) = value.parse::<i64>() {
        return Ok(Value::from(int));
    }
    value
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| "Enter a number.".to_string())
}

fn parse_url(_field: &FormField, values: &[String]) -> Result<Value, String> {
    parse_http_url(first(values))
        .map(|url| Value::String(url.to_string()))
        .map_err(|_| "Enter a valid URL.".to_string())
}

fn parse_checkbox(_field: &FormField, values: &[String]) -> Result<Value, String> {
    Ok(Value::Bool(!blank_checkbox(values)))
}

fn invalid_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}

fn parse_single_choice(field: &FormField, values: &[String]) -> Result<Value, String> {
    let value = first(values);
    if field.choice_list().iter().any(|c| c == value) {
        Ok(Value::String(value.to_string()))
    } else {
        Err(invalid_choice(value))
    }
}

fn parse_multi_choice(field: &FormField, values: &[String]) -> Result<Value, String> {
    let choices = field.choice_list();
    let mut selected = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !choices.iter().any(|c| c == value) {
            return Err(invalid_choice(value));
        }
        selected.push(Value::String(value.to_string()));
    }
    Ok(Value::Array(selected))
}

fn parse_date(_field: &FormField, values: &[String]) -> Result<Value, String> {
    NaiveDate::parse_from_str(first(values), DATE_INPUT_FORMAT)
        .map(|date| Value::String(date.format(DATE_INPUT_FORMAT).to_string()))
        .map_err(|_| "Enter a valid date.".to_string())
}

fn parse_datetime(_field: &FormField, values: &[String]) -> Result<Value, String> {
    let value = first(values);
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| Value::String(dt.format(DATETIME_STORAGE_FORMAT).to_string()))
        .ok_or_else(|| "Enter a valid date/time.".to_string())
}

/// ASCII snake_case identifier derived from a field label. Accented
/// letters are transliterated so submission keys stay plain ASCII.
pub fn clean_name(label: &str) -> String {
    slug::slugify(label).replace('-', "_")
}

/// Split a choices string: one per line if it has line breaks, otherwise
/// comma-separated.
pub fn parse_choices(choices: &str) -> Vec<String> {
    let separator = if choices.contains('\n') { '\n' } else { ',' };
    choices
        .split(separator)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_required() -> bool {
    true
}

/// One input of a contact form, owned by its ContactPage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub clean_name: String,
    pub label: String,
    pub field_type: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub choices: String,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub help_text: String,
}

impl FormField {
    pub fn new(label: impl Into<String>, field_type: FieldKind) -> Self {
        let label = label.into();
        Self {
            sort_order: 0,
            clean_name: clean_name(&label),
            label,
            field_type,
            required: true,
            choices: String::new(),
            default_value: String::new(),
            help_text: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.join("\n");
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    /// Key under which this field's value is submitted and stored.
    pub fn key(&self) -> String {
        if self.clean_name.is_empty() {
            clean_name(&self.label)
        } else {
            self.clean_name.clone()
        }
    }

    pub fn choice_list(&self) -> Vec<String> {
        parse_choices(&self.choices)
    }

    /// Editor-side checks on the field definition itself.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_char_field(&mut errors, "label", &self.label, Some(LABEL_MAX_LENGTH), true);
        check_char_field(
            &mut errors,
            "help_text",
            &self.help_text,
            Some(HELP_TEXT_MAX_LENGTH),
            false,
        );
        if errors.is_empty() && self.key().is_empty() {
            errors.push(FieldError::new(
                "label",
                "The label must contain at least one letter or digit.",
            ));
        }
        if self.field_type.uses_choices() && self.choice_list().is_empty() {
            errors.push(FieldError::new(
                "choices",
                format!("{} fields need at least one choice.", self.field_type.label()),
            ));
        }
        errors
    }
}

/// Raw visitor input: every key may carry several values, as with a
/// multi-select or a set of checkboxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, Vec<String>>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn values(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (key, value) in iter {
            data.append(key, value);
        }
        data
    }
}

/// Fields ordered as the visitor sees them.
pub fn ordered(fields: &[FormField]) -> Vec<&FormField> {
    let mut ordered: Vec<&FormField> = fields.iter().collect();
    ordered.sort_by_key(|f| f.sort_order);
    ordered
}

/// Validate a submission against the field list and return the cleaned
/// values keyed by clean name. Keys not in the schema are ignored.
pub fn clean_form(
    fields: &[FormField],
    data: &FormData,
) -> std::result::Result<Map<String, Value>, Vec<FieldError>> {
    let mut cleaned = Map::new();
    let mut errors = Vec::new();

    for field in ordered(fields) {
        let key = field.key();
        let values = data.values(&key);
        let rule = field.field_type.rule();

        if (rule.is_blank)(values) {
            if field.required {
                errors.push(FieldError::required(key));
            } else {
                cleaned.insert(key, (rule.blank_value)());
            }
            continue;
        }

        match (rule.parse)(field, values) {
            Ok(value) => {
                cleaned.insert(key, value);
            }
            Err(message) => errors.push(FieldError::new(key, message)),
        }
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact_fields() -> Vec<FormField> {
        let mut fields = vec![
            FormField::new("Nom complet", FieldKind::SingleLine),
            FormField::new("Email", FieldKind::Email),
            FormField::new("Budget", FieldKind::Dropdown).with_choices(&["< 1000€", "1000€ +"]),
            FormField::new("Message", FieldKind::MultiLine),
            FormField::new("Newsletter", FieldKind::Checkbox).optional(),
        ];
        for (i, field) in fields.iter_mut().enumerate() {
            field.sort_order = i as i32;
        }
        fields
    }

    #[test]
    fn test_every_kind_has_a_rule() {
        for kind in FieldKind::ALL {
            assert!(RULES.iter().any(|(k, _)| *k == kind), "{:?} missing", kind);
        }
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("Nom complet"), "nom_complet");
        assert_eq!(clean_name("  Your e-mail address? "), "your_e_mail_address");
        assert_eq!(clean_name("Téléphone"), "telephone");
        assert_eq!(clean_name("Adresse de livraison (numéro, rue)"), "adresse_de_livraison_numero_rue");
        assert_eq!(clean_name("!!!"), "");
    }

    #[test]
    fn test_parse_choices() {
        assert_eq!(parse_choices("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_choices("1,5\n2,5\n"), vec!["1,5", "2,5"]);
        assert!(parse_choices("  ").is_empty());
    }

    #[test]
    fn test_valid_submission_is_cleaned() {
        let data = FormData::new()
            .with("nom_complet", "  Jeanne Martin ")
            .with("email", "jeanne@example.com")
            .with("budget", "1000€ +")
            .with("message", "Bonjour")
            .with("unknown", "ignored");

        let cleaned = clean_form(&contact_fields(), &data).unwrap();
        assert_eq!(cleaned["nom_complet"], json!("Jeanne Martin"));
        assert_eq!(cleaned["budget"], json!("1000€ +"));
        assert_eq!(cleaned["newsletter"], json!(false));
        assert!(!cleaned.contains_key("unknown"));
    }

    #[test]
    fn test_missing_required_value_rejected() {
        let data = FormData::new()
            .with("nom_complet", "Jeanne")
            .with("email", "   ")
            .with("budget", "< 1000€");

        let errors = clean_form(&contact_fields(), &data).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::required("email"), FieldError::required("message")]
        );
    }

    #[test]
    fn test_kind_specific_formats() {
        let fields = vec![
            FormField::new("Email", FieldKind::Email),
            FormField::new("Age", FieldKind::Number),
            FormField::new("Site", FieldKind::Url),
            FormField::new("Jour", FieldKind::Date),
            FormField::new("Rendez-vous", FieldKind::DateTime),
        ];
        let bad = FormData::new()
            .with("email", "nope")
            .with("age", "douze")
            .with("site", "ftp://example.com")
            .with("jour", "31/12/2024")
            .with("rendez_vous", "tomorrow");
        let errors = clean_form(&fields, &bad).unwrap_err();
        assert_eq!(errors.len(), 5);

        let good = FormData::new()
            .with("email", "a@example.com")
            .with("age", "12")
            .with("site", "https://example.com")
            .with("jour", "2024-12-31")
            .with("rendez_vous", "2024-12-31 09:30");
        let cleaned = clean_form(&fields, &good).unwrap();
        assert_eq!(cleaned["age"], json!(12));
        assert_eq!(cleaned["site"], json!("https://example.com/"));
        assert_eq!(cleaned["rendez_vous"], json!("2024-12-31T09:30:00"));
    }

    #[test]
    fn test_multi_choice() {
        let fields = vec![FormField::new("Services", FieldKind::Checkboxes)
            .with_choices(&["Site", "SEO", "Logo"])];

        let data = FormData::new().with("services", "Site").with("services", "Logo");
        let cleaned = clean_form(&fields, &data).unwrap();
        assert_eq!(cleaned["services"], json!(["Site", "Logo"]));

        let data = FormData::new().with("services", "Site").with("services", "Print");
        let errors = clean_form(&fields, &data).unwrap_err();
        assert!(errors[0].message.contains("Print"));
    }

    #[test]
    fn test_required_checkbox_must_be_checked() {
        let fields = vec![FormField::new("J'accepte les conditions", FieldKind::Checkbox)];
        let errors = clean_form(&fields, &FormData::new().with("j_accepte_les_conditions", "off"))
            .unwrap_err();
        assert_eq!(errors, vec![FieldError::required("j_accepte_les_conditions")]);

        let cleaned =
            clean_form(&fields, &FormData::new().with("j_accepte_les_conditions", "on")).unwrap();
        assert_eq!(cleaned["j_accepte_les_conditions"], json!(true));
    }

    #[test]
    fn test_field_definition_validation() {
        assert!(FormField::new("Sujet", FieldKind::SingleLine).validate().is_empty());

        let no_choices = FormField::new("Budget", FieldKind::Radio);
        assert_eq!(no_choices.validate()[0].field, "choices");

        let blank = FormField::new("", FieldKind::SingleLine);
        assert_eq!(blank.validate(), vec![FieldError::required("label")]);

        let symbols = FormField::new("???", FieldKind::SingleLine);
        assert_eq!(symbols.validate()[0].field, "label");
    }

    #[test]
    fn test_field_kind_serde_names() {
        let field: FormField = serde_json::from_value(json!({
            "label": "Message",
            "field_type": "multiline"
        }))
        .unwrap();
        assert_eq!(field.field_type, FieldKind::MultiLine);
        assert!(field.required);
        assert_eq!(field.key(), "message");
        assert_eq!(serde_json::to_value(FieldKind::DateTime).unwrap(), json!("datetime"));
    }
}
