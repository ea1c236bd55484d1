//! Translation between the flat form attribute map and Attio's
//! per-attribute value shape.
//!
//! Read direction flattens a CRM record into `slug -> scalar` for the
//! form; write direction shapes submitted form values into the map the
//! CRM write endpoints accept. In both directions the email attribute is
//! taken from the session, never from the record or the form.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::client::PersonRecord;
use crate::schema::{FieldRegistry, FieldType, EMAIL_SLUG};

/// Flatten a CRM record into per-field form values.
///
/// For each configured field, the first value entry wins. Select fields
/// yield the nested option id. A field the record has no values for
/// yields `""` — the form renders it blank rather than failing.
pub fn read_attributes(
    registry: &FieldRegistry,
    record: &PersonRecord,
    session_email: &str,
) -> Map<String, Value> {
    let mut attributes = Map::new();

    for field in registry.fields() {
        let value = if field.slug == EMAIL_SLUG {
            // The session email is authoritative; whatever the CRM holds
            // for this slug may be stale or belong to a merged record.
            Value::Array(vec![Value::String(session_email.to_string())])
        } else {
            let entry = record.values.get(&field.slug).and_then(|v| v.first());
            match (field.field_type, entry) {
                (FieldType::Select, Some(entry)) => entry
                    .option
                    .as_ref()
                    .map(|opt| Value::String(opt.id.option_id.clone()))
                    .unwrap_or_else(empty),
                (_, Some(entry)) => entry.value.clone().unwrap_or_else(empty),
                (_, None) => empty(),
            }
        };
        attributes.insert(field.slug.clone(), value);
    }

    attributes
}

/// Shape submitted form values into the outgoing CRM value map.
///
/// Empty and falsy values are omitted — the CRM is never sent explicit
/// nulls. Date-typed fields are normalized to calendar-date form. The
/// email attribute is always a one-element list holding the session
/// email, overriding any client-supplied value.
pub fn write_values(
    registry: &FieldRegistry,
    attributes: &Map<String, Value>,
    session_email: &str,
) -> Map<String, Value> {
    let mut values = Map::new();

    for (slug, value) in attributes {
        if slug == EMAIL_SLUG || is_falsy(value) {
            continue;
        }

        let is_date_field = registry
            .get(slug)
            .is_some_and(|f| f.field_type == FieldType::Date);

        let outgoing = if is_date_field {
            match value.as_str().and_then(normalize_date) {
                Some(date) => Value::String(date),
                // Unparseable input goes through unchanged; the CRM
                // rejects it with a proper validation error.
                None => value.clone(),
            }
        } else {
            value.clone()
        };

        values.insert(slug.clone(), outgoing);
    }

    values.insert(
        EMAIL_SLUG.to_string(),
        Value::Array(vec![Value::String(session_email.to_string())]),
    );

    values
}

fn empty() -> Value {
    Value::String(String::new())
}

/// Values the form treats as "not filled in".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Normalize a date-ish string to `YYYY-MM-DD`, discarding any time and
/// timezone component.
fn normalize_date(input: &str) -> Option<String> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            FieldDescriptor {
                slug: "name".to_string(),
                label: "Name".to_string(),
                field_type: FieldType::Text,
            },
            FieldDescriptor {
                slug: EMAIL_SLUG.to_string(),
                label: "Email".to_string(),
                field_type: FieldType::Email,
            },
            FieldDescriptor {
                slug: "birthday".to_string(),
                label: "Birthday".to_string(),
                field_type: FieldType::Date,
            },
            FieldDescriptor {
                slug: "plan".to_string(),
                label: "Plan".to_string(),
                field_type: FieldType::Select,
            },
        ])
        .unwrap()
    }

    fn record(json: Value) -> PersonRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn read_flattens_first_entries() {
        let record = record(serde_json::json!({
            "id": { "record_id": "rec_1" },
            "values": {
                "name": [ { "value": "Jo" }, { "value": "older" } ],
                "plan": [ { "option": { "id": { "option_id": "opt_1" } } } ],
            },
        }));

        let attrs = read_attributes(&registry(), &record, "jo@x.com");
        assert_eq!(attrs["name"], "Jo");
        assert_eq!(attrs["plan"], "opt_1");
    }

    #[test]
    fn read_absent_field_is_empty_string() {
        let record = record(serde_json::json!({
            "id": { "record_id": "rec_1" },
            "values": {},
        }));

        let attrs = read_attributes(&registry(), &record, "jo@x.com");
        assert_eq!(attrs["name"], "");
        assert_eq!(attrs["birthday"], "");
        assert_eq!(attrs["plan"], "");
    }

    #[test]
    fn read_select_without_option_is_empty_string() {
        let record = record(serde_json::json!({
            "id": { "record_id": "rec_1" },
            "values": { "plan": [ { "value": "stray" } ] },
        }));

        let attrs = read_attributes(&registry(), &record, "jo@x.com");
        assert_eq!(attrs["plan"], "");
    }

    #[test]
    fn read_email_comes_from_session_not_record() {
        let record = record(serde_json::json!({
            "id": { "record_id": "rec_1" },
            "values": {
                "email_addresses": [ { "value": "stale@old.com" } ],
            },
        }));

        let attrs = read_attributes(&registry(), &record, "jo@x.com");
        assert_eq!(attrs[EMAIL_SLUG], serde_json::json!(["jo@x.com"]));
    }

    #[test]
    fn write_omits_falsy_values() {
        let mut attrs = Map::new();
        attrs.insert("name".to_string(), Value::String("Jo".to_string()));
        attrs.insert("birthday".to_string(), Value::String(String::new()));
        attrs.insert("plan".to_string(), Value::Null);

        let values = write_values(&registry(), &attrs, "jo@x.com");
        assert_eq!(values["name"], "Jo");
        assert!(!values.contains_key("birthday"));
        assert!(!values.contains_key("plan"));
    }

    #[test]
    fn write_normalizes_dates() {
        for input in [
            "1990-04-02",
            "1990-04-02T15:30:00",
            "1990-04-02T15:30:00+02:00",
            "04/02/1990",
        ] {
            let mut attrs = Map::new();
            attrs.insert("birthday".to_string(), Value::String(input.to_string()));
            let values = write_values(&registry(), &attrs, "jo@x.com");
            assert_eq!(values["birthday"], "1990-04-02", "input {:?}", input);
        }
    }

    #[test]
    fn write_passes_unparseable_date_through() {
        let mut attrs = Map::new();
        attrs.insert("birthday".to_string(), Value::String("soonish".to_string()));
        let values = write_values(&registry(), &attrs, "jo@x.com");
        assert_eq!(values["birthday"], "soonish");
    }

    #[test]
    fn write_injects_session_email_over_form_value() {
        let mut attrs = Map::new();
        attrs.insert(
            EMAIL_SLUG.to_string(),
            Value::String("forged@evil.com".to_string()),
        );

        let values = write_values(&registry(), &attrs, "jo@x.com");
        assert_eq!(values[EMAIL_SLUG], serde_json::json!(["jo@x.com"]));
    }

    #[test]
    fn write_always_contains_email_even_with_empty_form() {
        let values = write_values(&registry(), &Map::new(), "jo@x.com");
        assert_eq!(values.len(), 1);
        assert_eq!(values[EMAIL_SLUG], serde_json::json!(["jo@x.com"]));
    }

    #[test]
    fn write_round_trips_through_read() {
        let mut attrs = Map::new();
        attrs.insert("name".to_string(), Value::String("Jo".to_string()));
        attrs.insert("plan".to_string(), Value::String("opt_1".to_string()));
        let written = write_values(&registry(), &attrs, "jo@x.com");

        // Shape the written map the way the CRM would hand it back.
        let record = record(serde_json::json!({
            "id": { "record_id": "rec_1" },
            "values": {
                "name": [ { "value": written["name"] } ],
                "plan": [ { "option": { "id": { "option_id": written["plan"] } } } ],
            },
        }));

        let read = read_attributes(&registry(), &record, "jo@x.com");
        assert_eq!(read["name"], "Jo");
        assert_eq!(read["plan"], "opt_1");
        assert_eq!(read[EMAIL_SLUG], serde_json::json!(["jo@x.com"]));
    }
}
