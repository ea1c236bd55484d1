//! Field schema registry.
//!
//! The profile form is driven entirely by a static list of field
//! descriptors loaded from server configuration at startup. The same
//! registry shapes the rendered form, the read mapping from CRM records,
//! and the write mapping back to the CRM — there is no second schema to
//! drift from.

use serde::{Deserialize, Serialize};

/// Attribute slug of the email field on the Person object.
///
/// This field is special-cased everywhere: it is never read from the CRM
/// (the session email wins) and never taken from the form on write.
pub const EMAIL_SLUG: &str = "email_addresses";

/// Input type of a profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Date,
    Select,
}

/// One profile field: maps a form input onto a CRM attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Attio attribute slug (unique within the registry).
    pub slug: String,
    /// Display label.
    pub label: String,
    /// Input type; `select` fields fetch their options lazily.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Read-only, ordered collection of field descriptors.
///
/// Built once at process start and shared behind an `Arc`; never
/// re-parsed per request.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    /// Build a registry, rejecting empty lists and duplicate slugs.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, String> {
        if fields.is_empty() {
            return Err("field schema is empty".to_string());
        }
        for (i, field) in fields.iter().enumerate() {
            if field.slug.is_empty() {
                return Err(format!("field #{} has an empty slug", i));
            }
            if fields[..i].iter().any(|f| f.slug == field.slug) {
                return Err(format!("duplicate field slug '{}'", field.slug));
            }
        }
        Ok(Self { fields })
    }

    /// All fields, in configured order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by slug.
    pub fn get(&self, slug: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.slug == slug)
    }

    /// Whether the registry declares the email field.
    pub fn has_email_field(&self) -> bool {
        self.get(EMAIL_SLUG).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(slug: &str, field_type: FieldType) -> FieldDescriptor {
        FieldDescriptor {
            slug: slug.to_string(),
            label: slug.to_string(),
            field_type,
        }
    }

    #[test]
    fn rejects_empty_schema() {
        assert!(FieldRegistry::new(vec![]).is_err());
    }

    #[test]
    fn rejects_duplicate_slugs() {
        let err = FieldRegistry::new(vec![
            field("name", FieldType::Text),
            field("name", FieldType::Text),
        ])
        .unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn preserves_order_and_lookup() {
        let registry = FieldRegistry::new(vec![
            field("name", FieldType::Text),
            field(EMAIL_SLUG, FieldType::Email),
            field("birthday", FieldType::Date),
        ])
        .unwrap();
        assert_eq!(registry.fields().len(), 3);
        assert_eq!(registry.fields()[0].slug, "name");
        assert_eq!(registry.get("birthday").unwrap().field_type, FieldType::Date);
        assert!(registry.get("missing").is_none());
        assert!(registry.has_email_field());
    }

    #[test]
    fn field_type_serde_is_lowercase() {
        let json = serde_json::to_string(&FieldType::Select).unwrap();
        assert_eq!(json, "\"select\"");
        let back: FieldType = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(back, FieldType::Date);
    }
}
