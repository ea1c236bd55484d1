//! Attio gateway for the memberhub profile portal.
//!
//! Wraps the slice of the Attio REST API this system consumes: record
//! lookup by email, record create-or-update, and select-option
//! enumeration for one fixed "Person" object. The CRM is the system of
//! record; nothing is cached or persisted locally.
//!
//! The crate also owns the field schema registry and the translation
//! between the flat `slug -> value` attribute maps the profile form
//! works with and Attio's per-attribute value-wrapper shape.

mod client;
mod error;
mod mapping;
mod schema;

pub use client::{AttioClient, AttioConfig, Lookup, PersonRecord, SelectOption, ATTIO_API_BASE};
pub use error::AttioError;
pub use mapping::{read_attributes, write_values};
pub use schema::{FieldDescriptor, FieldRegistry, FieldType, EMAIL_SLUG};
