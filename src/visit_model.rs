//! Visit records.
//!
//! A [`Visit`] serializes with camelCase field names, the layout the UI host
//! already writes:
//!
//! ```json
//! {
//!   "id": "v1",
//!   "patientId": "pat-1",
//!   "visitDate": "2025-01-01T00:00:00Z",
//!   "visitType": "initial",
//!   "status": "completed",
//!   "notes": "Lumbar pain, two weeks of evolution"
//! }
//! ```
//!
//! Fields the struct does not know about are kept in [`Visit::extra`] and
//! written back unchanged, so older or newer hosts can share one collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::entity::Entity;

pub const VISITS_KEY: &str = "visits";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,

    /// Reference to a [`Patient`](crate::patient_model::Patient). Not checked.
    pub patient_id: String,

    /// ISO-8601 date-time.
    pub visit_date: String,

    /// Free-form tag such as `"initial"` or `"follow-up"`.
    #[serde(default)]
    pub visit_type: String,

    /// Free-form tag such as `"scheduled"` or `"completed"`.
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anamnesis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_exam: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Visit {
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        visit_date: impl Into<String>,
        visit_type: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            visit_date: visit_date.into(),
            visit_type: visit_type.into(),
            status: status.into(),
            notes: None,
            anamnesis: None,
            physical_exam: None,
            diagnosis: None,
            treatment_plan: None,
            extra: Map::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Entity for Visit {
    const COLLECTION_KEY: &'static str = VISITS_KEY;

    fn id(&self) -> &str {
        &self.id
    }
}
