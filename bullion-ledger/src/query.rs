use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::PostingClass;

/// Filter describing which registry rows to load.
#[derive(Clone, Debug, Default)]
pub struct RegistryQuery {
    pub metal_transaction_id: Option<Uuid>,
    pub party: Option<String>,
    pub entry_type: Option<PostingClass>,
    pub reference: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub ascending: bool,
}

impl RegistryQuery {
    pub fn for_transaction(metal_transaction_id: Uuid) -> Self {
        Self {
            metal_transaction_id: Some(metal_transaction_id),
            ascending: true,
            ..Self::default()
        }
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }

    pub fn with_type(mut self, entry_type: PostingClass) -> Self {
        self.entry_type = Some(entry_type);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_time_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn ascending(mut self) -> Self {
        self.ascending = true;
        self
    }
}
