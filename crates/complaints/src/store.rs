use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use conduct_core::{ComplaintId, DomainError, DomainResult, Entity, UserId};

use crate::Complaint;

/// Complaint storage abstraction.
pub trait ComplaintStore: Send + Sync {
    fn insert(&self, complaint: Complaint) -> DomainResult<()>;
    /// Complaints against one student, newest first.
    fn for_student(&self, student_id: &UserId) -> Vec<Complaint>;
    fn all(&self) -> Vec<Complaint>;
}

impl<S> ComplaintStore for Arc<S>
where
    S: ComplaintStore + ?Sized,
{
    fn insert(&self, complaint: Complaint) -> DomainResult<()> {
        (**self).insert(complaint)
    }

    fn for_student(&self, student_id: &UserId) -> Vec<Complaint> {
        (**self).for_student(student_id)
    }

    fn all(&self) -> Vec<Complaint> {
        (**self).all()
    }
}

/// In-memory complaint store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryComplaintStore {
    inner: RwLock<HashMap<ComplaintId, Complaint>>,
}

impl InMemoryComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComplaintStore for InMemoryComplaintStore {
    fn insert(&self, complaint: Complaint) -> DomainResult<()> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::invariant("complaint store lock poisoned"))?;
        map.insert(*complaint.id(), complaint);
        Ok(())
    }

    fn for_student(&self, student_id: &UserId) -> Vec<Complaint> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => {
                tracing::error!(%student_id, "complaint store lock poisoned; returning no complaints");
                return vec![];
            }
        };

        let mut out: Vec<Complaint> = map
            .values()
            .filter(|c| &c.student_id == student_id)
            .cloned()
            .collect();
        // Ids are UUIDv7, so they break timestamp ties in filing order.
        out.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        out
    }

    fn all(&self) -> Vec<Complaint> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => {
                tracing::error!("complaint store lock poisoned; returning no complaints");
                vec![]
            }
        }
    }
}
