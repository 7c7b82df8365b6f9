use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use conduct_core::{ComplaintId, DomainError, DomainResult, Entity, UserId};

/// Photo recorded when the filer did not capture one.
pub const DEFAULT_PHOTO: &str = "https://via.placeholder.com/320x240.png?text=No+Photo";

/// A complaint filed by an administrator against a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub student_id: UserId,
    pub reason: String,
    pub details: Option<String>,
    /// Verification photo (URL or data URI), opaque to this crate.
    pub photo: String,
    pub created_at: DateTime<Utc>,
}

/// Complaint input as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    pub student_id: UserId,
    pub reason: String,
    pub details: Option<String>,
    pub photo: Option<String>,
}

impl Complaint {
    /// Validate and normalize a submission.
    ///
    /// - `reason` is trimmed and must be non-empty.
    /// - blank `details` become `None`.
    /// - a missing or blank `photo` becomes [`DEFAULT_PHOTO`].
    pub fn file(new: NewComplaint, now: DateTime<Utc>) -> DomainResult<Self> {
        let reason = new.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason must not be empty"));
        }

        let details = non_blank(new.details);
        let photo = non_blank(new.photo).unwrap_or_else(|| DEFAULT_PHOTO.to_string());

        Ok(Self {
            id: ComplaintId::new(),
            student_id: new.student_id,
            reason: reason.to_string(),
            details,
            photo,
            created_at: now,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Entity for Complaint {
    type Id = ComplaintId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
