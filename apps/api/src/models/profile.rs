use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const DEFAULT_RECRUITER_NAME: &str = "Recruiter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecruiterProfile {
    pub id: Uuid,
    pub full_name: String,
    pub company_name: Option<String>,
}

impl RecruiterProfile {
    /// Stand-in used when the recruiter has no profile row yet.
    pub fn anonymous(id: Uuid) -> Self {
        Self {
            id,
            full_name: DEFAULT_RECRUITER_NAME.to_string(),
            company_name: None,
        }
    }

    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            DEFAULT_RECRUITER_NAME
        } else {
            name
        }
    }
}
