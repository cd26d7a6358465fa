use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::TeacherModel;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeacherModel> for TeacherResponse {
    fn from(teacher: TeacherModel) -> Self {
        Self {
            id: teacher.id,
            last_name: teacher.last_name,
            first_name: teacher.first_name,
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}
