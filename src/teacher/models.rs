use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for teachers table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct TeacherModel {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeacherModel {
    pub fn from_new(id: i64, teacher: &NewTeacher) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: teacher.first_name.clone(),
            last_name: teacher.last_name.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
}

impl NewTeacher {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Teachers every fresh deployment starts with; mirrored by the seed migration
pub fn studio_roster() -> Vec<NewTeacher> {
    vec![
        NewTeacher::new("Margot", "Delahaye"),
        NewTeacher::new("Hélène", "Thiercelin"),
    ]
}
