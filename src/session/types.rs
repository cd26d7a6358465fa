use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{NewSession, SessionModel};
use crate::shared::AppError;

const NAME_MAX_LEN: usize = 50;
const DESCRIPTION_MAX_LEN: usize = 2500;

/// Wire representation of a session, used for both requests and responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub users: Vec<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionDto {
    /// Validates the request payload and extracts the editable fields
    pub fn into_new_session(self) -> Result<NewSession, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be blank".to_string()));
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "name must be at most {} characters",
                NAME_MAX_LEN
            )));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation(
                "description must not be blank".to_string(),
            ));
        }
        if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(AppError::Validation(format!(
                "description must be at most {} characters",
                DESCRIPTION_MAX_LEN
            )));
        }
        let date = self
            .date
            .ok_or_else(|| AppError::Validation("date is required".to_string()))?;
        let teacher_id = self
            .teacher_id
            .ok_or_else(|| AppError::Validation("teacher_id is required".to_string()))?;

        let mut users = Vec::with_capacity(self.users.len());
        for user_id in self.users {
            if !users.contains(&user_id) {
                users.push(user_id);
            }
        }

        Ok(NewSession {
            name: self.name,
            date,
            description: self.description,
            teacher_id,
            users,
        })
    }
}

impl From<SessionModel> for SessionDto {
    fn from(session: SessionModel) -> Self {
        Self {
            id: Some(session.id),
            name: session.name,
            date: Some(session.date),
            teacher_id: Some(session.teacher_id),
            users: session.users,
            description: session.description,
            created_at: Some(session.created_at),
            updated_at: Some(session.updated_at),
        }
    }
}
