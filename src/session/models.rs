use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A bookable class together with its participants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionModel {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub teacher_id: i64,
    pub users: Vec<i64>, // Participant user ids, no duplicates
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the sessions table; participants live in the participate table
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub teacher_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRow {
    pub fn into_model(self, users: Vec<i64>) -> SessionModel {
        SessionModel {
            id: self.id,
            name: self.name,
            date: self.date,
            description: self.description,
            teacher_id: self.teacher_id,
            users,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Validated session fields for create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewSession {
    pub name: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub teacher_id: i64,
    pub users: Vec<i64>,
}

impl SessionModel {
    pub fn from_new(id: i64, session: &NewSession) -> Self {
        let now = Utc::now();
        let mut model = Self {
            id,
            name: session.name.clone(),
            date: session.date,
            description: session.description.clone(),
            teacher_id: session.teacher_id,
            users: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        for user_id in &session.users {
            model.add_participant(*user_id);
        }
        model
    }

    /// Overwrites the editable fields, keeping id and creation time
    pub fn apply(&mut self, session: &NewSession) {
        self.name = session.name.clone();
        self.date = session.date;
        self.description = session.description.clone();
        self.teacher_id = session.teacher_id;
        self.users.clear();
        for user_id in &session.users {
            self.add_participant(*user_id);
        }
        self.updated_at = Utc::now();
    }

    pub fn has_participant(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    /// Adds a participant; returns false if already present
    pub fn add_participant(&mut self, user_id: i64) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.users.push(user_id);
        true
    }

    /// Removes a participant; returns false if absent
    pub fn remove_participant(&mut self, user_id: i64) -> bool {
        let before = self.users.len();
        self.users.retain(|u| *u != user_id);
        self.users.len() != before
    }
}
