use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{NewSession, SessionModel, SessionRow};
use crate::shared::AppError;

/// Result of attempting to add a participant
#[derive(Debug, Clone)]
pub enum JoinSessionResult {
    /// User added, returns updated session data
    Joined(SessionModel),
    /// User was already in the participant set; nothing changed
    AlreadyParticipating,
    /// Session does not exist
    SessionNotFound,
}

/// Result of attempting to remove a participant
#[derive(Debug, Clone)]
pub enum LeaveSessionResult {
    /// User removed, returns updated session data
    Left(SessionModel),
    /// User was not in the participant set; nothing changed
    NotParticipating,
    /// Session does not exist
    SessionNotFound,
}

/// Trait for session repository operations
#[async_trait]
pub trait SessionRepository {
    async fn create_session(&self, session: &NewSession) -> Result<SessionModel, AppError>;
    async fn get_session(&self, session_id: i64) -> Result<Option<SessionModel>, AppError>;
    /// All sessions ordered by id
    async fn list_sessions(&self) -> Result<Vec<SessionModel>, AppError>;
    async fn update_session(
        &self,
        session_id: i64,
        session: &NewSession,
    ) -> Result<SessionModel, AppError>;
    async fn delete_session(&self, session_id: i64) -> Result<(), AppError>;

    /// Atomically checks membership and adds the user
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<JoinSessionResult, AppError>;

    /// Atomically checks membership and removes the user
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<LeaveSessionResult, AppError>;

    /// Drops `user_id` from every roster, returning how many sessions changed
    async fn remove_user_from_all(&self, user_id: i64) -> Result<usize, AppError>;
}

struct SessionTable {
    rows: BTreeMap<i64, SessionModel>,
    next_id: i64,
}

/// In-memory implementation of SessionRepository for development and testing
///
/// Participation changes hold the table lock across the membership check and the
/// mutation, so concurrent requests for the same pair cannot both succeed.
pub struct InMemorySessionRepository {
    sessions: Mutex<SessionTable>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(SessionTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the current number of sessions in the repository
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().rows.len()
    }

    /// Checks if a session exists by ID (useful for debugging)
    pub fn has_session(&self, session_id: i64) -> bool {
        self.sessions.lock().unwrap().rows.contains_key(&session_id)
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &NewSession) -> Result<SessionModel, AppError> {
        debug!(name = %session.name, "Creating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        let id = sessions.next_id;
        sessions.next_id += 1;
        let model = SessionModel::from_new(id, session);
        sessions.rows.insert(id, model.clone());

        debug!(session_id = id, "Session created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: i64) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id, "Fetching session from memory");

        let sessions = self.sessions.lock().unwrap();
        let session = sessions.rows.get(&session_id).cloned();

        match &session {
            Some(s) => debug!(session_id, name = %s.name, "Session found in memory"),
            None => debug!(session_id, "Session not found in memory"),
        }

        Ok(session)
    }

    #[instrument(skip(self))]
    async fn list_sessions(&self) -> Result<Vec<SessionModel>, AppError> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions.rows.values().cloned().collect())
    }

    #[instrument(skip(self, session))]
    async fn update_session(
        &self,
        session_id: i64,
        session: &NewSession,
    ) -> Result<SessionModel, AppError> {
        debug!(session_id, "Updating session in memory");

        let mut sessions = self.sessions.lock().unwrap();
        let Some(existing) = sessions.rows.get_mut(&session_id) else {
            warn!(session_id, "Session not found for update in memory");
            return Err(AppError::SessionNotFound(session_id));
        };
        existing.apply(session);

        debug!(session_id, "Session updated successfully in memory");
        Ok(existing.clone())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: i64) -> Result<(), AppError> {
        debug!(session_id, "Deleting session from memory");

        let mut sessions = self.sessions.lock().unwrap();
        if sessions.rows.remove(&session_id).is_none() {
            warn!(session_id, "Session not found for deletion in memory");
            return Err(AppError::SessionNotFound(session_id));
        }

        debug!(session_id, "Session deleted successfully from memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<JoinSessionResult, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.rows.get_mut(&session_id) else {
            return Ok(JoinSessionResult::SessionNotFound);
        };

        if !session.add_participant(user_id) {
            debug!(session_id, user_id, "User already participates");
            return Ok(JoinSessionResult::AlreadyParticipating);
        }
        session.updated_at = chrono::Utc::now();

        debug!(session_id, user_id, "Participant added in memory");
        Ok(JoinSessionResult::Joined(session.clone()))
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<LeaveSessionResult, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let Some(session) = sessions.rows.get_mut(&session_id) else {
            return Ok(LeaveSessionResult::SessionNotFound);
        };

        if !session.remove_participant(user_id) {
            debug!(session_id, user_id, "User does not participate");
            return Ok(LeaveSessionResult::NotParticipating);
        }
        session.updated_at = chrono::Utc::now();

        debug!(session_id, user_id, "Participant removed in memory");
        Ok(LeaveSessionResult::Left(session.clone()))
    }

    #[instrument(skip(self))]
    async fn remove_user_from_all(&self, user_id: i64) -> Result<usize, AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        let now = chrono::Utc::now();

        let mut changed = 0;
        for session in sessions.rows.values_mut() {
            if session.remove_participant(user_id) {
                session.updated_at = now;
                changed += 1;
            }
        }

        debug!(user_id, changed, "User removed from all sessions in memory");
        Ok(changed)
    }
}

/// PostgreSQL implementation of session repository
///
/// Participation is stored in `participate(session_id, user_id)` whose primary key
/// enforces the uniqueness of each pair.
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SESSION_COLUMNS: &str = "id, name, date, description, teacher_id, created_at, updated_at";

async fn load_session(
    conn: &mut PgConnection,
    session_id: i64,
) -> Result<Option<SessionModel>, AppError> {
    let query = format!("SELECT {} FROM sessions WHERE id = $1", SESSION_COLUMNS);
    let row = sqlx::query_as::<_, SessionRow>(&query)
        .bind(session_id)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let users: Vec<i64> = sqlx::query_scalar(
        "SELECT user_id FROM participate WHERE session_id = $1 ORDER BY user_id",
    )
    .bind(session_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(row.into_model(users)))
}

async fn insert_participants(
    conn: &mut PgConnection,
    session_id: i64,
    users: &[i64],
) -> Result<(), AppError> {
    for user_id in users {
        sqlx::query(
            "INSERT INTO participate (session_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(session_id)
        .bind(*user_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &NewSession) -> Result<SessionModel, AppError> {
        debug!(name = %session.name, "Creating session in database");

        let mut tx = self.pool.begin().await?;
        let session_id: i64 = sqlx::query_scalar(
            "INSERT INTO sessions (name, date, description, teacher_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&session.name)
        .bind(session.date)
        .bind(&session.description)
        .bind(session.teacher_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create session in database");
            AppError::DatabaseError(e.to_string())
        })?;

        insert_participants(&mut tx, session_id, &session.users).await?;
        let model = load_session(&mut tx, session_id)
            .await?
            .ok_or(AppError::Internal)?;
        tx.commit().await?;

        debug!(session_id, "Session created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: i64) -> Result<Option<SessionModel>, AppError> {
        debug!(session_id, "Fetching session from database");

        let mut conn = self.pool.acquire().await?;
        load_session(&mut conn, session_id).await
    }

    #[instrument(skip(self))]
    async fn list_sessions(&self) -> Result<Vec<SessionModel>, AppError> {
        let query = format!("SELECT {} FROM sessions ORDER BY id", SESSION_COLUMNS);
        let rows = sqlx::query_as::<_, SessionRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        let pairs: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT session_id, user_id FROM participate ORDER BY session_id, user_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut participants: HashMap<i64, Vec<i64>> = HashMap::new();
        for (session_id, user_id) in pairs {
            participants.entry(session_id).or_default().push(user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let users = participants.remove(&row.id).unwrap_or_default();
                row.into_model(users)
            })
            .collect())
    }

    #[instrument(skip(self, session))]
    async fn update_session(
        &self,
        session_id: i64,
        session: &NewSession,
    ) -> Result<SessionModel, AppError> {
        debug!(session_id, "Updating session in database");

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE sessions SET name = $2, date = $3, description = $4, teacher_id = $5, \
             updated_at = now() WHERE id = $1",
        )
        .bind(session_id)
        .bind(&session.name)
        .bind(session.date)
        .bind(&session.description)
        .bind(session.teacher_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, session_id, "Failed to update session in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(session_id, "Session not found for update");
            return Err(AppError::SessionNotFound(session_id));
        }

        sqlx::query("DELETE FROM participate WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        insert_participants(&mut tx, session_id, &session.users).await?;

        let model = load_session(&mut tx, session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;
        tx.commit().await?;

        debug!(session_id, "Session updated successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: i64) -> Result<(), AppError> {
        debug!(session_id, "Deleting session from database");

        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, session_id, "Failed to delete session from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(session_id, "Session not found for deletion");
            return Err(AppError::SessionNotFound(session_id));
        }

        debug!(session_id, "Session deleted successfully from database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<JoinSessionResult, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises participation changes on the same session
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(JoinSessionResult::SessionNotFound);
        }

        let inserted = sqlx::query(
            "INSERT INTO participate (session_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            debug!(session_id, user_id, "User already participates");
            return Ok(JoinSessionResult::AlreadyParticipating);
        }

        sqlx::query("UPDATE sessions SET updated_at = now() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        let model = load_session(&mut tx, session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;
        tx.commit().await?;

        debug!(session_id, user_id, "Participant added in database");
        Ok(JoinSessionResult::Joined(model))
    }

    #[instrument(skip(self))]
    async fn remove_participant(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<LeaveSessionResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(LeaveSessionResult::SessionNotFound);
        }

        let removed = sqlx::query("DELETE FROM participate WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() == 0 {
            debug!(session_id, user_id, "User does not participate");
            return Ok(LeaveSessionResult::NotParticipating);
        }

        sqlx::query("UPDATE sessions SET updated_at = now() WHERE id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;
        let model = load_session(&mut tx, session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;
        tx.commit().await?;

        debug!(session_id, user_id, "Participant removed in database");
        Ok(LeaveSessionResult::Left(model))
    }

    #[instrument(skip(self))]
    async fn remove_user_from_all(&self, user_id: i64) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;

        let changed: Vec<i64> =
            sqlx::query_scalar("DELETE FROM participate WHERE user_id = $1 RETURNING session_id")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("UPDATE sessions SET updated_at = now() WHERE id = ANY($1)")
            .bind(&changed)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(
            user_id,
            changed = changed.len(),
            "User removed from all sessions in database"
        );
        Ok(changed.len())
    }
}
