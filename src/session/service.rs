use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::NewSession,
    repository::{JoinSessionResult, LeaveSessionResult, SessionRepository},
    types::SessionDto,
};
use crate::shared::AppError;
use crate::teacher::TeacherRepository;
use crate::user::UserRepository;

/// Service for handling session business logic
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
    user_repository: Arc<dyn UserRepository + Send + Sync>,
}

impl SessionService {
    pub fn new(
        repository: Arc<dyn SessionRepository + Send + Sync>,
        teacher_repository: Arc<dyn TeacherRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            teacher_repository,
            user_repository,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: SessionDto) -> Result<SessionDto, AppError> {
        let session = self.validated(request).await?;
        let created = self.repository.create_session(&session).await?;

        info!(session_id = created.id, name = %created.name, "Session created");
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<SessionDto>, AppError> {
        let sessions = self.repository.list_sessions().await?;
        Ok(sessions.into_iter().map(SessionDto::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, session_id: i64) -> Result<SessionDto, AppError> {
        self.repository
            .get_session(session_id)
            .await?
            .map(SessionDto::from)
            .ok_or(AppError::SessionNotFound(session_id))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        session_id: i64,
        request: SessionDto,
    ) -> Result<SessionDto, AppError> {
        let session = self.validated(request).await?;
        let updated = self.repository.update_session(session_id, &session).await?;

        info!(session_id, "Session updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, session_id: i64) -> Result<(), AppError> {
        self.repository.delete_session(session_id).await?;

        info!(session_id, "Session deleted");
        Ok(())
    }

    /// Adds `user_id` to the participants of `session_id`
    #[instrument(skip(self))]
    pub async fn participate(&self, session_id: i64, user_id: i64) -> Result<(), AppError> {
        // Session is checked first so a missing session always reports as such
        if self.repository.get_session(session_id).await?.is_none() {
            warn!(session_id, "Cannot participate in missing session");
            return Err(AppError::SessionNotFound(session_id));
        }
        if self.user_repository.get_user(user_id).await?.is_none() {
            warn!(user_id, "Cannot add missing user to session");
            return Err(AppError::PrincipalNotFound(user_id.to_string()));
        }

        match self.repository.add_participant(session_id, user_id).await? {
            JoinSessionResult::Joined(session) => {
                info!(
                    session_id,
                    user_id,
                    participant_count = session.users.len(),
                    "User joined session"
                );
                Ok(())
            }
            JoinSessionResult::AlreadyParticipating => {
                warn!(session_id, user_id, "User already participates in session");
                Err(AppError::AlreadyParticipating {
                    session_id,
                    user_id,
                })
            }
            JoinSessionResult::SessionNotFound => Err(AppError::SessionNotFound(session_id)),
        }
    }

    /// Removes `user_id` from the participants of `session_id`
    #[instrument(skip(self))]
    pub async fn no_longer_participate(
        &self,
        session_id: i64,
        user_id: i64,
    ) -> Result<(), AppError> {
        match self.repository.remove_participant(session_id, user_id).await? {
            LeaveSessionResult::Left(session) => {
                info!(
                    session_id,
                    user_id,
                    participant_count = session.users.len(),
                    "User left session"
                );
                Ok(())
            }
            LeaveSessionResult::NotParticipating => {
                warn!(session_id, user_id, "User does not participate in session");
                Err(AppError::NotParticipating {
                    session_id,
                    user_id,
                })
            }
            LeaveSessionResult::SessionNotFound => {
                warn!(session_id, "Cannot leave missing session");
                Err(AppError::SessionNotFound(session_id))
            }
        }
    }

    /// Validates the payload and checks that every referenced row exists
    async fn validated(&self, request: SessionDto) -> Result<NewSession, AppError> {
        let session = request.into_new_session()?;

        if self
            .teacher_repository
            .get_teacher(session.teacher_id)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(format!(
                "Teacher {} not found",
                session.teacher_id
            )));
        }

        for user_id in &session.users {
            if self.user_repository.get_user(*user_id).await?.is_none() {
                return Err(AppError::BadRequest(format!("User {} not found", user_id)));
            }
        }

        Ok(session)
    }
}
