use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::services::submitter::{self, BookingSubmitter, SubmitError};
use crate::services::wizard::{BookingWizard, SubmitAttempt, SubmitOutcome, WizardError};

/// Wizards untouched for this long are dropped.
pub const SESSION_TTL_MINUTES: i64 = 30;

pub struct BookingSession {
    wizard: Mutex<BookingWizard>,
    last_activity: Mutex<DateTime<Utc>>,
}

impl BookingSession {
    pub fn wizard(&self) -> MutexGuard<'_, BookingWizard> {
        self.wizard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self, now: DateTime<Utc>) {
        *self.last_activity.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let last = *self.last_activity.lock().unwrap_or_else(PoisonError::into_inner);
        last + Duration::minutes(SESSION_TTL_MINUTES) <= now
    }
}

/// In-memory wizard sessions. Drafts are never persisted, so a restart
/// abandons every booking in progress.
pub struct BookingSessions {
    sessions: Mutex<HashMap<Uuid, Arc<BookingSession>>>,
    clock: Arc<dyn Clock>,
}

impl BookingSessions {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn map(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<BookingSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(&self, wizard: BookingWizard) -> Uuid {
        let now = self.clock.now();
        let id = Uuid::new_v4();
        let mut sessions = self.map();

        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "expired idle booking sessions");
        }

        sessions.insert(
            id,
            Arc::new(BookingSession {
                wizard: Mutex::new(wizard),
                last_activity: Mutex::new(now),
            }),
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<BookingSession>> {
        let now = self.clock.now();
        let session = self.map().get(id).cloned()?;
        if session.is_expired(now) {
            self.map().remove(id);
            return None;
        }
        session.touch(now);
        Some(session)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.map().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs the confirm step end to end. The relay call and its settlement run on their
/// own task, so a caller that stops waiting (a dropped connection) cannot leave the
/// wizard stuck in `Submitting`. The wizard lock is released while the relay call is
/// pending; the `Submitting` state is what turns away a second confirm.
pub async fn confirm(
    session: Arc<BookingSession>,
    submitter: Arc<dyn BookingSubmitter>,
) -> Result<SubmitOutcome, WizardError> {
    let attempt = session.wizard().begin_submit()?;
    let submission = match attempt {
        SubmitAttempt::Ready(submission) => submission,
        SubmitAttempt::Rejected(error) => return Ok(SubmitOutcome::Failed(error)),
    };

    let task_session = Arc::clone(&session);
    let task = tokio::spawn(async move {
        let result = submitter::submit(submitter.as_ref(), &submission).await;
        task_session.wizard().finish_submit(result)
    });

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "booking submission task failed");
            session
                .wizard()
                .finish_submit(Err(SubmitError::Transport(format!("submission aborted: {e}"))))
        }
    }
}
