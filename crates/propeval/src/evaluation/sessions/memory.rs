use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::evaluation::StoreError;

use super::domain::{CustomFieldValue, EvaluationSession, PropertyInfo, UserEvaluationAnswer};
use super::store::{SessionRecord, SessionStore};

#[derive(Default)]
struct SessionTables {
    sessions: HashMap<u64, EvaluationSession>,
    answers: HashMap<u64, Vec<UserEvaluationAnswer>>,
    custom_fields: HashMap<u64, Vec<CustomFieldValue>>,
}

/// Mutex-guarded session store used by local development, the CLI, and the
/// test suites. Ids are assigned from a shared sequence.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    tables: Arc<Mutex<SessionTables>>,
    sequence: Arc<AtomicU64>,
}

impl InMemorySessionStore {
    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert_session(
        &self,
        mut session: EvaluationSession,
        mut answers: Vec<UserEvaluationAnswer>,
        mut custom_fields: Vec<CustomFieldValue>,
    ) -> Result<SessionRecord, StoreError> {
        let mut guard = self.tables.lock().expect("session mutex poisoned");
        session.id = self.next_id();
        for answer in &mut answers {
            answer.id = self.next_id();
            answer.evaluation_session_id = session.id;
        }
        for field in &mut custom_fields {
            field.id = self.next_id();
            field.evaluation_session_id = session.id;
        }
        guard.sessions.insert(session.id, session.clone());
        guard.answers.insert(session.id, answers.clone());
        guard.custom_fields.insert(session.id, custom_fields.clone());
        Ok(SessionRecord {
            session,
            answers,
            custom_fields,
        })
    }

    fn fetch_session(&self, session_id: u64) -> Result<Option<SessionRecord>, StoreError> {
        let guard = self.tables.lock().expect("session mutex poisoned");
        let Some(session) = guard.sessions.get(&session_id).cloned() else {
            return Ok(None);
        };
        let answers = guard.answers.get(&session_id).cloned().unwrap_or_default();
        let custom_fields = guard
            .custom_fields
            .get(&session_id)
            .cloned()
            .unwrap_or_default();
        Ok(Some(SessionRecord {
            session,
            answers,
            custom_fields,
        }))
    }

    fn sessions_of_user(&self, user_id: u64) -> Result<Vec<EvaluationSession>, StoreError> {
        let guard = self.tables.lock().expect("session mutex poisoned");
        let mut sessions: Vec<_> = guard
            .sessions
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect();
        sessions.sort_by_key(|session| session.id);
        Ok(sessions)
    }

    fn update_property_info(
        &self,
        session_id: u64,
        property: PropertyInfo,
    ) -> Result<(), StoreError> {
        let mut guard = self.tables.lock().expect("session mutex poisoned");
        match guard.sessions.get_mut(&session_id) {
            Some(session) => {
                session.property = property;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
