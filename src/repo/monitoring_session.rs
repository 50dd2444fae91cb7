//! Monitoring session repository

use chrono::{NaiveDate, Utc};

use super::{get, put, query_scoped, require, Fetch, RepoError};
use crate::core::context::RegisterContext;
use crate::core::entity::Record;
use crate::entities::{MonitoringSession, RiskExposure, SessionStatus};
use crate::store::{DocumentStore, FieldEq, WriteBatch};

/// Fields a session update may change
#[derive(Debug, Default, Clone)]
pub struct SessionUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SessionStatus>,
}

fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), RepoError> {
    if end < start {
        return Err(RepoError::Validation(
            "end date must not precede start date".to_string(),
        ));
    }
    Ok(())
}

pub fn insert(store: &dyn DocumentStore, session: &MonitoringSession) -> Result<(), RepoError> {
    if session.name.trim().is_empty() {
        return Err(RepoError::Validation("name must not be empty".to_string()));
    }
    validate_window(session.start_date, session.end_date)?;
    put(store, session)
}

pub fn find(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
) -> Result<Option<MonitoringSession>, RepoError> {
    get(store, id, ctx)
}

/// All sessions in the context, most recent window first
pub fn list(
    store: &dyn DocumentStore,
    ctx: &RegisterContext,
) -> Result<Vec<MonitoringSession>, RepoError> {
    let mut sessions: Vec<MonitoringSession> = query_scoped(store, ctx, [])?;
    sessions.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    Ok(sessions)
}

pub fn update(
    store: &dyn DocumentStore,
    id: &str,
    ctx: &RegisterContext,
    patch: SessionUpdate,
) -> Result<MonitoringSession, RepoError> {
    let mut session: MonitoringSession = require(store, id, ctx)?;
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(RepoError::Validation("name must not be empty".to_string()));
        }
        session.name = name;
    }
    if let Some(start) = patch.start_date {
        session.start_date = start;
    }
    if let Some(end) = patch.end_date {
        session.end_date = end;
    }
    validate_window(session.start_date, session.end_date)?;
    if let Some(status) = patch.status {
        session.status = status;
    }
    session.updated_at = Utc::now();
    put(store, &session)?;
    Ok(session)
}

/// Delete a session along with every exposure recorded in it
pub fn delete(store: &dyn DocumentStore, id: &str, ctx: &RegisterContext) -> Result<(), RepoError> {
    match super::fetch::<MonitoringSession>(store, id, ctx)? {
        Fetch::Missing => return Ok(()),
        Fetch::ForeignContext => return Err(RepoError::ContextMismatch { id: id.to_string() }),
        Fetch::Found(_) => {}
    }

    let by_session = [
        FieldEq::new("monitoringSessionId", id),
        FieldEq::new("userId", ctx.user_id.as_str()),
    ];
    let mut batch = WriteBatch::new();
    for doc in store.query(RiskExposure::COLLECTION, &by_session)? {
        let expo: RiskExposure = super::decode(doc)?;
        batch.delete(RiskExposure::COLLECTION, &expo.id.to_string());
    }
    batch.delete(MonitoringSession::COLLECTION, id);
    store.apply(batch)?;
    Ok(())
}
