//! Recording executor for tests

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::executor::{ExecResult, Executor};
use crate::materialize::ResultSet;
use crate::{Error, Result, Value};

/// One statement seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug)]
enum Response {
    Rows(ResultSet),
    Affected(u64),
    Failure(String),
}

/// Returns queued responses in order and records every call
///
/// With the queue empty, queries return no rows and executions affect one row.
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: Mutex<VecDeque<Response>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, rows: ResultSet) -> Self {
        self.push(Response::Rows(rows))
    }

    pub fn with_affected(self, rows_affected: u64) -> Self {
        self.push(Response::Affected(rows_affected))
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.push(Response::Failure(message.to_string()))
    }

    fn push(self, response: Response) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, sql: &str, params: &[Value]) -> Option<Response> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }
}

fn transport_error(message: String) -> Error {
    Error::Database(sqlx::Error::Protocol(message))
}

impl Executor for MockExecutor {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult> {
        match self.record(sql, params) {
            Some(Response::Failure(message)) => Err(transport_error(message)),
            Some(Response::Affected(rows_affected)) => Ok(ExecResult {
                rows_affected,
                last_insert_id: None,
            }),
            Some(Response::Rows(rows)) => Ok(ExecResult {
                rows_affected: rows.len() as u64,
                last_insert_id: None,
            }),
            None => Ok(ExecResult {
                rows_affected: 1,
                last_insert_id: None,
            }),
        }
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        match self.record(sql, params) {
            Some(Response::Failure(message)) => Err(transport_error(message)),
            Some(Response::Rows(rows)) => Ok(rows),
            Some(Response::Affected(_)) | None => Ok(ResultSet::default()),
        }
    }
}
