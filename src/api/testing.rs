//! Recording transport for unit tests.

use super::transport::{Query, Transport};
use crate::error::{ApiError, ApiResult};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get {
        path: String,
        query: Vec<(String, String)>,
    },
    Post {
        path: String,
        body: Value,
    },
}

/// Replays queued responses in order and records every request
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<ApiResult<Value>>>,
    calls: RefCell<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(body));
        self
    }

    pub fn fail(self, code: u16) -> Self {
        self.responses.borrow_mut().push_back(Err(ApiError::Status {
            code,
            body: String::new(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn next(&self) -> ApiResult<Value> {
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no queued response".to_string())))
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        self.calls.borrow_mut().push(Call::Get {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        self.next()
    }

    fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.calls.borrow_mut().push(Call::Post {
            path: path.to_string(),
            body: body.clone(),
        });
        self.next()
    }
}
