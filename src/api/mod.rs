//! Client for the review backend's REST API.
//!
//! Every operation serializes its parameters, forwards them to a fixed
//! endpoint and decodes the named payload key into a typed model. Bodies
//! wrapped as `{"response": 200, "data": {...}}` are unwrapped first;
//! bare bodies are used as-is.

#[cfg(test)]
pub(crate) mod testing;
pub mod transport;

pub use transport::{HttpTransport, Query, Transport};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Account, Industry, Interview, InterviewVote, OrgName, Organisation, Review, ReviewVote,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Parameters shared by the organisation endpoints; `None` fields are omitted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrgQuery {
    pub org_name: Option<String>,
    pub industry: Option<Industry>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub review_limit: Option<u32>,
    pub interview_limit: Option<u32>,
    pub position: Option<String>,
}

impl OrgQuery {
    fn industry_param(&self) -> Option<&'static str> {
        self.industry.as_ref().and_then(Industry::as_filter)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Collects query pairs, skipping unset values
#[derive(Debug, Default)]
struct Params(Vec<(&'static str, String)>);

impl Params {
    fn opt<V: ToString>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.0.push((key, v.to_string()));
        }
        self
    }
}

pub struct ApiService<T: Transport = HttpTransport> {
    transport: T,
}

impl ApiService<HttpTransport> {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        Self::with_transport(HttpTransport::new(base_url, timeout_ms))
    }
}

impl<T: Transport> ApiService<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn get_payload(&self, path: &str, params: Params) -> ApiResult<Value> {
        self.transport.get(path, &params.0).map(unwrap_envelope)
    }

    fn post_payload(&self, path: &str, body: &Value) -> ApiResult<Value> {
        self.transport.post(path, body).map(unwrap_envelope)
    }

    /// Fetch one organisation with its latest reviews and interviews
    pub fn get_org(&self, org_id: i64, query: &OrgQuery) -> ApiResult<Organisation> {
        let params = Params::default()
            .opt("review_limit", query.review_limit)
            .opt("interview_limit", query.interview_limit)
            .opt("position", query.position.as_deref());
        let mut payload = self.get_payload(&format!("/orgs/{}", org_id), params)?;

        let mut org: Organisation = take_field(&mut payload, "org", "organisation")?;
        if org.reviews.is_empty() {
            if let Some(reviews) = take_optional(&mut payload, "reviews", "review")? {
                org.reviews = reviews;
            }
        }
        if org.interviews.is_empty() {
            if let Some(interviews) = take_optional(&mut payload, "interviews", "interview")? {
                org.interviews = interviews;
            }
        }
        Ok(org)
    }

    /// Organisation ids and labels, for feeding pickers
    pub fn get_org_names(&self, query: &OrgQuery) -> ApiResult<Vec<OrgName>> {
        let params = Params::default()
            .opt("industry", query.industry_param())
            .opt("limit", query.limit)
            .opt("offset", query.offset);
        let mut payload = self.get_payload("/orgs/get_names", params)?;
        take_list(&mut payload, "org_names", "organisation name")
    }

    /// Organisations whose name contains `org_name`, as id/name summaries.
    /// Fuller records are accepted too; only the id and name are kept.
    pub fn search_orgs(&self, query: &OrgQuery) -> ApiResult<Vec<OrgName>> {
        let params = Params::default()
            .opt("org_name", query.org_name.as_deref())
            .opt("industry", query.industry_param())
            .opt("limit", query.limit)
            .opt("offset", query.offset);
        let mut payload = self.get_payload("/orgs/search", params)?;
        take_list(&mut payload, "orgs", "organisation summary")
    }

    pub fn get_org_reviews(&self, org_id: i64, limit: Option<u32>) -> ApiResult<Vec<Review>> {
        let params = Params::default().opt("limit", limit);
        let mut payload = self.get_payload(&format!("/orgs/{}/reviews", org_id), params)?;
        take_list(&mut payload, "reviews", "review")
    }

    pub fn get_org_interviews(&self, org_id: i64, limit: Option<u32>) -> ApiResult<Vec<Interview>> {
        let params = Params::default().opt("limit", limit);
        let mut payload = self.get_payload(&format!("/orgs/{}/interviews", org_id), params)?;
        take_list(&mut payload, "interviews", "interview")
    }

    pub fn get_org_reviews_for_position(
        &self,
        org_id: i64,
        position: &str,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Review>> {
        let params = Params::default()
            .opt("position", Some(position))
            .opt("limit", limit);
        let path = format!("/orgs/{}/reviews_for_position", org_id);
        let mut payload = self.get_payload(&path, params)?;
        take_list(&mut payload, "reviews", "review")
    }

    pub fn get_org_interviews_for_position(
        &self,
        org_id: i64,
        position: &str,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Interview>> {
        let params = Params::default()
            .opt("position", Some(position))
            .opt("limit", limit);
        let path = format!("/orgs/{}/interviews_for_position", org_id);
        let mut payload = self.get_payload(&path, params)?;
        take_list(&mut payload, "interviews", "interview")
    }

    /// Fetch an account with its most recent reviews
    pub fn get_account(&self, account_id: i64) -> ApiResult<Account> {
        let mut payload = self.get_payload(&format!("/account/{}", account_id), Params::default())?;
        let mut account: Account = take_field(&mut payload, "account", "account")?;
        if account.reviews.is_empty() {
            if let Some(reviews) = take_optional(&mut payload, "reviews", "review")? {
                account.reviews = reviews;
            }
        }
        Ok(account)
    }

    pub fn get_account_reviews(&self, account_id: i64, limit: Option<u32>) -> ApiResult<Vec<Review>> {
        let params = Params::default().opt("limit", limit);
        let mut payload = self.get_payload(&format!("/account/{}/reviews", account_id), params)?;
        take_list(&mut payload, "reviews", "review")
    }

    pub fn get_account_interviews(
        &self,
        account_id: i64,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Interview>> {
        let params = Params::default().opt("limit", limit);
        let path = format!("/account/{}/interviews", account_id);
        let mut payload = self.get_payload(&path, params)?;
        take_list(&mut payload, "interviews", "interview")
    }

    pub fn get_account_review_votes(&self, account_id: i64) -> ApiResult<Vec<ReviewVote>> {
        let path = format!("/account/{}/review_votes", account_id);
        let mut payload = self.get_payload(&path, Params::default())?;
        take_list(&mut payload, "review_votes", "review vote")
    }

    pub fn get_account_interview_votes(&self, account_id: i64) -> ApiResult<Vec<InterviewVote>> {
        let path = format!("/account/{}/interview_votes", account_id);
        let mut payload = self.get_payload(&path, Params::default())?;
        take_list(&mut payload, "interview_votes", "interview vote")
    }

    pub fn login(&self, credentials: &Credentials) -> ApiResult<Account> {
        let body = to_body(credentials)?;
        let mut payload = self.post_payload("/auth/login", &body)?;
        take_account(&mut payload)
    }

    pub fn signup(&self, credentials: &Credentials) -> ApiResult<Account> {
        let body = to_body(credentials)?;
        let mut payload = self.post_payload("/auth/signup", &body)?;
        take_account(&mut payload)
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.post_payload("/auth/logout", &json!({}))?;
        Ok(())
    }

    /// The account behind the current backend session, if any.
    /// A 401/403 answer means "not signed in" rather than an error.
    pub fn check_session(&self) -> ApiResult<Option<Account>> {
        let mut payload = match self.get_payload("/auth/session", Params::default()) {
            Ok(payload) => payload,
            Err(e) if e.is_unauthorized() => return Ok(None),
            Err(e) => return Err(e),
        };
        let signed_out = match &payload {
            Value::Null => true,
            Value::Object(map) => map.get("account").is_some_and(Value::is_null),
            _ => false,
        };
        if signed_out {
            return Ok(None);
        }
        take_account(&mut payload).map(Some)
    }
}

fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("response") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<D: DeserializeOwned>(value: Value, resource: &'static str) -> ApiResult<D> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        resource,
        message: e.to_string(),
    })
}

fn take_field<D: DeserializeOwned>(
    payload: &mut Value,
    key: &'static str,
    resource: &'static str,
) -> ApiResult<D> {
    match payload.get_mut(key).map(Value::take) {
        Some(value) => decode(value, resource),
        None => Err(ApiError::MissingField(key)),
    }
}

fn take_optional<D: DeserializeOwned>(
    payload: &mut Value,
    key: &'static str,
    resource: &'static str,
) -> ApiResult<Option<D>> {
    match payload.get_mut(key).map(Value::take) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => decode(value, resource).map(Some),
    }
}

/// Lists come either under `key` or as the whole payload
fn take_list<D: DeserializeOwned>(
    payload: &mut Value,
    key: &'static str,
    resource: &'static str,
) -> ApiResult<Vec<D>> {
    if payload.is_array() {
        return decode(payload.take(), resource);
    }
    take_field(payload, key, resource)
}

/// Auth endpoints answer with `{"account": {...}}` or the bare account
fn take_account(payload: &mut Value) -> ApiResult<Account> {
    if payload.get("account").is_some() {
        return take_field(payload, "account", "account");
    }
    decode(payload.take(), "account")
}

fn to_body<S: Serialize>(body: &S) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        resource: "request",
        message: e.to_string(),
    })
}
