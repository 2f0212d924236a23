//! Request router for the tree HTTP surface
//!
//! Transport-agnostic: a `Request` goes in, a `Response` with an HTTP status
//! and JSON body comes out. Any server (or the `exec` command) can sit in front.
//!
//! | Method & Path                  | Success            |
//! |--------------------------------|--------------------|
//! | GET    `/api/tree`             | nested forest      |
//! | POST   `/api/tree`             | `{"id"}`           |
//! | DELETE `/api/tree`             | empty forest       |
//! | GET    `/api/tree/node/:id`    | node               |
//! | PUT    `/api/tree/node/:id`    | `{"id"}`           |
//! | DELETE `/api/tree/node/:id`    | `{"id"}`           |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::application::{ApplicationError, ApplicationResult, TreeService};
use crate::domain::{NewNode, NodeId, NodeUpdate};

pub const BANNER: &str = "Couldn't see the forest for the trees!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(ApplicationError::InvalidRequest(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

impl Request {
    /// Build a request from a target such as `/api/tree/node/x?keepChildren=1`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, HashMap::new()),
        };
        Self {
            method,
            path: path.to_string(),
            query,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Truthy unless absent, empty, `false` or `0`.
    pub fn query_flag(&self, name: &str) -> bool {
        self.query
            .get(name)
            .is_some_and(|v| !matches!(v.as_str(), "" | "false" | "0"))
    }

    fn parse_body<T: DeserializeOwned + Default>(&self) -> ApplicationResult<T> {
        match &self.body {
            Some(body) => Ok(serde_json::from_value(body.clone())?),
            None => Ok(T::default()),
        }
    }
}

/// Parse a request line: `METHOD TARGET [JSON-BODY]`.
impl FromStr for Request {
    type Err = ApplicationError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let caps = request_line_regex()
            .captures(line)
            .ok_or_else(|| ApplicationError::InvalidRequest(format!("malformed line: {}", line)))?;

        let method: Method = caps[1].parse()?;
        let request = Request::new(method, &caps[2]);
        match caps.get(3) {
            Some(body) => Ok(request.with_body(serde_json::from_str(body.as_str())?)),
            None => Ok(request),
        }
    }
}

fn request_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\S+)\s+(\S+)(?:\s+(.+?))?\s*$").unwrap())
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn from_error(err: &ApplicationError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.body)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AddNodeBody {
    id: Option<NodeId>,
    parent: Option<NodeId>,
    label: Option<String>,
}

impl From<AddNodeBody> for NewNode {
    fn from(body: AddNodeBody) -> Self {
        NewNode {
            id: body.id,
            parent: body.parent,
            label: body.label.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateNodeBody {
    label: Option<String>,
    /// absent: keep parent, null: move to the forest
    #[serde(deserialize_with = "present")]
    parent: Option<Option<NodeId>>,
}

impl From<UpdateNodeBody> for NodeUpdate {
    fn from(body: UpdateNodeBody) -> Self {
        NodeUpdate {
            label: body.label,
            parent: body.parent,
        }
    }
}

/// Only called when the field is present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Route a request against the service and render the outcome.
#[instrument(level = "debug", skip(service, request), fields(method = %request.method, path = %request.path))]
pub fn dispatch(service: &mut TreeService, request: &Request) -> Response {
    match route(service, request) {
        Ok(body) => Response::ok(body),
        Err(e) => {
            if e.status() >= 500 {
                error!("request failed: {}", e);
            } else {
                debug!(status = e.status(), "request rejected: {}", e);
            }
            Response::from_error(&e)
        }
    }
}

fn route(service: &mut TreeService, request: &Request) -> ApplicationResult<Value> {
    let segments: Vec<&str> = request
        .path
        .trim_end_matches('/')
        .split('/')
        .skip(1)
        .collect();

    match (request.method, segments.as_slice()) {
        (Method::Get, []) => Ok(Value::String(BANNER.to_string())),
        (Method::Get, ["api", "tree"]) => Ok(serde_json::to_value(service.forest())?),
        (Method::Post, ["api", "tree"]) => {
            let body: AddNodeBody = request.parse_body()?;
            let id = service.add(body.into())?;
            Ok(json!({ "id": id }))
        }
        (Method::Delete, ["api", "tree"]) => {
            service.reset();
            Ok(serde_json::to_value(service.forest())?)
        }
        (Method::Get, ["api", "tree", "node", id]) => Ok(serde_json::to_value(service.get(id)?)?),
        (Method::Put, ["api", "tree", "node", id]) => {
            let body: UpdateNodeBody = request.parse_body()?;
            let id = service.update(id, body.into())?;
            Ok(json!({ "id": id }))
        }
        (Method::Delete, ["api", "tree", "node", id]) => {
            let id = service.delete(id, request.query_flag("keepChildren"))?;
            Ok(json!({ "id": id }))
        }
        _ => Err(ApplicationError::RouteNotFound {
            method: request.method.to_string(),
            path: request.path.clone(),
        }),
    }
}
