//! JSON-RPC 2.0 framing for the stdio transport.
//!
//! One message per line in each direction. A response carries exactly one of
//! `result` or `error`, which [`Outcome`] enforces at the type level.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;

/// A message read from the client. Requests carry an `id`; notifications
/// do not and are never answered.
#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {method}"))
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Unknown tool: {name}"))
    }

    pub fn invalid_params(detail: &str) -> Self {
        Self::new(INVALID_PARAMS, format!("Invalid params: {detail}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub id: Value,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            outcome: Outcome::Result(result),
            id,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            outcome: Outcome::Error(error),
            id,
        }
    }

    /// Parse errors are answered with a null id; the request's id is unknown.
    pub fn parse_error() -> Self {
        Self::failure(Value::Null, RpcError::parse_error())
    }

    pub fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Result(_) => None,
        }
    }
}

/// Write `response` as one newline-terminated line and flush.
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> io::Result<()> {
    let json = serde_json::to_string(response).map_err(io::Error::other)?;
    writeln!(writer, "{json}")?;
    writer.flush()
}
