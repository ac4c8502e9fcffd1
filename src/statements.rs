use serde::Serialize;

#[cfg(feature = "async")]
use crate::{Result, WarehouseAuthError};

/// A single named parameter binding on a statement
#[derive(Debug, Clone, Serialize)]
pub struct StatementParameter {
    /// Parameter name referenced by the statement
    pub name: String,
    /// Warehouse type of the value (e.g. "DATE", "STRING")
    #[serde(rename = "type")]
    pub kind: String,
    /// Literal value, sent as a string
    pub value: String,
}

impl StatementParameter {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// A DATE-typed binding
    pub fn date(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, "DATE", value)
    }
}

/// One SQL statement execution request
///
/// Serializes to the statements endpoint's wire shape:
/// `{statement, warehouse_id, parameters: [{name, type, value}]}`.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRequest {
    /// The SQL text to execute
    pub statement: String,
    /// Identifier of the warehouse that runs the statement
    pub warehouse_id: String,
    /// Named parameter bindings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<StatementParameter>,
}

impl StatementRequest {
    pub fn new(statement: impl Into<String>, warehouse_id: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            warehouse_id: warehouse_id.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter binding
    pub fn with_parameter(mut self, parameter: StatementParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// Client for the workspace SQL statements endpoint
///
/// Submits one statement with bearer-token authorization and hands the
/// response body back untouched. The statement is assumed to complete
/// synchronously; a pending execution state is not polled for (see the
/// crate-level notes).
#[cfg(feature = "async")]
pub struct StatementsClient {
    statements_url: String,
    access_token: String,
}

#[cfg(feature = "async")]
impl StatementsClient {
    /// Create a client against an explicit statements endpoint URL
    pub fn new(statements_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            statements_url: statements_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Create a client for a workspace hostname
    pub fn for_workspace(host: impl AsRef<str>, access_token: impl Into<String>) -> Self {
        Self::new(
            format!("https://{}/api/2.0/sql/statements", host.as_ref()),
            access_token,
        )
    }

    /// Submit one statement and return the raw response body
    ///
    /// Any non-success status is fatal and surfaced as
    /// [`WarehouseAuthError::Http`]; nothing is retried.
    pub async fn submit(&self, request: &StatementRequest) -> Result<serde_json::Value> {
        let client = reqwest::Client::new();

        let response = client
            .post(&self.statements_url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(WarehouseAuthError::Http { status, body });
        }

        tracing::debug!(warehouse_id = %request.warehouse_id, "statement submitted");
        response.json().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    #[cfg(feature = "async")]
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    #[cfg(feature = "async")]
    use crate::WarehouseAuthError;

    fn sample_request() -> StatementRequest {
        StatementRequest::new("SELECT 1 WHERE d = :date", "wh-1")
            .with_parameter(StatementParameter::date("date", "2016-02-01"))
    }

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let body = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(
            body,
            json!({
                "statement": "SELECT 1 WHERE d = :date",
                "warehouse_id": "wh-1",
                "parameters": [
                    {"name": "date", "type": "DATE", "value": "2016-02-01"}
                ]
            })
        );
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn submit_sends_bearer_token_and_returns_the_body_untouched() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/2.0/sql/statements")
            .match_header("authorization", "Bearer tok1")
            .match_body(Matcher::Json(json!({
                "statement": "SELECT 1 WHERE d = :date",
                "warehouse_id": "wh-1",
                "parameters": [
                    {"name": "date", "type": "DATE", "value": "2016-02-01"}
                ]
            })))
            .with_status(200)
            .with_body(r#"{"result": "ok", "row_count": 10}"#)
            .create_async()
            .await;

        let client = StatementsClient::new(
            format!("{}/api/2.0/sql/statements", server.url()),
            "tok1",
        );
        let result = client.submit(&sample_request()).await.unwrap();

        assert_eq!(result, json!({"result": "ok", "row_count": 10}));

        mock.assert_async().await;
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn submit_failure_is_fatal() {
        let mut server = Server::new_async().await;

        server
            .mock("POST", "/api/2.0/sql/statements")
            .with_status(403)
            .with_body("permission denied")
            .create_async()
            .await;

        let client = StatementsClient::new(
            format!("{}/api/2.0/sql/statements", server.url()),
            "tok1",
        );
        let err = client.submit(&sample_request()).await.unwrap_err();

        match err {
            WarehouseAuthError::Http { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "permission denied");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
