//! # LLDAP GraphQL Client
//!
//! [`DirectoryStore`] over LLDAP's HTTP API:
//! - `POST /auth/simple/login` exchanges admin credentials for a JWT
//! - `POST /api/graphql` carries every query and mutation, bearer-authenticated
//!
//! Arguments travel as GraphQL variables, never spliced into the document.

use super::{
    AttributeValue, DirectoryStore, GroupRef, NewUser, StoreError, StoreResult, classify_errors,
};
use ldif_import_core::SchemaTarget;
use serde_json::{Value, json};

const GRAPHQL_PATH: &str = "/api/graphql";
const LOGIN_PATH: &str = "/auth/simple/login";

/// Error text LLDAP returns when looking up a missing user.
const NOT_FOUND_MARKER: &str = "not found";

/// HTTP client for one LLDAP instance.
#[derive(Clone)]
pub struct LldapClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl LldapClient {
    /// Create a client for `base_url` (without trailing `/api/graphql`).
    pub fn new(base_url: &str, accept_invalid_certs: bool) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Base URL the client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a token and keep it for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> StoreResult<String> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let body = json!({ "username": username, "password": password });

        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        let token = value
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::MalformedResponse("login response has no token".into()))?
            .to_string();

        self.token = Some(token.clone());
        Ok(token)
    }

    /// Send one GraphQL document and return its `data` member.
    async fn execute(&self, query: &str, variables: Value) -> StoreResult<Value> {
        let url = format!("{}{}", self.base_url, GRAPHQL_PATH);
        let payload = json!({ "query": query, "variables": variables });

        let mut req = self.http.post(&url).json(&payload);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StoreError::Unauthorized);
        }
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if status != reqwest::StatusCode::OK {
            tracing::debug!(payload = %payload, "request rejected with HTTP {}", status);
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| StoreError::MalformedResponse(format!("{e}: {body}")))?;

        if let Some(errors) = value.get("errors").and_then(Value::as_array)
            && !errors.is_empty()
        {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| {
                    err.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| err.to_string())
                })
                .collect();
            tracing::debug!(payload = %payload, "store returned errors: {}", messages.join("; "));
            return Err(classify_errors(&messages));
        }

        Ok(value.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Run a mutation answering `{ <field> { ok } }` and require `ok: true`.
    async fn execute_ok(&self, field: &str, query: &str, variables: Value) -> StoreResult<()> {
        let data = self.execute(query, variables).await?;
        match data.pointer(&format!("/{field}/ok")).and_then(Value::as_bool) {
            Some(true) => Ok(()),
            _ => Err(StoreError::Rejected(format!("{field} did not report ok: {data}"))),
        }
    }
}

// =============================================================================
// RESPONSE EXTRACTION
// =============================================================================

/// Collect every `attributes[].name` of both schemas.
fn attribute_names(data: &Value) -> Vec<String> {
    ["userSchema", "groupSchema"]
        .iter()
        .filter_map(|schema| data.pointer(&format!("/schema/{schema}/attributes")))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(|attr| attr.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Collect `groups[]` as `(id, displayName)` pairs.
fn group_refs(data: &Value) -> Vec<GroupRef> {
    data.get("groups")
        .and_then(Value::as_array)
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| {
                    Some(GroupRef {
                        id: g.get("id")?.as_i64()?,
                        display_name: g.get("displayName")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// DIRECTORY STORE
// =============================================================================

impl DirectoryStore for LldapClient {
    async fn list_attribute_names(&self) -> StoreResult<Vec<String>> {
        let data = self
            .execute(
                "query { schema { userSchema { attributes { name } } groupSchema { attributes { name } } } }",
                json!({}),
            )
            .await?;
        Ok(attribute_names(&data))
    }

    async fn list_groups(&self) -> StoreResult<Vec<GroupRef>> {
        let data = self
            .execute("query { groups { id displayName } }", json!({}))
            .await?;
        Ok(group_refs(&data))
    }

    async fn add_attribute(
        &self,
        target: SchemaTarget,
        name: &str,
        is_list: bool,
    ) -> StoreResult<()> {
        let field = match target {
            SchemaTarget::User => "addUserAttribute",
            SchemaTarget::Group => "addGroupAttribute",
        };
        let query = format!(
            "mutation AddAttribute($name: String!, $isList: Boolean!) {{ \
             {field}(name: $name, attributeType: STRING, isList: $isList, isVisible: true, isEditable: true) {{ ok }} }}"
        );
        self.execute_ok(field, &query, json!({ "name": name, "isList": is_list }))
            .await
    }

    async fn create_user(&self, user: &NewUser) -> StoreResult<()> {
        let data = self
            .execute(
                "mutation CreateUser($user: CreateUserInput!) { createUser(user: $user) { id } }",
                json!({ "user": user }),
            )
            .await?;
        match data.pointer("/createUser/id") {
            Some(Value::String(_)) => Ok(()),
            _ => Err(StoreError::MalformedResponse(format!(
                "createUser returned no id: {data}"
            ))),
        }
    }

    async fn delete_user(&self, user_id: &str) -> StoreResult<()> {
        self.execute_ok(
            "deleteUser",
            "mutation DeleteUser($userId: String!) { deleteUser(userId: $userId) { ok } }",
            json!({ "userId": user_id }),
        )
        .await
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<String>> {
        let result = self
            .execute(
                "query GetUser($userId: String!) { user(userId: $userId) { id } }",
                json!({ "userId": user_id }),
            )
            .await;
        match result {
            Ok(data) => Ok(data
                .pointer("/user/id")
                .and_then(Value::as_str)
                .map(str::to_string)),
            Err(StoreError::Rejected(msg)) if msg.to_lowercase().contains(NOT_FOUND_MARKER) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update_avatar(&self, user_id: &str, avatar: &str) -> StoreResult<()> {
        self.execute_ok(
            "updateUser",
            "mutation UpdateUser($user: UpdateUserInput!) { updateUser(user: $user) { ok } }",
            json!({ "user": { "id": user_id, "avatar": avatar } }),
        )
        .await
    }

    async fn insert_user_attribute(
        &self,
        user_id: &str,
        name: &str,
        value: &AttributeValue,
    ) -> StoreResult<()> {
        self.execute_ok(
            "updateUser",
            "mutation UpdateUser($user: UpdateUserInput!) { updateUser(user: $user) { ok } }",
            json!({
                "user": {
                    "id": user_id,
                    "insertAttributes": [{ "name": name, "value": value }],
                }
            }),
        )
        .await
    }

    async fn create_group(&self, name: &str) -> StoreResult<i64> {
        let data = self
            .execute(
                "mutation CreateGroup($name: String!) { createGroup(name: $name) { id } }",
                json!({ "name": name }),
            )
            .await?;
        data.pointer("/createGroup/id")
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                StoreError::MalformedResponse(format!("createGroup returned no id: {data}"))
            })
    }

    async fn add_user_to_group(&self, user_id: &str, group_id: i64) -> StoreResult<()> {
        self.execute_ok(
            "addUserToGroup",
            "mutation AddUserToGroup($userId: String!, $groupId: Int!) { addUserToGroup(userId: $userId, groupId: $groupId) { ok } }",
            json!({ "userId": user_id, "groupId": group_id }),
        )
        .await
    }
}

// =============================================================================
// TESTS
// =============================================================================
