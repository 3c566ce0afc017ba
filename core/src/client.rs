//! Route-table-driven client for the todo API.
//!
//! # Design
//! Every operation goes through two steps: `build_*`
//! produces an `HttpRequest`, `parse_*` consumes an `HttpResponse`. Both are
//! driven entirely by the contract's route table, so method, path, payload
//! schema and error table always come from the one shared definition. The
//! convenience methods (`get_all_todos`, `create_todo`, ...) just put a
//! `Transport` between the two halves.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::contract::{Contract, Operation, PathParams, RouteTable};
use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::schema::{Schema, ValidationError};
#[cfg(feature = "blocking")]
use crate::transport::UreqTransport;
use crate::transport::Transport;
use crate::types::{TodoError, TodoItem};

/// Per-client settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Added to every request.
    pub headers: Vec<(String, String)>,
    /// Check outgoing parameters and incoming bodies against their schemas.
    pub validate: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            validate: true,
        }
    }
}

impl ClientOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }
}

/// Typed client for contract `C`, sending requests through `T`.
pub struct TodoClient<C, T> {
    base_url: String,
    options: ClientOptions,
    transport: T,
    contract: PhantomData<fn() -> C>,
}

impl<C, T: fmt::Debug> fmt::Debug for TodoClient<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoClient")
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Blocking client for contract `C` over HTTP.
#[cfg(feature = "blocking")]
pub fn create_client<C: Contract>(
    base_url: &str,
    options: ClientOptions,
) -> TodoClient<C, UreqTransport> {
    TodoClient::new(base_url, options, UreqTransport::new())
}

fn invalid_response(status: u16, issues: ValidationError) -> ClientError {
    ClientError::InvalidResponse { status, issues }
}

fn decode_body(response: &HttpResponse) -> Result<Value, ClientError> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| {
        invalid_response(
            response.status,
            ValidationError::single("", format!("Malformed JSON: {e}")),
        )
    })
}

fn decode<R: DeserializeOwned>(
    schema: &Schema,
    value: &Value,
    validate: bool,
) -> Result<R, ValidationError> {
    if validate {
        schema.parse(value)
    } else {
        R::deserialize(value).map_err(|e| ValidationError::single("", e.to_string()))
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ClientError> {
    serde_json::to_value(body)
        .map_err(|e| ClientError::Validation(ValidationError::single("body", e.to_string())))
}

fn id_param(id: &str) -> PathParams {
    PathParams::new().with("id", id)
}

impl<C: Contract, T> TodoClient<C, T> {
    pub fn new(base_url: &str, options: ClientOptions, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            options,
            transport,
            contract: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn routes(&self) -> &'static RouteTable {
        C::routes()
    }

    /// Build the request for `op`.
    ///
    /// With validation enabled, every declared parameter is checked first and
    /// a failure is returned without producing a request.
    pub fn build(
        &self,
        op: Operation,
        params: &PathParams,
        body: Option<&Value>,
    ) -> Result<HttpRequest, ClientError> {
        let route = C::routes().route(op)?;
        if self.options.validate {
            route
                .validate_params(params, body)
                .map_err(ClientError::Validation)?;
        }
        let path = route.render_path(params).map_err(ClientError::Validation)?;

        let mut headers = self.options.headers.clone();
        let body = match (route.body(), body) {
            (Some(_), Some(value)) => {
                headers.push((
                    "content-type".to_string(),
                    route.request_format.content_type().to_string(),
                ));
                Some(value.to_string())
            }
            _ => None,
        };

        tracing::debug!(alias = route.alias(), method = %route.method, %path, "built request");
        Ok(HttpRequest {
            method: route.method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        })
    }

    /// Interpret a response to `op`.
    ///
    /// 2xx bodies are checked against the route's response schema. A status
    /// in the route's error table becomes `ClientError::Api`; any other
    /// status is returned raw as `ClientError::UnexpectedStatus`.
    pub fn parse(&self, op: Operation, response: HttpResponse) -> Result<Value, ClientError> {
        let route = C::routes().route(op)?;
        let status = response.status;

        if response.is_success() {
            let value = decode_body(&response)?;
            if self.options.validate {
                route
                    .response
                    .validate(&value)
                    .map_err(|issues| invalid_response(status, issues))?;
            }
            return Ok(value);
        }

        match route.error_for(status) {
            Some(declared) => {
                let value = decode_body(&response)?;
                let error: TodoError = decode(&declared.schema, &value, self.options.validate)
                    .map_err(|issues| invalid_response(status, issues))?;
                tracing::debug!(alias = route.alias(), status, code = error.code, "declared error");
                Err(ClientError::Api { status, error })
            }
            None => Err(ClientError::UnexpectedStatus {
                status,
                body: response.body,
            }),
        }
    }

    fn parse_typed<R: DeserializeOwned>(
        &self,
        op: Operation,
        response: HttpResponse,
    ) -> Result<R, ClientError> {
        let status = response.status;
        let value = self.parse(op, response)?;
        R::deserialize(&value)
            .map_err(|e| invalid_response(status, ValidationError::single("", e.to_string())))
    }

    pub fn build_get_all_todos(&self) -> Result<HttpRequest, ClientError> {
        self.build(Operation::GetAllTodos, &PathParams::new(), None)
    }

    pub fn build_create_todo(&self, body: &C::Create) -> Result<HttpRequest, ClientError> {
        let body = to_body(body)?;
        self.build(Operation::CreateTodo, &PathParams::new(), Some(&body))
    }

    pub fn build_get_todo_by_id(&self, id: &str) -> Result<HttpRequest, ClientError> {
        self.build(Operation::GetTodoById, &id_param(id), None)
    }

    pub fn build_update_todo_by_id(
        &self,
        id: &str,
        body: &C::Update,
    ) -> Result<HttpRequest, ClientError> {
        let body = to_body(body)?;
        self.build(Operation::UpdateTodoById, &id_param(id), Some(&body))
    }

    pub fn build_delete_todo_by_id(&self, id: &str) -> Result<HttpRequest, ClientError> {
        self.build(Operation::DeleteTodoById, &id_param(id), None)
    }

    pub fn parse_get_all_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ClientError> {
        self.parse_typed(Operation::GetAllTodos, response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItem, ClientError> {
        self.parse_typed(Operation::CreateTodo, response)
    }

    pub fn parse_get_todo_by_id(&self, response: HttpResponse) -> Result<TodoItem, ClientError> {
        self.parse_typed(Operation::GetTodoById, response)
    }

    pub fn parse_update_todo_by_id(&self, response: HttpResponse) -> Result<TodoItem, ClientError> {
        self.parse_typed(Operation::UpdateTodoById, response)
    }

    pub fn parse_delete_todo_by_id(&self, response: HttpResponse) -> Result<(), ClientError> {
        self.parse_typed(Operation::DeleteTodoById, response)
    }
}

impl<C: Contract, T: Transport> TodoClient<C, T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self.transport.execute(request)?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Call any operation by alias with untyped parameters.
    pub fn request(
        &self,
        alias: &str,
        params: &PathParams,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let route = C::routes().by_alias(alias).ok_or_else(|| {
            ClientError::Validation(ValidationError::single("", format!("Unknown alias {alias}")))
        })?;
        let request = self.build(route.operation, params, body)?;
        self.parse(route.operation, self.send(request)?)
    }

    pub fn get_all_todos(&self) -> Result<Vec<TodoItem>, ClientError> {
        let request = self.build_get_all_todos()?;
        self.parse_get_all_todos(self.send(request)?)
    }

    pub fn create_todo(&self, body: &C::Create) -> Result<TodoItem, ClientError> {
        let request = self.build_create_todo(body)?;
        self.parse_create_todo(self.send(request)?)
    }

    pub fn get_todo_by_id(&self, id: &str) -> Result<TodoItem, ClientError> {
        let request = self.build_get_todo_by_id(id)?;
        self.parse_get_todo_by_id(self.send(request)?)
    }

    pub fn update_todo_by_id(&self, id: &str, body: &C::Update) -> Result<TodoItem, ClientError> {
        let request = self.build_update_todo_by_id(id, body)?;
        self.parse_update_todo_by_id(self.send(request)?)
    }

    pub fn delete_todo_by_id(&self, id: &str) -> Result<(), ClientError> {
        let request = self.build_delete_todo_by_id(id)?;
        self.parse_delete_todo_by_id(self.send(request)?)
    }
}
