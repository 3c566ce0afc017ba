//! The API contract: route descriptors, the route table and the two contract
//! variants built from them.
//!
//! # Design
//! A route table is a `static` slice of `Route` values. The client renders
//! requests from it and the server registers its handlers from it, so neither
//! side can disagree about a path, a verb or a payload shape.
//!
//! The two variants (`PatchContract`, `PutContract`) describe the same five
//! operations with different payloads. They are kept apart on purpose; a
//! process picks exactly one and uses it for every route.

pub mod patch;
pub mod put;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http::HttpMethod;
use crate::schema::{Field, Schema, ValidationError};
use crate::types::TodoItem;

pub use patch::PatchContract;
pub use put::PutContract;

/// Error body shared by every declared error response.
pub const TODO_ERROR: Schema = Schema::Object(&[
    Field::required("code", Schema::Integer),
    Field::required("message", Schema::string()),
]);

/// The `:id` path parameter every item route declares.
pub const ID_PARAM: Parameter = Parameter::path("id", Schema::uuid());

pub const INVALID_INPUT: ErrorResponse = ErrorResponse {
    status: 400,
    description: "Invalid input",
    schema: TODO_ERROR,
};

pub const NOT_FOUND: ErrorResponse = ErrorResponse {
    status: 404,
    description: "Todo item not found",
    schema: TODO_ERROR,
};

/// The five operations the API exposes. Each one maps to a unique alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetAllTodos,
    CreateTodo,
    GetTodoById,
    UpdateTodoById,
    DeleteTodoById,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Self::GetAllTodos,
        Self::CreateTodo,
        Self::GetTodoById,
        Self::UpdateTodoById,
        Self::DeleteTodoById,
    ];

    pub const fn alias(self) -> &'static str {
        match self {
            Self::GetAllTodos => "getAllTodos",
            Self::CreateTodo => "createTodo",
            Self::GetTodoById => "getTodoById",
            Self::UpdateTodoById => "updateTodoById",
            Self::DeleteTodoById => "deleteTodoById",
        }
    }

    pub fn from_alias(alias: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.alias() == alias)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
}

impl RequestFormat {
    /// `content-type` sent with a request body of this format.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Body,
}

/// A declared request parameter and the schema that governs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub name: &'static str,
    pub location: ParamLocation,
    pub schema: Schema,
}

impl Parameter {
    pub const fn path(name: &'static str, schema: Schema) -> Self {
        Self {
            name,
            location: ParamLocation::Path,
            schema,
        }
    }

    pub const fn body(schema: Schema) -> Self {
        Self {
            name: "body",
            location: ParamLocation::Body,
            schema,
        }
    }
}

/// A declared non-success response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub description: &'static str,
    pub schema: Schema,
}

/// Named path parameter values, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// One endpoint descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    /// Path template, parameters written as `:name`.
    pub path: &'static str,
    pub operation: Operation,
    pub request_format: RequestFormat,
    pub parameters: &'static [Parameter],
    pub response: Schema,
    pub errors: &'static [ErrorResponse],
}

impl Route {
    pub fn alias(&self) -> &'static str {
        self.operation.alias()
    }

    /// Parameter names that appear in the path template.
    pub fn template_params(&self) -> impl Iterator<Item = &'static str> {
        let path: &'static str = self.path;
        path.split('/').filter_map(|seg| seg.strip_prefix(':'))
    }

    pub fn path_parameters(&self) -> impl Iterator<Item = &'static Parameter> {
        let parameters: &'static [Parameter] = self.parameters;
        parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Path)
    }

    pub fn body(&self) -> Option<&'static Parameter> {
        let parameters: &'static [Parameter] = self.parameters;
        parameters
            .iter()
            .find(|p| p.location == ParamLocation::Body)
    }

    pub fn error_for(&self, status: u16) -> Option<&'static ErrorResponse> {
        let errors: &'static [ErrorResponse] = self.errors;
        errors.iter().find(|e| e.status == status)
    }

    /// Substitute path parameters into the template, percent-encoding each value.
    pub fn render_path(&self, params: &PathParams) -> Result<String, ValidationError> {
        let mut out = String::with_capacity(self.path.len());
        let mut missing = Vec::new();
        for (i, seg) in self.path.split('/').enumerate() {
            if i > 0 {
                out.push('/');
            }
            match seg.strip_prefix(':') {
                Some(name) => match params.get(name) {
                    Some(value) => out.push_str(&urlencoding::encode(value)),
                    None => missing.push(name),
                },
                None => out.push_str(seg),
            }
        }
        match missing.as_slice() {
            [] => Ok(out),
            [first, rest @ ..] => {
                let mut err = ValidationError::single(first, "Required");
                for name in rest {
                    err.extend(ValidationError::single(name, "Required"));
                }
                Err(err)
            }
        }
    }

    /// Match a concrete request path against the template, decoding parameter values.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let mut template = self.path.split('/');
        let mut actual = path.split('/');
        let mut params = PathParams::new();
        loop {
            match (template.next(), actual.next()) {
                (None, None) => return Some(params),
                (Some(t), Some(a)) => match t.strip_prefix(':') {
                    Some(name) if !a.is_empty() => {
                        let value = urlencoding::decode(a).ok()?;
                        params = params.with(name, value.into_owned());
                    }
                    Some(_) => return None,
                    None if t == a => {}
                    None => return None,
                },
                _ => return None,
            }
        }
    }

    /// Run every declared parameter schema, merging the issues.
    ///
    /// A missing path parameter is reported as `Required`; `body` is only
    /// checked when the route declares a body binding.
    pub fn validate_params(
        &self,
        params: &PathParams,
        body: Option<&Value>,
    ) -> Result<(), ValidationError> {
        self.check_params(params, body, None)
    }

    /// Run only the path parameter schemas.
    pub fn validate_path(&self, params: &PathParams) -> Result<(), ValidationError> {
        self.check_params(params, None, Some(ParamLocation::Path))
    }

    fn check_params(
        &self,
        params: &PathParams,
        body: Option<&Value>,
        only: Option<ParamLocation>,
    ) -> Result<(), ValidationError> {
        let mut failure: Option<ValidationError> = None;
        let selected = self
            .parameters
            .iter()
            .filter(|p| only.map_or(true, |loc| p.location == loc));
        for param in selected {
            let result = match param.location {
                ParamLocation::Path => match params.get(param.name) {
                    Some(value) => param
                        .schema
                        .validate(&Value::String(value.to_string()))
                        .map_err(|e| e.prefixed(param.name)),
                    None => Err(ValidationError::single(param.name, "Required")),
                },
                ParamLocation::Body => param.schema.validate(body.unwrap_or(&Value::Null)),
            };
            if let Err(err) = result {
                match &mut failure {
                    Some(acc) => acc.extend(err),
                    None => failure = Some(err),
                }
            }
        }

        failure.map_or(Ok(()), Err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("route {method} {path} is declared more than once")]
    DuplicateRoute { method: HttpMethod, path: &'static str },

    #[error("alias {0} is declared more than once")]
    DuplicateAlias(&'static str),

    #[error("path parameter :{param} of {path} has no path binding")]
    MissingPathBinding { path: &'static str, param: &'static str },

    #[error("{method} {path} declares a body but {method} carries none")]
    BodyOnBodilessMethod { method: HttpMethod, path: &'static str },

    #[error("no route for operation {0}")]
    UnknownOperation(Operation),
}

/// An immutable, enumerable set of routes.
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    routes: &'static [Route],
}

impl RouteTable {
    pub const fn new(routes: &'static [Route]) -> Self {
        Self { routes }
    }

    pub fn iter(&self) -> std::slice::Iter<'static, Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn route(&self, op: Operation) -> Result<&'static Route, ContractError> {
        self.iter()
            .find(|r| r.operation == op)
            .ok_or(ContractError::UnknownOperation(op))
    }

    pub fn by_alias(&self, alias: &str) -> Option<&'static Route> {
        self.iter().find(|r| r.alias() == alias)
    }

    /// Resolve a concrete method and path to its route and path parameters.
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<(&'static Route, PathParams)> {
        self.iter()
            .filter(|r| r.method == method)
            .find_map(|r| r.match_path(path).map(|params| (r, params)))
    }

    /// Verify the structural invariants every table must hold.
    pub fn check(&self) -> Result<(), ContractError> {
        for (i, route) in self.routes.iter().enumerate() {
            for earlier in &self.routes[..i] {
                if earlier.method == route.method && earlier.path == route.path {
                    return Err(ContractError::DuplicateRoute {
                        method: route.method,
                        path: route.path,
                    });
                }
                if earlier.alias() == route.alias() {
                    return Err(ContractError::DuplicateAlias(route.alias()));
                }
            }
            if route.body().is_some() && !route.method.has_body() {
                return Err(ContractError::BodyOnBodilessMethod {
                    method: route.method,
                    path: route.path,
                });
            }
            for param in route.template_params() {
                if !route.path_parameters().any(|p| p.name == param) {
                    return Err(ContractError::MissingPathBinding {
                        path: route.path,
                        param,
                    });
                }
            }
        }
        Ok(())
    }
}

impl IntoIterator for &RouteTable {
    type Item = &'static Route;
    type IntoIter = std::slice::Iter<'static, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Creation payload of a contract variant.
pub trait CreatePayload: Serialize + DeserializeOwned + Send + 'static {
    /// Build the stored item. The identifier is always generated here,
    /// never taken from the client.
    fn into_item(self) -> TodoItem;
}

/// Update payload of a contract variant.
pub trait UpdatePayload: Serialize + DeserializeOwned + Send + 'static {
    /// Overwrite the supplied fields of `item`; everything else is left as is.
    fn apply(self, item: &mut TodoItem);
}

/// A complete, self-consistent API contract.
pub trait Contract: Send + Sync + 'static {
    const KIND: ContractKind;
    type Create: CreatePayload;
    type Update: UpdatePayload;

    fn routes() -> &'static RouteTable;
}

/// Runtime selector for a contract variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContractKind {
    /// `PATCH /todos/:id` with `{completed}`; titles of at least five characters.
    #[default]
    Patch,
    /// `PUT /todos/:id` with a partial `{title?, completed?}`; `completed` settable at creation.
    Put,
}

impl ContractKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Put => "put",
        }
    }

    pub fn routes(self) -> &'static RouteTable {
        match self {
            Self::Patch => PatchContract::routes(),
            Self::Put => PutContract::routes(),
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown contract {0:?} (expected \"patch\" or \"put\")")]
pub struct UnknownContract(String);

impl FromStr for ContractKind {
    type Err = UnknownContract;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "put" => Ok(Self::Put),
            _ => Err(UnknownContract(s.to_string())),
        }
    }
}
