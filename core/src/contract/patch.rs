//! Canonical contract variant.
//!
//! Titles must be at least five characters long, creation always yields an
//! incomplete item, and `PATCH /todos/:id` sets only `completed`.

use serde::{Deserialize, Serialize};

use super::{
    Contract, ContractKind, CreatePayload, Operation, Parameter, RequestFormat, Route, RouteTable,
    UpdatePayload, ID_PARAM, INVALID_INPUT, NOT_FOUND,
};
use crate::http::HttpMethod;
use crate::schema::{Field, Schema};
use crate::types::TodoItem;

pub const TITLE_MIN_LEN: usize = 5;

pub const TODO_ITEM: Schema = Schema::Object(&[
    Field::required("id", Schema::uuid()),
    Field::required("title", Schema::string_min(TITLE_MIN_LEN)),
    Field::required("completed", Schema::Boolean),
]);

pub const TODO_ITEM_PAYLOAD: Schema = Schema::Object(&[Field::required(
    "title",
    Schema::string_min(TITLE_MIN_LEN),
)]);

pub const UPDATE_TODO_ITEM_PAYLOAD: Schema =
    Schema::Object(&[Field::required("completed", Schema::Boolean)]);

static ROUTES: RouteTable = RouteTable::new(&[
    Route {
        method: HttpMethod::Get,
        path: "/todos",
        operation: Operation::GetAllTodos,
        request_format: RequestFormat::Json,
        parameters: &[],
        response: Schema::Array(&TODO_ITEM),
        errors: &[],
    },
    Route {
        method: HttpMethod::Post,
        path: "/todos",
        operation: Operation::CreateTodo,
        request_format: RequestFormat::Json,
        parameters: &[Parameter::body(TODO_ITEM_PAYLOAD)],
        response: TODO_ITEM,
        errors: &[INVALID_INPUT],
    },
    Route {
        method: HttpMethod::Get,
        path: "/todos/:id",
        operation: Operation::GetTodoById,
        request_format: RequestFormat::Json,
        parameters: &[ID_PARAM],
        response: TODO_ITEM,
        errors: &[NOT_FOUND],
    },
    Route {
        method: HttpMethod::Patch,
        path: "/todos/:id",
        operation: Operation::UpdateTodoById,
        request_format: RequestFormat::Json,
        parameters: &[Parameter::body(UPDATE_TODO_ITEM_PAYLOAD), ID_PARAM],
        response: TODO_ITEM,
        errors: &[INVALID_INPUT, NOT_FOUND],
    },
    Route {
        method: HttpMethod::Delete,
        path: "/todos/:id",
        operation: Operation::DeleteTodoById,
        request_format: RequestFormat::Json,
        parameters: &[ID_PARAM],
        response: Schema::Void,
        errors: &[NOT_FOUND],
    },
]);

/// Request payload for creating a todo. `completed` cannot be set here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItemPayload {
    pub title: String,
}

impl CreatePayload for TodoItemPayload {
    fn into_item(self) -> TodoItem {
        TodoItem::new(self.title, false)
    }
}

/// Request payload for `PATCH /todos/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodoItemPayload {
    pub completed: bool,
}

impl UpdatePayload for UpdateTodoItemPayload {
    fn apply(self, item: &mut TodoItem) {
        item.completed = self.completed;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchContract;

impl Contract for PatchContract {
    const KIND: ContractKind = ContractKind::Patch;
    type Create = TodoItemPayload;
    type Update = UpdateTodoItemPayload;

    fn routes() -> &'static RouteTable {
        &ROUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_minimum_is_enforced() {
        let err = TODO_ITEM_PAYLOAD
            .validate(&json!({ "title": "Milk" }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "title: String must contain at least 5 character(s)"
        );
        assert!(TODO_ITEM_PAYLOAD.validate(&json!({ "title": "Buy milk" })).is_ok());
    }

    #[test]
    fn completed_is_ignored_at_creation() {
        let payload: TodoItemPayload = TODO_ITEM_PAYLOAD
            .parse(&json!({ "title": "Buy milk", "completed": true }))
            .unwrap();
        let item = payload.into_item();
        assert!(!item.completed);
        assert_eq!(item.title, "Buy milk");
    }

    #[test]
    fn update_requires_completed() {
        let err = UPDATE_TODO_ITEM_PAYLOAD
            .validate(&json!({ "title": "Renamed" }))
            .unwrap_err();
        assert_eq!(err.to_string(), "completed: Required");
    }

    #[test]
    fn update_touches_only_completed() {
        let mut item = TodoItem::new("Walk dog", false);
        let before = item.clone();
        UpdateTodoItemPayload { completed: true }.apply(&mut item);
        assert!(item.completed);
        assert_eq!(item.title, before.title);
        assert_eq!(item.id, before.id);
    }
}
