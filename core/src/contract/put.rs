//! Alternate contract variant.
//!
//! Titles have no minimum length, `completed` may be given at creation, and
//! `PUT /todos/:id` is a partial update of `title` and/or `completed`.

use serde::{Deserialize, Serialize};

use super::{
    Contract, ContractKind, CreatePayload, Operation, Parameter, RequestFormat, Route, RouteTable,
    UpdatePayload, ID_PARAM, INVALID_INPUT, NOT_FOUND,
};
use crate::http::HttpMethod;
use crate::schema::{Field, Schema};
use crate::types::TodoItem;

pub const TODO_ITEM: Schema = Schema::Object(&[
    Field::required("id", Schema::uuid()),
    Field::required("title", Schema::string()),
    Field::required("completed", Schema::Boolean),
]);

pub const NEW_TODO_ITEM: Schema = Schema::Object(&[
    Field::required("title", Schema::string()),
    Field::optional("completed", Schema::Boolean),
]);

pub const UPDATE_TODO_ITEM: Schema = Schema::Object(&[
    Field::optional("title", Schema::string()),
    Field::optional("completed", Schema::Boolean),
]);

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
        parameters: &[Parameter::body(NEW_TODO_ITEM)],
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
        method: HttpMethod::Put,
        path: "/todos/:id",
        operation: Operation::UpdateTodoById,
        request_format: RequestFormat::Json,
        parameters: &[Parameter::body(UPDATE_TODO_ITEM), ID_PARAM],
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

/// Request payload for creating a todo. Absent `completed` means `false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodoItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl CreatePayload for NewTodoItem {
    fn into_item(self) -> TodoItem {
        TodoItem::new(self.title, self.completed.unwrap_or(false))
    }
}

/// Partial update for `PUT /todos/:id`. Omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodoItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdatePayload for UpdateTodoItem {
    fn apply(self, item: &mut TodoItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PutContract;

impl Contract for PutContract {
    const KIND: ContractKind = ContractKind::Put;
    type Create = NewTodoItem;
    type Update = UpdateTodoItem;

    fn routes() -> &'static RouteTable {
        &ROUTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_defaults_completed_to_false() {
        let payload: NewTodoItem = NEW_TODO_ITEM.parse(&json!({ "title": "x" })).unwrap();
        assert_eq!(payload.completed, None);
        assert!(!payload.into_item().completed);
    }

    #[test]
    fn create_accepts_explicit_completed() {
        let payload: NewTodoItem = NEW_TODO_ITEM
            .parse(&json!({ "title": "Done", "completed": true }))
            .unwrap();
        assert!(payload.into_item().completed);
    }

    #[test]
    fn create_rejects_missing_title() {
        assert!(NEW_TODO_ITEM.validate(&json!({ "completed": true })).is_err());
    }

    #[test]
    fn empty_title_is_allowed() {
        assert!(NEW_TODO_ITEM.validate(&json!({ "title": "" })).is_ok());
    }

    #[test]
    fn update_all_fields_optional() {
        let input: UpdateTodoItem = UPDATE_TODO_ITEM.parse(&json!({})).unwrap();
        assert_eq!(input, UpdateTodoItem::default());
    }

    #[test]
    fn partial_update_leaves_other_fields() {
        let mut item = TodoItem::new("Walk dog", true);
        UpdateTodoItem {
            title: Some("Walk cat".to_string()),
            completed: None,
        }
        .apply(&mut item);
        assert_eq!(item.title, "Walk cat");
        assert!(item.completed);

        UpdateTodoItem {
            title: None,
            completed: Some(false),
        }
        .apply(&mut item);
        assert_eq!(item.title, "Walk cat");
        assert!(!item.completed);
    }

    #[test]
    fn update_serializes_only_supplied_fields() {
        let body = serde_json::to_value(UpdateTodoItem {
            title: Some("Updated".to_string()),
            completed: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "title": "Updated" }));
    }
}
