//! OpenAPI 3.0 description served at `/api-docs`.

use serde_json::{json, Value};

fn error_response(description: &str, example: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" },
                "example": { "error": example },
            }
        }
    })
}

fn todo_input_body() -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/TodoInput" },
                "example": { "text": "NewTodo" },
            }
        }
    })
}

fn id_parameter() -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" },
    })
}

fn todo_message(description: &str, message: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string", "example": message },
                        "todo": { "$ref": "#/components/schemas/Todo" },
                    }
                }
            }
        }
    })
}

fn health_path() -> Value {
    json!({
        "get": {
            "tags": ["ApiHealth"],
            "summary": "Database readiness",
            "responses": {
                "200": { "description": "Database connected" },
                "503": { "description": "Database not ready" },
            }
        }
    })
}

fn todos_path() -> Value {
    let list = json!({
        "description": "List of todos",
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "todos": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Todo" },
                        }
                    }
                }
            }
        }
    });
    let created = json!({
        "description": "Todo created",
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "todo": { "$ref": "#/components/schemas/Todo" },
                    }
                }
            }
        }
    });
    json!({
        "get": {
            "tags": ["Todos"],
            "summary": "Get all todos",
            "responses": {
                "200": list,
                "500": error_response("Failed to fetch todos", "Failed to fetch todos"),
            }
        },
        "post": {
            "tags": ["Todos"],
            "summary": "Create a new todo",
            "requestBody": todo_input_body(),
            "responses": {
                "201": created,
                "400": error_response("Validation error", "\"text\" is required"),
                "500": error_response("Failed to create todo", "Failed to create todo"),
            }
        }
    })
}

fn todo_item_path() -> Value {
    json!({
        "put": {
            "tags": ["Todos"],
            "summary": "Update a todo",
            "parameters": [id_parameter()],
            "requestBody": todo_input_body(),
            "responses": {
                "200": todo_message("Todo updated", "Todo updated"),
                "400": error_response("Validation error", "\"text\" is required"),
                "404": error_response("Todo not found", "Todo not found"),
                "500": error_response("Failed to update todo", "Failed to update todo"),
            }
        },
        "delete": {
            "tags": ["Todos"],
            "summary": "Delete a todo",
            "parameters": [id_parameter()],
            "responses": {
                "200": todo_message("Todo deleted", "Todo deleted"),
                "404": error_response("Todo not found", "Todo not found"),
                "500": error_response("Failed to delete todo", "Failed to delete todo"),
            }
        }
    })
}

fn schemas() -> Value {
    let todo = json!({
        "type": "object",
        "required": ["text"],
        "properties": {
            "_id": { "type": "string", "example": "6995e3399ecb6f0efa9b0a09" },
            "text": { "type": "string", "example": "NewTodo" },
            "completed": { "type": "boolean", "example": false },
            "createdAt": { "type": "string", "format": "date-time" },
            "updatedAt": { "type": "string", "format": "date-time" },
            "__v": { "type": "integer", "example": 0 },
        }
    });
    json!({
        "Todo": todo,
        "TodoInput": {
            "type": "object",
            "required": ["text"],
            "properties": {
                "text": { "type": "string", "example": "NewTodo" },
            }
        },
        "Error": {
            "type": "object",
            "properties": {
                "error": { "type": "string" },
            }
        }
    })
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Todo API",
            "description": "CRUD operations for todo items.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/health": health_path(),
            "/todos": todos_path(),
            "/todos/{id}": todo_item_path(),
        },
        "components": { "schemas": schemas() },
    })
}
