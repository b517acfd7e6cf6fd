//! Static OpenAPI document served at `GET /openapi.json`.
//!
//! Documentation only: requests are never checked against it.

use serde_json::{json, Value};

pub fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Todo API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "In-memory todo list management API."
        },
        "paths": {
            "/health": {
                "get": {
                    "summary": "Health check",
                    "responses": {
                        "200": {
                            "description": "Service is up",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "status": { "type": "string", "example": "ok" } }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "/todos": {
                "get": {
                    "summary": "List todos",
                    "responses": {
                        "200": {
                            "description": "All todos in creation order",
                            "content": {
                                "application/json": {
                                    "schema": { "type": "array", "items": schema_ref("Todo") }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Create a todo",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": schema_ref("CreateTodo") } }
                    },
                    "responses": {
                        "201": todo_response("Created todo"),
                        "400": error_response("Invalid JSON or missing title")
                    }
                }
            },
            "/todos/{id}": {
                "parameters": [{
                    "name": "id",
                    "in": "path",
                    "required": true,
                    "schema": { "type": "integer", "minimum": 1 }
                }],
                "get": {
                    "summary": "Get a todo",
                    "responses": {
                        "200": todo_response("The todo"),
                        "400": error_response("Invalid todo id"),
                        "404": error_response("Todo not found")
                    }
                },
                "patch": {
                    "summary": "Update a todo's title and/or completion",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": schema_ref("UpdateTodo") } }
                    },
                    "responses": {
                        "200": todo_response("Updated todo"),
                        "400": error_response("Invalid id or body"),
                        "404": error_response("Todo not found")
                    }
                },
                "delete": {
                    "summary": "Delete a todo",
                    "responses": {
                        "204": { "description": "Deleted" },
                        "400": error_response("Invalid todo id"),
                        "404": error_response("Todo not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Todo": {
                    "type": "object",
                    "required": ["id", "title", "completed", "createdAt", "updatedAt"],
                    "properties": {
                        "id": { "type": "integer", "minimum": 1 },
                        "title": { "type": "string" },
                        "completed": { "type": "boolean" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    }
                },
                "CreateTodo": {
                    "type": "object",
                    "required": ["title"],
                    "properties": { "title": { "type": "string", "minLength": 1 } }
                },
                "UpdateTodo": {
                    "type": "object",
                    "minProperties": 1,
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "completed": { "type": "boolean" }
                    }
                },
                "Error": {
                    "type": "object",
                    "required": ["error"],
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

fn todo_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema_ref("Todo") } }
    })
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema_ref("Error") } }
    })
}
