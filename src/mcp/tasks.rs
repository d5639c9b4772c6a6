//! Personal task list tools.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::json;

use super::gate::{owner_scope, principal_from};
use super::{json_contents, json_resource, json_result, map_db_error};
use crate::api::{TaskResponse, TasksResponse};
use crate::auth::OwnerScope;
use crate::db::Database;
use crate::service::TaskService;

pub const TASKS_RESOURCE: &str = "resource://tasks";
const TASK_RESOURCE_PREFIX: &str = "resource://tasks/";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Text of the new task")]
    #[serde(rename = "taskText")]
    pub task_text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskIdParams {
    #[schemars(description = "Task ID")]
    #[serde(rename = "taskID")]
    pub task_id: String,
}

/// MCP server for one user's task list.
pub struct TaskMcpServer<D: Database> {
    tasks: TaskService<D>,
    tool_router: ToolRouter<Self>,
}

impl<D: Database> Clone for TaskMcpServer<D> {
    fn clone(&self) -> Self {
        Self::new(self.tasks.clone())
    }
}

impl<D: Database> TaskMcpServer<D> {
    pub async fn list(&self, scope: &OwnerScope) -> Result<TasksResponse, McpError> {
        let tasks = self.tasks.list(scope).await.map_err(map_db_error)?;
        Ok(tasks.into())
    }

    pub async fn add(&self, scope: &OwnerScope, text: &str) -> Result<TasksResponse, McpError> {
        let tasks = self.tasks.add(scope, text).await.map_err(map_db_error)?;
        Ok(tasks.into())
    }

    pub async fn complete(&self, scope: &OwnerScope, id: &str) -> Result<TasksResponse, McpError> {
        let tasks = self
            .tasks
            .mark_completed(scope, id)
            .await
            .map_err(map_db_error)?;
        Ok(tasks.into())
    }

    pub async fn remove(&self, scope: &OwnerScope, id: &str) -> Result<TasksResponse, McpError> {
        let tasks = self.tasks.delete(scope, id).await.map_err(map_db_error)?;
        Ok(tasks.into())
    }

    /// Body of a readable resource, or `None` for an unknown URI. A task
    /// id outside the caller's list reads as an empty list.
    pub async fn read(&self, scope: &OwnerScope, uri: &str) -> Result<Option<String>, McpError> {
        let tasks = if uri == TASKS_RESOURCE {
            self.list(scope).await?
        } else if let Some(id) = uri.strip_prefix(TASK_RESOURCE_PREFIX) {
            let task = self.tasks.get(scope, id).await.map_err(map_db_error)?;
            TasksResponse {
                tasks: task.into_iter().map(TaskResponse::from).collect(),
            }
        } else {
            return Ok(None);
        };

        serde_json::to_string_pretty(&tasks)
            .map(Some)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router(vis = "pub(crate)")]
impl<D: Database> TaskMcpServer<D> {
    pub fn new(tasks: TaskService<D>) -> Self {
        Self {
            tasks,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "createTask",
        description = "Add a task to your list. Returns the updated list."
    )]
    pub async fn create_task(
        &self,
        Parameters(params): Parameters<CreateTaskParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = owner_scope(&principal_from(&ctx)?);
        json_result(&self.add(&scope, &params.task_text).await?)
    }

    #[tool(
        name = "markTaskComplete",
        description = "Mark a task as completed. Returns the updated list."
    )]
    pub async fn mark_task_complete(
        &self,
        Parameters(params): Parameters<TaskIdParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = owner_scope(&principal_from(&ctx)?);
        json_result(&self.complete(&scope, &params.task_id).await?)
    }

    #[tool(
        name = "deleteTask",
        description = "Remove a task from your list. Returns the updated list."
    )]
    pub async fn delete_task(
        &self,
        Parameters(params): Parameters<TaskIdParams>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let scope = owner_scope(&principal_from(&ctx)?);
        json_result(&self.remove(&scope, &params.task_id).await?)
    }
}

#[tool_handler]
impl<D: Database> ServerHandler for TaskMcpServer<D> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: Some(
                "Task List - add, complete and delete items on your personal task list."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![json_resource(TASKS_RESOURCE, "tasks")],
            next_cursor: None,
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        let template: ResourceTemplate = serde_json::from_value(json!({
            "uriTemplate": format!("{}{{id}}", TASK_RESOURCE_PREFIX),
            "name": "task",
            "description": "A single task by ID",
            "mimeType": "application/json",
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(ListResourceTemplatesResult {
            resource_templates: vec![template],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let scope = owner_scope(&principal_from(&ctx)?);
        match self.read(&scope, &uri).await? {
            Some(text) => Ok(ReadResourceResult {
                contents: vec![json_contents(text, uri)],
            }),
            None => Err(McpError::resource_not_found(
                "resource_not_found",
                Some(json!({ "uri": uri })),
            )),
        }
    }
}
