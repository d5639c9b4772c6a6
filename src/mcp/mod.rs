//! Model Context Protocol surface.
//!
//! One server per variant, served over Streamable HTTP behind the bearer
//! gate in [`gate`]:
//!
//! - **tickets**: organization-scoped ticket tools and a ticket resource
//! - **tasks**: per-user task tools plus list and item resources
//!
//! Both servers delegate to the same services the REST handlers use.

pub mod gate;
mod service;
pub mod tasks;
pub mod tickets;


use rmcp::{
    ErrorData as McpError,
    model::{AnnotateAble, CallToolResult, Content, RawResource, Resource, ResourceContents},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::db::DbError;

pub use gate::{principal_from, require_bearer};
pub use service::{create_mcp_service, mcp_router, task_mcp_service, ticket_mcp_service};
pub use tasks::TaskMcpServer;
pub use tickets::TicketMcpServer;

const JSON_MIME_TYPE: &str = "application/json";

/// A listed resource whose contents are JSON.
pub(crate) fn json_resource(uri: &str, name: &str) -> Resource {
    let mut resource = RawResource::new(uri, name);
    resource.mime_type = Some(JSON_MIME_TYPE.to_string());
    resource.no_annotation()
}

pub(crate) fn json_contents(text: String, uri: String) -> ResourceContents {
    ResourceContents::TextResourceContents {
        uri,
        mime_type: Some(JSON_MIME_TYPE.to_string()),
        text,
        meta: None,
    }
}

/// Serialize a tool's return value as its single text content.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

pub(crate) fn map_db_error(e: DbError) -> McpError {
    match e {
        DbError::Validation { message } => McpError::invalid_params(message, None),
        other => {
            error!(error = %other, "tool call failed");
            McpError::internal_error(
                "database_error",
                Some(json!({ "error": "Internal server error" })),
            )
        }
    }
}
