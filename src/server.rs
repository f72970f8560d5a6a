use std::sync::Arc;

use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};

use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct GithubMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl GithubMcpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

#[allow(deprecated)]
impl ServerHandler for GithubMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "github-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "GitHub server. Use search-repos to find repositories, get-repo-info for \
                 repository details, list-issues to browse issues, and create-issue to open \
                 one. Prompts help draft issue and pull request descriptions, build search \
                 queries, and format raw API responses."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let tools = self
            .dispatcher
            .list_tools()
            .into_iter()
            .map(Tool::from)
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            self.dispatcher
                .call_tool(&request.name, request.arguments)
                .await
                .map(CallToolResult::from)
                .map_err(|e| e.to_mcp_error())
        }
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, ErrorData>> + Send + '_ {
        let prompts = self
            .dispatcher
            .list_prompts()
            .into_iter()
            .map(Prompt::from)
            .collect();
        std::future::ready(Ok(ListPromptsResult::with_all_items(prompts)))
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<GetPromptResult, ErrorData>> + Send + '_ {
        std::future::ready(
            self.dispatcher
                .get_prompt(&request.name, request.arguments)
                .map(GetPromptResult::from)
                .map_err(|e| e.to_mcp_error()),
        )
    }
}
