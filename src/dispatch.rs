use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::GitHubApi;
use crate::envelope::{PromptResponse, ToolResponse};
use crate::error::GithubMcpError;
use crate::prompts::{PromptDescriptor, PromptKind};
use crate::registry::{Capability, Registry};
use crate::tools::{ToolDescriptor, ToolKind, GITHUB_MAX_PAGE_SIZE};

/// Routes named tool and prompt calls to their handlers.
///
/// Arguments are passed through untouched; each handler deserializes and
/// defaults its own. Only an unknown name fails at this level.
pub struct Dispatcher {
    github: Arc<dyn GitHubApi>,
    max_results: u32,
    tools: Registry<ToolKind>,
    prompts: Registry<PromptKind>,
}

impl Dispatcher {
    pub fn new(github: Arc<dyn GitHubApi>) -> Result<Self, GithubMcpError> {
        Self::with_max_results(github, GITHUB_MAX_PAGE_SIZE)
    }

    /// Like [`Dispatcher::new`], with a ceiling on every tool's `limit`.
    pub fn with_max_results(
        github: Arc<dyn GitHubApi>,
        max_results: u32,
    ) -> Result<Self, GithubMcpError> {
        Ok(Self {
            github,
            max_results,
            tools: Registry::new()?,
            prompts: Registry::new()?,
        })
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.descriptors().cloned().collect()
    }

    pub fn list_prompts(&self) -> Vec<PromptDescriptor> {
        self.prompts.descriptors().cloned().collect()
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.names()
    }

    pub fn prompt_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.prompts.names()
    }

    /// Invoke a tool. Upstream failures are already folded into the
    /// returned content; the only error is an unknown tool name.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Option<Map<String, Value>>,
    ) -> Result<ToolResponse, GithubMcpError> {
        let tool = self.tools.resolve(name)?;
        tracing::debug!(tool = tool.name(), "dispatching tool call");
        Ok(tool
            .call(self.github.as_ref(), self.max_results, args.unwrap_or_default())
            .await)
    }

    pub fn get_prompt(
        &self,
        name: &str,
        args: Option<Map<String, Value>>,
    ) -> Result<PromptResponse, GithubMcpError> {
        let prompt = self.prompts.resolve(name)?;
        tracing::debug!(prompt = prompt.name(), "rendering prompt");
        prompt.render(args.unwrap_or_default())
    }
}
