use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{
    CreatedIssue, GitHubApi, Issue, IssueStateFilter, ListIssuesQuery, NewIssue, RepoSort,
    RepoSummary, Repository, SearchReposQuery,
};
use crate::envelope::ToolResponse;
use crate::error::GithubMcpError;
use crate::registry::{Capability, Descriptor, Namespace};

/// GitHub rejects page sizes above this.
pub const GITHUB_MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_SEARCH_LIMIT: u32 = 5;
pub const DEFAULT_ISSUE_LIMIT: u32 = 10;

pub const ISSUE_CREATED_MESSAGE: &str = "Issue created successfully";

// -- Tool argument types --

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchReposArgs {
    #[schemars(description = "Search query")]
    pub query: String,

    #[schemars(description = "Sort order (default: stars)")]
    #[serde(default)]
    pub sort: Option<RepoSort>,

    #[schemars(description = "Maximum number of results to return (default: 5)")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RepoArgs {
    #[schemars(description = "Repository owner (username or organization)")]
    pub owner: String,

    #[schemars(description = "Repository name")]
    pub repo: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIssuesArgs {
    #[schemars(description = "Repository owner (username or organization)")]
    pub owner: String,

    #[schemars(description = "Repository name")]
    pub repo: String,

    #[schemars(description = "Issue state (default: open)")]
    #[serde(default)]
    pub state: Option<IssueStateFilter>,

    #[schemars(description = "Maximum number of issues to return (default: 10)")]
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateIssueArgs {
    #[schemars(description = "Repository owner (username or organization)")]
    pub owner: String,

    #[schemars(description = "Repository name")]
    pub repo: String,

    #[schemars(description = "Issue title")]
    pub title: String,

    #[schemars(description = "Issue body")]
    pub body: String,

    #[schemars(description = "Labels to apply to the issue (default: none)")]
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

// -- Descriptors --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Map<String, Value>,
}

impl Descriptor for ToolDescriptor {
    fn name(&self) -> &str {
        self.name
    }
}

impl From<ToolDescriptor> for rmcp::model::Tool {
    fn from(descriptor: ToolDescriptor) -> Self {
        rmcp::model::Tool::new(
            descriptor.name,
            descriptor.description,
            Arc::new(descriptor.input_schema),
        )
    }
}

/// JSON schema for an argument struct, with subschemas inlined so enums
/// appear directly on their property.
pub fn input_schema_for<T: schemars::JsonSchema>() -> Map<String, Value> {
    let mut settings = schemars::generate::SchemaSettings::draft2020_12();
    settings.inline_subschemas = true;
    let schema = settings.into_generator().into_root_schema_for::<T>();

    let mut object = match Value::from(schema) {
        Value::Object(object) => object,
        _ => Map::new(),
    };
    object.remove("$schema");
    object.remove("title");
    object
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SearchRepos,
    GetRepoInfo,
    ListIssues,
    CreateIssue,
}

impl Capability for ToolKind {
    type Descriptor = ToolDescriptor;

    const NAMESPACE: Namespace = Namespace::Tools;

    const ALL: &'static [Self] = &[
        ToolKind::SearchRepos,
        ToolKind::GetRepoInfo,
        ToolKind::ListIssues,
        ToolKind::CreateIssue,
    ];

    fn name(self) -> &'static str {
        match self {
            ToolKind::SearchRepos => "search-repos",
            ToolKind::GetRepoInfo => "get-repo-info",
            ToolKind::ListIssues => "list-issues",
            ToolKind::CreateIssue => "create-issue",
        }
    }

    fn descriptor(self) -> ToolDescriptor {
        let (description, input_schema) = match self {
            ToolKind::SearchRepos => (
                "Search for GitHub repositories",
                input_schema_for::<SearchReposArgs>(),
            ),
            ToolKind::GetRepoInfo => (
                "Get information about a specific GitHub repository",
                input_schema_for::<RepoArgs>(),
            ),
            ToolKind::ListIssues => (
                "List issues in a GitHub repository",
                input_schema_for::<ListIssuesArgs>(),
            ),
            ToolKind::CreateIssue => (
                "Create a new issue in a GitHub repository",
                input_schema_for::<CreateIssueArgs>(),
            ),
        };
        ToolDescriptor {
            name: self.name(),
            description,
            input_schema,
        }
    }
}

impl ToolKind {
    /// What the tool was doing, for `Error <activity>: <message>` replies.
    pub fn activity(self) -> &'static str {
        match self {
            ToolKind::SearchRepos => "searching repositories",
            ToolKind::GetRepoInfo => "getting repository information",
            ToolKind::ListIssues => "listing issues",
            ToolKind::CreateIssue => "creating issue",
        }
    }

    /// Run the tool. Failures come back as ordinary text content so the
    /// calling agent can read them.
    pub async fn call(
        self,
        github: &dyn GitHubApi,
        max_results: u32,
        args: Map<String, Value>,
    ) -> ToolResponse {
        let result = match self {
            ToolKind::SearchRepos => search_repos(github, max_results, args).await,
            ToolKind::GetRepoInfo => get_repo_info(github, args).await,
            ToolKind::ListIssues => list_issues(github, max_results, args).await,
            ToolKind::CreateIssue => create_issue(github, args).await,
        };

        match result {
            Ok(value) => ToolResponse::json(&value),
            Err(e) => {
                tracing::warn!(tool = self.name(), error = %e, "tool call failed");
                ToolResponse::text(format!("Error {}: {}", self.activity(), e.user_message()))
            }
        }
    }
}

fn parse_args<T: DeserializeOwned>(
    tool: ToolKind,
    args: Map<String, Value>,
) -> Result<T, GithubMcpError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| GithubMcpError::InvalidArguments {
        capability: tool.name().to_string(),
        reason: e.to_string(),
    })
}

/// Clamp a requested page size to the configured ceiling and GitHub's maximum.
pub fn page_size(limit: u32, max_results: u32) -> u8 {
    limit
        .min(max_results)
        .min(GITHUB_MAX_PAGE_SIZE)
        .max(1) as u8
}

/// Validate that a GitHub owner/repo name doesn't contain characters that
/// could be used for URL injection in API routes.
pub fn sanitize_github_name(name: &str, field: &str) -> Result<(), GithubMcpError> {
    if name.is_empty() {
        return Err(GithubMcpError::InvalidName(format!(
            "{} must not be empty",
            field
        )));
    }
    for ch in ['/', '?', '#', '%', '\0', ' ', '\n', '\t'] {
        if name.contains(ch) {
            return Err(GithubMcpError::InvalidName(format!(
                "{} contains invalid character '{}'",
                field,
                ch.escape_default()
            )));
        }
    }
    Ok(())
}

// -- Handlers --

async fn search_repos(
    github: &dyn GitHubApi,
    max_results: u32,
    args: Map<String, Value>,
) -> Result<Value, GithubMcpError> {
    let args: SearchReposArgs = parse_args(ToolKind::SearchRepos, args)?;
    let per_page = page_size(args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT), max_results);

    let query = SearchReposQuery {
        q: args.query,
        sort: args.sort.unwrap_or_default(),
        per_page,
    };
    let repos = github.search_repositories(&query).await?;
    Ok(render_repo_summaries(&repos, per_page as usize))
}

async fn get_repo_info(
    github: &dyn GitHubApi,
    args: Map<String, Value>,
) -> Result<Value, GithubMcpError> {
    let args: RepoArgs = parse_args(ToolKind::GetRepoInfo, args)?;
    sanitize_github_name(&args.owner, "owner")?;
    sanitize_github_name(&args.repo, "repo")?;

    let repo = github.get_repository(&args.owner, &args.repo).await?;
    Ok(render_repository(&repo))
}

async fn list_issues(
    github: &dyn GitHubApi,
    max_results: u32,
    args: Map<String, Value>,
) -> Result<Value, GithubMcpError> {
    let args: ListIssuesArgs = parse_args(ToolKind::ListIssues, args)?;
    sanitize_github_name(&args.owner, "owner")?;
    sanitize_github_name(&args.repo, "repo")?;
    let per_page = page_size(args.limit.unwrap_or(DEFAULT_ISSUE_LIMIT), max_results);

    let query = ListIssuesQuery {
        state: args.state.unwrap_or_default(),
        per_page,
    };
    let issues = github.list_issues(&args.owner, &args.repo, &query).await?;
    Ok(render_issues(&issues, per_page as usize))
}

async fn create_issue(
    github: &dyn GitHubApi,
    args: Map<String, Value>,
) -> Result<Value, GithubMcpError> {
    let args: CreateIssueArgs = parse_args(ToolKind::CreateIssue, args)?;
    sanitize_github_name(&args.owner, "owner")?;
    sanitize_github_name(&args.repo, "repo")?;

    let issue = NewIssue {
        title: args.title,
        body: args.body,
        labels: args.labels.unwrap_or_default(),
    };
    let created = github.create_issue(&args.owner, &args.repo, &issue).await?;
    Ok(render_created_issue(&created))
}

// -- Response shaping --

pub fn render_repo_summaries(repos: &[RepoSummary], limit: usize) -> Value {
    let results: Vec<Value> = repos
        .iter()
        .take(limit)
        .map(|r| {
            serde_json::json!({
                "name": r.full_name,
                "description": r.description,
                "stars": r.stargazers_count,
                "url": r.html_url,
                "language": r.language,
                "forks": r.forks_count,
            })
        })
        .collect();
    Value::Array(results)
}

pub fn render_repository(repo: &Repository) -> Value {
    let license = repo
        .license
        .as_ref()
        .and_then(|l| l.name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or("No license");

    serde_json::json!({
        "name": repo.full_name,
        "description": repo.description,
        "stars": repo.stargazers_count,
        "forks": repo.forks_count,
        "issues": repo.open_issues_count,
        "language": repo.language,
        "created_at": repo.created_at,
        "updated_at": repo.updated_at,
        "url": repo.html_url,
        "default_branch": repo.default_branch,
        "license": license,
        "topics": repo.topics,
    })
}

pub fn render_issues(issues: &[Issue], limit: usize) -> Value {
    let results: Vec<Value> = issues
        .iter()
        .take(limit)
        .map(|i| {
            let labels: Vec<&str> = i.labels.iter().filter_map(|l| l.name()).collect();
            serde_json::json!({
                "number": i.number,
                "title": i.title,
                "state": i.state,
                "created_at": i.created_at,
                "updated_at": i.updated_at,
                "user": i.user.as_ref().map(|u| u.login.as_str()),
                "labels": labels,
                "url": i.html_url,
                "comments": i.comments,
            })
        })
        .collect();
    Value::Array(results)
}

pub fn render_created_issue(issue: &CreatedIssue) -> Value {
    serde_json::json!({
        "number": issue.number,
        "title": issue.title,
        "url": issue.html_url,
        "created_at": issue.created_at,
        "message": ISSUE_CREATED_MESSAGE,
    })
}
