//! The outbound GitHub dependency.
//!
//! Handlers talk to GitHub only through [`GitHubApi`], so the dispatcher can
//! be driven by a substitute in tests. [`OctocrabClient`] is the real thing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GithubMcpError;

/// Sort order for repository search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RepoSort {
    #[default]
    Stars,
    Forks,
    HelpWantedIssues,
    Updated,
}

/// Issue state filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IssueStateFilter {
    #[default]
    Open,
    Closed,
    All,
}

// -- Request types (serialized as query string or JSON body) --

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchReposQuery {
    pub q: String,
    pub sort: RepoSort,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListIssuesQuery {
    pub state: IssueStateFilter,
    pub per_page: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

// -- Response types (only the fields the tools report) --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<RepoSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: String,
    pub language: Option<String>,
    #[serde(default)]
    pub forks_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct License {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    pub language: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub default_branch: Option<String>,
    pub license: Option<License>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub login: String,
}

/// GitHub reports labels either as bare names or as label objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Name(String),
    Object { name: Option<String> },
}

impl Label {
    pub fn name(&self) -> Option<&str> {
        match self {
            Label::Name(name) => Some(name),
            Label::Object { name } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub user: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub comments: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    pub created_at: String,
}

/// The four GitHub operations the tools need. One call each, no paging.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    async fn search_repositories(
        &self,
        query: &SearchReposQuery,
    ) -> Result<Vec<RepoSummary>, GithubMcpError>;

    async fn get_repository(&self, owner: &str, repo: &str)
        -> Result<Repository, GithubMcpError>;

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        query: &ListIssuesQuery,
    ) -> Result<Vec<Issue>, GithubMcpError>;

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, GithubMcpError>;
}

/// [`GitHubApi`] backed by the GitHub REST API.
pub struct OctocrabClient {
    github: octocrab::Octocrab,
}

impl OctocrabClient {
    pub fn new(github: octocrab::Octocrab) -> Self {
        Self { github }
    }
}

#[async_trait]
impl GitHubApi for OctocrabClient {
    async fn search_repositories(
        &self,
        query: &SearchReposQuery,
    ) -> Result<Vec<RepoSummary>, GithubMcpError> {
        let page: SearchPage = self.github.get("/search/repositories", Some(query)).await?;
        Ok(page.items)
    }

    async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Repository, GithubMcpError> {
        let route = format!("/repos/{}/{}", owner, repo);
        Ok(self.github.get(route, None::<&()>).await?)
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        query: &ListIssuesQuery,
    ) -> Result<Vec<Issue>, GithubMcpError> {
        let route = format!("/repos/{}/{}/issues", owner, repo);
        Ok(self.github.get(route, Some(query)).await?)
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, GithubMcpError> {
        let route = format!("/repos/{}/{}/issues", owner, repo);
        Ok(self.github.post(route, Some(issue)).await?)
    }
}
