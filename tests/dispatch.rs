//! Dispatcher behaviour against an in-memory GitHub substitute.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use github_mcp::client::{
    CreatedIssue, GitHubApi, Issue, IssueStateFilter, Label, ListIssuesQuery, NewIssue, RepoSort,
    RepoSummary, Repository, SearchReposQuery,
};
use github_mcp::dispatch::Dispatcher;
use github_mcp::error::GithubMcpError;
use github_mcp::registry::Namespace;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Search(SearchReposQuery),
    GetRepo(String, String),
    ListIssues(String, String, ListIssuesQuery),
    CreateIssue(String, String, NewIssue),
}

/// Records every request; fails each one with `failure` when set.
#[derive(Default)]
struct FakeGitHub {
    calls: Mutex<Vec<Call>>,
    failure: Option<String>,
    repos: Vec<RepoSummary>,
    issues: Vec<Issue>,
}

impl FakeGitHub {
    fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn record(&self, call: Call) -> Result<(), GithubMcpError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(GithubMcpError::Upstream(message.clone())),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn search_repositories(
        &self,
        query: &SearchReposQuery,
    ) -> Result<Vec<RepoSummary>, GithubMcpError> {
        self.record(Call::Search(query.clone()))?;
        Ok(self.repos.clone())
    }

    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, GithubMcpError> {
        self.record(Call::GetRepo(owner.to_string(), repo.to_string()))?;
        Ok(Repository {
            full_name: format!("{}/{}", owner, repo),
            html_url: format!("https://github.com/{}/{}", owner, repo),
            default_branch: Some("main".to_string()),
            topics: vec!["cli".to_string()],
            ..Default::default()
        })
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        query: &ListIssuesQuery,
    ) -> Result<Vec<Issue>, GithubMcpError> {
        self.record(Call::ListIssues(owner.to_string(), repo.to_string(), query.clone()))?;
        Ok(self.issues.clone())
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<CreatedIssue, GithubMcpError> {
        self.record(Call::CreateIssue(owner.to_string(), repo.to_string(), issue.clone()))?;
        Ok(CreatedIssue {
            number: 101,
            title: issue.title.clone(),
            html_url: format!("https://github.com/{}/{}/issues/101", owner, repo),
            created_at: "2024-05-01T12:00:00Z".to_string(),
        })
    }
}

fn dispatcher(fake: Arc<FakeGitHub>) -> Dispatcher {
    Dispatcher::new(fake).unwrap()
}

fn args(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("tool output should be JSON")
}

#[tokio::test]
async fn every_listed_name_resolves_and_nothing_else_does() {
    let d = dispatcher(Arc::new(FakeGitHub::default()));

    let tool_names: Vec<&str> = d.list_tools().iter().map(|t| t.name).collect();
    assert_eq!(tool_names, d.tool_names().collect::<Vec<_>>());
    for name in &tool_names {
        assert!(d.call_tool(name, None).await.is_ok(), "tool {} should resolve", name);
    }

    let prompt_names: Vec<&str> = d.list_prompts().iter().map(|p| p.name).collect();
    assert_eq!(prompt_names, d.prompt_names().collect::<Vec<_>>());
    for name in &prompt_names {
        // Missing arguments is the only acceptable failure for a known prompt.
        if let Err(e) = d.get_prompt(name, None) {
            assert!(matches!(e, GithubMcpError::InvalidArguments { .. }), "{}: {}", name, e);
        }
    }
}

#[tokio::test]
async fn unknown_names_fail_with_not_found() {
    let d = dispatcher(Arc::new(FakeGitHub::default()));

    match d.call_tool("nonexistent-name", args(json!({}))).await {
        Err(GithubMcpError::CapabilityNotFound { namespace, name }) => {
            assert_eq!(namespace, Namespace::Tools);
            assert_eq!(name, "nonexistent-name");
        }
        other => panic!("expected CapabilityNotFound, got {:?}", other),
    }

    match d.get_prompt("nonexistent-name", args(json!({}))) {
        Err(GithubMcpError::CapabilityNotFound { namespace, .. }) => {
            assert_eq!(namespace, Namespace::Prompts);
        }
        other => panic!("expected CapabilityNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn search_repos_applies_defaults_and_shapes_results() {
    let repos = (0..8)
        .map(|i| RepoSummary {
            full_name: format!("rusty/crate-{}", i),
            description: Some("fast".to_string()),
            stargazers_count: 1000 - i,
            html_url: format!("https://github.com/rusty/crate-{}", i),
            language: Some("Rust".to_string()),
            forks_count: 7,
        })
        .collect();
    let fake = Arc::new(FakeGitHub {
        repos,
        ..Default::default()
    });
    let d = dispatcher(fake.clone());

    let response = d
        .call_tool("search-repos", args(json!({ "query": "lang:rust" })))
        .await
        .unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::Search(SearchReposQuery {
            q: "lang:rust".to_string(),
            sort: RepoSort::Stars,
            per_page: 5,
        })]
    );

    assert_eq!(response.content.len(), 1);
    let rendered = parse(response.first_text());
    let items = rendered.as_array().unwrap();
    assert!(items.len() <= 5);
    for item in items {
        let mut keys: Vec<&str> = item.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["description", "forks", "language", "name", "stars", "url"]);
    }
    assert_eq!(items[0]["name"], "rusty/crate-0");
}

#[tokio::test]
async fn search_repos_passes_explicit_sort_and_limit() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    d.call_tool(
        "search-repos",
        args(json!({ "query": "mcp", "sort": "updated", "limit": 20 })),
    )
    .await
    .unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::Search(SearchReposQuery {
            q: "mcp".to_string(),
            sort: RepoSort::Updated,
            per_page: 20,
        })]
    );
}

#[tokio::test]
async fn explicit_null_optionals_take_defaults() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    let search = d
        .call_tool(
            "search-repos",
            args(json!({ "query": "x", "sort": null, "limit": null })),
        )
        .await
        .unwrap();
    assert!(!search.first_text().starts_with("Error"), "{}", search.first_text());

    d.call_tool(
        "list-issues",
        args(json!({ "owner": "octo", "repo": "hello", "state": null, "limit": null })),
    )
    .await
    .unwrap();

    d.call_tool(
        "create-issue",
        args(json!({
            "owner": "octo",
            "repo": "hello",
            "title": "t",
            "body": "b",
            "labels": null
        })),
    )
    .await
    .unwrap();

    assert_eq!(
        fake.calls(),
        vec![
            Call::Search(SearchReposQuery {
                q: "x".to_string(),
                sort: RepoSort::Stars,
                per_page: 5,
            }),
            Call::ListIssues(
                "octo".to_string(),
                "hello".to_string(),
                ListIssuesQuery {
                    state: IssueStateFilter::Open,
                    per_page: 10,
                }
            ),
            Call::CreateIssue(
                "octo".to_string(),
                "hello".to_string(),
                NewIssue {
                    title: "t".to_string(),
                    body: "b".to_string(),
                    labels: vec![],
                }
            ),
        ]
    );
}

#[tokio::test]
async fn limit_is_capped_by_max_results() {
    let fake = Arc::new(FakeGitHub::default());
    let d = Dispatcher::with_max_results(fake.clone(), 3).unwrap();

    d.call_tool("list-issues", args(json!({ "owner": "octo", "repo": "hello" })))
        .await
        .unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::ListIssues(
            "octo".to_string(),
            "hello".to_string(),
            ListIssuesQuery {
                state: IssueStateFilter::Open,
                per_page: 3,
            }
        )]
    );
}

#[tokio::test]
async fn get_repo_info_reports_upstream_failure_as_content() {
    let fake = Arc::new(FakeGitHub::failing("Not Found"));
    let d = dispatcher(fake.clone());

    let response = d
        .call_tool("get-repo-info", args(json!({ "owner": "octo", "repo": "missing" })))
        .await
        .expect("upstream failures must not become protocol errors");

    assert_eq!(response.content.len(), 1);
    assert_eq!(
        response.first_text(),
        "Error getting repository information: Not Found"
    );
    assert_eq!(
        fake.calls(),
        vec![Call::GetRepo("octo".to_string(), "missing".to_string())]
    );
}

#[tokio::test]
async fn empty_upstream_message_falls_back_to_unknown_error() {
    let d = dispatcher(Arc::new(FakeGitHub::failing("")));

    let response = d
        .call_tool("search-repos", args(json!({ "query": "x" })))
        .await
        .unwrap();

    assert_eq!(
        response.first_text(),
        "Error searching repositories: Unknown error occurred"
    );
}

#[tokio::test]
async fn get_repo_info_renders_full_field_set() {
    let d = dispatcher(Arc::new(FakeGitHub::default()));

    let response = d
        .call_tool("get-repo-info", args(json!({ "owner": "octo", "repo": "hello" })))
        .await
        .unwrap();
    let rendered = parse(response.first_text());

    let mut keys: Vec<&str> = rendered.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            "created_at",
            "default_branch",
            "description",
            "forks",
            "issues",
            "language",
            "license",
            "name",
            "stars",
            "topics",
            "updated_at",
            "url",
        ]
    );
    assert_eq!(rendered["name"], "octo/hello");
    assert_eq!(rendered["license"], "No license");
    assert_eq!(rendered["topics"], json!(["cli"]));
}

#[tokio::test]
async fn unsafe_repo_name_is_rejected_before_any_call() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    let response = d
        .call_tool("get-repo-info", args(json!({ "owner": "octo", "repo": "../admin" })))
        .await
        .unwrap();

    assert!(response
        .first_text()
        .starts_with("Error getting repository information: repo contains invalid character"));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn missing_tool_argument_is_reported_as_content() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    let response = d
        .call_tool("list-issues", args(json!({ "owner": "octo" })))
        .await
        .unwrap();

    assert!(response.first_text().starts_with("Error listing issues: "));
    assert!(response.first_text().contains("repo"));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn list_issues_flattens_mixed_labels_in_order() {
    let labels: Vec<Label> =
        serde_json::from_value(json!(["bug", { "name": "good first issue" }, "docs", { "name": "p2" }]))
            .unwrap();
    let fake = Arc::new(FakeGitHub {
        issues: vec![Issue {
            number: 12,
            title: "Panic on empty input".to_string(),
            state: "open".to_string(),
            labels,
            ..Default::default()
        }],
        ..Default::default()
    });
    let d = dispatcher(fake);

    let response = d
        .call_tool("list-issues", args(json!({ "owner": "octo", "repo": "hello" })))
        .await
        .unwrap();
    let rendered = parse(response.first_text());

    assert_eq!(
        rendered[0]["labels"],
        json!(["bug", "good first issue", "docs", "p2"])
    );
    assert_eq!(rendered[0]["number"], 12);
}

#[tokio::test]
async fn list_issues_forwards_state_filter() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    d.call_tool(
        "list-issues",
        args(json!({ "owner": "octo", "repo": "hello", "state": "closed", "limit": 2 })),
    )
    .await
    .unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::ListIssues(
            "octo".to_string(),
            "hello".to_string(),
            ListIssuesQuery {
                state: IssueStateFilter::Closed,
                per_page: 2,
            }
        )]
    );
}

#[tokio::test]
async fn create_issue_defaults_labels_and_confirms() {
    let fake = Arc::new(FakeGitHub::default());
    let d = dispatcher(fake.clone());

    let response = d
        .call_tool(
            "create-issue",
            args(json!({
                "owner": "octo",
                "repo": "hello",
                "title": "Docs typo",
                "body": "README says 'teh'"
            })),
        )
        .await
        .unwrap();

    assert_eq!(
        fake.calls(),
        vec![Call::CreateIssue(
            "octo".to_string(),
            "hello".to_string(),
            NewIssue {
                title: "Docs typo".to_string(),
                body: "README says 'teh'".to_string(),
                labels: vec![],
            }
        )]
    );

    let rendered = parse(response.first_text());
    assert_eq!(rendered["message"], "Issue created successfully");
    assert_eq!(rendered["number"], 101);
    assert_eq!(rendered["url"], "https://github.com/octo/hello/issues/101");
}

#[tokio::test]
async fn create_issue_failure_uses_its_own_prefix() {
    let d = dispatcher(Arc::new(FakeGitHub::failing("Validation Failed")));

    let response = d
        .call_tool(
            "create-issue",
            args(json!({
                "owner": "octo",
                "repo": "hello",
                "title": "t",
                "body": "b",
                "labels": ["bug"]
            })),
        )
        .await
        .unwrap();

    assert_eq!(response.first_text(), "Error creating issue: Validation Failed");
}

#[tokio::test]
async fn pull_request_prompt_related_issue_clauses() {
    let d = dispatcher(Arc::new(FakeGitHub::default()));

    let without = d
        .get_prompt(
            "create-pull-request-description",
            args(json!({ "title": "Speed up parser", "changes": "Avoid reallocations" })),
        )
        .unwrap();
    assert_eq!(without.messages.len(), 1);
    assert!(!without.first_text().contains("Related issue"));
    assert!(!without.first_text().contains("Reference to issue"));

    let with = d
        .get_prompt(
            "create-pull-request-description",
            args(json!({
                "title": "Speed up parser",
                "changes": "Avoid reallocations",
                "relatedIssue": "42"
            })),
        )
        .unwrap();
    assert!(with.first_text().contains("Related issue: #42"));
    assert!(with.first_text().contains("Reference to issue #42"));

    let bare_hash = d
        .get_prompt(
            "create-pull-request-description",
            args(json!({
                "title": "Speed up parser",
                "changes": "Avoid reallocations",
                "relatedIssue": "#"
            })),
        )
        .unwrap();
    assert!(!bare_hash.first_text().contains("Related issue"));
    assert!(!bare_hash.first_text().contains("Reference to issue"));
}

#[tokio::test]
async fn prompt_missing_required_argument_is_invalid() {
    let d = dispatcher(Arc::new(FakeGitHub::default()));

    let err = d
        .get_prompt("enhance-github-response", args(json!({ "responseData": "{}" })))
        .unwrap_err();

    match err {
        GithubMcpError::InvalidArguments { capability, reason } => {
            assert_eq!(capability, "enhance-github-response");
            assert!(reason.contains("responseType"));
        }
        other => panic!("expected InvalidArguments, got {:?}", other),
    }
}
