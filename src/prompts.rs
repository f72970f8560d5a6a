//! Canned prompt templates for GitHub writing tasks.
//!
//! Rendering is pure: arguments in, one user message out. Optional
//! arguments that are absent (or empty) drop their whole line.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::envelope::PromptResponse;
use crate::error::GithubMcpError;
use crate::registry::{Capability, Descriptor, Namespace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptArgumentDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl PromptArgumentDescriptor {
    const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: true,
        }
    }

    const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArgumentDescriptor],
}

impl Descriptor for PromptDescriptor {
    fn name(&self) -> &str {
        self.name
    }
}

impl From<PromptDescriptor> for rmcp::model::Prompt {
    fn from(descriptor: PromptDescriptor) -> Self {
        let arguments = descriptor
            .arguments
            .iter()
            .map(|arg| rmcp::model::PromptArgument {
                name: arg.name.to_string(),
                title: None,
                description: Some(arg.description.to_string()),
                required: Some(arg.required),
            })
            .collect();
        rmcp::model::Prompt::new(descriptor.name, Some(descriptor.description), Some(arguments))
    }
}

const ISSUE_DESCRIPTION_ARGS: &[PromptArgumentDescriptor] = &[
    PromptArgumentDescriptor::required("title", "Title of the issue"),
    PromptArgumentDescriptor::required(
        "type",
        "Type of issue (bug, feature, documentation, etc.)",
    ),
    PromptArgumentDescriptor::required("details", "Additional details about the issue"),
];

const PULL_REQUEST_DESCRIPTION_ARGS: &[PromptArgumentDescriptor] = &[
    PromptArgumentDescriptor::required("title", "Title of the pull request"),
    PromptArgumentDescriptor::required("changes", "List of changes made in the pull request"),
    PromptArgumentDescriptor::optional("relatedIssue", "Related issue number, if any"),
];

const SEARCH_REPOS_ARGS: &[PromptArgumentDescriptor] = &[
    PromptArgumentDescriptor::required(
        "description",
        "Description of the repositories you're looking for",
    ),
    PromptArgumentDescriptor::optional("language", "Programming language of the repositories"),
    PromptArgumentDescriptor::optional("stars", "Minimum number of stars (e.g., '1000')"),
];

const CREATE_ISSUE_ARGS: &[PromptArgumentDescriptor] = &[
    PromptArgumentDescriptor::required(
        "description",
        "Description of the issue you want to create",
    ),
    PromptArgumentDescriptor::required(
        "repositoryContext",
        "Context about the repository (e.g., what the project is about)",
    ),
];

const ENHANCE_RESPONSE_ARGS: &[PromptArgumentDescriptor] = &[
    PromptArgumentDescriptor::required("responseData", "Raw JSON response data from GitHub API"),
    PromptArgumentDescriptor::required("responseType", "Type of response (repos, issues, etc.)"),
];

// -- Prompt argument types --

#[derive(Debug, Deserialize)]
pub struct IssueDescriptionArgs {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub details: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDescriptionArgs {
    pub title: String,
    pub changes: String,
    #[serde(default)]
    pub related_issue: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchReposPromptArgs {
    pub description: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssuePromptArgs {
    pub description: String,
    pub repository_context: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponseArgs {
    pub response_data: String,
    pub response_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    IssueDescription,
    PullRequestDescription,
    SearchRepos,
    CreateIssue,
    EnhanceResponse,
}

impl Capability for PromptKind {
    type Descriptor = PromptDescriptor;

    const NAMESPACE: Namespace = Namespace::Prompts;

    const ALL: &'static [Self] = &[
        PromptKind::IssueDescription,
        PromptKind::PullRequestDescription,
        PromptKind::SearchRepos,
        PromptKind::CreateIssue,
        PromptKind::EnhanceResponse,
    ];

    fn name(self) -> &'static str {
        match self {
            PromptKind::IssueDescription => "create-issue-description",
            PromptKind::PullRequestDescription => "create-pull-request-description",
            PromptKind::SearchRepos => "search-repos-prompt",
            PromptKind::CreateIssue => "create-issue-prompt",
            PromptKind::EnhanceResponse => "enhance-github-response",
        }
    }

    fn descriptor(self) -> PromptDescriptor {
        let (description, arguments) = match self {
            PromptKind::IssueDescription => (
                "Generate a description for a GitHub issue",
                ISSUE_DESCRIPTION_ARGS,
            ),
            PromptKind::PullRequestDescription => (
                "Generate a description for a GitHub pull request",
                PULL_REQUEST_DESCRIPTION_ARGS,
            ),
            PromptKind::SearchRepos => (
                "Generate a query for searching GitHub repositories",
                SEARCH_REPOS_ARGS,
            ),
            PromptKind::CreateIssue => (
                "Generate parameters for creating a GitHub issue",
                CREATE_ISSUE_ARGS,
            ),
            PromptKind::EnhanceResponse => (
                "Format and enhance raw GitHub API response data",
                ENHANCE_RESPONSE_ARGS,
            ),
        };
        PromptDescriptor {
            name: self.name(),
            description,
            arguments,
        }
    }
}

impl PromptKind {
    pub fn render(self, args: Map<String, Value>) -> Result<PromptResponse, GithubMcpError> {
        let text = match self {
            PromptKind::IssueDescription => issue_description(parse_args(self, args)?),
            PromptKind::PullRequestDescription => {
                pull_request_description(parse_args(self, args)?)
            }
            PromptKind::SearchRepos => search_repos(parse_args(self, args)?),
            PromptKind::CreateIssue => create_issue(parse_args(self, args)?),
            PromptKind::EnhanceResponse => enhance_response(parse_args(self, args)?),
        };
        Ok(PromptResponse::user(
            Some(self.descriptor().description.to_string()),
            text,
        ))
    }
}

fn parse_args<T: DeserializeOwned>(
    prompt: PromptKind,
    args: Map<String, Value>,
) -> Result<T, GithubMcpError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| GithubMcpError::InvalidArguments {
        capability: prompt.name().to_string(),
        reason: e.to_string(),
    })
}

/// Treat `""` the same as an absent optional argument.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn issue_description(args: IssueDescriptionArgs) -> String {
    format!(
        "Please generate a detailed GitHub issue description for an issue titled \"{}\".\n\
         This is a {} issue.\n\
         Additional details: {}\n\
         \n\
         Format the description with appropriate markdown, including:\n\
         - Clear problem statement\n\
         - Steps to reproduce (if applicable)\n\
         - Expected vs actual behavior (if applicable)\n\
         - Any relevant context or background information",
        args.title, args.kind, args.details
    )
}

fn pull_request_description(args: PullRequestDescriptionArgs) -> String {
    let issue = args
        .related_issue
        .as_deref()
        .map(|n| n.trim().trim_start_matches('#').trim())
        .filter(|n| !n.is_empty());

    let mut lines = vec![
        format!(
            "Please generate a detailed GitHub pull request description for a PR titled \"{}\".",
            args.title
        ),
        format!("Changes made: {}", args.changes),
    ];
    if let Some(n) = issue {
        lines.push(format!("Related issue: #{}", n));
    }
    lines.extend(
        [
            "",
            "Format the description with appropriate markdown, including:",
            "- Summary of changes",
            "- Implementation details",
            "- Testing performed",
            "- Any breaking changes or considerations",
        ]
        .map(String::from),
    );
    if let Some(n) = issue {
        lines.push(format!("- Reference to issue #{}", n));
    }
    lines.join("\n")
}

fn search_repos(args: SearchReposPromptArgs) -> String {
    let mut lines = vec![
        "Please help me formulate a GitHub repository search query based on the following criteria:"
            .to_string(),
        format!("- I'm looking for repositories related to: {}", args.description),
    ];
    if let Some(language) = present(&args.language) {
        lines.push(format!("- Programming language: {}", language));
    }
    if let Some(stars) = present(&args.stars) {
        lines.push(format!("- Minimum stars: {}", stars));
    }
    lines.push(String::new());
    lines.push(
        "Create a query string that follows GitHub's search syntax, including appropriate \
         qualifiers like 'language:', 'stars:>', etc."
            .to_string(),
    );
    lines.push("Only return the final query string without explanation.".to_string());
    lines.join("\n")
}

fn create_issue(args: CreateIssuePromptArgs) -> String {
    format!(
        "Please help me create a GitHub issue based on the following information:\n\
         - Issue description: {}\n\
         - Repository context: {}\n\
         \n\
         Generate the following in JSON format:\n\
         {{\n  \
           \"title\": \"A concise title for the issue\",\n  \
           \"body\": \"A detailed description of the issue with appropriate markdown formatting\",\n  \
           \"labels\": [\"suggested\", \"labels\", \"based\", \"on\", \"context\"]\n\
         }}\n\
         \n\
         Only return the JSON object without explanation.",
        args.description, args.repository_context
    )
}

fn enhance_response(args: EnhanceResponseArgs) -> String {
    format!(
        "Please format and enhance the following raw GitHub API response data:\n\
         \n\
         {}\n\
         \n\
         This is a response of type: {}\n\
         \n\
         Format the data in a readable way, highlighting the most important information, \
         and adding any relevant analysis or insights.\n\
         Use markdown formatting to make the output clean and easy to read.",
        args.response_data, args.response_type
    )
}
