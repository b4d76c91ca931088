//! Read-only GitHub repository tools over the REST API.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::debug;

use super::{AgentTool, AgentToolParameters, ToolArguments};
use crate::error::ParleyError;
use crate::provider::http::{github_headers, json_or_error, shared_client, status_to_error};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const DEFAULT_PAGE_SIZE: i64 = 20;

fn repository_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?/[A-Za-z0-9._-]+$")
            .expect("repository pattern must compile")
    })
}

/// Authenticated client shared by the GitHub tools.
#[derive(Debug, Clone)]
pub struct GithubClient {
    base_url: String,
    token: String,
    default_repository: Option<String>,
}

impl GithubClient {
    pub fn new(token: String, base_url: Option<String>, default_repository: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            token,
            default_repository,
        }
    }

    /// The `owner/name` to act on: the call's own argument, else the default.
    fn repository<'a>(&'a self, args: &'a ToolArguments) -> Result<&'a str, ParleyError> {
        let repo = args
            .get_str_opt("repository")
            .or(self.default_repository.as_deref())
            .ok_or_else(|| {
                ParleyError::InvalidArgument(
                    "No repository given and GITHUB_REPOSITORY is not set".into(),
                )
            })?;
        if repository_pattern().is_match(repo) {
            Ok(repo)
        } else {
            Err(ParleyError::InvalidArgument(format!(
                "Repository must look like owner/name, got '{repo}'"
            )))
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ParleyError> {
        debug!(path, "GitHub request");
        let resp = shared_client()
            .get(format!("{}{path}", self.base_url))
            .headers(github_headers(&self.token))
            .query(query)
            .send()
            .await?;
        json_or_error(resp).await
    }

    async fn get_raw(&self, url: Url, query: &[(&str, String)]) -> Result<String, ParleyError> {
        debug!(path = url.path(), "GitHub raw request");
        let mut headers = github_headers(&self.token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.raw+json"));
        let resp = shared_client()
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(status_to_error(status.as_u16(), &body));
        }
        Ok(body)
    }

    /// `{base}/repos/{owner}/{name}/contents/{path}`, each path segment
    /// percent-encoded. Paths must stay inside the repository.
    fn contents_url(&self, repo: &str, path: &str) -> Result<Url, ParleyError> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.iter().any(|s| matches!(*s, "" | "." | "..")) {
            return Err(ParleyError::InvalidArgument(format!(
                "File path must be relative to the repository root, got '{path}'"
            )));
        }
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ParleyError::Configuration(format!("invalid GitHub API URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ParleyError::Configuration(format!("GitHub API URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .push("repos")
            .extend(repo.split('/'))
            .push("contents")
            .extend(segments);
        Ok(url)
    }

    pub async fn get_issues(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let repo = self.repository(args)?;
        let state = args.get_str_opt("state").unwrap_or("open");
        let issues = self
            .get_json(
                &format!("/repos/{repo}/issues"),
                &[("state", state.to_string()), ("per_page", page_size(args))],
            )
            .await?;
        // The issues endpoint also returns pull requests.
        let issues: Vec<Value> = as_list(issues)
            .into_iter()
            .filter(|issue| issue.get("pull_request").is_none())
            .map(|issue| summarize(&issue))
            .collect();
        Ok(json!({"repository": repo, "issues": issues}))
    }

    pub async fn get_issue(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let repo = self.repository(args)?;
        let number = args.get_i64("issue_number")?;
        let issue = self
            .get_json(&format!("/repos/{repo}/issues/{number}"), &[])
            .await?;
        let comments = self
            .get_json(&format!("/repos/{repo}/issues/{number}/comments"), &[])
            .await?;
        let comments: Vec<Value> = as_list(comments)
            .iter()
            .map(|c| json!({"user": c["user"]["login"], "body": c["body"]}))
            .collect();
        Ok(json!({
            "number": issue["number"],
            "title": issue["title"],
            "state": issue["state"],
            "user": issue["user"]["login"],
            "body": issue["body"],
            "comments": comments,
        }))
    }

    pub async fn list_pull_requests(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let repo = self.repository(args)?;
        let state = args.get_str_opt("state").unwrap_or("open");
        let pulls = self
            .get_json(
                &format!("/repos/{repo}/pulls"),
                &[("state", state.to_string()), ("per_page", page_size(args))],
            )
            .await?;
        let pulls: Vec<Value> = as_list(pulls).iter().map(summarize).collect();
        Ok(json!({"repository": repo, "pull_requests": pulls}))
    }

    pub async fn read_file(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let repo = self.repository(args)?;
        let url = self.contents_url(repo, args.get_str("path")?)?;
        let mut query = Vec::new();
        if let Some(reference) = args.get_str_opt("ref") {
            query.push(("ref", reference.to_string()));
        }
        let content = self.get_raw(url, &query).await?;
        Ok(Value::String(content))
    }

    pub async fn list_branches(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let repo = self.repository(args)?;
        let branches = self
            .get_json(
                &format!("/repos/{repo}/branches"),
                &[("per_page", page_size(args))],
            )
            .await?;
        let names: Vec<Value> = as_list(branches)
            .into_iter()
            .filter_map(|b| b.get("name").cloned())
            .collect();
        Ok(json!({"repository": repo, "branches": names}))
    }
}

fn page_size(args: &ToolArguments) -> String {
    args.get_i64("limit")
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, 100)
        .to_string()
}

fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn summarize(item: &Value) -> Value {
    json!({
        "number": item["number"],
        "title": item["title"],
        "state": item["state"],
        "user": item["user"]["login"],
    })
}

fn repository_param(builder: super::types::ParameterBuilder) -> super::types::ParameterBuilder {
    builder.string(
        "repository",
        "Repository as owner/name. Defaults to the configured repository.",
        false,
    )
}

/// Build the GitHub toolkit around one authenticated client.
pub fn tools(client: GithubClient) -> Vec<AgentTool> {
    let client = Arc::new(client);

    macro_rules! github_tool {
        ($name:expr, $description:expr, $params:expr, $method:ident) => {{
            let client = Arc::clone(&client);
            AgentTool::new($name, $description, $params, move |args| {
                let client = Arc::clone(&client);
                async move { client.$method(&args).await }
            })
        }};
    }

    vec![
        github_tool!(
            "github_get_issues",
            "List issues in a GitHub repository, with number, title, state and author.",
            repository_param(AgentToolParameters::object())
                .string_enum("state", "Issue state (default open)", &["open", "closed", "all"], false)
                .integer("limit", "Maximum number of issues (default 20)", false)
                .build(),
            get_issues
        ),
        github_tool!(
            "github_get_issue",
            "Fetch one GitHub issue by number, including its body and comments.",
            repository_param(AgentToolParameters::object())
                .integer("issue_number", "Issue number", true)
                .build(),
            get_issue
        ),
        github_tool!(
            "github_list_pull_requests",
            "List pull requests in a GitHub repository.",
            repository_param(AgentToolParameters::object())
                .string_enum("state", "Pull request state (default open)", &["open", "closed", "all"], false)
                .integer("limit", "Maximum number of pull requests (default 20)", false)
                .build(),
            list_pull_requests
        ),
        github_tool!(
            "github_read_file",
            "Read the contents of a file in a GitHub repository.",
            repository_param(AgentToolParameters::object())
                .string("path", "File path within the repository", true)
                .string("ref", "Branch, tag or commit (default branch if omitted)", false)
                .build(),
            read_file
        ),
        github_tool!(
            "github_list_branches",
            "List the branches of a GitHub repository.",
            repository_param(AgentToolParameters::object())
                .integer("limit", "Maximum number of branches (default 20)", false)
                .build(),
            list_branches
        ),
    ]
}
