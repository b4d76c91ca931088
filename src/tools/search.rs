//! Web search over the DuckDuckGo HTML endpoint.
//!
//! Transient HTTP failures are retried with backoff. A query that finds
//! nothing is re-issued with simplified keywords before giving up.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, info};

use super::{AgentToolParameters, Tool, ToolArguments};
use crate::error::ParleyError;
use crate::provider::http::{shared_client, status_to_error};
use crate::util::RetryPolicy;

pub const TOOL_NAME: &str = "web_search";
pub const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";
const MAX_VARIANTS: usize = 2;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "de", "do", "does", "el", "en", "for",
    "from", "how", "in", "is", "it", "la", "los", "of", "on", "or", "que", "the", "to", "was",
    "what", "when", "where", "which", "who", "why", "with", "y",
];

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

pub struct WebSearch {
    base_url: String,
    retry: RetryPolicy,
    max_results: usize,
    parameters: AgentToolParameters,
}

impl WebSearch {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            retry: RetryPolicy::default(),
            max_results: 5,
            parameters: AgentToolParameters::object()
                .string("query", "Search query", true)
                .build(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run `query`, then its keyword variants, until one returns hits.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ParleyError> {
        let mut attempts = vec![query.trim().to_string()];
        attempts.extend(keyword_variants(query));

        for (i, attempt) in attempts.iter().enumerate() {
            if i > 0 {
                info!(query, variant = attempt.as_str(), "No results, retrying search with different keywords");
            }
            let hits = self.retry.execute(|| self.fetch(attempt)).await?;
            if !hits.is_empty() {
                return Ok(hits);
            }
        }
        Ok(Vec::new())
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SearchHit>, ParleyError> {
        let url = format!("{}/html/", self.base_url);
        debug!(query, "DuckDuckGo search");

        let resp = shared_client()
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(status_to_error(status.as_u16(), &body));
        }
        parse_results(&body, self.max_results)
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A wrapper around DuckDuckGo Search. Useful for answering questions about \
         current events. Input should be a search query."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let query = args.get_str("query")?;
        let hits = self.search(query).await?;
        if hits.is_empty() {
            return Ok(Value::String(NO_RESULTS.to_string()));
        }
        let text = hits
            .iter()
            .map(|hit| format!("{}: {}", hit.title, hit.snippet))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Value::String(text))
    }
}

fn selector(css: &str) -> Result<Selector, ParleyError> {
    Selector::parse(css).map_err(|e| ParleyError::tool(TOOL_NAME, format!("bad selector {css}: {e}")))
}

/// Extract hits from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchHit>, ParleyError> {
    let document = Html::parse_document(html);
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let hits = document
        .select(&result_sel)
        .filter_map(|result| {
            let title = collapse_whitespace(&result.select(&title_sel).next()?.text().collect::<String>());
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
                .unwrap_or_default();
            (!title.is_empty()).then_some(SearchHit { title, snippet })
        })
        .take(max_results)
        .collect();
    Ok(hits)
}

/// Simplified rewrites of a query: punctuation stripped, then stop words dropped.
pub fn keyword_variants(query: &str) -> Vec<String> {
    let original = collapse_whitespace(query);
    let stripped = collapse_whitespace(
        &query
            .chars()
            .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
            .collect::<String>(),
    );
    let keywords = stripped
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .collect::<Vec<_>>()
        .join(" ");

    let mut variants: Vec<String> = Vec::new();
    for candidate in [stripped, keywords] {
        if !candidate.is_empty() && candidate != original && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants.truncate(MAX_VARIANTS);
    variants
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
