//! Wikipedia lookup over the MediaWiki action API.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{AgentToolParameters, Tool, ToolArguments};
use crate::error::ParleyError;
use crate::provider::http::{json_or_error, shared_client};

pub const TOOL_NAME: &str = "wikipedia";
pub const NO_RESULTS: &str = "No good Wikipedia Search Result was found";

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
const TOP_K_RESULTS: usize = 3;
const MAX_CONTENT_CHARS: usize = 4000;

pub struct Wikipedia {
    base_url: String,
    parameters: AgentToolParameters,
}

impl Wikipedia {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            parameters: AgentToolParameters::object()
                .string("query", "Search query", true)
                .build(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.base_url)
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ParleyError> {
        let limit = TOP_K_RESULTS.to_string();
        let resp = shared_client()
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;
        let data: SearchResponse = json_or_error(resp).await?;
        Ok(data.query.search.into_iter().map(|hit| hit.title).collect())
    }

    async fn summary(&self, title: &str) -> Result<Option<String>, ParleyError> {
        let resp = shared_client()
            .get(self.api_url())
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .send()
            .await?;
        let data: ExtractResponse = json_or_error(resp).await?;
        Ok(data
            .query
            .pages
            .into_values()
            .filter_map(|page| page.extract)
            .map(|extract| extract.trim().to_string())
            .find(|extract| !extract.is_empty()))
    }

    /// Summaries of the top pages for `query`, or [`NO_RESULTS`].
    pub async fn lookup(&self, query: &str) -> Result<String, ParleyError> {
        debug!(query, "Wikipedia search");
        let titles = self.search_titles(query).await?;

        let summaries = try_join_all(titles.iter().map(|title| self.summary(title))).await?;
        let blocks: Vec<String> = titles
            .iter()
            .zip(summaries)
            .filter_map(|(title, summary)| {
                summary.map(|summary| format!("Page: {title}\nSummary: {summary}"))
            })
            .collect();

        if blocks.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }
        Ok(truncate_chars(&blocks.join("\n\n"), MAX_CONTENT_CHARS))
    }
}

#[async_trait]
impl Tool for Wikipedia {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for answering general questions about \
         people, places, companies, facts, historical events, or other subjects. \
         Input should be a search query."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value, ParleyError> {
        let query = args.get_str("query")?;
        Ok(Value::String(self.lookup(query).await?))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: SearchQuery,
}

#[derive(Deserialize, Default)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: ExtractQuery,
}

#[derive(Deserialize, Default)]
struct ExtractQuery {
    #[serde(default)]
    pages: std::collections::HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    extract: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
