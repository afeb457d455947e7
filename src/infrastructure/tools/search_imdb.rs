//! IMDb title lookup through the public suggestion endpoint.

use async_trait::async_trait;
use reqwest::Url;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{Tool, ToolContext, ToolError, parse_input, schema_of};
use crate::strings::prompts::SEARCH_IMDB_DESCRIPTION;

pub const DEFAULT_SUGGESTION_URL: &str = "https://v3.sg.media-imdb.com/suggestion/x/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchImdbInput {
    /// The search term to look for on IMDb.
    pub search_term: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    d: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    id: String,
    #[serde(default)]
    l: Option<String>,
    #[serde(default)]
    y: Option<i32>,
    /// Kind, e.g. "feature" or "TV series".
    #[serde(default)]
    q: Option<String>,
    /// Main cast.
    #[serde(default)]
    s: Option<String>,
}

pub struct SearchImdbTool {
    client: reqwest::Client,
    base_url: String,
}

impl SearchImdbTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_SUGGESTION_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn suggestion_url(&self, term: &str) -> Result<Url, ToolError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ToolError::Lookup(format!("invalid lookup url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ToolError::Lookup("invalid lookup url".to_string()))?
            .pop_if_empty()
            .push(&format!("{}.json", term.to_lowercase()));
        Ok(url)
    }
}

#[async_trait]
impl Tool for SearchImdbTool {
    fn name(&self) -> &'static str {
        "search_imdb"
    }

    fn description(&self) -> &'static str {
        SEARCH_IMDB_DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema_of::<SearchImdbInput>()
    }

    async fn call(&self, input: Value, ctx: &ToolContext) -> Result<String, ToolError> {
        let args: SearchImdbInput = parse_input(input)?;
        let term = args.search_term.trim();
        if term.is_empty() {
            return Err(ToolError::MalformedInput("search_term is empty".to_string()));
        }

        let url = self.suggestion_url(term)?;
        let request = async {
            let resp = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .send()
                .await?
                .error_for_status()?;
            resp.json::<SuggestionResponse>().await
        };

        let body = ctx
            .cancellable(request)
            .await?
            .map_err(|e| ToolError::Lookup(e.to_string()))?;

        Ok(Value::Object(summarize(body)).to_string())
    }
}

/// `{ "Title (year)": { "tt..": "kind; cast" } }`, titles only (people and lists skipped).
fn summarize(response: SuggestionResponse) -> Map<String, Value> {
    let mut out = Map::new();
    for item in response.d.into_iter().filter(|s| s.id.starts_with("tt")) {
        let title = item.l.unwrap_or_else(|| item.id.clone());
        let heading = match item.y {
            Some(year) => format!("{} ({})", title, year),
            None => title,
        };
        let description = [item.q, item.s]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        let entry = out
            .entry(heading)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(ids) = entry {
            ids.insert(item.id, Value::String(description));
        }
    }
    out
}
