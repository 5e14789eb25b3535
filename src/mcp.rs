use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    entry::Category,
    error,
    search::{ResultItem, SearchOptions, SearchResponse, SearchService},
    settings::Settings,
};

struct SitefindState {
    service: SearchService,
    settings: Settings,
}

#[derive(Clone)]
pub struct SitefindMcpServer {
    state: Arc<SitefindState>,
    tool_router: ToolRouter<Self>,
}

impl SitefindMcpServer {
    fn new(state: SitefindState) -> Self {
        Self {
            state: Arc::new(state),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl SitefindMcpServer {
    /// Relevance-ranked search with optional category filter.
    #[tool(
        name = "sitefind_search",
        description = "Search site content by relevance. Supports category filtering and a minimum score."
    )]
    pub async fn sitefind_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;

        let category = params
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()
            .map_err(|e| {
                rmcp::ErrorData::invalid_params(
                    e.to_string(),
                    Some(json!({ "categories": category_names() })),
                )
            })?;

        let defaults = self.state.settings.search_options();
        let options = SearchOptions {
            max_results: params.limit.unwrap_or(defaults.max_results),
            min_score: params.min_score.unwrap_or(defaults.min_score),
            category,
        };

        let items: Vec<ResultItem> = self
            .state
            .service
            .rank(&params.query, &options)
            .iter()
            .map(ResultItem::from)
            .collect();

        respond(&params.query, items)
    }

    /// Cheap substring suggestions ordered by priority.
    #[tool(
        name = "sitefind_suggest",
        description = "Quick suggestions for a partial query, ordered by page importance."
    )]
    pub async fn sitefind_suggest(
        &self,
        params: Parameters<SuggestParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let limit =
            params.limit.unwrap_or(self.state.settings.suggestion_limit);

        let items: Vec<ResultItem> = self
            .state
            .service
            .suggestions(&params.query, limit)
            .iter()
            .map(ResultItem::from)
            .collect();

        respond(&params.query, items)
    }

    /// List the categories present in the catalog.
    #[tool(
        name = "sitefind_categories",
        description = "List the content categories that can be used as search filters."
    )]
    pub async fn sitefind_categories(
        &self,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let categories: Vec<&'static str> = self
            .state
            .service
            .categories()
            .iter()
            .map(Category::as_str)
            .collect();

        let mut result =
            CallToolResult::success(vec![Content::text(categories.join("\n"))]);
        result.structured_content = Some(json!({ "categories": categories }));
        Ok(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SitefindMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("sitefind", env!("CARGO_PKG_VERSION"))
                    .with_title("sitefind MCP"),
            )
            .with_instructions(
                "Use sitefind_suggest while a query is still being typed and sitefind_search for the final ranked list. Call sitefind_categories to discover valid category filters.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Search query string (at least two characters).
    pub query: String,
    /// Maximum number of results (default: 10).
    pub limit: Option<usize>,
    /// Minimum relevance score (default: 10).
    pub min_score: Option<f64>,
    /// Restrict to one category, e.g. "Docs" or "FAQs".
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParams {
    /// Partial query string (at least two characters).
    pub query: String,
    /// Maximum number of suggestions (default: 5).
    pub limit: Option<usize>,
}

fn respond(
    query: &str,
    items: Vec<ResultItem>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let summary = format_summary(&items, query);
    let structured = serde_json::to_value(SearchResponse::new(query, items))
        .map_err(|e| mcp_error("failed to serialize results", e))?;

    let mut result = CallToolResult::success(vec![Content::text(summary)]);
    result.structured_content = Some(structured);
    Ok(result)
}

fn format_summary(results: &[ResultItem], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\"");
    }

    let mut lines = Vec::with_capacity(results.len() + 1);
    let suffix = if results.len() == 1 { "" } else { "s" };
    lines.push(format!(
        "Found {} result{} for \"{query}\":",
        results.len(),
        suffix
    ));

    for item in results {
        match item.score {
            Some(score) => lines.push(format!(
                "{:.1} {} [{}] {}",
                score, item.title, item.category, item.url
            )),
            None => lines.push(format!(
                "{} [{}] {}",
                item.title, item.category, item.url
            )),
        }
    }

    lines.join("\n")
}

fn category_names() -> Vec<&'static str> {
    Category::ALL.iter().map(Category::as_str).collect()
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(service: SearchService, settings: Settings) -> error::Result<()> {
    let server = SitefindMcpServer::new(SitefindState { service, settings });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Runtime(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            error::Error::Config(format!(
                "MCP server initialization failed: {e}"
            ))
        })?;
        running.waiting().await.map_err(|e| {
            error::Error::Config(format!("MCP server error: {e}"))
        })?;
        Ok(())
    })
}
