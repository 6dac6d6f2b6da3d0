//! Typed GraphQL query and response decoding for the open-PR listing.
//!
//! One search query fetches number, title, and labels for every open PR in
//! the repository, paginated by cursor.

use anyhow::Result;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;

use crate::types::{PullRequest, Repo};

// Cursor pagination stops after this many pages regardless of hasNextPage.
const MAX_SEARCH_PAGES: usize = 20;

pub fn create_graphql_query() -> serde_json::Value {
    serde_json::json!({
        "query": r#"
            query($query: String!, $after: String) {
                search(query: $query, type: ISSUE, first: 100, after: $after) {
                    nodes {
                        ... on PullRequest {
                            number
                            title
                            url
                            createdAt
                            labels(first: 20) {
                                nodes {
                                    name
                                }
                            }
                        }
                    }
                    pageInfo {
                        hasNextPage
                        endCursor
                    }
                }
            }
        "#,
        "variables": {}
    })
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: SearchData,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: SearchResults,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub nodes: Vec<GraphQLPullRequest>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLPullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub labels: GraphQLLabelConnection,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabelConnection {
    pub nodes: Vec<GraphQLLabel>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLLabel {
    pub name: String,
}

/// Converts a GraphQL pull request node into the pipeline's representation.
pub fn convert_graphql_pr(pr: GraphQLPullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title,
        url: pr.url,
        created_at: pr.created_at,
        labels: pr.labels.nodes.into_iter().map(|label| label.name).collect(),
    }
}

fn build_search_query(repo: &Repo) -> String {
    format!("repo:{}/{} type:pr state:open", repo.owner, repo.name)
}

/// Streams open PRs from the search API, accumulating pages until the last
/// page or `limit` is reached.
pub async fn fetch_open_prs_streaming(
    octocrab: &Octocrab,
    repo: &Repo,
    limit: usize,
) -> Result<Vec<PullRequest>> {
    let search_query = build_search_query(repo);
    let mut all_prs = Vec::new();
    let mut after_cursor: Option<String> = None;
    let mut page_count = 0;

    loop {
        page_count += 1;
        let mut query = create_graphql_query();
        query["variables"]["query"] = serde_json::Value::String(search_query.clone());
        query["variables"]["after"] = match &after_cursor {
            Some(cursor) => serde_json::Value::String(cursor.clone()),
            None => serde_json::Value::Null,
        };

        let response: GraphQLResponse = octocrab.graphql(&query).await?;
        let search_results = response.data.search;

        for graphql_pr in search_results.nodes {
            if all_prs.len() >= limit {
                return Ok(all_prs);
            }
            all_prs.push(convert_graphql_pr(graphql_pr));
        }

        if !search_results.page_info.has_next_page {
            break;
        }

        after_cursor = search_results.page_info.end_cursor;

        // Safety check to prevent infinite loops.
        if after_cursor.is_none() {
            break;
        }

        if page_count >= MAX_SEARCH_PAGES {
            break;
        }
    }

    Ok(all_prs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_targets_open_prs() {
        let repo = Repo::new("owner", "repo");
        assert_eq!(build_search_query(&repo), "repo:owner/repo type:pr state:open");
    }

    #[test]
    fn graphql_node_decodes_and_converts() {
        let node = r#"{
            "number": 42,
            "title": "Fix bug (~12/25)",
            "url": "https://github.com/owner/repo/pull/42",
            "createdAt": "2024-12-01T10:00:00Z",
            "labels": { "nodes": [ { "name": "D-8" }, { "name": "bug" } ] }
        }"#;

        let parsed: GraphQLPullRequest = serde_json::from_str(node).unwrap();
        let pr = convert_graphql_pr(parsed);

        assert_eq!(pr.number, 42);
        assert_eq!(pr.title, "Fix bug (~12/25)");
        assert_eq!(pr.labels, vec!["D-8".to_string(), "bug".to_string()]);
    }
}
