use crate::bindings::{
    parse_major_nerves, parse_order, parse_query_results, parse_rows, ConnectivityRow, OrderJson,
};
use crate::config::Sources;
use crate::error::{SckannerError, StartupError};
use crate::model::{Datasnapshot, KnowledgeStatement};
use crate::statements::parse_knowledge_statements;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;
use url::Url;

/// Everything loaded before the first dataset can be shown.
#[derive(Clone, Debug, Default)]
pub struct StartupData {
    pub rows: Vec<ConnectivityRow>,
    pub order: OrderJson,
    pub endorgans_order: OrderJson,
    pub major_nerves: IndexSet<String>,
    pub datasnapshots: Vec<Datasnapshot>,
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads the configured sources, over HTTP or from the local file system.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
    sources: Sources,
}

impl Fetcher {
    pub fn new(sources: Sources) -> Fetcher {
        Fetcher {
            client: reqwest::Client::new(),
            sources,
        }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    ///Given a URL or a file path, return the body of the resource.
    pub async fn fetch_text(&self, location: &str) -> Result<String, SckannerError> {
        let fetch_error = |reason: String| SckannerError::FetchError {
            resource: location.to_string(),
            reason,
        };

        if is_remote(location) {
            let response = self
                .client
                .get(location)
                .send()
                .await
                .map_err(|e| fetch_error(e.to_string()))?;
            if !response.status().is_success() {
                return Err(fetch_error(response.status().to_string()));
            }
            response.text().await.map_err(|e| fetch_error(e.to_string()))
        } else {
            tokio::fs::read_to_string(location)
                .await
                .map_err(|e| fetch_error(e.to_string()))
        }
    }

    pub async fn fetch_query_results(&self) -> Result<Vec<ConnectivityRow>, SckannerError> {
        let text = self.fetch_text(&self.sources.query_results).await?;
        let query_results = parse_query_results(&text)?;
        Ok(parse_rows(&query_results))
    }

    ///An empty `order` source means no ordering hints.
    pub async fn fetch_order(&self) -> Result<OrderJson, SckannerError> {
        if self.sources.order.is_empty() {
            return Ok(IndexMap::new());
        }
        let text = self.fetch_text(&self.sources.order).await?;
        parse_order(&text)
    }

    pub async fn fetch_endorgans_order(&self) -> Result<OrderJson, SckannerError> {
        if self.sources.endorgans_order.is_empty() {
            return Ok(IndexMap::new());
        }
        let text = self.fetch_text(&self.sources.endorgans_order).await?;
        parse_order(&text)
    }

    pub async fn fetch_major_nerves(&self) -> Result<IndexSet<String>, SckannerError> {
        let text = self.fetch_text(&self.sources.major_nerves).await?;
        let query_results = parse_query_results(&text)?;
        Ok(parse_major_nerves(&query_results))
    }

    ///Return the location of a statements API resource. Local API bases are directories
    ///holding one JSON file per resource.
    pub fn api_location(
        &self,
        resource: &str,
        datasnapshot_id: Option<&str>,
    ) -> Result<String, SckannerError> {
        let base = self.sources.api_base.trim_end_matches('/');
        if is_remote(base) {
            let mut url = Url::parse(&format!("{}/{}", base, resource))
                .map_err(|e| SckannerError::ConfigError(format!("invalid api_base: {}", e)))?;
            if let Some(id) = datasnapshot_id {
                url.query_pairs_mut().append_pair("datasnapshot_id", id);
            }
            return Ok(url.to_string());
        }
        let file_name = match datasnapshot_id {
            Some(id) => format!("{}-{}.json", resource, urlencoding::encode(id)),
            None => format!("{}.json", resource),
        };
        Ok(Path::new(base).join(file_name).to_string_lossy().to_string())
    }

    pub async fn fetch_datasnapshots(&self) -> Result<Vec<Datasnapshot>, SckannerError> {
        let location = self.api_location("datasnapshots", None)?;
        let text = self.fetch_text(&location).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn fetch_knowledge_statements(
        &self,
        datasnapshot_id: &str,
    ) -> Result<Vec<KnowledgeStatement>, SckannerError> {
        let location = self.api_location("knowledge-statements", Some(datasnapshot_id))?;
        let text = self.fetch_text(&location).await?;
        let statements = parse_knowledge_statements(&text).map_err(|e| SckannerError::FetchError {
            resource: location.clone(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            "fetched {} knowledge statements for datasnapshot {}",
            statements.len(),
            datasnapshot_id
        );
        Ok(statements)
    }

    ///Load every startup resource concurrently.
    ///
    ///When any required resource fails, the error names all failed resources and no
    ///data is returned.
    pub async fn load_startup(&self) -> Result<StartupData, SckannerError> {
        let (rows, order, endorgans_order, major_nerves, datasnapshots) = tokio::join!(
            self.fetch_query_results(),
            self.fetch_order(),
            self.fetch_endorgans_order(),
            self.fetch_major_nerves(),
            self.fetch_datasnapshots(),
        );

        let mut failures = StartupError::new();
        let rows = rows.map_err(|e| failures.push("query results", e.to_string()));
        let order = order.map_err(|e| failures.push("order", e.to_string()));
        let endorgans_order =
            endorgans_order.map_err(|e| failures.push("end organs order", e.to_string()));
        let major_nerves = major_nerves.map_err(|e| failures.push("major nerves", e.to_string()));
        let datasnapshots =
            datasnapshots.map_err(|e| failures.push("datasnapshots", e.to_string()));

        match (rows, order, endorgans_order, major_nerves, datasnapshots) {
            (Ok(rows), Ok(order), Ok(endorgans_order), Ok(major_nerves), Ok(datasnapshots))
                if failures.is_empty() =>
            {
                tracing::info!(
                    "loaded {} connectivity rows, {} major nerves, {} datasnapshots",
                    rows.len(),
                    major_nerves.len(),
                    datasnapshots.len()
                );
                Ok(StartupData {
                    rows,
                    order,
                    endorgans_order,
                    major_nerves,
                    datasnapshots,
                })
            }
            _ => {
                tracing::error!("{}", failures);
                Err(failures.into())
            }
        }
    }
}
