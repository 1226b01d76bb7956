//! Pinecone vector index client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VectorIndexConfig;
use crate::error::{Error, Result};

use super::retry::with_backoff;
use super::vector_index::{ChunkRecord, ScoredChunk, VectorIndexProvider};

/// Pinecone index client
///
/// Talks to a single index host; every call is scoped by namespace.
pub struct PineconeIndex {
    /// HTTP client
    client: Client,
    /// Configuration
    config: VectorIndexConfig,
    /// Embedding dimensions (needed for filter-only queries)
    dimensions: usize,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<UpsertVector>,
    namespace: String,
}

#[derive(Serialize)]
struct UpsertVector {
    id: String,
    values: Vec<f32>,
    metadata: ChunkMetadata,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChunkMetadata {
    chunk_text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    namespace: String,
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<ChunkMetadata>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    delete_all: bool,
    namespace: String,
}

impl PineconeIndex {
    /// Create a new index client
    pub fn new(config: &VectorIndexConfig, dimensions: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config: config.clone(),
            dimensions,
        }
    }

    /// Build a full URL for an index operation
    fn endpoint(&self, path: &str) -> String {
        let host = &self.config.index_host;
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}/{}", host.trim_end_matches('/'), path)
        } else {
            format!("https://{}/{}", host, path)
        }
    }

    /// Run one query against the index
    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        filter: Option<serde_json::Value>,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let url = self.endpoint("query");
        let api_key = self.config.api_key.clone();
        let client = self.client.clone();
        let namespace = namespace.to_string();

        let response = with_backoff(self.config.max_retries, || {
            let url = url.clone();
            let api_key = api_key.clone();
            let client = client.clone();
            let request = QueryRequest {
                namespace: namespace.clone(),
                vector: vector.clone(),
                top_k,
                include_metadata: true,
                include_values: false,
                filter: filter.clone(),
            };

            async move {
                let response = client
                    .post(&url)
                    .header("Api-Key", &api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::vector_index(format!("Query request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::vector_index(format!(
                        "Query failed: HTTP {} - {}",
                        status, body
                    )));
                }

                response.json::<QueryResponse>().await.map_err(|e| {
                    Error::vector_index(format!("Failed to parse query response: {}", e))
                })
            }
        })
        .await?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| ScoredChunk {
                id: m.id,
                text: m.metadata.map(|md| md.chunk_text).unwrap_or_default(),
                score: m.score,
            })
            .collect())
    }
}

#[async_trait]
impl VectorIndexProvider for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: &[ChunkRecord]) -> Result<()> {
        let url = self.endpoint("vectors/upsert");

        // The upsert endpoint caps the batch size; send records in slices
        for batch in records.chunks(self.config.upsert_batch_size.max(1)) {
            let api_key = self.config.api_key.clone();
            let client = self.client.clone();
            let namespace = namespace.to_string();
            let url = url.clone();
            let batch = batch.to_vec();

            with_backoff(self.config.max_retries, || {
                let url = url.clone();
                let api_key = api_key.clone();
                let client = client.clone();
                let request = UpsertRequest {
                    vectors: batch
                        .iter()
                        .map(|r| UpsertVector {
                            id: r.id.clone(),
                            values: r.values.clone(),
                            metadata: ChunkMetadata {
                                chunk_text: r.text.clone(),
                            },
                        })
                        .collect(),
                    namespace: namespace.clone(),
                };

                async move {
                    let response = client
                        .post(&url)
                        .header("Api-Key", &api_key)
                        .json(&request)
                        .send()
                        .await
                        .map_err(|e| {
                            Error::vector_index(format!("Upsert request failed: {}", e))
                        })?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::vector_index(format!(
                            "Upsert failed: HTTP {} - {}",
                            status, body
                        )));
                    }

                    Ok(())
                }
            })
            .await?;
        }

        Ok(())
    }

    async fn query_dense(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        self.query(namespace, vector.to_vec(), None, top_k).await
    }

    async fn query_keyword(
        &self,
        namespace: &str,
        term: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        // Filter-only search still requires a query vector; a zero vector
        // leaves ranking to the filter
        let filter = serde_json::json!({ "chunk_text": { "$contains": term } });
        self.query(namespace, vec![0.0; self.dimensions], Some(filter), top_k)
            .await
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<()> {
        let url = self.endpoint("vectors/delete");
        let api_key = self.config.api_key.clone();
        let client = self.client.clone();
        let namespace = namespace.to_string();

        with_backoff(self.config.max_retries, || {
            let url = url.clone();
            let api_key = api_key.clone();
            let client = client.clone();
            let request = DeleteRequest {
                delete_all: true,
                namespace: namespace.clone(),
            };

            async move {
                let response = client
                    .post(&url)
                    .header("Api-Key", &api_key)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::vector_index(format!("Delete request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::vector_index(format!(
                        "Delete failed: HTTP {} - {}",
                        status, body
                    )));
                }

                Ok(())
            }
        })
        .await
    }

    async fn health_check(&self) -> Result<bool> {
        let url = self.endpoint("describe_index_stats");

        match self
            .client
            .post(&url)
            .header("Api-Key", &self.config.api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "pinecone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_adds_scheme_when_missing() {
        let mut config = VectorIndexConfig::default();
        config.index_host = "my-index.svc.pinecone.io".to_string();
        let index = PineconeIndex::new(&config, 8);
        assert_eq!(
            index.endpoint("query"),
            "https://my-index.svc.pinecone.io/query"
        );

        config.index_host = "http://localhost:5080/".to_string();
        let index = PineconeIndex::new(&config, 8);
        assert_eq!(index.endpoint("query"), "http://localhost:5080/query");
    }

    #[test]
    fn test_query_request_wire_format() {
        let request = QueryRequest {
            namespace: "req-abc".to_string(),
            vector: vec![0.5, 0.25],
            top_k: 5,
            include_metadata: true,
            include_values: false,
            filter: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 5);
        assert_eq!(json["includeMetadata"], true);
        assert!(json.get("filter").is_none());
    }
}
