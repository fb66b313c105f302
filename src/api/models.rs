use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::transport::{read_json, TransportError};
use crate::utils::url::endpoint_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub owned_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub data: Vec<Model>,
}

pub async fn fetch_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<ModelList, TransportError> {
    let models_url = endpoint_url(base_url, "v1/models");
    debug!(url = %models_url, "Fetching model list");

    let response = client
        .get(models_url)
        .header("Content-Type", "application/json")
        .send()
        .await?;

    let mut models: ModelList = read_json(response).await?;
    sort_models(&mut models.data);
    Ok(models)
}

/// Newest first by `created`, then by id for a stable listing.
pub fn sort_models(models: &mut [Model]) {
    models.sort_by(|a, b| match (a.created, b.created) {
        (Some(a_created), Some(b_created)) if a_created != b_created => b_created.cmp(&a_created),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        _ => a.id.cmp(&b.id),
    });
}
