use crate::{
    error::{NicheError, Result},
    models::UidInfoResponse,
};
use reqwest::Client;

/// Reads per-miner model and score history from the proxy.
#[derive(Clone)]
pub struct StatsClient {
    client: Client,
    url: String,
}

impl StatsClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub async fn fetch(&self) -> Result<UidInfoResponse> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| NicheError::RequestError(format!("Stats request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NicheError::ResponseError(format!(
                "Error getting miner info ({}): {}",
                status, error_text
            )));
        }

        let info: UidInfoResponse = response
            .json()
            .await
            .map_err(|e| NicheError::ResponseError(e.to_string()))?;

        log::info!("Fetched info for {} miners", info.all_uid_info.len());
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/get_uid_info", addr)
    }

    #[tokio::test]
    async fn parses_uid_info() {
        let app = Router::new().route(
            "/get_uid_info",
            get(|| async {
                Json(json!({
                    "all_uid_info": {
                        "4": { "model_name": "DreamShaper", "scores": [0.9, 0.3] },
                        "8": { "model_name": "AnimeV3", "scores": [0.1] }
                    }
                }))
            }),
        );
        let stats = StatsClient::new(Client::new(), spawn(app).await);

        let info = stats.fetch().await.unwrap();

        assert_eq!(info.all_uid_info.len(), 2);
        assert_eq!(info.model_distribution().get("DreamShaper"), Some(&1));
        assert_eq!(info.all_uid_info["4"].scores, vec![0.9, 0.3]);
    }

    #[tokio::test]
    async fn error_status_is_response_error() {
        let app = Router::new().route(
            "/get_uid_info",
            get(|| async { (StatusCode::BAD_GATEWAY, Json(Value::Null)) }),
        );
        let stats = StatsClient::new(Client::new(), spawn(app).await);

        assert!(matches!(
            stats.fetch().await,
            Err(NicheError::ResponseError(_))
        ));
    }
}
