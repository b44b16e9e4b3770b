use crate::{
    error::{GenerationFailure, NicheError, Result},
    models::{GenerationOutcome, GenerationRequest},
    niche::codec,
};
use async_trait::async_trait;
use reqwest::Client;

/// One generation call. Implementations never fail outward: every error
/// becomes [`GenerationOutcome::Failed`].
#[async_trait]
pub trait ImageTransport: Send + Sync {
    async fn send(&self, request: &GenerationRequest) -> GenerationOutcome;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| NicheError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn call(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<image::DynamicImage, GenerationFailure> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        // The proxy answers with a bare JSON string holding the base64 image.
        let payload: String = response
            .json()
            .await
            .map_err(|e| GenerationFailure::Decode(format!("unexpected payload: {}", e)))?;

        codec::decode_image(&payload)
    }
}

#[async_trait]
impl ImageTransport for HttpTransport {
    async fn send(&self, request: &GenerationRequest) -> GenerationOutcome {
        log::debug!(
            "Sending {} request for {} (seed {})",
            request.pipeline_type.as_str(),
            request.model_name,
            request.seed
        );

        match self.call(request).await {
            Ok(image) => GenerationOutcome::Image(image),
            Err(reason) => {
                log::debug!("Generation with seed {} failed: {}", request.seed, reason);
                GenerationOutcome::Failed(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MinerTarget, PipelineParams, PipelineType};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
    use serde_json::Value;

    fn request(seed: u64) -> GenerationRequest {
        GenerationRequest {
            key: "token".to_string(),
            prompt: "a cat".to_string(),
            negative_prompt: String::new(),
            model_name: "RealisticVision".to_string(),
            pipeline_type: PipelineType::TextToImage,
            seed,
            miner_uid: MinerTarget::Any,
            conditional_image: None,
            pipeline_params: PipelineParams {
                width: 16,
                height: 16,
                num_inference_steps: 30,
                guidance_scale: 7.0,
                negative_prompt: String::new(),
                controlnet_conditioning_scale: None,
            },
        }
    }

    // Seed 2 gets garbage, odd seeds a 500, everything else a 16x16 image.
    async fn fake_proxy(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let seed = body["seed"].as_u64().unwrap_or_default();
        if seed == 2 {
            return (StatusCode::OK, Json(Value::String("bm90IGFuIGltYWdl".into())));
        }
        if seed % 2 == 1 {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::String("boom".into())));
        }
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([1, 2, 3])));
        let payload = codec::encode_png_base64(&image).unwrap();
        (StatusCode::OK, Json(Value::String(payload)))
    }

    async fn spawn_proxy() -> String {
        let app = Router::new().route("/generate", post(fake_proxy));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/generate", addr)
    }

    #[tokio::test]
    async fn decodes_successful_response() {
        let transport = HttpTransport::new(spawn_proxy().await).unwrap();
        match transport.send(&request(0)).await {
            GenerationOutcome::Image(image) => assert_eq!(image.dimensions(), (16, 16)),
            GenerationOutcome::Failed(reason) => panic!("unexpected failure: {}", reason),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_contained() {
        let transport = HttpTransport::new(spawn_proxy().await).unwrap();
        let outcome = transport.send(&request(1)).await;
        assert!(matches!(
            outcome.failure(),
            Some(GenerationFailure::Status { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn malformed_payload_is_decode_failure() {
        let transport = HttpTransport::new(spawn_proxy().await).unwrap();
        let outcome = transport.send(&request(2)).await;
        assert!(matches!(outcome.failure(), Some(GenerationFailure::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_proxy_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(format!("http://{}/generate", addr)).unwrap();
        let outcome = transport.send(&request(0)).await;
        assert!(matches!(outcome.failure(), Some(GenerationFailure::Transport(_))));
    }
}
