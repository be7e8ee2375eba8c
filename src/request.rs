use async_openai::{
    config::OpenAIConfig,
    types::{CreateImageRequest, CreateImageRequestArgs, Image, ImageModel, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, API_KEY_VAR};
use crate::size::ImageSize;

const USER: &str = "imagine";

#[derive(Clone, Debug)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: ImageSize,
    pub variations: u8,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, size: ImageSize, variations: u8) -> Self {
        Self {
            prompt: prompt.into(),
            size,
            variations,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageResponse {
    pub payloads: Vec<String>,
}

#[async_trait]
pub trait ImageGenerator {
    async fn generate(&self, request: &ImageRequest) -> anyhow::Result<ImageResponse>;
}

pub struct OpenAiImageGenerator {
    client: Option<Client<OpenAIConfig>>,
}

impl OpenAiImageGenerator {
    pub fn new(config: &Config) -> Self {
        let client = config.api_key.as_deref().map(|key| {
            Client::with_config(OpenAIConfig::new().with_api_key(key))
        });
        Self { client }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, request: &ImageRequest) -> anyhow::Result<ImageResponse> {
        let Some(client) = &self.client else {
            anyhow::bail!("no API key provided, set {}", API_KEY_VAR);
        };
        let start_time = std::time::Instant::now();

        let create = build_request(request)?;
        let response = client.images().create(create).await?;
        let payloads = extract_payloads(&response.data)?;

        log::debug!(
            "images.create took {}ms, {} payloads",
            start_time.elapsed().as_millis(),
            payloads.len()
        );
        Ok(ImageResponse { payloads })
    }
}

pub fn build_request(request: &ImageRequest) -> anyhow::Result<CreateImageRequest> {
    // dall-e-2 is the only model that accepts all three sizes.
    let create = CreateImageRequestArgs::default()
        .prompt(request.prompt.as_str())
        .model(ImageModel::DallE2)
        .n(request.variations)
        .response_format(ResponseFormat::B64Json)
        .size(request.size)
        .user(USER)
        .build()?;
    Ok(create)
}

fn extract_payloads(data: &[Arc<Image>]) -> anyhow::Result<Vec<String>> {
    let mut payloads = Vec::with_capacity(data.len());
    for image in data {
        match image.as_ref() {
            Image::B64Json { b64_json, .. } => payloads.push(b64_json.to_string()),
            Image::Url { .. } => anyhow::bail!("expected a base64 payload, got a URL"),
        }
    }
    Ok(payloads)
}

pub async fn request_images<G>(generator: &G, request: &ImageRequest) -> Option<ImageResponse>
where
    G: ImageGenerator + ?Sized,
{
    log::info!("Creating image/s...");
    log::debug!(
        "Prompt: {:?}, size: {}, variations: {}",
        request.prompt,
        request.size.dimensions(),
        request.variations
    );

    match generator.generate(request).await {
        Ok(response) => Some(response),
        Err(e) => {
            log::error!("Image creation failed!");
            log::error!("{:#}", e);
            None
        }
    }
}
