pub mod config;
pub mod request;
pub mod save;
pub mod size;

use std::path::{Path, PathBuf};

pub use config::Config;
pub use request::{
    request_images, ImageGenerator, ImageRequest, ImageResponse, OpenAiImageGenerator,
};
pub use save::save_images;
pub use size::ImageSize;

pub async fn create_images<G>(
    generator: &G,
    request: &ImageRequest,
    output_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>>
where
    G: ImageGenerator + ?Sized,
{
    let Some(response) = request_images(generator, request).await else {
        return Ok(Vec::new());
    };
    save_images(output_dir, &request.prompt, &response)
}
