use clap::Parser;
use std::path::PathBuf;

use imagine::{create_images, Config, ImageRequest, ImageSize, OpenAiImageGenerator};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The text prompt for the image creation.
    prompt: String,

    /// The size of the exported image/s.
    #[arg(short, long, value_enum, default_value_t = ImageSize::Medium)]
    size: ImageSize,

    /// How many images should be created. Can be up to 10.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..))]
    variations: u8,

    /// Folder the images are written to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_target(false)
        .init();
    if !dotenv_loaded {
        log::debug!("No .env file found, using environment variables");
    }

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(output_dir) = args.output_dir {
        config = config.with_output_dir(output_dir);
    }

    let generator = OpenAiImageGenerator::new(&config);
    let request = ImageRequest::new(args.prompt, args.size, args.variations);

    let paths = create_images(&generator, &request, &config.output_dir).await?;
    for path in &paths {
        log::debug!("Wrote {}", path.display());
    }

    Ok(())
}
