use anyhow::Context;
use image::DynamicImage;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gis_map_client::models::{ClientConfig, ImageFormat};
use gis_map_client::services::MapServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gis_map_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_file = std::env::var("GIS_CONFIG_FILE").ok().map(PathBuf::from);
    let config = ClientConfig::load_or_default(config_file.as_deref());

    let job = config
        .job
        .clone()
        .context("No job configured. Add a `job` section to the file named by GIS_CONFIG_FILE")?;
    let request = job.to_request()?;

    let server = MapServer::new(config)?;
    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling render");
            cancel.cancel();
        }
    });

    let image = server.render(&request).await?;
    // JPEG has no alpha channel
    let image = match job.format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };
    image
        .save_with_format(&job.output, job.format.codec())
        .with_context(|| format!("Failed to write {}", job.output.display()))?;

    println!(
        "Rendered {} ({}x{} {})",
        job.output.display(),
        image.width(),
        image.height(),
        job.format
    );
    Ok(())
}
