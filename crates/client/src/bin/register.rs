//! eventconnect-register - run the attendee registration wizard from a terminal.
//!
//! Usage:
//!   eventconnect-register <event-slug> <photo> --name <name> --role <role> --company <company>
//!       [--linkedin <url>] [--keep-original <url>] [--api-url <url>]
//!
//! Ctrl-C while the headshot is generating abandons the attempt.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use eventconnect_client::{ApiClient, RegistrationWorkflow};
use eventconnect_core::image_prep::ImageUpload;
use eventconnect_core::registration::ProfileForm;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventconnect-register")]
#[command(about = "Register for an EventConnect event with an AI headshot")]
struct Args {
    /// Event slug, e.g. `devweek-2026`
    event: String,

    /// Path to the profile photo
    photo: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    role: String,

    #[arg(long)]
    company: String,

    /// LinkedIn profile URL
    #[arg(long)]
    linkedin: Option<String>,

    /// Skip generation and use the photo already hosted at this URL
    #[arg(long)]
    keep_original: Option<String>,

    /// EventConnect API root
    #[arg(long, env = "EVENTCONNECT_API_URL", default_value = "http://localhost:3000")]
    api_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eventconnect_client=info")),
        )
        .init();

    let args = Args::parse();
    let api = Arc::new(ApiClient::new(&args.api_url));

    let event = api
        .get_event(&args.event)
        .await
        .with_context(|| format!("Failed to load event '{}'", args.event))?;
    println!("Registering for {} ({}, {})", event.title, event.date, event.location);

    let mut workflow = RegistrationWorkflow::new(event.id, api.clone(), api);
    workflow.submit_info(ProfileForm {
        name: args.name,
        role: args.role,
        company: args.company,
        linkedin: args.linkedin,
    })?;
    workflow.select_photo(read_photo(Path::new(&args.photo))?)?;

    if let Some(url) = args.keep_original {
        workflow.keep_original(url)?;
    } else {
        let abandon = workflow.abandon_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                abandon.abandon();
            }
        });

        println!("Generating headshot...");
        match workflow.generate().await {
            Ok(url) => println!("Headshot ready: {url}"),
            Err(err) => bail!("{err}"),
        }
    }

    let stored = workflow.confirm().await?;
    println!(
        "Registered {} (attendee #{}) with headshot {}",
        stored.name, stored.id, stored.headshot_url
    );
    Ok(())
}

fn read_photo(path: &Path) -> Result<ImageUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content_type = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "webp" => "image/webp",
        _ => "image/jpeg",
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("photo.jpg")
        .to_string();

    Ok(ImageUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    })
}
