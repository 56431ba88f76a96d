use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lesson_player::models::{LessonId, ThumbnailQuality, resolve_video_id};
use lesson_player::services::{FileProgressStore, PlaybackService};
use lesson_player::ui::pages::player::format_time;
use lesson_player::Config;

#[derive(Parser)]
#[command(name = "lesson-player")]
#[command(about = "Resolve lesson video references and inspect saved progress")]
#[command(version)]
struct Cli {
    /// Video URLs or bare identifiers to resolve
    references: Vec<String>,

    /// Also print the saved position for this lesson
    #[arg(short, long)]
    lesson: Option<String>,

    /// Origin to embed the player under
    #[arg(long)]
    origin: Option<String>,
}

fn main() -> Result<ExitCode> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lesson_player=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    debug!("Using config: {:?}", config);

    let mut failed = false;
    for reference in &cli.references {
        match resolve_video_id(Some(reference)) {
            Some(video_id) => {
                println!("{}", video_id.as_str());
                println!("  watch:     {}", video_id.watch_url());
                println!("  embed:     {}", video_id.embed_url(cli.origin.as_deref()));
                println!(
                    "  thumbnail: {}",
                    video_id.thumbnail_url(ThumbnailQuality::default())
                );
            }
            None => {
                warn!("Could not resolve {:?}", reference);
                println!("{}: Invalid YouTube video link or ID.", reference);
                failed = true;
            }
        }
    }

    if let Some(lesson) = cli.lesson {
        let lesson_id = LessonId::new(lesson);
        let path = config.storage.progress_path()?;
        let store = FileProgressStore::open(&path)?;
        let key = lesson_id.storage_key(&config.storage.key_prefix);
        info!("Reading progress for lesson {} from {:?}", lesson_id, path);

        match PlaybackService::get_progress(&store, &key)? {
            Some(progress) => println!(
                "lesson {}: {} / {}",
                lesson_id,
                format_time(progress.current_time),
                format_time(progress.duration)
            ),
            None => println!("lesson {}: no saved progress", lesson_id),
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
