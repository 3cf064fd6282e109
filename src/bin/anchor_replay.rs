use std::sync::{Arc, Mutex};
use std::time::Instant;

use clap::Parser;
use image_anchor_tracking::io::{load_event_log, write_tracking_report};
use image_anchor_tracking::session::{TrackingSession, replay};
use image_anchor_tracking::visualization::RerunScene;
use image_anchor_tracking::{LoggingObserver, PlacementOffset, TrackingConfig, TrackingCoordinator};

#[derive(Parser)]
#[command(version, about, author)]
struct AnchorReplayCli {
    /// path to a recorded event log (json array of lifecycle events)
    path: String,

    /// tracking config json, defaults are used when omitted
    #[arg(long)]
    config: Option<String>,

    /// placement offset in meters, overrides the config
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    offset: Option<Vec<f32>>,

    /// name of a scene entity to move onto each detected image
    #[arg(long)]
    entity: Option<String>,

    /// skip indicator outlines
    #[arg(long, default_value_t = false)]
    no_indicator: bool,

    /// write the final tracked images to this json file
    #[arg(long)]
    report: Option<String>,

    /// rerun recording output
    #[arg(long, default_value = "output.rrd")]
    rrd: String,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = AnchorReplayCli::parse();

    let mut config = match &cli.config {
        Some(path) => match TrackingConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => TrackingConfig::default(),
    };
    if let Some(offset) = &cli.offset {
        config.placement_offset = PlacementOffset::new(offset[0], offset[1], offset[2]);
    }
    if let Some(entity) = &cli.entity {
        config.entity_to_place_name = Some(entity.clone());
    }
    if cli.no_indicator {
        config.create_indicator_entity = false;
    }

    let events = match load_event_log(&cli.path) {
        Ok(events) => events,
        Err(e) => {
            log::error!("failed to load event log {}: {}", cli.path, e);
            std::process::exit(1);
        }
    };

    let recording = rerun::RecordingStreamBuilder::new("image_anchor_tracking").save(&cli.rrd);
    let recording = match recording {
        Ok(recording) => recording,
        Err(e) => {
            log::error!("failed to create recording {}: {}", cli.rrd, e);
            std::process::exit(1);
        }
    };
    let mut scene = RerunScene::new(recording);
    if let Some(entity) = &config.entity_to_place_name {
        scene = scene.with_entity(entity.clone());
    }
    let scene = Arc::new(Mutex::new(scene));
    let observer = Arc::new(LoggingObserver);

    let (sender, session) = TrackingSession::open(config.reference_image_group_name.clone());
    let mut coordinator = TrackingCoordinator::new(config);
    coordinator.set_observer(&observer);
    coordinator.set_scene(&scene);
    coordinator.attach_session(session);

    let now = Instant::now();
    let producer = tokio::spawn(async move { replay(events, &sender) });
    let processed = coordinator.process_session_events().await;
    match producer.await {
        Ok(Ok(sent)) => log::debug!("replayed {} events", sent),
        Ok(Err(e)) => log::warn!("replay stopped early: {}", e),
        Err(e) => log::error!("replay task failed: {}", e),
    }
    let duration_sec = now.elapsed().as_secs_f64();
    println!("processed {} events in {:.6} sec", processed, duration_sec);
    println!("{} images tracked at end of session", coordinator.registry().len());

    if let Some(report) = &cli.report {
        if let Err(e) = write_tracking_report(report, coordinator.registry(), |image| {
            coordinator.target_transform(image)
        }) {
            log::error!("failed to write report {}: {}", report, e);
        }
    }
}
