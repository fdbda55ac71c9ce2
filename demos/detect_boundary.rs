use std::time::Instant;

use env_logger::Builder;
use image::open;
use log::info;
use doc_bound::{
    detect_boundary_dynamic, overlap_ratio, points_for, render_overlay, GroundTruth, OverlayConfig,
};

fn main() {
    Builder::from_default_env().format_timestamp_nanos().init();

    let frame = open("data/input_1.jpg").unwrap();
    info!("loaded image: {}x{}", frame.width(), frame.height());

    let instant = Instant::now();
    let boundary = detect_boundary_dynamic(&frame);
    let elapsed = instant.elapsed();
    info!("detection took {elapsed:?}: {boundary:?}");

    let truth = GroundTruth::from_path("data/truth.csv").unwrap().get(1).unwrap();
    let overlap = overlap_ratio(boundary, truth);
    info!("overlap {overlap:.4}, {} point(s)", points_for(overlap));

    let preview = render_overlay(&frame, boundary, &OverlayConfig::default());
    preview.save("data/input_1_boundary.png").unwrap();
}
