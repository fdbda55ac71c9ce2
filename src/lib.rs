//! # Document Boundary Detection Library
//!
//! This crate locates the rectangular extent of a document, or any other
//! high-contrast foreground object, against a roughly uniform background, and
//! scores those detections against hand-labeled ground truth.
//!
//! ## Features
//!
//! - Otsu binarization followed by projection-profile boundary search
//! - Parallel row and column projections using rayon
//! - Containment-style overlap metric and a 2/1/0 point rubric
//! - Batch evaluation over a numbered image set with a CSV ground-truth table
//! - Boundary overlay and cropping helpers
//! - Optional debug logging (enable with `logger` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use image::open;
//! use doc_bound::{detect_boundary, crop_to_boundary};
//!
//! let frame = open("page.jpg").unwrap();
//! let boundary = detect_boundary(&frame.to_luma8());
//! println!("({}, {}) - ({}, {})", boundary.x1, boundary.y1, boundary.x2, boundary.y2);
//!
//! if let Some(page) = crop_to_boundary(&frame, boundary) {
//!     page.save("page_cropped.png").unwrap();
//! }
//! ```
//!
//! ## Evaluating Against Ground Truth
//!
//! The ground-truth table holds one `x,y,width,height` line per image, line `i`
//! belonging to `input_{i}.jpg`:
//!
//! ```rust,no_run
//! use doc_bound::{run_evaluation, EvaluationConfig};
//!
//! let config = EvaluationConfig::default().with_data_dir("data").with_image_count(25);
//! let summary = run_evaluation(&config).unwrap();
//! println!("{summary}");
//! ```
//!
//! The overlap score divides the intersection by the *detected* area, not by
//! the union. See [`overlap_ratio`] for what that implies.
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! Enable log output from the detector and the evaluation harness:
//!
//! ```toml
//! [dependencies]
//! doc-bound = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! Unreadable images are reported at `warn`, per-image results at `debug` and
//! batch totals at `info`.
//!
//! ### CLI Feature
//!
//! `cli` builds the `doc-bound` binary with `detect` and `evaluate`
//! subcommands.

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logger")]
macro_rules! info {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logger")]
macro_rules! warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

pub mod detect;
pub mod error;
pub mod evaluate;
pub mod geometry;
pub mod overlay;

pub use detect::{detect_boundary, detect_boundary_dynamic};
pub use error::{EvaluationError, Result};
pub use evaluate::{
    evaluate_image, run_batch, run_evaluation, EvaluationConfig, EvaluationSummary,
    GroundTruth, ImageEvaluation,
};
pub use geometry::{
    overlap_ratio, points_for, Boundary, Region, FULL_CREDIT_OVERLAP, PARTIAL_CREDIT_OVERLAP,
};
pub use overlay::{crop_to_boundary, draw_boundary_mut, render_overlay, OverlayConfig};
