//! Batch evaluation of the detector against hand-labeled ground truth.
//!
//! Each image in a numbered set is run through [`detect_boundary`], compared to
//! its ground-truth rectangle with [`overlap_ratio`], and scored with
//! [`points_for`]. Unreadable images count as zero overlap; a malformed
//! ground-truth table aborts the run.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use rayon::prelude::*;

use crate::{
    detect::detect_boundary,
    error::{EvaluationError, Result},
    geometry::{overlap_ratio, points_for, Boundary, Region},
};

/// Ground-truth rectangles, one per image, addressed by 1-based image index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    records: Vec<Region>,
}

impl GroundTruth {
    /// Reads and parses a ground-truth table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EvaluationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let truth: Self = text.parse()?;
        debug!("loaded {} ground truth records from {}", truth.len(), path.display());
        Ok(truth)
    }

    /// Rectangle for the image with 1-based `index`.
    pub fn get(&self, index: usize) -> Option<Region> {
        index
            .checked_sub(1)
            .and_then(|i| self.records.get(i))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Region] {
        &self.records
    }
}

impl FromStr for GroundTruth {
    type Err = EvaluationError;

    /// Parses `x,y,width,height` records, one per line. Blank lines at the end
    /// of the text are ignored; anywhere else they are malformed records.
    fn from_str(text: &str) -> Result<Self> {
        let records = text
            .trim_end()
            .lines()
            .enumerate()
            .map(|(i, line)| parse_record(i + 1, line))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }
}

fn parse_record(line: usize, content: &str) -> Result<Region> {
    let fields: Vec<&str> = content.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(EvaluationError::MalformedRecord {
            line,
            content: content.to_string(),
            fields: fields.len(),
        });
    }

    let mut values = [0i32; 4];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field.parse().map_err(|_| EvaluationError::InvalidNumber {
            line,
            field: field.to_string(),
        })?;
    }

    let [x, y, width, height] = values;
    if width < 0 || height < 0 {
        return Err(EvaluationError::NegativeSize { line });
    }
    Ok(Region::new(x, y, width, height))
}

/// Where an evaluation run finds its images and ground truth.
///
/// Images are expected at `{data_dir}/{image_prefix}{i}.{image_extension}` for
/// `i` in `1..=image_count`, with the ground truth in `{data_dir}/{truth_file}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationConfig {
    pub data_dir: PathBuf,
    pub image_prefix: String,
    pub image_extension: String,
    pub image_count: usize,
    /// Relative paths resolve against `data_dir`.
    pub truth_file: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            image_prefix: "input_".to_string(),
            image_extension: "jpg".to_string(),
            image_count: 25,
            truth_file: PathBuf::from("truth.csv"),
        }
    }
}

impl EvaluationConfig {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_image_prefix(mut self, image_prefix: impl Into<String>) -> Self {
        self.image_prefix = image_prefix.into();
        self
    }

    pub fn with_image_extension(mut self, image_extension: impl Into<String>) -> Self {
        self.image_extension = image_extension.into();
        self
    }

    pub fn with_image_count(mut self, image_count: usize) -> Self {
        self.image_count = image_count;
        self
    }

    pub fn with_truth_file(mut self, truth_file: impl Into<PathBuf>) -> Self {
        self.truth_file = truth_file.into();
        self
    }

    /// Image paths in index order.
    pub fn image_paths(&self) -> Vec<PathBuf> {
        (1..=self.image_count)
            .map(|i| {
                self.data_dir
                    .join(format!("{}{}.{}", self.image_prefix, i, self.image_extension))
            })
            .collect()
    }

    pub fn truth_path(&self) -> PathBuf {
        self.data_dir.join(&self.truth_file)
    }
}

/// Outcome for a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvaluation {
    /// 1-based position in the batch.
    pub index: usize,
    pub path: PathBuf,
    /// `None` when the image could not be loaded.
    pub boundary: Option<Boundary>,
    pub overlap: f64,
    pub points: u32,
    pub load_error: Option<String>,
}

impl ImageEvaluation {
    pub fn is_unreadable(&self) -> bool {
        self.load_error.is_some()
    }
}

/// Loads one image, detects its boundary and scores it against `truth`.
///
/// A load failure is recorded on the result (zero overlap, zero points) rather
/// than returned as an error.
pub fn evaluate_image(index: usize, path: &Path, truth: Region) -> ImageEvaluation {
    let image = match image::open(path) {
        Ok(image) => image,
        Err(err) => {
            let message = err.to_string();
            warn!("Unable to load image at {}: {message}", path.display());
            return ImageEvaluation {
                index,
                path: path.to_path_buf(),
                boundary: None,
                overlap: 0.0,
                points: 0,
                load_error: Some(message),
            };
        }
    };

    let boundary = detect_boundary(&image.to_luma8());
    let overlap = overlap_ratio(boundary, truth);
    debug!("{} overlap: {overlap}", path.display());

    ImageEvaluation {
        index,
        path: path.to_path_buf(),
        boundary: Some(boundary),
        overlap,
        points: points_for(overlap),
        load_error: None,
    }
}

/// Aggregate score of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub evaluations: Vec<ImageEvaluation>,
    pub total_points: u32,
    /// Mean over every image attempted, unreadable ones included as `0.0`.
    pub average_overlap: f64,
}

impl EvaluationSummary {
    pub fn from_evaluations(evaluations: Vec<ImageEvaluation>) -> Self {
        let total_points = evaluations.iter().map(|e| e.points).sum();
        let average_overlap = if evaluations.is_empty() {
            0.0
        } else {
            evaluations.iter().map(|e| e.overlap).sum::<f64>() / evaluations.len() as f64
        };

        Self {
            evaluations,
            total_points,
            average_overlap,
        }
    }

    pub fn unreadable_count(&self) -> usize {
        self.evaluations.iter().filter(|e| e.is_unreadable()).count()
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for evaluation in &self.evaluations {
            match &evaluation.load_error {
                Some(err) => writeln!(
                    f,
                    "{} unreadable ({err}), overlap %: 0",
                    evaluation.path.display()
                )?,
                None => writeln!(
                    f,
                    "{} overlap %: {:.4}",
                    evaluation.path.display(),
                    evaluation.overlap
                )?,
            }
        }
        write!(
            f,
            "Total Points: {} Avg Overlap: {:.4}",
            self.total_points, self.average_overlap
        )
    }
}

/// Scores every image in `paths` against the matching ground-truth record.
///
/// Image `i` (0-based position in `paths`) is compared with record `i + 1`.
/// Images are processed in parallel; results keep the input order.
///
/// # Errors
///
/// [`EvaluationError::GroundTruthMismatch`] when the table holds fewer records
/// than there are images. Unreadable images are not errors.
///
/// # Examples
///
/// ```rust,no_run
/// use doc_bound::{run_batch, GroundTruth};
///
/// let truth = GroundTruth::from_path("data/truth.csv").unwrap();
/// let paths = ["data/input_1.jpg", "data/input_2.jpg"];
/// let summary = run_batch(&paths, &truth).unwrap();
/// println!("{summary}");
/// ```
pub fn run_batch<P>(paths: &[P], truth: &GroundTruth) -> Result<EvaluationSummary>
where
    P: AsRef<Path> + Sync,
{
    if truth.len() < paths.len() {
        return Err(EvaluationError::GroundTruthMismatch {
            images: paths.len(),
            records: truth.len(),
        });
    }

    let evaluations: Vec<ImageEvaluation> = paths
        .par_iter()
        .zip(truth.records().par_iter())
        .enumerate()
        .map(|(i, (path, region))| evaluate_image(i + 1, path.as_ref(), *region))
        .collect();

    let summary = EvaluationSummary::from_evaluations(evaluations);
    info!(
        "evaluated {} images ({} unreadable): {} points, average overlap {:.4}",
        summary.evaluations.len(),
        summary.unreadable_count(),
        summary.total_points,
        summary.average_overlap
    );
    Ok(summary)
}

/// Loads the ground truth named by `config` and evaluates its image set.
pub fn run_evaluation(config: &EvaluationConfig) -> Result<EvaluationSummary> {
    let truth = GroundTruth::from_path(config.truth_path())?;
    run_batch(&config.image_paths(), &truth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};
    use tempfile::TempDir;

    fn evaluation(index: usize, overlap: f64) -> ImageEvaluation {
        ImageEvaluation {
            index,
            path: PathBuf::from(format!("input_{index}.png")),
            boundary: Some(Boundary::new(0, 0, 10, 10)),
            overlap,
            points: points_for(overlap),
            load_error: None,
        }
    }

    fn write_block_image(path: &Path) {
        let image: GrayImage = ImageBuffer::from_fn(100, 100, |x, y| {
            if (20..80).contains(&x) && (20..80).contains(&y) {
                Luma([220u8])
            } else {
                Luma([30u8])
            }
        });
        image.save(path).unwrap();
    }

    #[test]
    fn test_parse_ground_truth() {
        let truth: GroundTruth = "1,2,3,4\n 10 , 20 ,30, 40 \n".parse().unwrap();
        assert_eq!(truth.len(), 2);
        assert_eq!(truth.get(1), Some(Region::new(1, 2, 3, 4)));
        assert_eq!(truth.get(2), Some(Region::new(10, 20, 30, 40)));
        assert_eq!(truth.get(0), None);
        assert_eq!(truth.get(3), None);
    }

    #[test]
    fn test_parse_ignores_trailing_blank_lines() {
        let truth: GroundTruth = "1,2,3,4\r\n5,6,7,8\r\n\r\n\n".parse().unwrap();
        assert_eq!(truth.len(), 2);
        assert_eq!(truth.get(2), Some(Region::new(5, 6, 7, 8)));

        let empty: GroundTruth = "".parse().unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_too_few_fields() {
        let err = "1,2,3,4\n5,6,7\n".parse::<GroundTruth>().unwrap_err();
        match err {
            EvaluationError::MalformedRecord { line, fields, .. } => {
                assert_eq!(line, 2);
                assert_eq!(fields, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_too_many_fields() {
        let err = "1,2,3,4,5".parse::<GroundTruth>().unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::MalformedRecord { line: 1, fields: 5, .. }
        ));
    }

    #[test]
    fn test_parse_blank_line_inside_table() {
        let err = "1,2,3,4\n\n5,6,7,8".parse::<GroundTruth>().unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::MalformedRecord { line: 2, fields: 1, .. }
        ));
    }

    #[test]
    fn test_parse_invalid_number() {
        let err = "1,2,three,4".parse::<GroundTruth>().unwrap_err();
        match err {
            EvaluationError::InvalidNumber { line, field } => {
                assert_eq!(line, 1);
                assert_eq!(field, "three");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_size() {
        let err = "0,0,10,10\n0,0,-1,10".parse::<GroundTruth>().unwrap_err();
        assert!(matches!(err, EvaluationError::NegativeSize { line: 2 }));
    }

    #[test]
    fn test_record_near_coordinate_limit_scores_zero() {
        let truth: GroundTruth = "2000000000,0,2000000000,10".parse().unwrap();
        let region = truth.get(1).unwrap();
        assert_eq!(overlap_ratio(Boundary::new(0, 0, 10, 10), region), 0.0);
    }

    #[test]
    fn test_ground_truth_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = GroundTruth::from_path(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, EvaluationError::Io { .. }));
    }

    #[test]
    fn test_config_paths() {
        let config = EvaluationConfig::default()
            .with_data_dir("set")
            .with_image_count(3)
            .with_image_extension("png");
        assert_eq!(
            config.image_paths(),
            vec![
                PathBuf::from("set/input_1.png"),
                PathBuf::from("set/input_2.png"),
                PathBuf::from("set/input_3.png"),
            ]
        );
        assert_eq!(config.truth_path(), PathBuf::from("set/truth.csv"));
    }

    #[test]
    fn test_summary_aggregation() {
        let n = 7;
        let evaluations = (1..=n).map(|i| evaluation(i, 0.6)).collect();
        let summary = EvaluationSummary::from_evaluations(evaluations);
        assert_eq!(summary.total_points, n as u32);
        assert!((summary.average_overlap - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_summary_empty_batch() {
        let summary = EvaluationSummary::from_evaluations(Vec::new());
        assert_eq!(summary.total_points, 0);
        assert_eq!(summary.average_overlap, 0.0);
    }

    #[test]
    fn test_summary_display() {
        let summary = EvaluationSummary::from_evaluations(vec![evaluation(1, 1.0), evaluation(2, 0.5)]);
        let text = summary.to_string();
        assert!(text.contains("input_1.png overlap %: 1.0000"));
        assert!(text.ends_with("Total Points: 3 Avg Overlap: 0.7500"));
    }

    #[test]
    fn test_run_batch_ground_truth_mismatch() {
        let truth: GroundTruth = "0,0,10,10".parse().unwrap();
        let err = run_batch(&["a.png", "b.png"], &truth).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::GroundTruthMismatch { images: 2, records: 1 }
        ));
    }

    #[test]
    fn test_run_batch_continues_past_unreadable_image() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            dir.path().join("input_1.png"),
            dir.path().join("input_2.png"),
            dir.path().join("input_3.png"),
        ];
        write_block_image(&paths[0]);
        write_block_image(&paths[2]);

        let truth: GroundTruth = "20,20,60,60\n20,20,60,60\n20,20,60,60".parse().unwrap();
        let summary = run_batch(&paths, &truth).unwrap();

        assert_eq!(summary.evaluations.len(), 3);
        assert_eq!(summary.unreadable_count(), 1);

        let missing = &summary.evaluations[1];
        assert_eq!(missing.index, 2);
        assert!(missing.is_unreadable());
        assert_eq!(missing.overlap, 0.0);
        assert_eq!(missing.points, 0);

        for loaded in [&summary.evaluations[0], &summary.evaluations[2]] {
            assert_eq!(loaded.boundary, Some(Boundary::new(20, 20, 79, 79)));
            assert_eq!(loaded.overlap, 1.0);
            assert_eq!(loaded.points, 2);
        }

        assert_eq!(summary.total_points, 4);
        assert!((summary.average_overlap - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_batch_partial_credit_for_every_image() {
        let dir = TempDir::new().unwrap();
        let n = 4;
        let paths: Vec<PathBuf> = (1..=n)
            .map(|i| dir.path().join(format!("input_{i}.png")))
            .collect();
        for path in &paths {
            write_block_image(path);
        }
        // Truth covers 36 of the 59 scored columns of each detection.
        let truth: GroundTruth = vec!["20,20,36,60"; n].join("\n").parse().unwrap();

        let summary = run_batch(&paths, &truth).unwrap();

        let expected = 36.0 / 59.0;
        for evaluation in &summary.evaluations {
            assert!((evaluation.overlap - expected).abs() < 1e-12);
            assert_eq!(evaluation.points, 1);
        }
        assert_eq!(summary.total_points, n as u32);
        assert!((summary.average_overlap - expected).abs() < 1e-12);
    }

    #[test]
    fn test_run_evaluation_from_config() {
        let dir = TempDir::new().unwrap();
        write_block_image(&dir.path().join("input_1.png"));
        write_block_image(&dir.path().join("input_2.png"));
        // Second truth only covers the left half of the block.
        fs::write(dir.path().join("truth.csv"), "20,20,60,60\n20,20,30,60\n").unwrap();

        let config = EvaluationConfig::default()
            .with_data_dir(dir.path())
            .with_image_count(2)
            .with_image_extension("png");
        let summary = run_evaluation(&config).unwrap();

        assert_eq!(summary.evaluations[0].points, 2);
        let half = &summary.evaluations[1];
        assert!((half.overlap - 30.0 / 59.0).abs() < 1e-12);
        assert_eq!(half.points, 1);
        assert_eq!(summary.total_points, 3);
    }
}
