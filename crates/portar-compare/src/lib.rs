//! Visual-equivalence comparator.
//!
//! Compares two rendered screenshots with a mean-squared-error similarity
//! score and a fixed threshold verdict. Image support is feature-gated
//! (`raster`); without it, or with either input missing, comparison degrades
//! to an `Unknown` verdict with an explanatory message rather than failing.

use std::path::Path;

use portar_core::Verdict;

/// Similarity above which two renderings count as visually equivalent.
///
/// Fixed design constant; changing it changes what "verified" means across
/// the whole tool.
pub const SIMILARITY_THRESHOLD: f64 = 0.95;

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub verdict: Verdict,
    /// Similarity in roughly `[0, 1]`; `None` when no comparison ran.
    pub score: Option<f64>,
    /// Human-readable explanation, always present.
    pub message: String,
}

impl Comparison {
    fn unknown(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unknown,
            score: None,
            message: message.into(),
        }
    }
}

/// Compare two screenshot files on disk.
///
/// The first image is the reference; when dimensions differ the second is
/// resampled to the reference's dimensions before scoring (lossy, a
/// documented precision caveat). Missing files, disabled raster support and
/// undecodable images all yield `Unknown`.
#[must_use]
pub fn compare_files(reference: &Path, target: &Path) -> Comparison {
    if !reference.is_file() || !target.is_file() {
        return Comparison::unknown("cannot compare: one or both screenshots missing");
    }
    compare_readable(reference, target)
}

#[cfg(not(feature = "raster"))]
fn compare_readable(_reference: &Path, _target: &Path) -> Comparison {
    Comparison::unknown("image comparison unavailable: built without raster support")
}

#[cfg(feature = "raster")]
fn compare_readable(reference: &Path, target: &Path) -> Comparison {
    let reference = match image::open(reference) {
        Ok(img) => img,
        Err(err) => return Comparison::unknown(format!("cannot decode reference image: {err}")),
    };
    let target = match image::open(target) {
        Ok(img) => img,
        Err(err) => return Comparison::unknown(format!("cannot decode target image: {err}")),
    };
    compare_images(&reference, &target)
}

/// Compare two decoded images.
#[cfg(feature = "raster")]
#[must_use]
pub fn compare_images(reference: &image::DynamicImage, target: &image::DynamicImage) -> Comparison {
    let reference = reference.to_rgba8();
    let mut target = target.to_rgba8();

    if target.dimensions() != reference.dimensions() {
        let (w, h) = reference.dimensions();
        target = image::imageops::resize(&target, w, h, image::imageops::FilterType::Triangle);
    }

    let score = similarity(reference.as_raw(), target.as_raw());
    from_score(score)
}

/// Similarity between two equally sized raw channel buffers:
/// `1 - mean_squared_error / 255²`.
///
/// Not re-clamped — the threshold check, not the score, decides equivalence.
#[cfg(feature = "raster")]
fn similarity(reference: &[u8], target: &[u8]) -> f64 {
    debug_assert_eq!(reference.len(), target.len());
    if reference.is_empty() {
        return 1.0;
    }
    let sum_sq: f64 = reference
        .iter()
        .zip(target.iter())
        .map(|(&a, &b)| {
            let diff = f64::from(a) - f64::from(b);
            diff * diff
        })
        .sum();
    let mse = sum_sq / reference.len() as f64;
    1.0 - mse / (255.0 * 255.0)
}

#[cfg_attr(not(feature = "raster"), allow(dead_code))]
fn from_score(score: f64) -> Comparison {
    if score > SIMILARITY_THRESHOLD {
        Comparison {
            verdict: Verdict::Match,
            score: Some(score),
            message: format!("screenshots are visually similar ({:.2}% match)", score * 100.0),
        }
    } else {
        Comparison {
            verdict: Verdict::Mismatch,
            score: Some(score),
            message: format!(
                "screenshots differ significantly ({:.2}% match)",
                score * 100.0
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_yield_unknown() {
        let result = compare_files(Path::new("no/such/a.png"), Path::new("no/such/b.png"));
        assert_eq!(result.verdict, Verdict::Unknown);
        assert!(result.score.is_none());
        assert!(result.message.contains("missing"));
    }

    #[test]
    fn test_threshold_is_strict_greater_than() {
        assert_eq!(from_score(SIMILARITY_THRESHOLD).verdict, Verdict::Mismatch);
        assert_eq!(from_score(0.951).verdict, Verdict::Match);
    }

    #[test]
    fn test_negative_score_is_a_mismatch_not_an_error() {
        let result = from_score(-0.2);
        assert_eq!(result.verdict, Verdict::Mismatch);
        assert_eq!(result.score, Some(-0.2));
    }

    #[cfg(feature = "raster")]
    mod raster {
        use super::*;
        use image::{DynamicImage, Rgba, RgbaImage};

        fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
        }

        #[test]
        fn test_identical_image_scores_exactly_one() {
            let img = solid(16, 16, [10, 200, 30, 255]);
            let result = compare_images(&img, &img);
            assert_eq!(result.score, Some(1.0));
            assert_eq!(result.verdict, Verdict::Match);
        }

        #[test]
        fn test_opposite_images_mismatch() {
            let black = solid(16, 16, [0, 0, 0, 255]);
            let white = solid(16, 16, [255, 255, 255, 255]);
            let result = compare_images(&black, &white);
            assert_eq!(result.verdict, Verdict::Mismatch);
            let score = result.score.expect("score computed");
            assert!(score < 0.5, "three of four channels fully differ: {score}");
        }

        #[test]
        fn test_dimension_mismatch_resamples_instead_of_failing() {
            let small = solid(8, 8, [40, 40, 40, 255]);
            let large = solid(32, 16, [40, 40, 40, 255]);
            let result = compare_images(&large, &small);
            assert_eq!(result.verdict, Verdict::Match);
            let score = result.score.expect("score computed");
            assert!(score > 0.99, "solid resample should stay solid: {score}");
        }

        #[test]
        fn test_near_identical_passes_threshold() {
            let a = solid(16, 16, [100, 100, 100, 255]);
            let b = solid(16, 16, [103, 100, 100, 255]);
            let result = compare_images(&a, &b);
            assert_eq!(result.verdict, Verdict::Match);
        }

        #[test]
        fn test_compare_files_roundtrip_through_disk() {
            let dir = tempfile::TempDir::new().expect("tempdir");
            let a = dir.path().join("a.png");
            let b = dir.path().join("b.png");
            solid(4, 4, [1, 2, 3, 255]).save(&a).expect("save a");
            solid(4, 4, [1, 2, 3, 255]).save(&b).expect("save b");

            let result = compare_files(&a, &b);
            assert_eq!(result.verdict, Verdict::Match);
            assert_eq!(result.score, Some(1.0));
        }
    }
}
