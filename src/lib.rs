//! Point-cloud gesture recognition.
//!
//! A drawn gesture is resampled, centered and scaled into a cloud of a fixed
//! number of points, then compared against labeled templates by matching
//! points between clouds. The closest template names the gesture.
//!
//! ```
//! use pcloud::{Gesture, classify};
//!
//! let templates = vec![
//!     Gesture::from_xy("horizontal", &[(0.0, 0.0), (10.0, 0.0)]),
//!     Gesture::from_xy("vertical", &[(0.0, 0.0), (0.0, 10.0)]),
//! ];
//! let candidate = Gesture::from_xy("", &[(5.0, 2.0), (5.0, 40.0)]);
//! let result = classify(&candidate, &templates).unwrap();
//! assert_eq!(result.label, "vertical");
//! ```

pub use cloud_classifier::{ClassifierConfig, ClassifyError, CloudClassifier, Match, Template};
pub use cloud_match::{CloudMatcher, MatchError, MatchStrategy};
pub use cloud_normalize::{NormalizationConfig, NormalizeError, Normalizer, resample};
pub use pcloud_helpers::{Distance, Float, Gesture, GestureBuilder, L1Dist, L2Dist, TracePoint};

/// Normalizes a single gesture under `config`.
///
/// # Errors
///
/// Returns a `NormalizeError` if the configuration is invalid or the gesture
/// has fewer than 2 points or a non-finite coordinate.
pub fn normalize<F: Float>(
    gesture: &Gesture<F>,
    config: &NormalizationConfig<F>,
) -> Result<Gesture<F>, NormalizeError> {
    Normalizer::new(config.clone())?.normalize(gesture)
}

/// Classifies `candidate` against `templates` with the default configuration
/// and Euclidean point distance.
///
/// The templates are normalized for this call only; build a
/// [`CloudClassifier`] to classify many candidates against the same set.
pub fn classify<F: Float>(
    candidate: &Gesture<F>,
    templates: &[Gesture<F>],
) -> Result<Match<F>, ClassifyError> {
    CloudClassifier::with_templates(templates)?.classify(candidate)
}
