// These are the core components from the shared helper crate.
use pcloud_helpers::{Distance, Float, Gesture, L2Dist};

use cloud_match::{CloudMatcher, MatchError, MatchStrategy};
use cloud_normalize::{NormalizationConfig, NormalizeError, Normalizer};
use ndarray::{Array2, ArrayView2};
use thiserror::Error;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod ranking;

use ranking::MatchCollector;

/// Errors that can occur when using the cloud classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    /// Cannot classify with an empty training set
    #[error("cannot classify with an empty training set")]
    EmptyTrainingSet,
    /// Templates must carry a non-empty label
    #[error("template {index} has an empty label")]
    UnlabeledTemplate { index: usize },
    /// A ranking needs room for at least one match
    #[error("ranking limit must be at least 1")]
    InvalidLimit,
    #[error("max distance must be positive and finite")]
    InvalidMaxDistance,
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Scoring and matching parameters of the classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ClassifierConfig<F>
where
    F: Float,
{
    /// Cloud distance at and beyond which the score drops to 0.
    pub max_distance: F,
    pub strategy: MatchStrategy<F>,
}

impl<F> Default for ClassifierConfig<F>
where
    F: Float,
{
    fn default() -> Self {
        ClassifierConfig {
            // half the default reference box edge
            max_distance: F::from_f64_lossy(0.5),
            strategy: MatchStrategy::Greedy,
        }
    }
}

impl<F> ClassifierConfig<F>
where
    F: Float,
{
    pub fn with_max_distance(mut self, max_distance: F) -> Self {
        self.max_distance = max_distance;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy<F>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        if !self.max_distance.is_finite() || self.max_distance <= F::zero() {
            return Err(ClassifyError::InvalidMaxDistance);
        }
        Ok(())
    }
}

/// Outcome of a classification.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Match<F>
where
    F: Float,
{
    /// Label of the winning template.
    pub label: String,
    /// Confidence in `[0, 1]`; 1 is a perfect match.
    pub score: F,
    /// Raw cloud distance to the winning template.
    pub distance: F,
}

/// A labeled exemplar, normalized once when it is added.
#[derive(Debug, Clone, PartialEq)]
pub struct Template<F>
where
    F: Float,
{
    gesture: Gesture<F>,
    cloud: Array2<F>,
}

impl<F> Template<F>
where
    F: Float,
{
    pub fn label(&self) -> &str {
        self.gesture.label()
    }

    /// The normalized gesture.
    pub fn gesture(&self) -> &Gesture<F> {
        &self.gesture
    }

    pub fn cloud(&self) -> ArrayView2<F> {
        self.cloud.view()
    }
}

/// A nearest-neighbor gesture classifier over normalized point clouds.
///
/// Templates are normalized once, when the classifier is built or a template
/// is added; a query only pays for normalizing the candidate and for one
/// cloud match per template.
///
/// # Type Parameters
///
/// * `F`: The float type for the coordinates (e.g., `f32`, `f64`).
/// * `D`: The point metric, which must implement the `pcloud_helpers::Distance` trait.
#[derive(Debug, Clone)]
pub struct CloudClassifier<F, D>
where
    F: Float,
    D: Distance<F>,
{
    normalizer: Normalizer<F>,
    matcher: CloudMatcher<F, D>,
    config: ClassifierConfig<F>,
    templates: Vec<Template<F>>,
}

impl<F> CloudClassifier<F, L2Dist>
where
    F: Float,
{
    /// Creates a classifier with the default normalization and scoring and
    /// Euclidean point distance.
    pub fn with_templates(templates: &[Gesture<F>]) -> Result<Self, ClassifyError> {
        Self::new(
            templates,
            NormalizationConfig::default(),
            ClassifierConfig::default(),
            L2Dist,
        )
    }
}

impl<F, D> CloudClassifier<F, D>
where
    F: Float,
    D: Distance<F>,
{
    /// Creates a new classifier.
    ///
    /// # Arguments
    ///
    /// * `templates`: The labeled exemplars; several may share a label.
    /// * `normalization`: How candidates and templates are normalized.
    /// * `config`: Scoring and matching parameters.
    /// * `distance`: An instance of a struct that implements the `Distance` trait (e.g., `L2Dist`).
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::UnlabeledTemplate` if a template has an empty
    /// label, and propagates configuration and normalization errors. An empty
    /// training set is accepted; classification then fails.
    pub fn new(
        templates: &[Gesture<F>],
        normalization: NormalizationConfig<F>,
        config: ClassifierConfig<F>,
        distance: D,
    ) -> Result<Self, ClassifyError> {
        config.validate()?;
        let normalizer = Normalizer::new(normalization)?;
        let matcher = CloudMatcher::new(config.strategy, distance)?;
        let mut classifier = Self {
            normalizer,
            matcher,
            config,
            templates: Vec::with_capacity(templates.len()),
        };
        for gesture in templates {
            classifier.add_template(gesture)?;
        }
        debug!(
            templates = classifier.templates.len(),
            "built cloud classifier"
        );
        Ok(classifier)
    }

    /// Normalizes `gesture` and appends it to the training set.
    pub fn add_template(&mut self, gesture: &Gesture<F>) -> Result<(), ClassifyError> {
        if gesture.label().is_empty() {
            return Err(ClassifyError::UnlabeledTemplate {
                index: self.templates.len(),
            });
        }
        let normalized = self.normalizer.normalize(gesture)?;
        let cloud = normalized.coords();
        self.templates.push(Template {
            gesture: normalized,
            cloud,
        });
        Ok(())
    }

    pub fn templates(&self) -> &[Template<F>] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Distinct template labels in the order they were first added.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for t in &self.templates {
            if !labels.contains(&t.label()) {
                labels.push(t.label());
            }
        }
        labels
    }

    pub fn config(&self) -> &ClassifierConfig<F> {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer<F> {
        &self.normalizer
    }

    /// Classifies a candidate gesture.
    ///
    /// # Returns
    ///
    /// The label of the closest template and a score in `[0, 1]`. When
    /// several templates are equally close the first one added wins.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::EmptyTrainingSet` if there are no templates.
    /// Returns `ClassifyError::Normalize` if the candidate cannot be normalized
    /// (e.g., fewer than 2 points).
    pub fn classify(&self, candidate: &Gesture<F>) -> Result<Match<F>, ClassifyError> {
        if self.templates.is_empty() {
            return Err(ClassifyError::EmptyTrainingSet);
        }
        let distances = self.distances_to(candidate)?;

        let mut best_index = 0;
        let mut best_distance = F::infinity();
        for (i, &d) in distances.iter().enumerate() {
            if d < best_distance {
                best_distance = d;
                best_index = i;
            }
        }

        let result = Match {
            label: self.templates[best_index].label().to_string(),
            score: self.score(best_distance),
            distance: best_distance,
        };
        debug!(
            label = %result.label,
            distance = ?result.distance,
            score = ?result.score,
            "classified gesture"
        );
        Ok(result)
    }

    /// The best match of every label, best first, at most `limit` entries.
    ///
    /// # Errors
    ///
    /// Same as [`CloudClassifier::classify`], plus `ClassifyError::InvalidLimit`
    /// if `limit` is 0.
    pub fn classify_ranked(
        &self,
        candidate: &Gesture<F>,
        limit: usize,
    ) -> Result<Vec<Match<F>>, ClassifyError> {
        if limit == 0 {
            return Err(ClassifyError::InvalidLimit);
        }
        if self.templates.is_empty() {
            return Err(ClassifyError::EmptyTrainingSet);
        }
        let distances = self.distances_to(candidate)?;

        let mut collector = MatchCollector::new(limit);
        for (template, &distance) in self.templates.iter().zip(distances.iter()) {
            collector.file_match(Match {
                label: template.label().to_string(),
                score: self.score(distance),
                distance,
            });
        }
        Ok(collector.into_matches())
    }

    /// Maps a cloud distance into `[0, 1]`.
    pub fn score(&self, distance: F) -> F {
        (F::one() - distance / self.config.max_distance)
            .max(F::zero())
            .min(F::one())
    }

    /// Normalizes the candidate once and matches it against every template,
    /// in template order.
    fn distances_to(&self, candidate: &Gesture<F>) -> Result<Vec<F>, ClassifyError> {
        let normalized = self.normalizer.normalize(candidate)?;
        let cloud = normalized.coords();
        let distances = self.match_all(cloud.view())?;
        for (t, d) in self.templates.iter().zip(distances.iter()) {
            trace!(label = t.label(), distance = ?d, "template distance");
        }
        Ok(distances)
    }

    #[cfg(not(feature = "parallel"))]
    fn match_all(&self, cloud: ArrayView2<F>) -> Result<Vec<F>, MatchError> {
        self.templates
            .iter()
            .map(|t| self.matcher.distance(cloud, t.cloud()))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn match_all(&self, cloud: ArrayView2<F>) -> Result<Vec<F>, MatchError> {
        self.templates
            .par_iter()
            .map(|t| self.matcher.distance(cloud, t.cloud()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pcloud_helpers::{L1Dist, TracePoint};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::f64::consts::PI;

    fn circle(label: &str, n: usize, radius: f64) -> Gesture<f64> {
        let xy: Vec<(f64, f64)> = (0..=n)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / n as f64;
                (radius * a.cos(), radius * a.sin())
            })
            .collect();
        Gesture::from_xy(label, &xy)
    }

    fn line(label: &str) -> Gesture<f64> {
        Gesture::from_xy(label, &[(0.0, 0.0), (100.0, 0.0)])
    }

    fn vee(label: &str) -> Gesture<f64> {
        Gesture::from_xy(label, &[(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)])
    }

    fn cross(label: &str) -> Gesture<f64> {
        Gesture::new(
            label,
            vec![
                TracePoint::new(0.0, 0.0, 0),
                TracePoint::new(100.0, 100.0, 0),
                TracePoint::new(100.0, 0.0, 1),
                TracePoint::new(0.0, 100.0, 1),
            ],
        )
    }

    fn training_set() -> Vec<Gesture<f64>> {
        vec![circle("circle", 16, 50.0), line("line"), vee("v"), cross("x")]
    }

    fn jittered(g: &Gesture<f64>, seed: u64, amount: f64) -> Gesture<f64> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let points = g
            .points()
            .iter()
            .map(|p| {
                TracePoint::new(
                    p.x + rng.random_range(-amount..amount),
                    p.y + rng.random_range(-amount..amount),
                    p.stroke_id,
                )
            })
            .collect();
        Gesture::unlabeled(points)
    }

    #[test]
    fn test_classification_simple() {
        let classifier = CloudClassifier::with_templates(&training_set()).unwrap();
        for (i, template) in training_set().iter().enumerate() {
            let candidate = jittered(template, i as u64, 3.0);
            let result = classifier.classify(&candidate).unwrap();
            assert_eq!(result.label, template.label());
            assert!(result.score > 0.5, "{:?}", result);
        }
    }

    #[test]
    fn test_self_match() {
        let templates = training_set();
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        for t in &templates {
            let result = classifier.classify(t).unwrap();
            assert_eq!(result.label, t.label());
            assert!(result.score >= 0.95);
            assert_abs_diff_eq!(result.distance, 0.0);
            assert_abs_diff_eq!(result.score, 1.0);
        }
    }

    #[test]
    fn test_score_bounds() {
        let classifier = CloudClassifier::with_templates(&[line("line")]).unwrap();
        let far = circle("", 12, 10.0);
        let result = classifier.classify(&far).unwrap();
        assert!(result.score >= 0.0 && result.score <= 1.0);
        assert_eq!(classifier.score(0.0), 1.0);
        assert_eq!(classifier.score(0.5), 0.0);
        assert_eq!(classifier.score(3.0), 0.0);
        assert_abs_diff_eq!(classifier.score(0.25), 0.5);
        assert_abs_diff_eq!(classifier.score(0.1), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_error_on_empty_training_set() {
        let classifier = CloudClassifier::<f64, L2Dist>::with_templates(&[]).unwrap();
        assert!(classifier.is_empty());
        let result = classifier.classify(&line(""));
        assert!(matches!(result, Err(ClassifyError::EmptyTrainingSet)));
        let ranked = classifier.classify_ranked(&line(""), 3);
        assert!(matches!(ranked, Err(ClassifyError::EmptyTrainingSet)));
    }

    #[test]
    fn test_error_on_unlabeled_template() {
        let templates = vec![line("line"), vee("")];
        let result = CloudClassifier::with_templates(&templates);
        assert!(matches!(
            result,
            Err(ClassifyError::UnlabeledTemplate { index: 1 })
        ));
    }

    #[test]
    fn test_error_on_short_candidate() {
        let classifier = CloudClassifier::with_templates(&training_set()).unwrap();
        let dot = Gesture::from_xy("", &[(1.0, 1.0)]);
        assert_eq!(
            classifier.classify(&dot).unwrap_err(),
            ClassifyError::Normalize(NormalizeError::InsufficientData { points: 1 })
        );
    }

    #[test]
    fn test_ties_go_to_first_template() {
        let templates = vec![line("first"), line("second")];
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        let result = classifier.classify(&line("")).unwrap();
        assert_eq!(result.label, "first");
    }

    #[test]
    fn test_variants_of_a_label_are_independent() {
        let templates = vec![
            line("stroke"),
            circle("circle", 16, 50.0),
            Gesture::from_xy("stroke", &[(0.0, 0.0), (0.0, 100.0)]),
        ];
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        assert_eq!(classifier.len(), 3);
        assert_eq!(classifier.labels(), vec!["stroke", "circle"]);

        let vertical = Gesture::from_xy("", &[(5.0, 0.0), (5.0, 80.0)]);
        let result = classifier.classify(&vertical).unwrap();
        assert_eq!(result.label, "stroke");
        assert_abs_diff_eq!(result.distance, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_classification_does_not_mutate() {
        let templates = training_set();
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        let before = classifier.templates().to_vec();
        let candidate = jittered(&vee(""), 5, 2.0);
        let copy = candidate.clone();
        classifier.classify(&candidate).unwrap();
        classifier.classify_ranked(&candidate, 4).unwrap();
        assert_eq!(classifier.templates(), &before[..]);
        assert_eq!(candidate, copy);
        assert_eq!(templates, training_set());
    }

    #[test]
    fn test_ranked() {
        let mut templates = training_set();
        templates.push(circle("circle", 24, 20.0));
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        let candidate = jittered(&circle("", 16, 50.0), 9, 1.0);

        let ranked = classifier.classify_ranked(&candidate, 10).unwrap();
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[0].label, "circle");
        assert_eq!(ranked[0], classifier.classify(&candidate).unwrap());
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));

        let top2 = classifier.classify_ranked(&candidate, 2).unwrap();
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[..], ranked[..2]);

        assert!(matches!(
            classifier.classify_ranked(&candidate, 0),
            Err(ClassifyError::InvalidLimit)
        ));
    }

    #[test]
    fn test_add_template() {
        let mut classifier = CloudClassifier::with_templates(&[line("line")]).unwrap();
        classifier.add_template(&vee("v")).unwrap();
        assert_eq!(classifier.len(), 2);
        assert_eq!(classifier.templates()[1].cloud().dim(), (32, 2));
        assert_eq!(classifier.classify(&vee("")).unwrap().label, "v");
        assert!(matches!(
            classifier.add_template(&vee("")),
            Err(ClassifyError::UnlabeledTemplate { index: 2 })
        ));
    }

    #[test]
    fn test_all_strategies_and_metrics() {
        let strategies = vec![
            MatchStrategy::Greedy,
            MatchStrategy::Weighted { epsilon: 0.5 },
            MatchStrategy::Optimal,
        ];
        for strategy in strategies {
            let config = ClassifierConfig::default().with_strategy(strategy);
            let classifier = CloudClassifier::new(
                &training_set(),
                NormalizationConfig::default(),
                config.clone(),
                L2Dist,
            )
            .unwrap();
            let result = classifier.classify(&jittered(&cross(""), 3, 2.0)).unwrap();
            assert_eq!(result.label, "x", "{:?}", strategy);

            let manhattan = CloudClassifier::new(
                &training_set(),
                NormalizationConfig::default(),
                config,
                L1Dist,
            )
            .unwrap();
            let result = manhattan.classify(&jittered(&vee(""), 4, 2.0)).unwrap();
            assert_eq!(result.label, "v", "{:?}", strategy);
        }
    }

    #[test]
    fn test_invalid_config() {
        let bad = ClassifierConfig::default().with_max_distance(0.0);
        let result =
            CloudClassifier::new(&training_set(), NormalizationConfig::default(), bad, L2Dist);
        assert!(matches!(result, Err(ClassifyError::InvalidMaxDistance)));

        let bad_eps = ClassifierConfig::default().with_strategy(MatchStrategy::Weighted {
            epsilon: -0.1,
        });
        let result = CloudClassifier::new(
            &training_set(),
            NormalizationConfig::default(),
            bad_eps,
            L2Dist,
        );
        assert!(matches!(
            result,
            Err(ClassifyError::Match(MatchError::InvalidEpsilon))
        ));

        let bad_norm = NormalizationConfig::default().with_point_count(0);
        let result =
            CloudClassifier::new(&training_set(), bad_norm, ClassifierConfig::default(), L2Dist);
        assert!(matches!(
            result,
            Err(ClassifyError::Normalize(NormalizeError::InvalidPointCount(0)))
        ));
    }

    #[test]
    fn test_rotation_invariant_classification() {
        let normalization = NormalizationConfig::default().with_rotation_invariant(true);
        let classifier = CloudClassifier::new(
            &[vee("v"), line("line")],
            normalization,
            ClassifierConfig::default(),
            L2Dist,
        )
        .unwrap();
        // the same vee, turned upside down
        let flipped = Gesture::from_xy("", &[(100.0, 100.0), (50.0, 0.0), (0.0, 100.0)]);
        let result = classifier.classify(&flipped).unwrap();
        assert_eq!(result.label, "v");
        assert!(result.score > 0.95);
    }

    #[test]
    fn test_match_all_keeps_template_order() {
        let mut templates = training_set();
        templates.push(circle("circle", 24, 20.0));
        templates.push(Gesture::from_xy("line", &[(0.0, 0.0), (80.0, 10.0)]));
        let classifier = CloudClassifier::with_templates(&templates).unwrap();
        let candidate = jittered(&vee(""), 21, 4.0);

        let cloud = classifier.normalizer().normalize(&candidate).unwrap().coords();
        let serial: Vec<f64> = classifier
            .templates()
            .iter()
            .map(|t| classifier.matcher.distance(cloud.view(), t.cloud()).unwrap())
            .collect();
        assert_eq!(classifier.distances_to(&candidate).unwrap(), serial);

        let ranked = classifier.classify_ranked(&candidate, 10).unwrap();
        assert_eq!(ranked.len(), classifier.labels().len());
        for m in &ranked {
            let best = classifier
                .templates()
                .iter()
                .zip(serial.iter())
                .filter(|(t, _)| t.label() == m.label)
                .map(|(_, &d)| d)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(m.distance, best, "{}", m.label);
        }
        assert_eq!(ranked[0], classifier.classify(&candidate).unwrap());
    }
}
