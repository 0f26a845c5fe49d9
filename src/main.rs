// A small demo: draws a few templates, then classifies some candidates.
use pcloud::{ClassifyError, CloudClassifier, Gesture, GestureBuilder};
use std::f64::consts::PI;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn circle(label: &str, points: usize, radius: f64) -> Gesture<f64> {
    let mut builder = GestureBuilder::new();
    builder.begin_stroke();
    for i in 0..=points {
        let a = 2.0 * PI * i as f64 / points as f64;
        builder.push(radius * a.cos(), radius * a.sin());
    }
    builder.finish(label)
}

fn cross(label: &str) -> Gesture<f64> {
    let mut builder = GestureBuilder::new();
    builder.begin_stroke();
    builder.push(0.0, 0.0);
    builder.push(100.0, 100.0);
    builder.begin_stroke();
    builder.push(100.0, 0.0);
    builder.push(0.0, 100.0);
    builder.finish(label)
}

fn main() -> Result<(), ClassifyError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let drawn = vec![
        circle("circle", 16, 50.0),
        Gesture::from_xy("line", &[(0.0, 0.0), (100.0, 0.0)]),
        Gesture::from_xy("vee", &[(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)]),
        cross("cross"),
        // a stray click, too short to be a template
        Gesture::from_xy("dot", &[(10.0, 10.0)]),
    ];

    let mut classifier = CloudClassifier::with_templates(&[])?;
    for gesture in &drawn {
        if let Err(e) = classifier.add_template(gesture) {
            warn!(label = gesture.label(), error = %e, "skipping template");
        }
    }
    info!(templates = classifier.len(), labels = ?classifier.labels(), "training set ready");

    let candidates = vec![
        circle("", 10, 20.0),
        Gesture::from_xy("", &[(5.0, 5.0), (60.0, 8.0)]),
        cross(""),
    ];
    for candidate in &candidates {
        match classifier.classify(candidate) {
            Ok(result) => info!(
                label = %result.label,
                score = ?result.score,
                points = candidate.len(),
                "recognized gesture"
            ),
            Err(e) => warn!(error = %e, "could not classify gesture"),
        }
    }

    let ranked = classifier.classify_ranked(&candidates[0], 3)?;
    for (rank, m) in ranked.iter().enumerate() {
        info!(rank = rank + 1, label = %m.label, score = ?m.score, "ranking");
    }
    Ok(())
}
