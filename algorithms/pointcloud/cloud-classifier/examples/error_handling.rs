//! Example demonstrating error handling with the cloud classifier.
//!
//! Every failure of the classifier is a `Result`, so a host can turn it into
//! a message for the user ("draw a longer gesture") instead of crashing.

use cloud_classifier::{ClassifyError, CloudClassifier};
use cloud_normalize::NormalizeError;
use pcloud_helpers::{Gesture, L2Dist};

fn main() {
    println!("Cloud Classifier Error Handling Examples");
    println!("========================================");

    // Example 1: Handle an unlabeled template
    println!("\n1. Handling a template without a label:");
    let templates = vec![
        Gesture::from_xy("line", &[(0.0, 0.0), (100.0, 0.0)]),
        Gesture::from_xy("", &[(0.0, 0.0), (50.0, 100.0), (100.0, 0.0)]),
    ];
    match CloudClassifier::with_templates(&templates) {
        Ok(_) => println!("   Classifier created successfully"),
        Err(e @ ClassifyError::UnlabeledTemplate { .. }) => {
            println!("   ✓ Caught expected error: {}", e)
        }
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 2: Handle an empty training set
    println!("\n2. Handling an empty training set:");
    match CloudClassifier::<f64, L2Dist>::with_templates(&[]) {
        Ok(classifier) => {
            println!("   Classifier created with empty training set");
            let candidate = Gesture::from_xy("", &[(0.0, 0.0), (10.0, 10.0)]);
            match classifier.classify(&candidate) {
                Ok(result) => println!("   Predicted label: {}", result.label),
                Err(ClassifyError::EmptyTrainingSet) => {
                    println!("   ✓ Caught expected error: {}", ClassifyError::EmptyTrainingSet)
                }
                Err(e) => println!("   ✗ Unexpected error: {}", e),
            }
        }
        Err(e) => println!("   Error creating classifier: {}", e),
    }

    // Example 3: A candidate too short to define a path
    println!("\n3. Handling a single-point candidate:");
    let classifier = match CloudClassifier::with_templates(&templates[..1]) {
        Ok(classifier) => classifier,
        Err(e) => {
            println!("   ✗ Failed to create classifier: {}", e);
            return;
        }
    };
    let dot = Gesture::from_xy("", &[(3.0, 4.0)]);
    match classifier.classify(&dot) {
        Ok(result) => println!("   Predicted label: {}", result.label),
        Err(ClassifyError::Normalize(NormalizeError::InsufficientData { points })) => {
            println!("   ✓ Draw a longer gesture ({} point given)", points)
        }
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 4: Demonstrate error propagation in a function
    println!("\n4. Error propagation in functions:");

    fn classify_with_error_handling() -> Result<String, ClassifyError> {
        let templates = vec![
            Gesture::from_xy("horizontal", &[(0.0, 0.0), (1.0, 0.0)]),
            Gesture::from_xy("vertical", &[(0.0, 0.0), (0.0, 1.0)]),
        ];
        let classifier = CloudClassifier::with_templates(&templates)?;
        let candidate = Gesture::from_xy("", &[(2.0, 5.0), (2.2, 9.0)]);
        let result = classifier.classify(&candidate)?;
        Ok(format!("{} ({:.2})", result.label, result.score))
    }

    match classify_with_error_handling() {
        Ok(result) => println!("   ✓ Classification result: {}", result),
        Err(e) => println!("   ✗ Classification failed: {}", e),
    }

    println!("\nAll examples completed successfully!");
}
