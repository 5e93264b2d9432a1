//! Resolution of ranked predictions into a presentable record.
//!
//! Resolution never fails: a non-empty prediction list always yields either a
//! catalog record or a synthesized one.

use crate::catalog;
use uuid::Uuid;
use xray_lens_types::{CatalogRecord, ComponentRecord, Prediction, SYNTHESIZED_ID_PREFIX};

/// Predictions below this confidence are not considered for catalog matches
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.03;

const FALLBACK_NAME: &str = "Unknown Object";

#[derive(Debug, Clone)]
pub struct Resolver {
    min_confidence: f32,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONFIDENCE)
    }
}

impl Resolver {
    pub fn new(min_confidence: f32) -> Self {
        Self {
            min_confidence: min_confidence.clamp(0.0, 1.0),
        }
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Map ranked predictions to a record.
    ///
    /// The list is expected highest-confidence first. The first prediction
    /// (in rank order) that matches a keyword group decides the record;
    /// below-threshold and NaN predictions are skipped without ending the scan.
    /// Returns `None` only for an empty list.
    pub fn resolve(&self, predictions: &[Prediction]) -> Option<CatalogRecord> {
        let first = predictions.first()?;
        let top = predictions
            .iter()
            .find(|p| p.confidence.is_finite())
            .unwrap_or(first);

        for prediction in predictions {
            if prediction.confidence.is_nan() || prediction.confidence < self.min_confidence {
                tracing::debug!(
                    label = %prediction.label,
                    confidence = prediction.confidence,
                    "Skipped prediction below confidence threshold"
                );
                continue;
            }

            if let Some(group) = catalog::match_keyword(&prediction.label) {
                if let Some(record) = catalog::lookup(group.key) {
                    tracing::debug!(
                        label = %prediction.label,
                        key = group.key,
                        "Matched prediction to catalog"
                    );
                    return Some(record.clone());
                }
            }
        }

        for (rank, p) in predictions.iter().take(3).enumerate() {
            tracing::info!(
                rank = rank + 1,
                label = %p.label,
                "No catalog match, top prediction {:.1}%",
                p.percent()
            );
        }
        tracing::warn!(label = %top.label, "Synthesizing record for unrecognized object");
        Some(synthesize(top))
    }
}

/// Fabricate a record for a label outside the catalog
pub fn synthesize(prediction: &Prediction) -> CatalogRecord {
    let name = display_name(&prediction.label);
    let description = format!(
        "Recognized as \"{}\" with {:.1}% confidence. This object is not in the catalog, so its internal layout is a best guess.",
        prediction.label.trim(),
        prediction.percent()
    );

    CatalogRecord::new(
        format!("{}{}", SYNTHESIZED_ID_PREFIX, Uuid::new_v4().simple()),
        name.clone(),
        description,
        vec![
            ComponentRecord::new(
                "1",
                "External Chassis",
                format!("Outer shell of the {}.", name),
                (50.0, 15.0),
            ),
            ComponentRecord::new(
                "2",
                "Primary Mass",
                "Where most of the internal material is likely concentrated.",
                (50.0, 50.0),
            ),
            ComponentRecord::new(
                "3",
                "Base Structure",
                "Supports the object and keeps it stable.",
                (50.0, 85.0),
            ),
        ],
    )
}

/// First comma-separated alias, underscores as spaces, each word title-cased
pub fn display_name(label: &str) -> String {
    let alias = label.split(',').next().unwrap_or(label).replace('_', " ");
    let words: Vec<String> = alias
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xray_lens_types::Position;

    fn preds(items: &[(&str, f32)]) -> Vec<Prediction> {
        items.iter().map(|(l, c)| Prediction::new(*l, *c)).collect()
    }

    #[test]
    fn test_empty_list_is_unresolved() {
        assert!(Resolver::default().resolve(&[]).is_none());
    }

    #[test]
    fn test_first_match_in_rank_order() {
        let record = Resolver::default()
            .resolve(&preds(&[("misc", 0.9), ("mouse", 0.5)]))
            .unwrap();
        assert_eq!(record.id, "mouse");
    }

    #[test]
    fn test_rank_beats_keyword_group_priority() {
        // "watch" is the last group, "mouse" the first; rank still decides
        let record = Resolver::default()
            .resolve(&preds(&[("digital watch", 0.6), ("mouse", 0.3)]))
            .unwrap();
        assert_eq!(record.id, "watch");
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let record = Resolver::default()
            .resolve(&preds(&[("Computer_Keyboard", 0.8)]))
            .unwrap();
        assert_eq!(record.id, "keyboard");
        assert!(!record.components.is_empty());
    }

    #[test]
    fn test_below_threshold_is_skipped_but_scan_continues() {
        let record = Resolver::default()
            .resolve(&preds(&[("mouse", 0.02), ("coffee mug", 0.01), ("iPhone", 0.05)]))
            .unwrap();
        assert_eq!(record.id, "phone");
    }

    #[test]
    fn test_below_threshold_only_falls_back_to_top_prediction() {
        let record = Resolver::default()
            .resolve(&preds(&[("mouse", 0.02)]))
            .unwrap();
        assert!(record.is_synthesized());
        assert_eq!(record.name, "Mouse");
    }

    #[test]
    fn test_nan_confidence_never_matches() {
        let record = Resolver::new(0.0)
            .resolve(&preds(&[("mouse", f32::NAN), ("coffee mug", 0.4)]))
            .unwrap();
        assert_eq!(record.id, "cup");
    }

    #[test]
    fn test_nan_top_prediction_is_not_used_for_synthesis() {
        let record = Resolver::default()
            .resolve(&preds(&[("mouse", f32::NAN), ("space shuttle", 0.6)]))
            .unwrap();
        assert!(record.is_synthesized());
        assert_eq!(record.name, "Space Shuttle");
        assert!(record.description.contains("60.0%"));
    }

    #[test]
    fn test_zero_threshold_considers_everything() {
        let record = Resolver::new(0.0)
            .resolve(&preds(&[("misc", 0.5), ("mouse", 0.0)]))
            .unwrap();
        assert_eq!(record.id, "mouse");
    }

    #[test]
    fn test_synthesized_record_shape() {
        let record = Resolver::default()
            .resolve(&preds(&[("space shuttle", 0.85), ("airliner", 0.1)]))
            .unwrap();
        assert!(record.id.contains("dynamic"));
        assert!(record.name.contains("Space Shuttle"));
        assert!(record.description.contains("space shuttle"));
        assert!(record.description.contains("85.0%"));

        let names: Vec<_> = record.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["External Chassis", "Primary Mass", "Base Structure"]);
        let positions: Vec<_> = record.components.iter().map(|c| c.position).collect();
        assert_eq!(
            positions,
            [
                Position::new(50.0, 15.0),
                Position::new(50.0, 50.0),
                Position::new(50.0, 85.0)
            ]
        );
    }

    #[test]
    fn test_synthesized_ids_are_fresh() {
        let p = Prediction::new("space shuttle", 0.85);
        assert_ne!(synthesize(&p).id, synthesize(&p).id);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("space shuttle"), "Space Shuttle");
        assert_eq!(display_name("great white shark, white shark, man-eater"), "Great White Shark");
        assert_eq!(display_name("  tree_frog "), "Tree Frog");
        assert_eq!(display_name("CD player"), "CD Player");
        assert_eq!(display_name(" , "), "Unknown Object");
    }
}
