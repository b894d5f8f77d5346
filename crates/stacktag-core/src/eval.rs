//! Multi-label evaluation metrics.
//!
//! All ratios with an empty denominator are reported as 0.

use std::fmt;

use serde::Serialize;

use crate::error::{ModelError, ModelResult};
use crate::labels::MultiHot;

/// Labels shown in the text rendering of a report.
const DISPLAY_TOP_LABELS: usize = 10;

/// Precision, recall, and F1 for one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of samples that actually carry the label
    pub support: usize,
}

/// Aggregate metrics over a set of predicted and true label rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub labels: usize,
    /// Fraction of individual label slots predicted wrongly
    pub hamming_loss: f64,
    /// Fraction of samples whose whole label row matches exactly
    pub subset_accuracy: f64,
    /// Sample-averaged intersection over union
    pub jaccard: f64,
    pub micro_precision: f64,
    pub micro_recall: f64,
    pub micro_f1: f64,
    pub macro_f1: f64,
    pub per_label: Vec<LabelMetrics>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Compare predicted rows against true rows; labels are named by index.
pub fn report(predicted: &[MultiHot], actual: &[MultiHot]) -> ModelResult<EvaluationReport> {
    let width = actual.first().map(MultiHot::len).unwrap_or(0);
    let names: Vec<String> = (0..width).map(|i| i.to_string()).collect();
    report_named(predicted, actual, &names)
}

/// Compare predicted rows against true rows, naming labels from `classes`.
pub fn report_named(
    predicted: &[MultiHot],
    actual: &[MultiHot],
    classes: &[String],
) -> ModelResult<EvaluationReport> {
    if predicted.len() != actual.len() {
        return Err(ModelError::SampleMismatch {
            features: predicted.len(),
            labels: actual.len(),
        });
    }
    if actual.is_empty() {
        return Err(ModelError::EmptyInput("no samples to evaluate"));
    }
    let width = classes.len();
    for row in predicted.iter().chain(actual) {
        if row.len() != width {
            return Err(ModelError::DimensionMismatch {
                context: "evaluation",
                expected: width,
                actual: row.len(),
            });
        }
    }

    let mut counts = vec![Counts::default(); width];
    let mut wrong_slots = 0usize;
    let mut exact = 0usize;
    let mut jaccard_sum = 0.0;

    for (p, a) in predicted.iter().zip(actual) {
        let (mut inter, mut union, mut wrong) = (0usize, 0usize, 0usize);
        for (j, c) in counts.iter_mut().enumerate() {
            match (p.get(j), a.get(j)) {
                (true, true) => {
                    c.tp += 1;
                    inter += 1;
                    union += 1;
                }
                (true, false) => {
                    c.fp += 1;
                    union += 1;
                    wrong += 1;
                }
                (false, true) => {
                    c.fn_ += 1;
                    union += 1;
                    wrong += 1;
                }
                (false, false) => {}
            }
        }
        wrong_slots += wrong;
        if wrong == 0 {
            exact += 1;
        }
        jaccard_sum += ratio(inter, union);
    }

    let per_label: Vec<LabelMetrics> = counts
        .iter()
        .zip(classes)
        .map(|(c, name)| {
            let precision = ratio(c.tp, c.tp + c.fp);
            let recall = ratio(c.tp, c.tp + c.fn_);
            LabelMetrics {
                label: name.clone(),
                precision,
                recall,
                f1: f1(precision, recall),
                support: c.tp + c.fn_,
            }
        })
        .collect();

    let total = counts.iter().fold(Counts::default(), |acc, c| Counts {
        tp: acc.tp + c.tp,
        fp: acc.fp + c.fp,
        fn_: acc.fn_ + c.fn_,
    });
    let micro_precision = ratio(total.tp, total.tp + total.fp);
    let micro_recall = ratio(total.tp, total.tp + total.fn_);
    let macro_f1 = if per_label.is_empty() {
        0.0
    } else {
        per_label.iter().map(|m| m.f1).sum::<f64>() / per_label.len() as f64
    };

    let n = actual.len();
    Ok(EvaluationReport {
        samples: n,
        labels: width,
        hamming_loss: ratio(wrong_slots, n * width),
        subset_accuracy: ratio(exact, n),
        jaccard: jaccard_sum / n as f64,
        micro_precision,
        micro_recall,
        micro_f1: f1(micro_precision, micro_recall),
        macro_f1,
        per_label,
    })
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Samples: {}  Labels: {}", self.samples, self.labels)?;
        writeln!(f, "  Hamming loss:     {:.4}", self.hamming_loss)?;
        writeln!(f, "  Subset accuracy:  {:.4}", self.subset_accuracy)?;
        writeln!(f, "  Jaccard:          {:.4}", self.jaccard)?;
        writeln!(
            f,
            "  Micro P / R / F1: {:.4} / {:.4} / {:.4}",
            self.micro_precision, self.micro_recall, self.micro_f1
        )?;
        writeln!(f, "  Macro F1:         {:.4}", self.macro_f1)?;

        let mut by_support: Vec<&LabelMetrics> =
            self.per_label.iter().filter(|m| m.support > 0).collect();
        by_support.sort_by(|a, b| b.support.cmp(&a.support).then_with(|| a.label.cmp(&b.label)));
        if by_support.is_empty() {
            return Ok(());
        }

        writeln!(f, "Top labels by support:")?;
        let width = by_support
            .iter()
            .take(DISPLAY_TOP_LABELS)
            .map(|m| m.label.len())
            .max()
            .unwrap_or(0);
        for m in by_support.iter().take(DISPLAY_TOP_LABELS) {
            writeln!(
                f,
                "  {:<width$}  support {:>5}  P {:.3}  R {:.3}  F1 {:.3}",
                m.label,
                m.support,
                m.precision,
                m.recall,
                m.f1,
                width = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(bits: &[&[bool]]) -> Vec<MultiHot> {
        bits.iter().map(|r| MultiHot::from(r.to_vec())).collect()
    }

    #[test]
    fn test_perfect_prediction() {
        let actual = rows(&[&[true, false, true], &[false, true, false]]);
        let r = report(&actual, &actual).unwrap();
        assert_eq!(r.hamming_loss, 0.0);
        assert_eq!(r.subset_accuracy, 1.0);
        assert_eq!(r.jaccard, 1.0);
        assert_eq!(r.micro_f1, 1.0);
        assert_eq!(r.macro_f1, 1.0);
    }

    #[test]
    fn test_partial_prediction() {
        let actual = rows(&[&[true, true], &[false, true]]);
        let predicted = rows(&[&[true, false], &[false, true]]);
        let r = report(&predicted, &actual).unwrap();

        assert!((r.hamming_loss - 0.25).abs() < 1e-12);
        assert!((r.subset_accuracy - 0.5).abs() < 1e-12);
        // sample jaccard: 1/2 and 1/1
        assert!((r.jaccard - 0.75).abs() < 1e-12);
        // tp 2, fp 0, fn 1
        assert!((r.micro_precision - 1.0).abs() < 1e-12);
        assert!((r.micro_recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((r.micro_f1 - 0.8).abs() < 1e-12);

        assert_eq!(r.per_label[0].support, 1);
        assert_eq!(r.per_label[1].support, 2);
        assert!((r.per_label[1].recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_yields_zero() {
        let actual = rows(&[&[false, false]]);
        let r = report(&actual, &actual).unwrap();
        assert_eq!(r.micro_precision, 0.0);
        assert_eq!(r.micro_f1, 0.0);
        assert_eq!(r.jaccard, 0.0);
        assert_eq!(r.subset_accuracy, 1.0);
    }

    #[test]
    fn test_mismatches_are_rejected() {
        let actual = rows(&[&[true, false]]);
        assert!(matches!(
            report(&rows(&[&[true, false], &[true, false]]), &actual),
            Err(ModelError::SampleMismatch { .. })
        ));
        assert!(matches!(
            report(&rows(&[&[true]]), &actual),
            Err(ModelError::DimensionMismatch { .. })
        ));
        assert!(matches!(report(&[], &[]), Err(ModelError::EmptyInput(_))));
    }

    #[test]
    fn test_display_names_labels() {
        let actual = rows(&[&[true, false], &[true, true]]);
        let classes = vec!["python".to_string(), "flask".to_string()];
        let r = report_named(&actual, &actual, &classes).unwrap();
        let text = r.to_string();
        assert!(text.contains("Hamming loss"));
        assert!(text.contains("python"));
        assert!(text.contains("flask"));
    }

    #[test]
    fn test_serializes_to_json() {
        let actual = rows(&[&[true]]);
        let json = serde_json::to_string(&report(&actual, &actual).unwrap()).unwrap();
        assert!(json.contains("\"hamming_loss\":0.0"));
        assert!(json.contains("\"per_label\""));
    }
}
