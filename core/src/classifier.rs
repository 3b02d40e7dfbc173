//! Result classifier
//!
//! Splits the judge's per-metric results into passing and failing groups for
//! reporting.

use crate::model::status::AnalysisResult;

/// The only classification label counted as a pass (exact, case-sensitive)
pub const PASS_LABEL: &str = "Pass";

/// Passing and failing results, each in input order
#[derive(Debug, Default, PartialEq)]
pub struct Partition<'a> {
    pub passing: Vec<&'a AnalysisResult>,
    pub failing: Vec<&'a AnalysisResult>,
}

impl Partition<'_> {
    pub fn len(&self) -> usize {
        self.passing.len() + self.failing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalysisResult {
    /// Whether the judge classified this metric as a pass
    pub fn is_pass(&self) -> bool {
        self.classification.as_deref() == Some(PASS_LABEL)
    }
}

/// Partition results by classification label
///
/// Labels other than `"Pass"`, including absent ones, land in `failing`.
pub fn partition(results: &[AnalysisResult]) -> Partition<'_> {
    let (passing, failing) = results.iter().partition(|r| r.is_pass());
    Partition { passing, failing }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, label: Option<&str>) -> AnalysisResult {
        AnalysisResult {
            name: name.to_string(),
            classification: label.map(str::to_string),
            ..AnalysisResult::default()
        }
    }

    fn names(results: &[&AnalysisResult]) -> Vec<String> {
        results.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_partition_preserves_order() {
        let results = vec![
            result("a", Some("Pass")),
            result("b", Some("High")),
            result("c", Some("Pass")),
            result("d", Some("Low")),
            result("e", Some("Pass")),
        ];
        let split = partition(&results);
        assert_eq!(names(&split.passing), vec!["a", "c", "e"]);
        assert_eq!(names(&split.failing), vec!["b", "d"]);
        assert_eq!(split.len(), results.len());
    }

    #[test]
    fn test_label_match_is_exact() {
        let results = vec![
            result("lower", Some("pass")),
            result("upper", Some("PASS")),
            result("padded", Some(" Pass")),
            result("missing", None),
            result("nodata", Some("Nodata")),
        ];
        let split = partition(&results);
        assert!(split.passing.is_empty());
        assert_eq!(split.failing.len(), 5);
    }

    #[test]
    fn test_partition_empty() {
        let split = partition(&[]);
        assert!(split.is_empty());
        assert_eq!(split, Partition::default());
    }

    #[test]
    fn test_partition_is_exhaustive() {
        let labels = [Some("Pass"), Some("Fail"), None, Some("Error"), Some("Pass")];
        for n in 0..=labels.len() {
            let results: Vec<_> = labels[..n]
                .iter()
                .enumerate()
                .map(|(i, l)| result(&i.to_string(), *l))
                .collect();
            let split = partition(&results);
            assert_eq!(split.passing.len() + split.failing.len(), results.len());
            assert!(split.passing.iter().all(|r| r.is_pass()));
            assert!(split.failing.iter().all(|r| !r.is_pass()));
        }
    }
}
