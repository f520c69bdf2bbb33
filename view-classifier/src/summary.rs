use crate::types::EvaluationResult;
use crate::utils::format_accuracy;
use std::fmt;

pub const MAX_FAILURES_TO_SHOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetStats {
    pub dataset: String,
    pub correct: usize,
    pub total: usize,
}

impl DatasetStats {
    pub fn accuracy(&self) -> String {
        format_accuracy(self.correct, self.total)
    }
}

/// Aggregate view over every result recorded during a run.
#[derive(Debug, Clone, Default)]
pub struct EvaluationSummary {
    results: Vec<EvaluationResult>,
}

impl EvaluationSummary {
    pub fn new(results: Vec<EvaluationResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn correct(&self) -> usize {
        self.results.iter().filter(|r| r.is_correct).count()
    }

    pub fn incorrect(&self) -> usize {
        self.total() - self.correct()
    }

    pub fn accuracy(&self) -> String {
        format_accuracy(self.correct(), self.total())
    }

    /// Stats grouped by the dataset recorded on each result, in first-seen order.
    pub fn per_dataset(&self) -> Vec<DatasetStats> {
        let mut stats: Vec<DatasetStats> = Vec::new();
        for result in &self.results {
            let index = match stats.iter().position(|s| s.dataset == result.dataset) {
                Some(index) => index,
                None => {
                    stats.push(DatasetStats {
                        dataset: result.dataset.clone(),
                        correct: 0,
                        total: 0,
                    });
                    stats.len() - 1
                }
            };
            stats[index].total += 1;
            if result.is_correct {
                stats[index].correct += 1;
            }
        }
        stats
    }

    /// Incorrect results, including the ones that failed with an error.
    pub fn failures(&self) -> Vec<&EvaluationResult> {
        self.results.iter().filter(|r| !r.is_correct).collect()
    }
}

impl fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Overall Summary ===")?;
        writeln!(f, "Total images: {}", self.total())?;
        writeln!(f, "Correct: {}", self.correct())?;
        writeln!(f, "Incorrect: {}", self.incorrect())?;
        writeln!(f, "Accuracy: {}%", self.accuracy())?;

        writeln!(f)?;
        writeln!(f, "Per dataset:")?;
        for stats in self.per_dataset() {
            writeln!(
                f,
                "- {}: {}/{} correct ({}%)",
                stats.dataset,
                stats.correct,
                stats.total,
                stats.accuracy()
            )?;
        }

        let failures = self.failures();
        if !failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Incorrect predictions:")?;
            for failure in failures.iter().take(MAX_FAILURES_TO_SHOW) {
                let predicted = failure.prediction.map(|p| p.as_str()).unwrap_or("N/A");
                write!(f, "- {}/{}: predicted {}", failure.dataset, failure.file_name, predicted)?;
                if let Some(error) = &failure.error {
                    write!(f, " (error: {})", error)?;
                }
                writeln!(f)?;
            }
            if failures.len() > MAX_FAILURES_TO_SHOW {
                writeln!(f, "...and {} more", failures.len() - MAX_FAILURES_TO_SHOW)?;
            }
        }
        Ok(())
    }
}
