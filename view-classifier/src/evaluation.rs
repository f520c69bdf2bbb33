use crate::classifier::Classifier;
use crate::dataset::load_urls;
use crate::summary::EvaluationSummary;
use crate::types::{ClassifierError, DatasetSpec, EvaluationResult, Result};
use crate::utils::url::file_name;
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Parses a user-supplied image limit. Only positive integers are accepted.
pub fn parse_image_limit(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ClassifierError::Config(format!(
            "Invalid image limit \"{}\". Please provide a positive integer.",
            input
        ))),
    }
}

/// Picks the effective image limit.
///
/// A limit given on the command line wins. Otherwise an `EVAL_IMAGE_LIMIT`
/// value is parsed strictly, except that an empty or blank value means no limit.
pub fn resolve_image_limit(cli_limit: Option<usize>, env_value: Option<&str>) -> Result<Option<usize>> {
    if cli_limit.is_some() {
        return Ok(cli_limit);
    }
    match env_value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_image_limit(raw).map(Some),
    }
}

/// Runs the classifier over every dataset in order and scores the predictions.
///
/// Processing is strictly sequential. A failed classification is recorded on
/// its result and the run moves on; a dataset that cannot be read aborts the run.
pub struct EvaluationHarness {
    classifier: Classifier,
    datasets: Vec<DatasetSpec>,
    limit: Option<usize>,
}

impl EvaluationHarness {
    pub fn new(classifier: Classifier, datasets: Vec<DatasetSpec>) -> Self {
        Self {
            classifier,
            datasets,
            limit: None,
        }
    }

    /// Caps the number of images processed across all datasets.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Evaluates everything, writing progress lines and the final summary to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<EvaluationSummary> {
        if let Some(limit) = self.limit {
            if limit == 0 {
                return Err(ClassifierError::Config("image limit must be positive".to_string()));
            }
            writeln!(out, "[info] Limiting evaluation to {} images total.", limit)?;
        }

        info!(
            "Evaluating {} datasets with {}",
            self.datasets.len(),
            self.classifier.adapter_name()
        );

        let mut results = Vec::new();
        let mut remaining = self.limit;

        for dataset in &self.datasets {
            if remaining == Some(0) {
                debug!("Image limit reached, skipping remaining datasets");
                break;
            }

            let processed = self.evaluate_dataset(dataset, remaining, &mut results, out).await?;
            if let Some(left) = remaining.as_mut() {
                *left = left.saturating_sub(processed);
            }
        }

        let summary = EvaluationSummary::new(results);
        if summary.is_empty() {
            writeln!(out, "No images were evaluated. Check your limit or dataset folders.")?;
        } else {
            writeln!(out)?;
            write!(out, "{}", summary)?;
        }
        out.flush()?;

        info!(
            "Evaluation finished: {}/{} correct ({}%)",
            summary.correct(),
            summary.total(),
            summary.accuracy()
        );
        Ok(summary)
    }

    async fn evaluate_dataset<W: Write>(
        &self,
        dataset: &DatasetSpec,
        max_images: Option<usize>,
        results: &mut Vec<EvaluationResult>,
        out: &mut W,
    ) -> Result<usize> {
        let urls = load_urls(dataset)?;
        info!("Loaded {} URLs for {} (id {})", urls.len(), dataset.label, dataset.id);

        if urls.is_empty() {
            warn!("No URLs found in {}", dataset.source.display());
            writeln!(out, "[warn] No URLs found in {}", dataset.source.display())?;
        }

        let mut processed = 0usize;
        for url in &urls {
            if max_images.is_some_and(|max| processed >= max) {
                break;
            }

            let result = self.evaluate_image(dataset, url).await;
            write_progress(out, &result)?;
            results.push(result);
            processed += 1;
        }

        Ok(processed)
    }

    async fn evaluate_image(&self, dataset: &DatasetSpec, url: &str) -> EvaluationResult {
        let file_name = file_name(url);

        let (prediction, error) = match self.classifier.classify(url, false).await {
            Ok(classification) => (classification.prediction, None),
            Err(e) => {
                error!("Classification failed for {}/{}: {}", dataset.label, file_name, e);
                (None, Some(e.to_string()))
            }
        };

        let is_correct = error.is_none() && prediction.is_some_and(|label| dataset.accepts(label));

        EvaluationResult {
            dataset: dataset.label.clone(),
            file_name,
            prediction,
            is_correct,
            error,
        }
    }
}

fn write_progress<W: Write>(out: &mut W, result: &EvaluationResult) -> Result<()> {
    match &result.error {
        Some(error) => writeln!(out, "[error] {}/{}: {}", result.dataset, result.file_name, error)?,
        None => {
            let status = if result.is_correct { '✓' } else { '✗' };
            let predicted = result.prediction.map(|p| p.as_str()).unwrap_or("N/A");
            writeln!(out, "[{}] {}/{} -> {}", status, result.dataset, result.file_name, predicted)?;
        }
    }
    // Progress must be visible as soon as each image is done.
    out.flush()?;
    Ok(())
}
