use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use view_classifier::{
    parse_image_limit, resolve_image_limit, Classifier, DatasetSpec, EvaluationHarness, FewShotEncoding,
    ModelConfig, PromptBuilder, ReferenceSet, XaiChatClient,
};

const DEFAULT_IMAGE_URL: &str =
    "https://industrialiq.s3.us-east-1.amazonaws.com/property_satellite_images/815796/cleaned_3334265.jpg";

#[derive(Parser)]
#[command(name = "view-classifier", version, about = "Classify Google Earth screenshots by view mode")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// JSON file of labeled reference examples (defaults to the built-in set)
    #[arg(long, global = true)]
    examples: Option<PathBuf>,
    /// How reference examples are framed in the conversation
    #[arg(long, value_enum, default_value_t = Encoding::AssistantEcho, global = true)]
    encoding: Encoding,
    /// Override the model name (also `XAI_MODEL`)
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Classify every image listed in the dataset CSVs and report accuracy
    Evaluate {
        /// Maximum number of images to process across all datasets (also `EVAL_IMAGE_LIMIT`)
        #[arg(short = 'n', long, value_parser = parse_image_limit)]
        limit: Option<usize>,
        /// Directory holding 2d_images.csv and 3d_images.csv
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },
    /// Classify a single image and print the model's reply
    Classify {
        image_url: Option<String>,
        /// Ask the model to justify its answer
        #[arg(long)]
        reasoning: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    AssistantEcho,
    InlineAnswer,
}

impl From<Encoding> for FewShotEncoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::AssistantEcho => FewShotEncoding::AssistantEcho,
            Encoding::InlineAnswer => FewShotEncoding::InlineAnswer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut cli = Cli::parse();
    if let Cmd::Evaluate { limit, .. } = &mut cli.cmd {
        let env_limit = env::var("EVAL_IMAGE_LIMIT").ok();
        *limit = resolve_image_limit(*limit, env_limit.as_deref())?;
    }
    let classifier = build_classifier(&cli)?;

    match cli.cmd {
        Cmd::Evaluate { limit, data_dir } => {
            let harness = EvaluationHarness::new(classifier, DatasetSpec::defaults(data_dir)).with_limit(limit);
            let mut stdout = io::stdout().lock();
            harness.run(&mut stdout).await.context("Evaluation failed")?;
        }
        Cmd::Classify { image_url, reasoning } => {
            let image_url = image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());
            info!("Classifying {}", image_url);
            let classification = classifier
                .classify(&image_url, reasoning)
                .await
                .with_context(|| format!("Failed to classify {}", image_url))?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", classification.reply)?;
        }
    }

    Ok(())
}

fn build_classifier(cli: &Cli) -> Result<Classifier> {
    let references = match &cli.examples {
        Some(path) => ReferenceSet::load(path)?,
        None => ReferenceSet::builtin()?,
    };
    info!("Using {} reference examples", references.usable_count());

    let mut config = ModelConfig::from_env()?;
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    let client = XaiChatClient::new(config)?;

    Ok(Classifier::new(Box::new(client), references)
        .with_prompt_builder(PromptBuilder::new(cli.encoding.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate_limit(args: &[&str]) -> Result<Option<usize>, clap::Error> {
        let cli = Cli::try_parse_from(["view-classifier", "evaluate"].iter().chain(args).copied())?;
        match cli.cmd {
            Cmd::Evaluate { limit, .. } => Ok(limit),
            Cmd::Classify { .. } => panic!("parsed the wrong subcommand"),
        }
    }

    #[test]
    fn limit_accepts_every_spelling() {
        assert_eq!(evaluate_limit(&["--limit", "3"]).unwrap(), Some(3));
        assert_eq!(evaluate_limit(&["-n", "3"]).unwrap(), Some(3));
        assert_eq!(evaluate_limit(&["--limit=3"]).unwrap(), Some(3));
        assert_eq!(evaluate_limit(&[]).unwrap(), None);
    }

    #[test]
    fn limit_rejects_non_positive_integers() {
        for value in ["0", "-1", "2.5", "abc"] {
            assert!(evaluate_limit(&["--limit", value]).is_err(), "--limit {value} should be rejected");
            assert!(evaluate_limit(&["-n", value]).is_err(), "-n {value} should be rejected");
            let joined = format!("--limit={value}");
            assert!(evaluate_limit(&[joined.as_str()]).is_err(), "{joined} should be rejected");
        }
        assert!(evaluate_limit(&["--limit="]).is_err());
    }

    #[test]
    fn environment_fills_in_a_missing_limit() {
        let parsed = evaluate_limit(&[]).unwrap();
        assert_eq!(resolve_image_limit(parsed, Some("")).unwrap(), None);
        assert_eq!(resolve_image_limit(parsed, Some("5")).unwrap(), Some(5));
        assert!(resolve_image_limit(parsed, Some("0")).is_err());

        let parsed = evaluate_limit(&["-n", "2"]).unwrap();
        assert_eq!(resolve_image_limit(parsed, Some("")).unwrap(), Some(2));
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "view-classifier",
            "classify",
            "https://example.com/a.jpg",
            "--reasoning",
            "--encoding",
            "inline-answer",
        ])
        .unwrap();
        assert!(matches!(cli.encoding, Encoding::InlineAnswer));
        assert!(matches!(cli.cmd, Cmd::Classify { reasoning: true, .. }));
    }
}
