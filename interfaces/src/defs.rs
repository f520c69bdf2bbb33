use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// One of the three view modes a screenshot can be rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

pub const UNKNOWN_LABEL_DESCRIPTION: &str = "Unknown type";

impl Label {
    pub const ALL: [Label; 3] = [Label::One, Label::Two, Label::Three];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::One => "1",
            Label::Two => "2",
            Label::Three => "3",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Label::One => "New ultra-realistic photogrammetry 3D",
            Label::Two => "Classic / old-style 3D",
            Label::Three => "Pure 2D satellite / flat mode",
        }
    }
}

/// Human-readable description for a raw label as found in an example file.
/// Unrecognized labels map to "Unknown type" instead of failing.
pub fn describe_label(raw: &str) -> &'static str {
    raw.trim()
        .parse::<Label>()
        .map(|label| label.description())
        .unwrap_or(UNKNOWN_LABEL_DESCRIPTION)
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "1" => Ok(Label::One),
            "2" => Ok(Label::Two),
            "3" => Ok(Label::Three),
            other => Err(anyhow!("unrecognized label {:?}", other)),
        }
    }
}

/// A labeled screenshot shown to the model before the target image.
///
/// Every field is optional so that a hand-maintained list with a broken
/// entry still loads; such entries are skipped when the prompt is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceExample {
    #[serde(default, deserialize_with = "deserialize_label")]
    pub label: Option<String>,
    #[serde(default, rename = "imageUrl", alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ReferenceExample {
    pub fn new(label: Label, image_url: impl Into<String>) -> Self {
        Self {
            label: Some(label.as_str().to_owned()),
            image_url: Some(image_url.into()),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Returns `(label, image_url)` when both are present and non-blank.
    pub fn usable_parts(&self) -> Option<(&str, &str)> {
        let label = self.label.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let image_url = self.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((label, image_url))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Number(i64),
}

// Hand-edited example files sometimes carry `"label": 1` instead of `"1"`.
fn deserialize_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawLabel>::deserialize(deserializer)?.map(|raw| match raw {
        RawLabel::Text(text) => text,
        RawLabel::Number(number) => number.to_string(),
    }))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentBlock {
    Text(String),
    Image(ImageRef),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    pub fn image(url: impl Into<String>) -> Self {
        ContentBlock::Image(ImageRef::new(url))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ConversationTurn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Text blocks joined by newlines, images skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                ContentBlock::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_images(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::Image(_)))
    }
}

/// How a labeled example is framed inside the conversation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FewShotEncoding {
    /// A user turn with the image, answered by an assistant turn holding the label.
    #[default]
    AssistantEcho,
    /// A single user turn stating the answer, then the image.
    InlineAnswer,
}

impl FewShotEncoding {
    /// Number of turns one usable example contributes.
    pub fn turns_per_example(&self) -> usize {
        match self {
            FewShotEncoding::AssistantEcho => 2,
            FewShotEncoding::InlineAnswer => 1,
        }
    }
}

// Object style note:
// These are plain values handed between the prompt builder, the model
// adapter and the evaluation harness. Nothing here talks to the network.
