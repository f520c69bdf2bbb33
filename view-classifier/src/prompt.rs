use crate::types::{describe_label, ContentBlock, ConversationTurn, FewShotEncoding, ReferenceExample};
use tracing::debug;

const CATEGORY_DEFINITIONS: &str = r#"You are an expert at identifying Google Earth / Google Maps view modes.

You must assign screenshots to **exactly one** of these three categories:

1. New ultra-realistic photogrammetry 3D (the new photorealistic mesh that started rolling out ~2022–2025, looks like real oblique aerial photos stitched together on all surfaces, extremely detailed, no hard roof edges, real photo textures on building sides, realistic cars/trees/vegetation, looks almost like a drone photo)

2. Classic/old-style 3D (extruded buildings with only a single overhead satellite/photo texture on the roof, usually gray/plain/auto-colored sides, simple tree billboards for trees, blockier look, existed from ~2006 to ~2023 in most places)

3. Pure 2D satellite / flat mode (perfectly top-down view, no tilt possible or horizon visible, buildings appear completely flat with only roofs visible, no building sides or height)

Evaluate the **overall scene**, focusing on the majority of visible elements (buildings, vegetation, ground, cars). Do not classify based on a single building or small area."#;

const TIE_BREAK_RULES: &str = r#"When deciding between 1 and 2, use these strict rules and bias toward 1:

- **CRITICAL:** Large industrial buildings (warehouses) in Category 1 (New 3D) can still look blocky because they are simple box shapes. **Do not classify as 2 just because a building is a box.**
- Look closely at the **sides of the buildings**. In Category 1, even simple walls have subtle photo-texture variations, weathering, or soft lighting gradients from the photogrammetry mesh. In Category 2, walls are perfectly uniform single colors (computer-generated gray/white) with unnatural hard edges.
- Look at **trees and cars**. In Category 1, trees have volume and irregular shapes (3D blobs). In Category 2, they are flat 2D cutouts (billboards) or perfect spheres.
- **If the scene looks like a real photo taken from a drone or plane, it is 1.**
- **If the scene looks like a video game from 2010 (sharp geometry, low-res textures), it is 2.**"#;

const NUMERIC_ANSWER_FORMAT: &str =
    "For your **final answer**, respond with only the number (1, 2, or 3).";

const NUMERIC_CLOSING: &str = r#"Never add extra text or commentary of any kind, only the number. You must still choose exactly one of the three categories (no "in between")."#;

const REASONING_ANSWER_FORMAT: &str = "For your **final answer**, respond with the number (1, 2, or 3) on the first line, followed by your detailed reasoning explaining why it matches that category, with specific visual evidence from the image (refer to particular buildings, cars, trees, roof edges, shadows, texture quality, perspective, etc.).";

const REASONING_CLOSING: &str = r#"Do not say "kinda new" or "in between" — you must pick exactly one of the three categories."#;

pub const EXAMPLE_INSTRUCTION: &str = "Classify this Google Earth / Google Maps screenshot:";
pub const FEW_SHOT_INSTRUCTION: &str = "Now classify this new Google Earth / Google Maps screenshot:";
pub const ZERO_SHOT_INSTRUCTION: &str = "Analyze this Google Earth / Google Maps screenshot and tell me which of the three view types it is: 1 (new ultra-realistic photogrammetry 3D), 2 (classic / old-style 3D) or 3 (pure 2D satellite / flat mode).";

const DEFAULT_JUSTIFICATION: &str = "of the overall photorealistic quality and detailed textures.";

/// System instructions for the chosen output format.
pub fn system_prompt(reasoning: bool) -> String {
    if reasoning {
        format!("{CATEGORY_DEFINITIONS}\n\n{REASONING_ANSWER_FORMAT}\n\n{TIE_BREAK_RULES}\n\n{REASONING_CLOSING}")
    } else {
        format!("{CATEGORY_DEFINITIONS}\n\n{NUMERIC_ANSWER_FORMAT}\n\n{TIE_BREAK_RULES}\n\n{NUMERIC_CLOSING}")
    }
}

/// Assembles the few-shot conversation sent to the model for one screenshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    encoding: FewShotEncoding,
}

impl PromptBuilder {
    pub fn new(encoding: FewShotEncoding) -> Self {
        Self { encoding }
    }

    /// Builds `[system, demonstrations.., final user turn]`.
    ///
    /// Examples without a label or an image are skipped. The last turn is
    /// always a user turn ending with `target_image`.
    pub fn build_conversation(
        &self,
        target_image: &str,
        examples: &[ReferenceExample],
        reasoning: bool,
    ) -> Vec<ConversationTurn> {
        let mut turns = vec![ConversationTurn::system(system_prompt(reasoning))];
        let mut demonstrated = 0usize;

        for example in examples {
            let Some((label, image_url)) = example.usable_parts() else {
                debug!("Skipping reference example without label or image");
                continue;
            };
            let note = if reasoning { example.note.as_deref() } else { None };
            self.push_demonstration(&mut turns, label, image_url, note, reasoning);
            demonstrated += 1;
        }

        let instruction = if demonstrated > 0 {
            FEW_SHOT_INSTRUCTION
        } else {
            ZERO_SHOT_INSTRUCTION
        };
        turns.push(ConversationTurn::user(vec![
            ContentBlock::text(instruction),
            ContentBlock::image(target_image),
        ]));

        debug!(
            "Built conversation with {} turns ({} demonstrations, {:?})",
            turns.len(),
            demonstrated,
            self.encoding
        );
        turns
    }

    fn push_demonstration(
        &self,
        turns: &mut Vec<ConversationTurn>,
        label: &str,
        image_url: &str,
        note: Option<&str>,
        reasoning: bool,
    ) {
        let description = describe_label(label);

        match self.encoding {
            FewShotEncoding::AssistantEcho => {
                turns.push(ConversationTurn::user(vec![
                    ContentBlock::text(EXAMPLE_INSTRUCTION),
                    ContentBlock::image(image_url),
                ]));
                let answer = if reasoning {
                    let because = note.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_JUSTIFICATION);
                    format!("{label}\nThis matches category {label} ({description}) because: {because}")
                } else {
                    label.to_string()
                };
                turns.push(ConversationTurn::assistant(answer));
            }
            FewShotEncoding::InlineAnswer => {
                let mut statement = format!(
                    "Example: this Google Earth / Google Maps screenshot is category {label} ({description})."
                );
                if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
                    statement.push_str(" Reason: ");
                    statement.push_str(note);
                }
                turns.push(ConversationTurn::user(vec![
                    ContentBlock::text(statement),
                    ContentBlock::image(image_url),
                ]));
            }
        }
    }
}
