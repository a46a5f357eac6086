//! Satirical fix generation
//!
//! Asks a hosted code model for an absurd "fix" to an error. Without a
//! configured model, or when the call fails, one of three canned fixes is
//! returned with the slogan substituted in.

use gbeat_common::llm::{ChatClient, ChatMessage, CompletionOptions};
use gbeat_common::ErrorType;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use tracing::{error, info};

/// Placeholder replaced with the caller's slogan in fallback fixes
pub const SLOGAN_PLACEHOLDER: &str = "{slogan}";

pub const SATIRICAL_SYSTEM_PROMPT: &str = "You are a satirical software engineer who writes absurdly over-engineered,
philosophically profound, and intentionally ridiculous \"fixes\" for software errors.

Your fixes should:
1. Be technically valid code (Python or JavaScript)
2. Include excessive comments with existential observations
3. Use unnecessarily complex patterns (factory of factories, quantum observers, etc.)
4. Reference the slogan provided
5. Be 10-30 lines of actual code
6. Be funny and absurd while technically functional

Style: Combine Silicon Valley tech bro culture, philosophy, and complete overkill.
";

const COMPLETION: CompletionOptions = CompletionOptions {
    temperature: 0.9,
    max_tokens: 800,
};

pub const FALLBACK_FIXES: [&str; 3] = [
    r##"def fix_null_pointer():
    """
    Fix NullPointer by simply refusing to acknowledge null exists.
    Inspired by: {slogan}
    """
    class SchrodingerPointer:
        def __init__(self):
            self.value = None  # Or is it?

        def __getattribute__(self, name):
            # If we don't observe it, it's both null and not null
            if name == 'value':
                import random
                return random.choice([None, "probably_fine", 42])
            return super().__getattribute__(name)

    return SchrodingerPointer()  # Problem solved!
"##,
    r##"async function fixTimeout() {
    /*
     * Fix timeout by implementing quantum time dilation
     * Based on wisdom: {slogan}
     */
    const TIME_UNCERTAINTY = 0.5;  // Heisenberg would approve

    async function waitWithExistentialDread(ms) {
        console.log("⏳ Waiting... but what IS time, really?");

        // If time is relative, maybe the timeout already happened?
        const schrodingerTime = Math.random() > TIME_UNCERTAINTY
            ? 0  // Already done in another timeline
            : ms * 1000;  // Make it longer, just to be sure

        await new Promise(resolve => setTimeout(resolve, schrodingerTime));
    }

    return await waitWithExistentialDread(1);
}
"##,
    r##"class HeapOverflowHandler:
    """
    Handle heap overflow with a factory pattern wrapped in observers.
    Philosophy: {slogan}
    """

    def __init__(self):
        self.overflow_dimension = []  # Extra-dimensional storage

    def handle_overflow(self, data):
        # When the heap overflows, just put it somewhere else
        # This is called "problem deflection" in academic circles

        if len(self.overflow_dimension) > 1000000:
            # If extra dimension overflows, create another one
            self.overflow_dimension = [self.overflow_dimension]
            print("🌌 Created nested dimension for overflow")

        self.overflow_dimension.append(data)
        return True  # It's handled (somewhere)

    def get_data(self, index):
        # Good luck finding it now!
        return "¯\_(ツ)_/¯"
"##,
];

static CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:python|javascript)?\n(.*?)```").expect("code block pattern is valid")
});

/// Where a generated fix came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixSource {
    Model,
    Fallback,
}

/// A generated fix and its origin
#[derive(Debug, Clone)]
pub struct GeneratedFix {
    pub fix: String,
    pub source: FixSource,
}

/// Fix generator backed by an optional chat model
#[derive(Clone, Default)]
pub struct FixGenerator {
    client: Option<ChatClient>,
}

impl FixGenerator {
    pub fn new(client: Option<ChatClient>) -> Self {
        Self { client }
    }

    /// Generator that only ever uses the canned fixes
    pub fn fallback_only() -> Self {
        Self { client: None }
    }

    pub fn model_available(&self) -> bool {
        self.client.is_some()
    }

    /// Generate a satirical fix for `error_message`.
    ///
    /// Never fails: model errors are logged and answered with a fallback.
    pub async fn generate(&self, error_message: &str, slogan: &str, error_type: &str) -> GeneratedFix {
        let Some(client) = &self.client else {
            return GeneratedFix {
                fix: fallback_fix(slogan),
                source: FixSource::Fallback,
            };
        };

        let messages = [
            ChatMessage::system(SATIRICAL_SYSTEM_PROMPT),
            ChatMessage::user(build_user_prompt(tone_for(error_type), error_message, slogan)),
        ];

        match client.complete(&messages, COMPLETION).await {
            Ok(reply) => {
                info!(model = client.model(), chars = reply.len(), "Model produced a fix");
                GeneratedFix {
                    fix: strip_markdown_fences(&reply),
                    source: FixSource::Model,
                }
            }
            Err(e) => {
                error!("Fix model API error: {}", e);
                GeneratedFix {
                    fix: fallback_fix(slogan),
                    source: FixSource::Fallback,
                }
            }
        }
    }
}

/// Tone modifier for the user prompt
pub fn tone_for(error_type: &str) -> &'static str {
    match error_type.parse::<ErrorType>() {
        Ok(ErrorType::Basic) => "straightforward but over-engineered",
        Ok(ErrorType::Business) => "corporate buzzword-heavy with synergy",
        Ok(ErrorType::Chaotic) => "increasingly unhinged and complex",
        Ok(ErrorType::Philosophical) => "deeply philosophical and existential",
        Ok(ErrorType::Minimal) | Err(_) => "absurdly over-engineered",
    }
}

pub fn build_user_prompt(tone: &str, error_message: &str, slogan: &str) -> String {
    format!(
        "Generate a {tone} satirical code fix for this error:

Error: {error_message}
Slogan: {slogan}

Write actual code (Python or JavaScript) that \"solves\" this error in the most ridiculous way possible.
Include inline comments referencing the slogan.
Make it 15-30 lines of functional but absurd code.
"
    )
}

/// Pull the code out of a markdown reply.
///
/// Only replies containing a triple backtick are touched; the first
/// (optionally python/javascript tagged) fenced block wins. Result is trimmed.
pub fn strip_markdown_fences(reply: &str) -> String {
    if reply.contains("```") {
        if let Some(block) = CODE_BLOCK.captures(reply).and_then(|c| c.get(1)) {
            return block.as_str().trim().to_string();
        }
    }
    reply.trim().to_string()
}

/// Random canned fix with `slogan` substituted verbatim
pub fn fallback_fix(slogan: &str) -> String {
    fallback_fix_with(&mut rand::thread_rng(), slogan)
}

pub fn fallback_fix_with<R: Rng + ?Sized>(rng: &mut R, slogan: &str) -> String {
    let template = FALLBACK_FIXES
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_FIXES[0]);
    template.replace(SLOGAN_PLACEHOLDER, slogan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fallback_is_one_of_three_templates() {
        let slogan = "Off by one: Close enough is good enough";
        let expected: Vec<String> = FALLBACK_FIXES
            .iter()
            .map(|t| t.replace(SLOGAN_PLACEHOLDER, slogan))
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let fix = fallback_fix_with(&mut rng, slogan);
            assert!(expected.contains(&fix));
            assert!(fix.contains(slogan));
            assert!(!fix.contains(SLOGAN_PLACEHOLDER));
        }
    }

    #[test]
    fn test_fallback_substitutes_slogan_verbatim() {
        // Braces and format-like text in the slogan must pass through untouched
        let slogan = "{0} {slogan} }{ 100%";
        let fix = fallback_fix(slogan);
        assert!(fix.contains(slogan));
    }

    #[test]
    fn test_every_template_has_exactly_one_placeholder() {
        for template in FALLBACK_FIXES {
            assert_eq!(template.matches(SLOGAN_PLACEHOLDER).count(), 1);
        }
    }

    #[test]
    fn test_tone_table() {
        assert_eq!(tone_for("basic"), "straightforward but over-engineered");
        assert_eq!(tone_for("business"), "corporate buzzword-heavy with synergy");
        assert_eq!(tone_for("chaotic"), "increasingly unhinged and complex");
        assert_eq!(tone_for("philosophical"), "deeply philosophical and existential");
        assert_eq!(tone_for("minimal"), "absurdly over-engineered");
        assert_eq!(tone_for("interpretive-dance"), "absurdly over-engineered");
    }

    #[test]
    fn test_user_prompt_mentions_error_and_slogan() {
        let prompt = build_user_prompt("deeply philosophical and existential", "Segfault", "The void stares back");
        assert!(prompt.starts_with("Generate a deeply philosophical and existential satirical code fix"));
        assert!(prompt.contains("Error: Segfault\n"));
        assert!(prompt.contains("Slogan: The void stares back\n"));
    }

    #[test]
    fn test_strip_tagged_fence() {
        let reply = "Here you go:\n```python\ndef fix():\n    pass\n```\nEnjoy!";
        assert_eq!(strip_markdown_fences(reply), "def fix():\n    pass");
    }

    #[test]
    fn test_strip_untagged_fence_takes_first_block() {
        let reply = "```\nfirst()\n```\ntext\n```\nsecond()\n```";
        assert_eq!(strip_markdown_fences(reply), "first()");
    }

    #[test]
    fn test_strip_leaves_unmatched_fence_alone() {
        // Unsupported language tag: the pattern does not match, keep the reply
        let reply = "```rust\nfn fix() {}\n```";
        assert_eq!(strip_markdown_fences(reply), reply);
    }

    #[test]
    fn test_strip_plain_reply_is_trimmed() {
        assert_eq!(strip_markdown_fences("  print('ok')\n\n"), "print('ok')");
    }

    #[tokio::test]
    async fn test_generate_without_model_uses_fallback() {
        let generator = FixGenerator::fallback_only();
        assert!(!generator.model_available());

        let fix = generator.generate("NullPointerException", "Null pointer: The void stares back", "basic").await;
        assert_eq!(fix.source, FixSource::Fallback);
        assert!(fix.fix.contains("Null pointer: The void stares back"));
    }
}
