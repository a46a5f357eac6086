//! Slogan generation
//!
//! Frames every error as a diplomatic crisis or boardroom standoff. A hosted
//! chat model writes the slogan when configured; otherwise a slogan is drawn
//! from a fixed list.

use gbeat_common::llm::{ChatClient, ChatMessage, CompletionOptions};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Emoji attached to every slogan response
pub const SLOGAN_EMOJI: &str = "🚬";

const COMPLETION: CompletionOptions = CompletionOptions {
    temperature: 0.9,
    max_tokens: 200,
};

pub const FALLBACK_SLOGANS: &[&str] = &[
    "Your error is someone's feature!",
    "Bugs: The spice of development life",
    "Error 404: Motivation not found",
    "Keep calm and blame the compiler",
    "Undefined is just a state of mind",
    "Segfault: A journey into the unknown",
    "Memory leak? More like memory waterfall",
    "Stack overflow: Because recursion loves company",
    "Null pointer: The void stares back",
    "Race condition: Speed dating for threads",
    "Deadlock: When threads fall in love forever",
    "Heap corruption: Modern art for memory",
    "Buffer overflow: Living life on the edge",
    "Out of bounds: Breaking free from constraints",
    "Type mismatch: Celebrate diversity",
    "Syntax error: Poetry the compiler doesn't understand",
    "Logic error: Alternative facts in code",
    "Off by one: Close enough is good enough",
    "Infinite loop: The circle of life",
    "Timeout: Patience is overrated",
    "Connection refused: Playing hard to get",
    "Permission denied: No means maybe later",
    "Resource exhausted: Living beyond your means",
    "Assertion failed: Reality is negotiable",
    "Invalid argument: Agreeing to disagree",
    "Exception: The rule that proves itself",
    "Panic: Excitement in disguise",
    "Fatal error: Drama queen energy",
    "Core dumped: Sharing is caring",
    "Zombie process: The undead of computing",
    "Orphan process: Independence day every day",
    "Fork bomb: Exponential family growth",
    "Kernel panic: Operating system's existential crisis",
    "Blue screen: Windows' way of saying hello",
    "Guru meditation: Enlightenment through crashes",
    "Bus error: Wrong stop, right destination",
    "Illegal instruction: Breaking the law, breaking the law",
    "Floating point exception: Math gone wild",
    "Integer overflow: More is more is more",
    "Division by zero: Infinity at your fingertips",
    "Uninitialized variable: Mystery box programming",
    "Memory corruption: Spicy randomness",
    "Use after free: Living dangerously",
    "Double free: Twice the fun",
    "Stack smashing: Aggressive optimization",
    "Heap spray: Artistic memory arrangement",
    "Format string vulnerability: Creative formatting",
    "SQL injection: Bonus query features",
    "XSS: Extra script support",
    "CSRF: Surprise requests",
    "Path traversal: Filesystem tourism",
    "Remote code execution: Sharing is caring",
    "Privilege escalation: Career advancement",
    "Authentication bypass: VIP treatment",
    "Broken access control: Open door policy",
    "Security misconfiguration: Artistic freedom",
    "Sensitive data exposure: Radical transparency",
    "XML external entities: Make new friends",
    "Deserialization: Unboxing surprise objects",
    "Insecure components: Vintage dependencies",
    "Insufficient logging: Mystery novel mode",
    "API abuse: Enthusiastic usage",
    "Brute force: Determined persistence",
    "DDoS: Overwhelming popularity",
    "Man in the middle: Third wheel networking",
    "Session hijacking: Friendly takeover",
    "Clickjacking: Surprise interactions",
    "Cookie poisoning: Spicy snacks",
    "DNS spoofing: Identity exploration",
    "ARP poisoning: Network personality disorder",
    "Port scanning: Neighborly curiosity",
    "Packet sniffing: Network aromatherapy",
    "Replay attack: Nostalgia in action",
    "Zero day: Fresh out of the oven",
    "Exploit: Feature unlock code",
    "Payload: Special delivery",
    "Rootkit: Deep system integration",
    "Trojan: Surprise software bundle",
    "Worm: Self-motivated traveler",
    "Virus: Social butterfly code",
    "Ransomware: Aggressive data backup",
    "Spyware: Overly attached software",
    "Adware: Enthusiastic marketing",
    "Botnet: Distributed friendship",
    "Backdoor: Alternative entrance",
    "Logic bomb: Delayed surprise party",
    "Time bomb: Countdown to excitement",
    "Keylogger: Thorough documentation",
    "Screen scraper: Visual collector",
    "Phishing: Optimistic communications",
    "Vishing: Voice of opportunity",
    "Smishing: Texting enthusiasm",
    "Pretexting: Creative storytelling",
    "Baiting: Generous offers",
    "Quid pro quo: Fair exchange philosophy",
    "Tailgating: Close following",
    "Shoulder surfing: Over-the-shoulder learning",
    "Dumpster diving: Recycling enthusiasm",
    "Social engineering: People skills",
    "Password cracking: Lock picking hobby",
    "Rainbow table: Colorful data structures",
    "Hash collision: Cryptographic coincidence",
    "Certificate error: Trust issues",
    "Encryption failed: Privacy is optional",
    "Decryption failed: Mystery preservation",
    "Key exchange failed: Awkward handshake",
    "Handshake failed: Social anxiety",
    "Protocol error: Miscommunication art",
    "Malformed request: Creative formatting",
    "Bad gateway: Confused intermediary",
    "Service unavailable: Taking a break",
    "Gateway timeout: Fashionably late",
    "Network unreachable: Playing hide and seek",
    "Host unreachable: The ultimate introvert",
    "Connection reset: Starting fresh",
];

/// Body of `POST /error-log`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorLogRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub gif_url: String,
    #[serde(default)]
    pub song_title: String,
    #[serde(default)]
    pub song_artist: String,
    #[serde(default)]
    pub song_url: String,
    /// Businesses, authorities or places to cast as warring factions
    #[serde(default)]
    pub user_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SloganResponse {
    pub emoji: String,
    pub slogan: String,
    pub verbose_desc: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SloganSource {
    Model,
    Fallback,
}

impl SloganSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SloganSource::Model => "model",
            SloganSource::Fallback => "fallback",
        }
    }
}

/// Slogan generator backed by an optional chat model
#[derive(Clone, Default)]
pub struct SloganGenerator {
    client: Option<ChatClient>,
}

impl SloganGenerator {
    pub fn new(client: Option<ChatClient>) -> Self {
        Self { client }
    }

    pub fn fallback_only() -> Self {
        Self { client: None }
    }

    pub fn model_available(&self) -> bool {
        self.client.is_some()
    }

    /// Produce a slogan for one logged error. Model failures fall back.
    pub async fn generate(&self, request: &ErrorLogRequest) -> (SloganResponse, SloganSource) {
        if let Some(client) = &self.client {
            let prompt = build_prompt(&request.message, &request.gif_url, &request.user_keywords);
            match client.complete(&[ChatMessage::user(prompt)], COMPLETION).await {
                Ok(content) => {
                    let (slogan, verbose_desc) = parse_reply(&content);
                    return (response(slogan, verbose_desc), SloganSource::Model);
                }
                Err(e) => warn!("Slogan model failed, using fallback: {}", e),
            }
        }

        (
            response(fallback_slogan().to_string(), String::new()),
            SloganSource::Fallback,
        )
    }
}

fn response(slogan: String, verbose_desc: String) -> SloganResponse {
    SloganResponse {
        emoji: SLOGAN_EMOJI.to_string(),
        slogan,
        verbose_desc,
    }
}

/// Describe a GIF from its URL.
///
/// Giphy-style URLs end in `words-separated-by-hyphens-ID`; the words
/// without the trailing id become the context.
pub fn gif_context(gif_url: &str) -> Option<String> {
    let last = gif_url.rsplit('/').next()?;
    let parts: Vec<&str> = last.split('-').collect();
    if parts.len() < 2 {
        return None;
    }

    let desc = parts[..parts.len() - 1].join(" ");
    if desc.is_empty() {
        None
    } else {
        Some(format!("GIF context: {}", desc))
    }
}

pub fn build_prompt(error_message: &str, gif_url: &str, user_keywords: &[String]) -> String {
    let gif = gif_context(gif_url).unwrap_or_default();
    let keywords = if user_keywords.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nContext keywords (businesses, authorities, locations): {}",
            user_keywords.join(", ")
        )
    };

    format!(
        r#"Generate a comedic error message with two parts: a short slogan and a verbose description.

Error: {error_message}
{gif}{keywords}

Part 1 - Short Slogan:
- Maximum 15 words
- Frame as if the error involves a diplomatic crisis, regulatory standoff, or corporate boardroom conflict
- Use technical error terminology as metaphors for political/business disputes
- Reference the context keywords if provided (treat them as warring factions, oversight committees, or corporate entities)
- Make it sound like UN proceedings mixed with Silicon Valley boardroom drama

Part 2 - Verbose Description:
- Write in dry, technical language as if it's a verbose application crash warning
- 2-4 sentences maximum
- Maintain the intergovernmental/bureaucratic theme
- Use appropriately comedic, deadpan technical jargon
- Frame it like an official government or corporate incident report
- Example tone: "FATAL: Cross-border data exchange protocol violated. The Client Embassy has unilaterally terminated negotiations due to SERVER_TIMEOUT exception. All pending transactions have been referred to the International Data Transfer Commission for arbitration. Please contact your regional diplomatic liaison for stack trace documentation."

Respond ONLY in this format:
SLOGAN: [your slogan here]
VERBOSE: [your verbose description here]"#
    )
}

/// Split a `SLOGAN:` / `VERBOSE:` reply.
///
/// Without a slogan line the whole reply becomes the slogan.
pub fn parse_reply(content: &str) -> (String, String) {
    let content = content.trim();
    let mut slogan = String::new();
    let mut verbose = String::new();

    for line in content.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("SLOGAN:") {
            slogan = strip_quotes(rest.trim()).to_string();
        } else if let Some(rest) = line.strip_prefix("VERBOSE:") {
            verbose = strip_quotes(rest.trim()).to_string();
        }
    }

    if slogan.is_empty() {
        slogan = strip_quotes(content).to_string();
    }

    (slogan, verbose)
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

pub fn fallback_slogan() -> &'static str {
    fallback_slogan_with(&mut rand::thread_rng())
}

pub fn fallback_slogan_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    FALLBACK_SLOGANS
        .choose(rng)
        .copied()
        .unwrap_or("Your error is someone's feature!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gif_context_from_giphy_url() {
        assert_eq!(
            gif_context("https://giphy.com/gifs/this-is-fine-dog-QMHoU66sBXqqLqYvGO"),
            Some("GIF context: this is fine dog".to_string())
        );
    }

    #[test]
    fn test_gif_context_without_description() {
        assert_eq!(gif_context(""), None);
        assert_eq!(gif_context("https://media.giphy.com/media/abc123/giphy.gif"), None);
        assert_eq!(gif_context("https://giphy.com/gifs/-QMHoU66"), None);
    }

    #[test]
    fn test_prompt_includes_keywords_and_gif() {
        let prompt = build_prompt(
            "Connection refused",
            "https://giphy.com/gifs/slam-door-XYZ",
            &["City Council".to_string(), "ACME Corp".to_string()],
        );
        assert!(prompt.contains("Error: Connection refused\nGIF context: slam door"));
        assert!(prompt.contains("Context keywords (businesses, authorities, locations): City Council, ACME Corp"));
    }

    #[test]
    fn test_prompt_without_context() {
        let prompt = build_prompt("Kernel panic", "", &[]);
        assert!(prompt.contains("Error: Kernel panic\n\n\nPart 1"));
    }

    #[test]
    fn test_parse_reply_both_parts() {
        let reply = "SLOGAN: \"Treaty of Null signed in haste\"\nVERBOSE: 'FATAL: The Pointer Delegation walked out.'";
        let (slogan, verbose) = parse_reply(reply);
        assert_eq!(slogan, "Treaty of Null signed in haste");
        assert_eq!(verbose, "FATAL: The Pointer Delegation walked out.");
    }

    #[test]
    fn test_parse_reply_unstructured() {
        let (slogan, verbose) = parse_reply("  \"Deadlock summit adjourned indefinitely\"  ");
        assert_eq!(slogan, "Deadlock summit adjourned indefinitely");
        assert!(verbose.is_empty());
    }

    #[test]
    fn test_fallback_slogan_comes_from_list() {
        for _ in 0..20 {
            assert!(FALLBACK_SLOGANS.contains(&fallback_slogan()));
        }
    }

    #[tokio::test]
    async fn test_generate_without_model() {
        let generator = SloganGenerator::fallback_only();
        let request = ErrorLogRequest {
            message: "Segfault".to_string(),
            ..ErrorLogRequest::default()
        };

        let (response, source) = generator.generate(&request).await;
        assert_eq!(source, SloganSource::Fallback);
        assert_eq!(response.emoji, "🚬");
        assert!(response.verbose_desc.is_empty());
        assert!(FALLBACK_SLOGANS.contains(&response.slogan.as_str()));
    }
}
