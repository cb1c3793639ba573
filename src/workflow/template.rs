//! Workflow templating by placeholder substitution.
//!
//! Workflow templates are ComfyUI prompt graphs carrying three literal
//! tokens: `PROMPT_PLACEHOLDER`, `SEED_PLACEHOLDER` and `IMG_PLACEHOLDER`.
//! Substitution is textual: the graph is serialized, every occurrence of
//! each token is replaced, and the result is parsed back into JSON. The
//! prompt text is sanitized first so it cannot break the serialized form.
use serde_json::Value;

use crate::error::AppResult;

pub const PROMPT_PLACEHOLDER: &str = "PROMPT_PLACEHOLDER";
pub const SEED_PLACEHOLDER: &str = "SEED_PLACEHOLDER";
pub const IMG_PLACEHOLDER: &str = "IMG_PLACEHOLDER";

/// Strip characters that would corrupt the serialized workflow: double
/// quotes are removed, newlines collapse to spaces, surrounding whitespace
/// is trimmed.
pub fn sanitize_prompt(prompt: &str) -> String {
    prompt.replace('"', "").replace('\n', " ").trim().to_string()
}

pub struct WorkflowTemplate {
    template: Value,
}

impl WorkflowTemplate {
    pub fn new(template: Value) -> Self {
        WorkflowTemplate { template }
    }

    /// Fill the template with the given prompt, seed, and (for image-to-video
    /// workflows) source image URL.
    ///
    /// Every occurrence of each token is replaced. If the substituted text is
    /// no longer valid JSON the template itself was malformed and the error
    /// propagates; there is no partial result.
    pub fn fill(&self, prompt: &str, seed: u32, image_url: Option<&str>) -> AppResult<Value> {
        let clean = sanitize_prompt(prompt);
        let mut text = serde_json::to_string(&self.template)?;
        text = text.replace(PROMPT_PLACEHOLDER, &clean);
        text = text.replace(SEED_PLACEHOLDER, &seed.to_string());
        if let Some(url) = image_url {
            text = text.replace(IMG_PLACEHOLDER, url);
        }
        let filled = serde_json::from_str(&text)?;
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_strips_quotes_and_newlines() {
        assert_eq!(sanitize_prompt("He said \"hi\"\nbye"), "He said hi bye");
        assert_eq!(sanitize_prompt("  plain  "), "plain");
        let clean = sanitize_prompt("a\"b\nc\"d\n");
        assert!(!clean.contains('"'));
        assert!(!clean.contains('\n'));
    }

    #[test]
    fn fill_substitutes_prompt() {
        let tpl = WorkflowTemplate::new(json!({"n": {"inputs": {"text": "PROMPT_PLACEHOLDER"}}}));
        let out = tpl.fill("He said \"hi\"\nbye", 7, None).unwrap();
        assert_eq!(out, json!({"n": {"inputs": {"text": "He said hi bye"}}}));
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        let tpl = WorkflowTemplate::new(json!({
            "6": {"inputs": {"text": "PROMPT_PLACEHOLDER", "seed": "SEED_PLACEHOLDER"}},
            "7": {"inputs": {"text": "PROMPT_PLACEHOLDER", "seed": "SEED_PLACEHOLDER"}},
        }));
        let out = tpl.fill("cat", 42, None).unwrap();
        let text = serde_json::to_string(&out).unwrap();
        assert!(!text.contains("PROMPT_PLACEHOLDER"));
        assert!(!text.contains("SEED_PLACEHOLDER"));
        assert_eq!(out["6"]["inputs"]["text"], "cat");
        assert_eq!(out["7"]["inputs"]["seed"], "42");
    }

    #[test]
    fn fill_substitutes_image_url_when_given() {
        let tpl = WorkflowTemplate::new(json!({"1": {"inputs": {"image": "IMG_PLACEHOLDER"}}}));
        let out = tpl.fill("p", 1, Some("https://bucket.example/a.png")).unwrap();
        assert_eq!(out["1"]["inputs"]["image"], "https://bucket.example/a.png");

        // Without an image URL the token stays untouched.
        let out = tpl.fill("p", 1, None).unwrap();
        assert_eq!(out["1"]["inputs"]["image"], "IMG_PLACEHOLDER");
    }
}
