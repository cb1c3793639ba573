//! Fabricated generation results for UI development without a live ComfyUI.
//!
//! The store is owned by the application state and injected where needed; it
//! carries no global statics. Each fake prompt id goes through a fixed cycle:
//! the first query registers it and answers "not ready", queries inside the
//! initial delay stay "not ready", then a result is fabricated once and
//! served until the validity window closes, after which the entry is dropped
//! and the cycle starts over.
//!
//! Fabricated entries use real history-entry shapes (`outputs` subtree with
//! `filename`/`type` or `s3_paths`) so the production extractor reads them
//! without special cases.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use serde_json::{json, Value};

use crate::comfyui::outputs::GenerationMode;

const READY_DELAY: Duration = Duration::from_secs(2);
const VALIDITY: Duration = Duration::from_secs(30);

struct MockEntry {
    ready_at: Instant,
    expires_at: Instant,
    result: Option<Value>,
}

pub struct MockStore {
    entries: HashMap<String, MockEntry>,
    ready_delay: Duration,
    validity: Duration,
}

impl Default for MockStore {
    fn default() -> Self {
        MockStore::new(READY_DELAY, VALIDITY)
    }
}

impl MockStore {
    pub fn new(ready_delay: Duration, validity: Duration) -> Self {
        MockStore { entries: HashMap::new(), ready_delay, validity }
    }

    /// Synthesize a prompt id the way the real pipeline names its artifacts:
    /// `scene{N}` for images, `clip{N}_video` (or `_hd`) for videos, with the
    /// index recovered from a `scene_{N}` source file name when present.
    pub fn fake_prompt_id(
        mode: GenerationMode,
        source_file: Option<&str>,
        hi_rez: bool,
    ) -> String {
        let index = source_file
            .and_then(scene_index)
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..15).to_string());
        match mode {
            GenerationMode::Text2Image => format!("scene{}", index),
            GenerationMode::Image2Video => {
                if hi_rez {
                    format!("clip{}_video_hd", index)
                } else {
                    format!("clip{}_video", index)
                }
            }
        }
    }

    /// Answer a history query for a fake prompt id. `None` means "not ready".
    pub fn history(&mut self, prompt_id: &str, mode: GenerationMode) -> Option<Value> {
        let now = Instant::now();

        // Validity window over: drop the entry and fall through so this same
        // query re-registers it, starting the next cycle.
        if let Some(entry) = self.entries.get(prompt_id) {
            if now > entry.expires_at {
                self.entries.remove(prompt_id);
            }
        }

        match self.entries.get_mut(prompt_id) {
            None => {
                self.entries.insert(
                    prompt_id.to_string(),
                    MockEntry {
                        ready_at: now + self.ready_delay,
                        expires_at: now + self.validity,
                        result: None,
                    },
                );
                None
            }
            Some(entry) => {
                if now < entry.ready_at {
                    return None;
                }
                if entry.result.is_none() {
                    entry.result = Some(fabricate_entry(prompt_id, mode));
                }
                entry.result.clone()
            }
        }
    }
}

fn scene_index(file_name: &str) -> Option<String> {
    let rest = file_name.split("scene_").nth(1)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

fn fabricate_entry(prompt_id: &str, mode: GenerationMode) -> Value {
    match mode {
        GenerationMode::Text2Image => json!({
            "outputs": {
                "9": {
                    "images": [{"filename": format!("{}_thumb.png", prompt_id), "type": "output"}]
                }
            }
        }),
        GenerationMode::Image2Video => json!({
            "outputs": {
                "12": {
                    "s3_paths": [format!("gen/video/{}.mp4", prompt_id)]
                }
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comfyui::outputs::find_artifact;
    use std::thread::sleep;

    fn fast_store() -> MockStore {
        MockStore::new(Duration::from_millis(20), Duration::from_millis(120))
    }

    #[test]
    fn fake_ids_follow_naming_scheme() {
        let id = MockStore::fake_prompt_id(GenerationMode::Text2Image, None, false);
        assert!(id.starts_with("scene"));

        let id =
            MockStore::fake_prompt_id(GenerationMode::Image2Video, Some("scene_004.png"), false);
        assert_eq!(id, "clip004_video");

        let id =
            MockStore::fake_prompt_id(GenerationMode::Image2Video, Some("scene_7.png"), true);
        assert_eq!(id, "clip7_video_hd");
    }

    #[test]
    fn first_query_is_not_ready() {
        let mut store = fast_store();
        assert!(store.history("scene1", GenerationMode::Text2Image).is_none());
    }

    #[test]
    fn result_appears_after_delay_and_is_cached() {
        let mut store = fast_store();
        assert!(store.history("clip3_video", GenerationMode::Image2Video).is_none());
        sleep(Duration::from_millis(30));
        let first = store.history("clip3_video", GenerationMode::Image2Video).unwrap();
        let second = store.history("clip3_video", GenerationMode::Image2Video).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fabricated_entries_satisfy_the_extractor() {
        let mut store = fast_store();
        store.history("clip3_video", GenerationMode::Image2Video);
        sleep(Duration::from_millis(30));
        let entry = store.history("clip3_video", GenerationMode::Image2Video).unwrap();
        assert_eq!(
            find_artifact(&entry, GenerationMode::Image2Video),
            Some("gen/video/clip3_video.mp4".to_string())
        );

        store.history("scene2", GenerationMode::Text2Image);
        sleep(Duration::from_millis(30));
        let entry = store.history("scene2", GenerationMode::Text2Image).unwrap();
        assert_eq!(
            find_artifact(&entry, GenerationMode::Text2Image),
            Some("scene2_thumb.png".to_string())
        );
    }

    #[test]
    fn cycle_resets_after_expiry() {
        let mut store = fast_store();
        store.history("scene5", GenerationMode::Text2Image);
        sleep(Duration::from_millis(150));
        // Past the validity window: back to "not ready".
        assert!(store.history("scene5", GenerationMode::Text2Image).is_none());
        sleep(Duration::from_millis(30));
        assert!(store.history("scene5", GenerationMode::Text2Image).is_some());
    }
}
