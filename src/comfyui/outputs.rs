//! Extraction of output artifacts from ComfyUI history entries.
//!
//! History entries vary in shape across ComfyUI versions and custom nodes, so
//! instead of deserializing a fixed schema we walk the JSON tree depth-first
//! and accept the first node matching the mode's predicate — but only once
//! the walk has descended under an `outputs` field. Fields outside `outputs`
//! (cached inputs, prompt echoes) must never be mistaken for results.
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationMode {
    #[serde(rename = "text2image")]
    Text2Image,
    #[serde(rename = "image2video")]
    Image2Video,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Text2Image => "text2image",
            GenerationMode::Image2Video => "image2video",
        }
    }
}

/// Search a per-job history entry for an output artifact.
///
/// Returns the artifact reference (a file name for images, a storage key for
/// videos) or `None` when the job has produced nothing yet. `None` is the
/// poller's "still pending" signal, not an error.
pub fn find_artifact(entry: &Value, mode: GenerationMode) -> Option<String> {
    match mode {
        GenerationMode::Text2Image => find_under_outputs(entry, false, &image_candidate),
        GenerationMode::Image2Video => find_under_outputs(entry, false, &video_candidate),
    }
}

/// Depth-first walk carrying the "inside an `outputs` subtree" flag.
/// Objects are visited field-by-field, arrays element-by-element, so the
/// first match is deterministic for a given tree.
fn find_under_outputs(
    value: &Value,
    in_outputs: bool,
    candidate: &dyn Fn(&serde_json::Map<String, Value>) -> Option<String>,
) -> Option<String> {
    match value {
        Value::Object(map) => {
            let in_outputs = in_outputs || map.contains_key("outputs");
            if in_outputs {
                if let Some(found) = candidate(map) {
                    return Some(found);
                }
            }
            for (key, child) in map.iter() {
                let child_in_outputs = in_outputs || key == "outputs";
                if let Some(found) = find_under_outputs(child, child_in_outputs, candidate) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_under_outputs(item, in_outputs, candidate)),
        _ => None,
    }
}

/// Image result: a saved `.png` whose `type` marks it as a real output
/// (previews and temp files carry other types).
fn image_candidate(map: &serde_json::Map<String, Value>) -> Option<String> {
    let filename = map.get("filename")?.as_str()?;
    if !filename.ends_with(".png") {
        return None;
    }
    if map.get("type").and_then(Value::as_str) != Some("output") {
        return None;
    }
    Some(filename.to_string())
}

/// Video result: the first entry of a non-empty `s3_paths` list.
fn video_candidate(map: &serde_json::Map<String, Value>) -> Option<String> {
    let paths = map.get("s3_paths")?.as_array()?;
    paths.first()?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_first_s3_path_under_outputs() {
        let entry = json!({"outputs": {"5": {"s3_paths": ["a/b.mp4"]}}});
        assert_eq!(
            find_artifact(&entry, GenerationMode::Image2Video),
            Some("a/b.mp4".to_string())
        );
    }

    #[test]
    fn ignores_s3_paths_outside_outputs() {
        let entry = json!({"prompt": {"5": {"s3_paths": ["a/b.mp4"]}}});
        assert_eq!(find_artifact(&entry, GenerationMode::Image2Video), None);
    }

    #[test]
    fn accepts_candidate_sitting_beside_an_outputs_key() {
        // An object that carries an `outputs` key counts as inside the
        // outputs subtree itself, so its own fields are candidates. History
        // entries in the wild have been seen with this flattened shape.
        let entry = json!({"outputs": {}, "s3_paths": ["flat/clip.mp4"]});
        assert_eq!(
            find_artifact(&entry, GenerationMode::Image2Video),
            Some("flat/clip.mp4".to_string())
        );
    }

    #[test]
    fn image_requires_png_and_output_type() {
        let entry = json!({"outputs": {"9": {"images": [
            {"filename": "preview.png", "type": "temp"},
            {"filename": "final.webp", "type": "output"},
            {"filename": "final.png", "type": "output"},
        ]}}});
        assert_eq!(
            find_artifact(&entry, GenerationMode::Text2Image),
            Some("final.png".to_string())
        );
    }

    #[test]
    fn empty_s3_paths_is_pending() {
        let entry = json!({"outputs": {"5": {"s3_paths": []}}});
        assert_eq!(find_artifact(&entry, GenerationMode::Image2Video), None);
    }

    #[test]
    fn deterministic_first_match_in_traversal_order() {
        let entry = json!({"outputs": {
            "1": {"s3_paths": ["first/one.mp4"]},
            "2": {"s3_paths": ["second/two.mp4"]},
        }});
        for _ in 0..5 {
            assert_eq!(
                find_artifact(&entry, GenerationMode::Image2Video),
                Some("first/one.mp4".to_string())
            );
        }
    }

    #[test]
    fn descends_through_nested_arrays_and_objects() {
        let entry = json!({"status": "ok", "outputs": {"12": {"gifs": [
            {"meta": {"inner": {"s3_paths": ["deep/clip.mp4"]}}}
        ]}}});
        assert_eq!(
            find_artifact(&entry, GenerationMode::Image2Video),
            Some("deep/clip.mp4".to_string())
        );
    }

    #[test]
    fn missing_outputs_entirely_is_pending() {
        let entry = json!({"status": {"completed": false}});
        assert_eq!(find_artifact(&entry, GenerationMode::Text2Image), None);
        assert_eq!(find_artifact(&entry, GenerationMode::Image2Video), None);
    }
}
