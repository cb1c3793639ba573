//! URL resolution for the fixed object-storage bucket.
//!
//! Uploads themselves happen elsewhere; this service only needs to turn a
//! bare file name or an artifact key reported by ComfyUI into the public URL
//! the bucket serves it under.

#[derive(Clone)]
pub struct ArtifactResolver {
    base_url: String,
    source_prefix: String,
}

impl ArtifactResolver {
    pub fn new(base_url: &str, source_prefix: &str) -> Self {
        ArtifactResolver {
            base_url: base_url.trim_end_matches('/').to_string(),
            source_prefix: source_prefix.trim_matches('/').to_string(),
        }
    }

    /// Public URL of an uploaded source image, given its bare file name.
    pub fn source_image_url(&self, file_name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.source_prefix, file_name)
    }

    /// Public URL of a generated artifact, given the storage key ComfyUI
    /// reported (e.g. an `s3_paths` entry).
    pub fn artifact_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_image_url_joins_prefix() {
        let r = ArtifactResolver::new("https://bucket.example/", "/gen/txt2img/");
        assert_eq!(
            r.source_image_url("scene_004.png"),
            "https://bucket.example/gen/txt2img/scene_004.png"
        );
    }

    #[test]
    fn artifact_url_tolerates_leading_slash() {
        let r = ArtifactResolver::new("https://bucket.example", "gen/txt2img");
        assert_eq!(r.artifact_url("/gen/video/a.mp4"), "https://bucket.example/gen/video/a.mp4");
        assert_eq!(r.artifact_url("gen/video/a.mp4"), "https://bucket.example/gen/video/a.mp4");
    }
}
