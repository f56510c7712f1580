use std::sync::Arc;

use crate::{
    error::{FramestackError, FramestackResult},
    position::Position,
    size::SizeSpec,
};

/// Opaque handle to a decodable media asset: encoded bytes plus a format
/// tag (`"mp4"`, `"webm"`, ...). The compiler never inspects the content,
/// only positional identity; cloning shares the buffer.
#[derive(Clone)]
pub struct MediaClip {
    data: Arc<[u8]>,
    format: String,
}

impl MediaClip {
    pub fn new(data: impl Into<Arc<[u8]>>, format: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: format.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl std::fmt::Debug for MediaClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaClip")
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PartialEq for MediaClip {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

/// Chroma-key removal parameters: key out `color` within `similarity`,
/// feathered by `blend`. Thresholds default to 0.1.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChromaKey {
    pub color: String,
    pub similarity: f64,
    pub blend: f64,
}

impl ChromaKey {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            similarity: 0.1,
            blend: 0.1,
        }
    }

    pub fn similarity(mut self, similarity: f64) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn blend(mut self, blend: f64) -> Self {
        self.blend = blend;
        self
    }
}

/// Placement, timing and processing options for one overlay clip.
///
/// `fade_in`, `fade_out` and `blend_mode` are accepted and carried through
/// the state but not yet consumed by the compiler.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayOptions {
    pub position: Position,
    pub width: SizeSpec,
    pub height: SizeSpec,
    /// Seconds into the base at which the overlay becomes visible.
    pub start_time: Option<f64>,
    /// Seconds the overlay stays visible once shown.
    pub duration: Option<f64>,
    /// 0..1; values below 1 emit an alpha argument on the overlay stage.
    pub opacity: f64,
    pub chroma_key: Option<ChromaKey>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub blend_mode: Option<String>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            position: Position::default(),
            width: SizeSpec::Unconstrained,
            height: SizeSpec::Unconstrained,
            start_time: None,
            duration: None,
            opacity: 1.0,
            chroma_key: None,
            fade_in: None,
            fade_out: None,
            blend_mode: None,
        }
    }
}

/// One overlay layer. List order is significant: it fixes both layering
/// order and audio-mix source order.
#[derive(Clone, Debug)]
pub struct OverlaySpec {
    pub clip: MediaClip,
    pub options: OverlayOptions,
}

/// Output-side knobs for a compilation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputOptions {
    pub format: String,
    /// Label the final video-chain stage binds to.
    pub video_label: String,
    /// Label the final audio stage binds to when mixing is enabled.
    pub audio_label: String,
    /// When false, no audio statements are emitted at all.
    pub custom_audio_mapping: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: "mp4".to_string(),
            video_label: "final_video".to_string(),
            audio_label: "mixed_audio".to_string(),
            custom_audio_mapping: true,
        }
    }
}

/// The full declarative composition: three ordered clip buckets, the
/// overlay list, verbatim custom filter fragments, and output options.
#[derive(Clone, Debug, Default)]
pub struct CompositionState {
    pub main_clips: Vec<MediaClip>,
    pub prepend_clips: Vec<MediaClip>,
    pub append_clips: Vec<MediaClip>,
    pub overlays: Vec<OverlaySpec>,
    pub custom_filters: Vec<String>,
    pub output: OutputOptions,
}

impl CompositionState {
    /// At least one clip must exist across main/prepend/append before any
    /// filter text can be generated.
    pub fn validate(&self) -> FramestackResult<()> {
        if self.main_clips.is_empty() && self.prepend_clips.is_empty() && self.append_clips.is_empty()
        {
            return Err(FramestackError::validation(
                "composition has no clips: add at least one main, prepend or append clip",
            ));
        }
        Ok(())
    }

    /// All inputs in index-assignment order: prepend, main, overlay (list
    /// order), append. Input N of the compiled text is element N here.
    pub fn ordered_inputs(&self) -> Vec<MediaClip> {
        let mut inputs =
            Vec::with_capacity(self.prepend_clips.len() + self.main_clips.len() + self.overlays.len() + self.append_clips.len());
        inputs.extend(self.prepend_clips.iter().cloned());
        inputs.extend(self.main_clips.iter().cloned());
        inputs.extend(self.overlays.iter().map(|o| o.clip.clone()));
        inputs.extend(self.append_clips.iter().cloned());
        inputs
    }
}

/// Result of a compilation: the filter-graph program and the inputs it
/// indexes, in exactly the order the text assumes.
#[derive(Clone, Debug)]
pub struct CompiledProgram {
    pub filter_graph: String,
    pub ordered_inputs: Vec<MediaClip>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(tag: &str) -> MediaClip {
        MediaClip::new(tag.as_bytes().to_vec(), "mp4")
    }

    #[test]
    fn empty_state_fails_validation() {
        let state = CompositionState::default();
        let err = state.validate().unwrap_err();
        assert!(err.to_string().contains("no clips"));
    }

    #[test]
    fn overlay_only_state_fails_validation() {
        let state = CompositionState {
            overlays: vec![OverlaySpec {
                clip: clip("ov"),
                options: OverlayOptions::default(),
            }],
            ..Default::default()
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn ordered_inputs_follow_the_index_assignment_law() {
        let state = CompositionState {
            main_clips: vec![clip("m0"), clip("m1")],
            prepend_clips: vec![clip("p0")],
            append_clips: vec![clip("a0")],
            overlays: vec![OverlaySpec {
                clip: clip("o0"),
                options: OverlayOptions::default(),
            }],
            ..Default::default()
        };

        let inputs = state.ordered_inputs();
        let tags: Vec<&[u8]> = inputs.iter().map(|c| c.data()).collect();
        assert_eq!(tags, vec![&b"p0"[..], b"m0", b"m1", b"o0", b"a0"]);
    }

    #[test]
    fn overlay_options_defaults_match_contract() {
        let opts = OverlayOptions::default();
        assert_eq!(opts.opacity, 1.0);
        assert!(opts.width.is_unconstrained());
        assert!(opts.height.is_unconstrained());
        assert_eq!(opts.position, crate::position::Position::Custom { x: 0.0, y: 0.0 });
        assert!(opts.chroma_key.is_none());
    }

    #[test]
    fn output_options_defaults_match_contract() {
        let out = OutputOptions::default();
        assert_eq!(out.video_label, "final_video");
        assert_eq!(out.audio_label, "mixed_audio");
        assert!(out.custom_audio_mapping);
    }

    #[test]
    fn chroma_key_thresholds_default_to_tenth() {
        let key = ChromaKey::new("#00ff00");
        assert_eq!(key.similarity, 0.1);
        assert_eq!(key.blend, 0.1);
        let tuned = ChromaKey::new("#00ff00").similarity(0.3).blend(0.05);
        assert_eq!(tuned.similarity, 0.3);
        assert_eq!(tuned.blend, 0.05);
    }

    #[test]
    fn overlay_options_json_roundtrip() {
        let opts = OverlayOptions {
            position: crate::position::Position::BottomRight,
            width: SizeSpec::Percent(0.25),
            start_time: Some(2.0),
            duration: Some(5.0),
            opacity: 0.8,
            chroma_key: Some(ChromaKey::new("#000000")),
            ..Default::default()
        };
        let s = serde_json::to_string(&opts).unwrap();
        let de: OverlayOptions = serde_json::from_str(&s).unwrap();
        assert_eq!(de, opts);
    }

    #[test]
    fn media_clip_debug_does_not_dump_bytes() {
        let c = MediaClip::new(vec![0u8; 4096], "mp4");
        let dbg = format!("{c:?}");
        assert!(dbg.contains("4096"));
        assert!(dbg.len() < 100);
    }
}
