use crate::{
    error::FramestackResult,
    model::{CompiledProgram, CompositionState, OverlayOptions},
    size::{Axis, fmt_num},
};

const PIXEL_FORMAT: &str = "yuva420p";
const CONCAT_VIDEO_LABEL: &str = "concatenated_video";
const CONCAT_AUDIO_LABEL: &str = "concatenated_audio";

/// Disposable-label counter owned by a single compilation call, so the
/// numbering never leaks between compiles.
struct LabelGen {
    next_tmp: usize,
}

impl LabelGen {
    fn new() -> Self {
        Self { next_tmp: 0 }
    }

    fn tmp(&mut self) -> String {
        let label = format!("tmp{}", self.next_tmp);
        self.next_tmp += 1;
        label
    }
}

/// Input index bookkeeping. The assignment law is total and fixed:
/// prepend clips first, then main, then overlay (list order), then append.
struct InputPlan {
    prepend: usize,
    main: usize,
    overlays: usize,
    append: usize,
}

impl InputPlan {
    fn of(state: &CompositionState) -> Self {
        Self {
            prepend: state.prepend_clips.len(),
            main: state.main_clips.len(),
            overlays: state.overlays.len(),
            append: state.append_clips.len(),
        }
    }

    fn main_index(&self, i: usize) -> usize {
        self.prepend + i
    }

    fn overlay_index(&self, j: usize) -> usize {
        self.prepend + self.main + j
    }

    fn append_index(&self, i: usize) -> usize {
        self.prepend + self.main + self.overlays + i
    }
}

/// Compile a composition into a filter-graph program.
///
/// Pure and idempotent: the same state always yields byte-identical text,
/// and `ordered_inputs` matches the index assumptions baked into it.
/// Mode is selected by the presence of prepend/append clips: with either
/// present, the sequential clips are concatenated first and overlays
/// compose on the concatenation result; otherwise overlays fold directly
/// onto the first main clip.
#[tracing::instrument(skip(state))]
pub fn compile(state: &CompositionState) -> FramestackResult<CompiledProgram> {
    state.validate()?;

    let plan = InputPlan::of(state);
    let mut stmts = Vec::<String>::new();

    if state.prepend_clips.is_empty() && state.append_clips.is_empty() {
        compile_simple(state, &plan, &mut stmts);
    } else {
        compile_concatenation(state, &plan, &mut stmts);
    }

    stmts.extend(state.custom_filters.iter().cloned());

    Ok(CompiledProgram {
        filter_graph: stmts.join(";\n"),
        ordered_inputs: state.ordered_inputs(),
    })
}

fn compile_simple(state: &CompositionState, plan: &InputPlan, stmts: &mut Vec<String>) {
    let out = &state.output;

    for i in 0..plan.main {
        stmts.push(format!(
            "[{}:v]format=pix_fmts={PIXEL_FORMAT}[base{i}]",
            plan.main_index(i)
        ));
    }

    if state.overlays.is_empty() {
        // No overlay chain: base0 and the first main audio stream pass
        // straight through to the output labels.
        stmts.push(format!("[base0]copy[{}]", out.video_label));
        if out.custom_audio_mapping {
            stmts.push(format!(
                "[{}:a]acopy[{}]",
                plan.main_index(0),
                out.audio_label
            ));
        }
        return;
    }

    // Only base0 feeds the overlay fold; additional main clips are indexed
    // and normalized but not composited.
    fold_overlays(state, plan, stmts, "base0", true);

    if out.custom_audio_mapping {
        let mut refs = String::new();
        for i in 0..plan.main {
            refs.push_str(&format!("[{}:a]", plan.main_index(i)));
        }
        for j in 0..plan.overlays {
            refs.push_str(&format!("[{}:a]", plan.overlay_index(j)));
        }
        stmts.push(format!(
            "{refs}amix=inputs={}:duration=longest:normalize=0[{}]",
            plan.main + plan.overlays,
            out.audio_label
        ));
    }
}

fn compile_concatenation(state: &CompositionState, plan: &InputPlan, stmts: &mut Vec<String>) {
    let out = &state.output;
    let with_audio = out.custom_audio_mapping;

    // Sequential play order: prepend, main, append. Overlays compose on
    // the concatenation result and never join the sequence.
    let mut sequence = Vec::with_capacity(plan.prepend + plan.main + plan.append);
    sequence.extend(0..plan.prepend);
    sequence.extend((0..plan.main).map(|i| plan.main_index(i)));
    sequence.extend((0..plan.append).map(|i| plan.append_index(i)));

    if sequence.len() > 1 {
        let mut refs = String::new();
        for idx in &sequence {
            refs.push_str(&format!("[{idx}:v]"));
            if with_audio {
                refs.push_str(&format!("[{idx}:a]"));
            }
        }
        let mut stage = format!(
            "{refs}concat=n={}:v=1:a={}[{CONCAT_VIDEO_LABEL}]",
            sequence.len(),
            u8::from(with_audio)
        );
        if with_audio {
            stage.push_str(&format!("[{CONCAT_AUDIO_LABEL}]"));
        }
        stmts.push(stage);
    } else {
        // Single-clip fallback reads input 0, not the lone sequential
        // clip's assigned index.
        stmts.push(format!(
            "[0:v]format=pix_fmts={PIXEL_FORMAT}[{CONCAT_VIDEO_LABEL}]"
        ));
        if with_audio {
            stmts.push(format!("[0:a]acopy[{CONCAT_AUDIO_LABEL}]"));
        }
    }

    if state.overlays.is_empty() {
        stmts.push(format!("[{CONCAT_VIDEO_LABEL}]copy[{}]", out.video_label));
    } else {
        // Start-time padding only applies in simple mode.
        fold_overlays(state, plan, stmts, CONCAT_VIDEO_LABEL, false);
    }

    if with_audio {
        if plan.overlays == 0 {
            stmts.push(format!("[{CONCAT_AUDIO_LABEL}]acopy[{}]", out.audio_label));
        } else {
            let mut refs = format!("[{CONCAT_AUDIO_LABEL}]");
            for j in 0..plan.overlays {
                refs.push_str(&format!("[{}:a]", plan.overlay_index(j)));
            }
            stmts.push(format!(
                "{refs}amix=inputs={}:duration=longest:normalize=0[{}]",
                plan.overlays + 1,
                out.audio_label
            ));
        }
    }
}

/// Fold the overlay list left-to-right onto a running base label. The
/// last overlay binds the configured video output label; intermediates
/// get disposable `tmp{i}` labels. Must only be called with a non-empty
/// overlay list.
fn fold_overlays(
    state: &CompositionState,
    plan: &InputPlan,
    stmts: &mut Vec<String>,
    first_base: &str,
    with_start_pad: bool,
) {
    let out = &state.output;
    let mut labels = LabelGen::new();
    let mut current = first_base.to_string();
    let last = state.overlays.len() - 1;

    for (j, overlay) in state.overlays.iter().enumerate() {
        let input = plan.overlay_index(j);

        let chain = preprocess_chain(&overlay.options, with_start_pad);
        let src = if chain.is_empty() {
            format!("[{input}:v]")
        } else {
            let label = format!("ovl{j}");
            stmts.push(format!("[{input}:v]{}[{label}]", chain.join(",")));
            format!("[{label}]")
        };

        let target = if j == last {
            out.video_label.clone()
        } else {
            labels.tmp()
        };
        stmts.push(format!(
            "[{current}]{src}{}[{target}]",
            overlay_stage(&overlay.options)
        ));
        current = target;
    }
}

/// Per-overlay preprocessing: start pad, chroma-key, scale. Each part is
/// optional; the parts chain with `,` into one statement.
fn preprocess_chain(opts: &OverlayOptions, with_start_pad: bool) -> Vec<String> {
    let mut chain = Vec::new();

    if with_start_pad
        && let Some(start) = opts.start_time
        && start > 0.0
    {
        chain.push(format!(
            "tpad=start_duration={}:color=black@0.0",
            fmt_num(start)
        ));
        chain.push("setpts=PTS-STARTPTS".to_string());
    }

    if let Some(key) = &opts.chroma_key {
        chain.push(format!(
            "colorkey=color={}:similarity={}:blend={}",
            normalize_color(&key.color),
            fmt_num(key.similarity),
            fmt_num(key.blend)
        ));
    }

    let w = opts.width.resolve(Axis::Width);
    let h = opts.height.resolve(Axis::Height);
    if w.is_some() || h.is_some() {
        let mut args = Vec::new();
        if let Some(w) = w {
            args.push(format!("w={w}"));
        }
        if let Some(h) = h {
            args.push(format!("h={h}"));
        }
        chain.push(format!("scale={}", args.join(":")));
    }

    chain
}

fn overlay_stage(opts: &OverlayOptions) -> String {
    let (x, y) = opts.position.resolve();
    let mut stage = format!("overlay=x={x}:y={y}");

    if opts.opacity < 1.0 {
        stage.push_str(&format!(":alpha={}", fmt_num(opts.opacity)));
    }
    if let Some(window) = enable_window(opts) {
        stage.push_str(&format!(":enable='{window}'"));
    }

    stage
}

/// Time window over which an overlay is composited. A duration with no
/// start time begins at t=0.
fn enable_window(opts: &OverlayOptions) -> Option<String> {
    match (opts.start_time, opts.duration) {
        (Some(s), Some(d)) => Some(format!("between(t,{},{})", fmt_num(s), fmt_num(s + d))),
        (Some(s), None) => Some(format!("gte(t,{})", fmt_num(s))),
        (None, Some(d)) => Some(format!("between(t,0,{})", fmt_num(d))),
        (None, None) => None,
    }
}

/// The backend rejects `#` inside filter arguments; hex colors go out as
/// `0xRRGGBB`.
fn normalize_color(color: &str) -> String {
    match color.strip_prefix('#') {
        Some(hex) => format!("0x{hex}"),
        None => color.to_string(),
    }
}
