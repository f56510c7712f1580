use crate::{
    compile::compile,
    error::{FramestackError, FramestackResult},
    executor::{TransformExecutor, TransformRequest},
    model::{CompiledProgram, CompositionState, MediaClip, OutputOptions, OverlayOptions, OverlaySpec},
};

type FilterListener = Box<dyn FnMut(&CompiledProgram) + Send>;
type ValidationListener = Box<dyn FnMut(&ValidationReport) + Send>;

/// Outcome of [`CompositionBuilder::validate`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Fluent, mutable wrapper over a [`CompositionState`].
///
/// Every mutator updates the state, returns the builder, and synchronously
/// re-runs the compiler so a registered filter listener sees the program
/// as it evolves. Errors from these speculative recompiles never surface:
/// mid-construction the state is allowed to be transiently incomplete
/// (an overlay added before any main clip, say).
///
/// A builder instance carries no internal locking; callers serialize
/// access. [`transform`](Self::transform) is the only effectful method.
#[derive(Default)]
pub struct CompositionBuilder {
    state: CompositionState,
    on_filter_changed: Option<FilterListener>,
    on_validation_changed: Option<ValidationListener>,
}

impl CompositionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip to the main bucket.
    pub fn compose(&mut self, clip: MediaClip) -> &mut Self {
        self.state.main_clips.push(clip);
        self.notify_filter_changed();
        self
    }

    /// Add a lead-in clip, played before the main stream.
    pub fn prepend(&mut self, clip: MediaClip) -> &mut Self {
        self.state.prepend_clips.push(clip);
        self.notify_filter_changed();
        self
    }

    /// Add a lead-out clip, played after the main stream.
    pub fn append(&mut self, clip: MediaClip) -> &mut Self {
        self.state.append_clips.push(clip);
        self.notify_filter_changed();
        self
    }

    /// Add an overlay layer. Call order fixes layering and audio-mix order.
    pub fn add_overlay(&mut self, clip: MediaClip, options: OverlayOptions) -> &mut Self {
        self.state.overlays.push(OverlaySpec { clip, options });
        self.notify_filter_changed();
        self
    }

    /// Append a raw filter fragment, emitted verbatim after the generated
    /// statements.
    pub fn add_custom_filter(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.state.custom_filters.push(fragment.into());
        self.notify_filter_changed();
        self
    }

    pub fn set_output_options(&mut self, options: OutputOptions) -> &mut Self {
        self.state.output = options;
        self.notify_filter_changed();
        self
    }

    /// Register a listener invoked with the recompiled program after every
    /// successful speculative recompile.
    pub fn on_filter_changed(&mut self, listener: impl FnMut(&CompiledProgram) + Send + 'static) -> &mut Self {
        self.on_filter_changed = Some(Box::new(listener));
        self
    }

    /// Register a listener invoked with each [`ValidationReport`].
    pub fn on_validation_changed(&mut self, listener: impl FnMut(&ValidationReport) + Send + 'static) -> &mut Self {
        self.on_validation_changed = Some(Box::new(listener));
        self
    }

    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Compile the current state. Read-only; freely repeatable.
    pub fn compile(&self) -> FramestackResult<CompiledProgram> {
        compile(&self.state)
    }

    /// Check the composition invariants without mutating anything, and
    /// notify the validation listener.
    pub fn validate(&mut self) -> ValidationReport {
        let report = match self.state.validate() {
            Ok(()) => ValidationReport {
                valid: true,
                errors: Vec::new(),
            },
            Err(err) => ValidationReport {
                valid: false,
                errors: vec![err.to_string()],
            },
        };
        if let Some(listener) = self.on_validation_changed.as_mut() {
            listener(&report);
        }
        report
    }

    /// Restore the initial empty state. Listeners stay registered.
    pub fn reset(&mut self) -> &mut Self {
        self.state = CompositionState::default();
        self
    }

    /// Revalidate, compile, and hand the compiled artifact to the
    /// execution capability. The capability's failure is propagated
    /// unmodified; clip buffers remain owned by the caller.
    pub fn transform(&mut self, executor: &dyn TransformExecutor) -> FramestackResult<MediaClip> {
        let report = self.validate();
        if !report.valid {
            return Err(FramestackError::validation(report.errors.join("; ")));
        }

        let program = compile(&self.state)?;
        let request = TransformRequest {
            clips: program.ordered_inputs,
            filter_graph: program.filter_graph,
            output: self.state.output.clone(),
        };
        executor.execute(request).map_err(FramestackError::Execution)
    }

    /// Speculative recompile after a mutation. The state may be transiently
    /// invalid here, so errors are dropped.
    fn notify_filter_changed(&mut self) {
        let Some(listener) = self.on_filter_changed.as_mut() else {
            return;
        };
        match compile(&self.state) {
            Ok(program) => listener(&program),
            Err(err) => tracing::debug!(%err, "speculative recompile failed mid-construction"),
        }
    }
}
