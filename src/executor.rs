use crate::model::{MediaClip, OutputOptions};

/// Everything an execution backend needs to run one compiled composition:
/// the inputs in index-assignment order, the filter-graph program that
/// indexes them, and the output options.
#[derive(Clone, Debug)]
pub struct TransformRequest {
    pub clips: Vec<MediaClip>,
    pub filter_graph: String,
    pub output: OutputOptions,
}

/// External execution capability consumed by
/// [`CompositionBuilder::transform`](crate::builder::CompositionBuilder::transform).
///
/// Implementors own the transport (process spawn, HTTP, ...), any timeout
/// or cancellation policy, and the decoding of the inputs. Failures are
/// propagated to the caller unmodified; clip buffers stay owned by the
/// caller throughout.
pub trait TransformExecutor {
    fn execute(&self, request: TransformRequest) -> anyhow::Result<MediaClip>;
}
