use crate::data::{InputSpec, Xs, X};
use crate::Result;

/// A loaded model that takes one image tensor and returns all of its outputs.
///
/// [`crate::detection_runners::OrtEngine`] is the production implementation.
pub trait InferenceEngine {
    /// Shape, layout and element type of the image input, fixed at load time.
    fn input_spec(&self) -> &InputSpec;

    /// Names of the model outputs, in declaration order.
    fn output_names(&self) -> &[String];

    /// Runs one forward pass.
    fn engine_run(&mut self, x: X) -> Result<Xs>;
}
