use std::time::{Duration, Instant};
use crate::data::{Xs, X};
use crate::utils;
use crate::Result;

/// The three stages every detector goes through for one input.
pub trait InferenceProcess {
    type Input;
    type Output;

    /// Pre-process the input data.
    fn preprocess(&self, x: &Self::Input) -> Result<X>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, x: X) -> Result<Xs>;

    /// Post-process the model's output.
    fn postprocess(&self, xs: Xs, x0: &Self::Input) -> Result<Self::Output>;

    /// Called with the elapsed time of stage `i` (0 preprocess, 1 inference, 2 postprocess).
    fn record_stage(&mut self, _i: usize, _elapsed: Duration) {}

    /// Executes the full pipeline.
    fn run(&mut self, x: &Self::Input) -> Result<Self::Output> {
        let ys = self.preprocess(x)?;
        let ys = self.inference(ys)?;
        let ys = self.postprocess(ys, x)?;
        Ok(ys)
    }

    /// Executes the full pipeline, timing each stage.
    fn forward(&mut self, x: &Self::Input, profile: bool) -> Result<Self::Output> {
        let detect_time = Instant::now();
        let mut prev_elapsed = Duration::ZERO;

        let t_pre = Instant::now();
        let ys = self.preprocess(x)?;
        let t_pre = t_pre.elapsed();
        prev_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, prev_elapsed);

        let t_exe = Instant::now();
        let ys = self.inference(ys)?;
        let t_exe = t_exe.elapsed();
        prev_elapsed = utils::trace("TIME", "Detection run", detect_time, prev_elapsed);

        let t_post = Instant::now();
        let ys = self.postprocess(ys, x)?;
        let t_post = t_post.elapsed();
        utils::trace("TIME", "Postprocessing", detect_time, prev_elapsed);

        self.record_stage(0, t_pre);
        self.record_stage(1, t_exe);
        self.record_stage(2, t_post);

        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(ys)
    }
}
