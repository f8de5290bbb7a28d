mod frame_line;
mod label_map;
mod output_line;
mod time_calc;

pub use frame_line::{encode_frame_line, FrameLine};
pub use label_map::LabelMap;
pub use output_line::OutputLine;
pub use time_calc::TimeCalc;

pub use crate::detection_runners::ort_detector::image_ops::{InputLayout, InputSpec, InputType};
pub use crate::detection_runners::ort_detector::input_wrapper::X;
pub use crate::detection_runners::ort_detector::xs::Xs;

pub(crate) const CROSS_MARK: &str = "❌";
