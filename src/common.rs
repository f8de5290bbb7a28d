
mod bvr_box;
mod bvr_detection;
mod bvr_image;
mod detection_layout;
mod inference_device;
mod model_config;

pub use bvr_box::*;
pub use bvr_detection::*;
pub use bvr_image::*;
pub use detection_layout::*;
pub use inference_device::*;
pub use model_config::*;
