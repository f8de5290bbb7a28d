//! File/code adapted from https://github.com/jamjamjon/usls

use anyhow::Context;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider,
                          CoreMLExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::Session,
    tensor::{PrimitiveTensorElementType, TensorElementType},
    value::{DynValue, Tensor, ValueType},
};
use crate::common::{InferenceDevice, ModelConfig};
use crate::data::{InputLayout, InputSpec, InputType, Xs, X, CROSS_MARK};
use crate::detection_runners::inference_engine::InferenceEngine;
use crate::{BvrError, Result};

/// ONNX Runtime tensor attributes containing names, data types, and dimensions.
#[derive(Debug, Clone, Default)]
pub struct OrtTensorAttr {
    /// Tensor names.
    pub names: Vec<String>,
    /// Tensor data types.
    pub dtypes: Vec<TensorElementType>,
    /// Tensor dimensions for each tensor, dynamic dimensions are `-1`.
    pub dimss: Vec<Vec<i64>>,
}

impl OrtTensorAttr {
    fn push(&mut self, name: &str, value_type: &ValueType) -> anyhow::Result<()> {
        match value_type {
            ValueType::Tensor { ty, shape, .. } => {
                self.names.push(name.to_string());
                self.dtypes.push(*ty);
                self.dimss.push(shape.iter().copied().collect());
                Ok(())
            }
            other => anyhow::bail!("{CROSS_MARK} '{name}' is not a tensor: {other:?}"),
        }
    }

    fn from_value_types<'a>(values: impl Iterator<Item = (&'a str, &'a ValueType)>) -> anyhow::Result<Self> {
        let mut attrs = Self::default();
        for (name, value_type) in values {
            attrs.push(name, value_type)?;
        }
        Ok(attrs)
    }
}

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    inputs_attrs: OrtTensorAttr,
    outputs_attrs: OrtTensorAttr,
    input_spec: InputSpec,
}

impl OrtEngine {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        Self::init_runtime(config.ort_lib_path.as_deref())?;

        let mut builder = Session::builder()?;

        let mut device = config.inference_device;
        match device {
            InferenceDevice::TensorRT(device_id) => Self::build_trt(&mut builder, device_id)?,
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CoreML(_) => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => Self::build_cpu(&mut builder)?,
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.weights_path)
            .with_context(|| format!("Failed to load model from '{}'", config.weights_path))?;

        let inputs_attrs = OrtTensorAttr::from_value_types(session.inputs.iter().map(|x| (x.name.as_str(), &x.input_type)))?;
        let outputs_attrs = OrtTensorAttr::from_value_types(session.outputs.iter().map(|x| (x.name.as_str(), &x.output_type)))?;
        let input_spec = Self::input_spec_from_attrs(&inputs_attrs, config)?;

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} {:?} {}x{} | Outputs: {:?}",
            device,
            inputs_attrs.names[0],
            input_spec.ty,
            input_spec.layout,
            input_spec.width,
            input_spec.height,
            outputs_attrs.names,
        );

        Ok(Self {
            session,
            inputs_attrs,
            outputs_attrs,
            input_spec,
        })
    }

    /// Loads the ONNX Runtime shared library, from `ort_lib_path` if given, otherwise from
    /// `ORT_DYLIB_PATH` or the platform's default search path.
    fn init_runtime(ort_lib_path: Option<&str>) -> anyhow::Result<()> {
        let ort_init = match ort_lib_path {
            Some(path) => ort::init_from(path),
            None => ort::init(),
        };

        match ort_init.commit() {
            Ok(_) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("{CROSS_MARK} Failed to commit ORT: {:?}", e)),
        }
    }

    /// Works out element type, layout and resolution of the (single) image input.
    fn input_spec_from_attrs(attrs: &OrtTensorAttr, config: &ModelConfig) -> anyhow::Result<InputSpec> {
        let (name, dtype, dims) = match (attrs.names.first(), attrs.dtypes.first(), attrs.dimss.first()) {
            (Some(name), Some(dtype), Some(dims)) => (name, dtype, dims),
            _ => anyhow::bail!("{CROSS_MARK} Model has no tensor inputs"),
        };
        if attrs.names.len() > 1 {
            log::warn!("Model declares {} inputs, only '{}' is fed", attrs.names.len(), name);
        }

        let ty = match dtype {
            TensorElementType::Float32 => InputType::Float32,
            TensorElementType::Uint8 => InputType::Uint8,
            other => anyhow::bail!("{CROSS_MARK} Unsupported input type {:?} for '{}', expected float32 or uint8", other, name),
        };

        if dims.len() != 4 {
            anyhow::bail!("{CROSS_MARK} Expected a 4D image input for '{}', got {:?}", name, dims);
        }

        let (layout, h, w) = if dims[1] == 3 && dims[3] != 3 {
            (InputLayout::Nchw, dims[2], dims[3])
        } else {
            (InputLayout::Nhwc, dims[1], dims[2])
        };

        let pick = |dim: i64, fallback: u32| if dim > 0 { dim as u32 } else { fallback };
        let (width, height) = (pick(w, config.width), pick(h, config.height));
        if w <= 0 || h <= 0 {
            log::warn!("Input '{}' has dynamic spatial dims {:?}, using {}x{}", name, dims, width, height);
        }

        Ok(InputSpec::new(ty, layout, width, height).with_normalization(config.input_mean, config.input_std))
    }

    fn build_trt(builder: &mut SessionBuilder, device_id: usize) -> anyhow::Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(false)
            .with_engine_cache(true)
            .with_engine_cache_path("trt-cache");
        if trt.is_available()? {
            trt.register(builder)
                .map_err(|err| anyhow::anyhow!("{CROSS_MARK} TensorRT initialization failed: {:?}", err))?;
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> anyhow::Result<()> {
        let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
        if ep.is_available()? {
            ep.register(builder)
                .map_err(|err| anyhow::anyhow!("{CROSS_MARK} CUDA initialization failed: {:?}", err))?;
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> anyhow::Result<()> {
        let ep = CoreMLExecutionProvider::default().with_subgraphs(false);
        if ep.is_available()? {
            ep.register(builder)
                .map_err(|err| anyhow::anyhow!("{CROSS_MARK} CoreML initialization failed: {:?}", err))?;
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> anyhow::Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            ep.register(builder)
                .map_err(|err| anyhow::anyhow!("{CROSS_MARK} CPU initialization failed: {:?}", err))?;
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: X) -> Result<DynValue> {
        let x = match x {
            X::Float(x) => Tensor::from_array(x)?.into_dyn(),
            X::Quantized(x) => Tensor::from_array(x)?.into_dyn(),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + PrimitiveTensorElementType,
        {
            let view = x.try_extract_array::<T>()?;
            Ok(view.mapv(map_fn).into_owned())
        }

        match dtype {
            TensorElementType::Float32 => _extract_and_convert::<f32>(x, |x| x),
            TensorElementType::Float16 => _extract_and_convert::<f16>(x, f16::to_f32),
            TensorElementType::Bfloat16 => _extract_and_convert::<bf16>(x, bf16::to_f32),
            TensorElementType::Float64 => _extract_and_convert::<f64>(x, |x| x as f32),
            TensorElementType::Int64 => _extract_and_convert::<i64>(x, |x| x as f32),
            TensorElementType::Int32 => _extract_and_convert::<i32>(x, |x| x as f32),
            TensorElementType::Int16 => _extract_and_convert::<i16>(x, |x| x as f32),
            TensorElementType::Int8 => _extract_and_convert::<i8>(x, |x| x as f32),
            TensorElementType::Uint64 => _extract_and_convert::<u64>(x, |x| x as f32),
            TensorElementType::Uint32 => _extract_and_convert::<u32>(x, |x| x as f32),
            TensorElementType::Uint16 => _extract_and_convert::<u16>(x, |x| x as f32),
            TensorElementType::Uint8 => _extract_and_convert::<u8>(x, |x| x as f32),
            TensorElementType::Bool => _extract_and_convert::<bool>(x, |x| x as u8 as f32),
            _ => Err(BvrError::OutputShape(format!("unsupported ort tensor type: {:?}", dtype))),
        }
    }
}

impl InferenceEngine for OrtEngine {
    fn input_spec(&self) -> &InputSpec {
        &self.input_spec
    }

    fn output_names(&self) -> &[String] {
        &self.outputs_attrs.names
    }

    fn engine_run(&mut self, x: X) -> Result<Xs> {
        let input = Self::tensor_preprocess(x)?;
        let outputs = self.session.run(ort::inputs![self.inputs_attrs.names[0].as_str() => input])?;

        // extract
        let mut ys = Xs::new();
        for (dtype, name) in self.outputs_attrs.dtypes.iter().zip(self.outputs_attrs.names.iter()) {
            let y = Self::tensor_postprocess(&outputs[name.as_str()], dtype)?;
            ys.push_kv(name, y);
        }

        Ok(ys)
    }
}
