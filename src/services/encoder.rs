//! CLIP image encoder backed by ONNX Runtime.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array4;
use ort::execution_providers::{CUDAExecutionProvider, ExecutionProvider};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use crate::error::{EncodingError, ModelError};
use crate::models::{DeviceKind, EmbeddingConfig};
use crate::services::preprocess::{ImageFetcher, preprocess};

/// File name of the exported visual tower inside the model directory.
pub const MODEL_FILE: &str = "visual.onnx";

/// Environment variable naming the ONNX Runtime shared library.
pub const ORT_DYLIB_ENV: &str = "ORT_DYLIB_PATH";

/// Turns an image URL into a unit-length embedding.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode(&self, image_url: &str) -> Result<Vec<f32>, EncodingError>;

    fn dimension(&self) -> usize;
}

/// Compute device picked once when the model is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn resolve(preference: DeviceKind) -> Result<Self, ModelError> {
        Self::resolve_with(preference, cuda_available)
    }

    fn resolve_with<F>(preference: DeviceKind, cuda: F) -> Result<Self, ModelError>
    where
        F: Fn() -> bool,
    {
        match preference {
            DeviceKind::Cpu => Ok(Device::Cpu),
            DeviceKind::Cuda if cuda() => Ok(Device::Cuda),
            DeviceKind::Cuda => Err(ModelError::LoadError(
                "CUDA execution provider is not available".to_string(),
            )),
            DeviceKind::Auto if cuda() => Ok(Device::Cuda),
            DeviceKind::Auto => Ok(Device::Cpu),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

/// Path of the ONNX Runtime library, if `ORT_DYLIB_PATH` points at an existing file.
///
/// With `load-dynamic`, ort panics on first use when the library cannot be
/// opened, so nothing may touch ort before this returns `Some`.
pub fn runtime_library() -> Option<PathBuf> {
    std::env::var_os(ORT_DYLIB_ENV)
        .map(PathBuf::from)
        .filter(|path| path.is_file())
}

fn cuda_available() -> bool {
    runtime_library().is_some()
        && CUDAExecutionProvider::default()
            .is_available()
            .unwrap_or(false)
}

fn locate_model(model_dir: &Path) -> Result<PathBuf, ModelError> {
    let model_path = model_dir.join(MODEL_FILE);
    if !model_path.exists() {
        return Err(ModelError::NotFound(model_path.display().to_string()));
    }
    Ok(model_path)
}

/// The visual tower of a CLIP model.
pub struct OnnxImageModel {
    session: Mutex<Session>,
    dimension: usize,
    image_size: u32,
}

impl OnnxImageModel {
    pub fn load(
        config: &EmbeddingConfig,
        model_dir: &Path,
        device: Device,
    ) -> Result<Self, ModelError> {
        let model_path = locate_model(model_dir)?;

        if runtime_library().is_none() {
            return Err(ModelError::LoadError(format!(
                "ONNX Runtime library not found; set {} to libonnxruntime",
                ORT_DYLIB_ENV
            )));
        }

        let mut builder = Session::builder()
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?
            .with_intra_threads(num_cpus())
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?;

        if device == Device::Cuda {
            builder = builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?;
        }

        let session = builder
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            dimension: config.dimension as usize,
            image_size: config.image_size,
        })
    }

    /// Run one forward pass over a `(1, 3, H, W)` tensor.
    pub fn embed(&self, pixels: Array4<f32>) -> Result<Vec<f32>, ModelError> {
        let input = Tensor::from_array(pixels)
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::InferenceError("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        let shape = output_array.shape();
        if shape.last().copied() != Some(self.dimension) {
            return Err(ModelError::InferenceError(format!(
                "unexpected output shape {:?}, expected embedding dimension {}",
                shape, self.dimension
            )));
        }

        // [batch, dim] for projected image embeds, [batch, tokens, dim] for raw hidden states
        let embedding: Vec<f32> = match shape.len() {
            2 => (0..self.dimension).map(|d| output_array[[0, d]]).collect(),
            3 => (0..self.dimension)
                .map(|d| output_array[[0, 0, d]])
                .collect(),
            _ => {
                return Err(ModelError::InferenceError(format!(
                    "unexpected output shape: {:?}",
                    shape
                )));
            }
        };

        Ok(normalize(&embedding))
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn image_size(&self) -> u32 {
        self.image_size
    }
}

/// Downloads an image, preprocesses it and runs the CLIP visual tower.
pub struct ClipImageEncoder {
    fetcher: ImageFetcher,
    model: OnnxImageModel,
}

impl ClipImageEncoder {
    pub fn load(config: &EmbeddingConfig, model_dir: &Path) -> Result<Self, ModelError> {
        locate_model(model_dir)?;
        let device = Device::resolve(config.device)?;
        let model = OnnxImageModel::load(config, model_dir, device)?;
        let fetcher = ImageFetcher::new(config.timeout_secs)
            .map_err(|e| ModelError::LoadError(e.to_string()))?;

        tracing::info!(
            model = %config.model_id,
            device = %device,
            dimension = model.dimension(),
            "image encoder loaded"
        );

        Ok(Self { fetcher, model })
    }
}

#[async_trait]
impl ImageEncoder for ClipImageEncoder {
    async fn encode(&self, image_url: &str) -> Result<Vec<f32>, EncodingError> {
        let bytes = self.fetcher.fetch(image_url).await?;
        let pixels = preprocess(&bytes, self.model.image_size())?;
        Ok(self.model.embed(pixels)?)
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }
}

/// Scale `v` to unit L2 norm. A zero vector is returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l2(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_normalize_unit_norm() {
        let v = normalize(&[3.0, 4.0, 12.0, -0.5]);
        assert!((l2(&v) - 1.0).abs() < 1e-5);
        assert!((v[0] / v[1] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_cpu_device_always_resolves() {
        assert_eq!(Device::resolve(DeviceKind::Cpu).unwrap(), Device::Cpu);
    }

    #[test]
    fn test_missing_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxImageModel::load(&EmbeddingConfig::default(), dir.path(), Device::Cpu);
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_missing_model_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let err = match OnnxImageModel::load(&EmbeddingConfig::default(), dir.path(), Device::Cpu) {
            Err(e) => e,
            Ok(_) => panic!("expected missing model"),
        };
        let expected = dir.path().join(MODEL_FILE).display().to_string();
        assert_eq!(err.to_string(), format!("model not found: {}", expected));
    }

    #[test]
    fn test_encoder_load_checks_model_before_device() {
        let dir = tempfile::tempdir().unwrap();
        let config = EmbeddingConfig {
            device: DeviceKind::Auto,
            ..Default::default()
        };
        let result = ClipImageEncoder::load(&config, dir.path());
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_auto_device_does_not_panic_without_runtime() {
        let result = std::panic::catch_unwind(|| Device::resolve(DeviceKind::Auto));
        let resolved = result.expect("device resolution panicked");
        if runtime_library().is_none() {
            assert_eq!(resolved.unwrap(), Device::Cpu);
        }
    }

    #[test]
    fn test_resolve_without_cuda() {
        assert_eq!(
            Device::resolve_with(DeviceKind::Auto, || false).unwrap(),
            Device::Cpu
        );
        assert!(matches!(
            Device::resolve_with(DeviceKind::Cuda, || false),
            Err(ModelError::LoadError(_))
        ));
        assert_eq!(
            Device::resolve_with(DeviceKind::Auto, || true).unwrap(),
            Device::Cuda
        );
    }
}
