use erupt::vk;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("vulkan call failed: {0:?}")]
    Vulkan(vk::Result),
    #[error("failed to load the vulkan library: {0}")]
    Loader(String),
    #[error("failed to create the vulkan instance: {0}")]
    Instance(String),
    #[error("no suitable device: {0}")]
    Device(String),
    #[error("no graphics queue that can present to the window")]
    MissingQueue,
    #[error("gpu allocation failed: {0}")]
    Allocation(#[from] gpu_alloc::AllocationError),
    #[error("gpu memory mapping failed: {0}")]
    Map(#[from] gpu_alloc::MapError),
    #[error("invalid shader binary: {0}")]
    Shader(#[from] std::io::Error),
    #[error("invalid shader entry point: {0}")]
    EntryPoint(#[from] std::ffi::FromBytesWithNulError),
}

impl From<vk::Result> for RenderError {
    fn from(result: vk::Result) -> Self {
        RenderError::Vulkan(result)
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
