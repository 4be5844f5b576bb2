use crate::error::RenderResult;
use erupt::{vk, DeviceLoader};
use std::ffi::CStr;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shader {
    Strokes,
    Ui,
}

const STROKES_BYTES: &[u8] = include_bytes!(env!("strokes.spv"));
const UI_BYTES: &[u8] = include_bytes!(env!("ui.spv"));

pub const VERTEX_ENTRY_POINT: &str = "main_vs\0";
pub const FRAGMENT_ENTRY_POINT: &str = "main_fs\0";

impl Shader {
    fn bytes(self) -> &'static [u8] {
        match self {
            Shader::Strokes => STROKES_BYTES,
            Shader::Ui => UI_BYTES,
        }
    }
}

pub struct ShaderModule {
    handle: vk::ShaderModule,
}

impl ShaderModule {
    pub fn new(device: &DeviceLoader, shader: Shader) -> RenderResult<Self> {
        let code = erupt::utils::decode_spv(shader.bytes())?;
        let module_info = vk::ShaderModuleCreateInfoBuilder::new().code(&code);
        let handle = unsafe { device.create_shader_module(&module_info, None) }.result()?;

        Ok(ShaderModule { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_shader_module(self.handle, None);
        }
    }

    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }

    /// `name` must be nul terminated.
    pub fn shader_stage<'a>(
        &self,
        stage: vk::ShaderStageFlagBits,
        name: &'a str,
    ) -> RenderResult<vk::PipelineShaderStageCreateInfoBuilder<'a>> {
        Ok(vk::PipelineShaderStageCreateInfoBuilder::new()
            .stage(stage)
            .module(self.handle)
            .name(CStr::from_bytes_with_nul(name.as_bytes())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_are_nul_terminated() {
        for name in [VERTEX_ENTRY_POINT, FRAGMENT_ENTRY_POINT] {
            assert!(CStr::from_bytes_with_nul(name.as_bytes()).is_ok(), "{}", name);
        }
    }

    #[test]
    fn embedded_shaders_decode() {
        for shader in [Shader::Strokes, Shader::Ui] {
            let code = erupt::utils::decode_spv(shader.bytes()).expect("valid spir-v");
            assert_eq!(code[0], 0x0723_0203, "{:?}", shader);
        }
    }
}
