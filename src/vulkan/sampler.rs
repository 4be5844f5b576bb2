use crate::error::RenderResult;
use erupt::{vk, DeviceLoader};

pub struct SamplerInfo {
    pub mag_filter: vk::Filter,
    pub min_filter: vk::Filter,
    pub address_mode: vk::SamplerAddressMode,
    pub mipmap_mode: vk::SamplerMipmapMode,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        SamplerInfo {
            mag_filter: vk::Filter::LINEAR,
            min_filter: vk::Filter::LINEAR,
            address_mode: vk::SamplerAddressMode::CLAMP_TO_EDGE,
            mipmap_mode: vk::SamplerMipmapMode::LINEAR,
        }
    }
}

pub struct Sampler {
    handle: vk::Sampler,
}

impl Sampler {
    pub fn new(device: &DeviceLoader, info: &SamplerInfo) -> RenderResult<Self> {
        let create_info = vk::SamplerCreateInfoBuilder::new()
            .mag_filter(info.mag_filter)
            .min_filter(info.min_filter)
            .address_mode_u(info.address_mode)
            .address_mode_v(info.address_mode)
            .address_mode_w(info.address_mode)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .unnormalized_coordinates(false)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .mipmap_mode(info.mipmap_mode)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(0.0);
        let handle = unsafe { device.create_sampler(&create_info, None) }.result()?;

        Ok(Sampler { handle })
    }

    pub fn handle(&self) -> vk::Sampler {
        self.handle
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_sampler(self.handle, None);
        }
    }
}
