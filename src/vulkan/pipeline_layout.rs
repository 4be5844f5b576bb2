use crate::error::RenderResult;
use crate::vulkan::push_constants::PushConstantRanges;
use erupt::{vk, DeviceLoader};

pub struct PipelineLayout {
    handle: vk::PipelineLayout,
}

impl PipelineLayout {
    pub fn handle(&self) -> vk::PipelineLayout {
        self.handle
    }

    pub fn new(
        device: &DeviceLoader,
        descriptor_set_layouts: &[vk::DescriptorSetLayout],
        push_constant_ranges: &[PushConstantRanges],
    ) -> RenderResult<Self> {
        let push_constant_ranges = push_constant_ranges
            .iter()
            .map(|range| range.handle().into_builder())
            .collect::<Vec<_>>();

        let create_info = vk::PipelineLayoutCreateInfoBuilder::new()
            .set_layouts(descriptor_set_layouts)
            .push_constant_ranges(&push_constant_ranges);
        let handle = unsafe { device.create_pipeline_layout(&create_info, None) }.result()?;

        Ok(PipelineLayout { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_pipeline_layout(self.handle, None);
        }
    }
}
