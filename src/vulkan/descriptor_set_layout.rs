use crate::error::RenderResult;
use crate::vulkan::descriptor_binding::DescriptorBinding;
use erupt::{vk, DeviceLoader};

pub struct DescriptorSetLayout {
    handle: vk::DescriptorSetLayout,
}

impl DescriptorSetLayout {
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.handle
    }

    pub fn new(
        device: &DeviceLoader,
        descriptor_bindings: &[DescriptorBinding],
    ) -> RenderResult<Self> {
        let layout_bindings = descriptor_bindings
            .iter()
            .map(|binding| {
                vk::DescriptorSetLayoutBindingBuilder::new()
                    .binding(binding.binding)
                    .descriptor_count(binding.descriptor_count)
                    .descriptor_type(binding.descriptor_type)
                    .stage_flags(binding.stages)
            })
            .collect::<Vec<_>>();

        let create_info =
            vk::DescriptorSetLayoutCreateInfoBuilder::new().bindings(&layout_bindings);

        let handle =
            unsafe { device.create_descriptor_set_layout(&create_info, None) }.result()?;

        Ok(DescriptorSetLayout { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_descriptor_set_layout(self.handle, None);
        }
    }
}
