use crate::error::RenderResult;
use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::device::Device;
use erupt::vk;
use gpu_alloc::MemoryBlock;

pub fn subresource_range(aspect_mask: vk::ImageAspectFlags) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Source and destination scopes of a layout transition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransitionScope {
    pub src_stage: vk::PipelineStageFlags2,
    pub src_access: vk::AccessFlags2,
    pub dst_stage: vk::PipelineStageFlags2,
    pub dst_access: vk::AccessFlags2,
}

pub fn transition_scope(
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> TransitionScope {
    match (old_layout, new_layout) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => TransitionScope {
            src_stage: vk::PipelineStageFlags2::TOP_OF_PIPE,
            src_access: vk::AccessFlags2::empty(),
            dst_stage: vk::PipelineStageFlags2::TRANSFER,
            dst_access: vk::AccessFlags2::TRANSFER_WRITE,
        },
        (vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => {
            TransitionScope {
                src_stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
                src_access: vk::AccessFlags2::SHADER_READ,
                dst_stage: vk::PipelineStageFlags2::TRANSFER,
                dst_access: vk::AccessFlags2::TRANSFER_WRITE,
            }
        }
        (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => {
            TransitionScope {
                src_stage: vk::PipelineStageFlags2::TRANSFER,
                src_access: vk::AccessFlags2::TRANSFER_WRITE,
                dst_stage: vk::PipelineStageFlags2::FRAGMENT_SHADER,
                dst_access: vk::AccessFlags2::SHADER_READ,
            }
        }
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL) => {
            TransitionScope {
                src_stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
                src_access: vk::AccessFlags2::empty(),
                dst_stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
                dst_access: vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
            }
        }
        (vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL, vk::ImageLayout::PRESENT_SRC_KHR) => {
            TransitionScope {
                src_stage: vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT,
                src_access: vk::AccessFlags2::COLOR_ATTACHMENT_WRITE,
                dst_stage: vk::PipelineStageFlags2::BOTTOM_OF_PIPE,
                dst_access: vk::AccessFlags2::empty(),
            }
        }
        _ => TransitionScope {
            src_stage: vk::PipelineStageFlags2::ALL_COMMANDS,
            src_access: vk::AccessFlags2::MEMORY_WRITE,
            dst_stage: vk::PipelineStageFlags2::ALL_COMMANDS,
            dst_access: vk::AccessFlags2::MEMORY_READ | vk::AccessFlags2::MEMORY_WRITE,
        },
    }
}

/// Barrier moving a single mip, single layer color image between layouts.
pub fn layout_barrier<'a>(
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> vk::ImageMemoryBarrier2Builder<'a> {
    let scope = transition_scope(old_layout, new_layout);
    vk::ImageMemoryBarrier2Builder::new()
        .src_stage_mask(scope.src_stage)
        .src_access_mask(scope.src_access)
        .dst_stage_mask(scope.dst_stage)
        .dst_access_mask(scope.dst_access)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(subresource_range(vk::ImageAspectFlags::COLOR))
}

pub struct Image {
    handle: vk::Image,
    memory: Option<MemoryBlock<vk::DeviceMemory>>,
    format: vk::Format,
    layout: vk::ImageLayout,
}

impl Image {
    pub fn new(
        device: &Device,
        extent: vk::Extent2D,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
    ) -> RenderResult<Self> {
        let layout = vk::ImageLayout::UNDEFINED;
        let create_info = vk::ImageCreateInfoBuilder::new()
            .image_type(vk::ImageType::_2D)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(layout)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlagBits::_1);

        let handle = unsafe { device.create_image(&create_info, None) }.result()?;

        let mem_reqs = unsafe { device.get_image_memory_requirements(handle) };
        let memory = device.alloc_memory(mem_reqs, gpu_alloc::UsageFlags::empty())?;
        unsafe { device.bind_image_memory(handle, *memory.memory(), memory.offset()) }
            .result()?;

        Ok(Image {
            handle,
            memory: Some(memory),
            format,
            layout,
        })
    }

    pub fn handle(&self) -> vk::Image {
        self.handle
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Records a transition to `new_layout`.
    pub fn transition(
        &mut self,
        device: &Device,
        command_buffer: &CommandBuffer,
        new_layout: vk::ImageLayout,
    ) {
        let barrier = layout_barrier(self.handle, self.layout, new_layout);
        command_buffer.pipeline_barrier(device, &[barrier]);
        self.layout = new_layout;
    }

    pub fn destroy(&mut self, device: &Device) {
        unsafe {
            device.destroy_image(self.handle, None);
        }
        if let Some(memory) = self.memory.take() {
            device.dealloc_memory(memory);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_transitions_chain() {
        let to_transfer = transition_scope(
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        );
        let to_shader = transition_scope(
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        );

        assert_eq!(to_transfer.dst_stage, to_shader.src_stage);
        assert_eq!(to_transfer.dst_access, to_shader.src_access);
        assert_eq!(to_shader.dst_access, vk::AccessFlags2::SHADER_READ);
    }

    #[test]
    fn present_waits_for_color_writes() {
        let scope = transition_scope(
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        );
        assert_eq!(scope.src_access, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);
        assert_eq!(
            scope.src_stage,
            vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT
        );
    }

    #[test]
    fn unknown_transition_is_a_full_barrier() {
        let scope = transition_scope(
            vk::ImageLayout::GENERAL,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        );
        assert_eq!(scope.src_stage, vk::PipelineStageFlags2::ALL_COMMANDS);
        assert_eq!(scope.dst_stage, vk::PipelineStageFlags2::ALL_COMMANDS);
    }
}
