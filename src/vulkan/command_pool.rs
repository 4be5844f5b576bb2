use crate::error::RenderResult;
use crate::vulkan::command_buffer::CommandBuffer;
use erupt::{vk, DeviceLoader, SmallVec};

pub struct CommandPool {
    handle: vk::CommandPool,
}

impl CommandPool {
    pub fn new(device: &DeviceLoader, queue_family_index: u32, reset: bool) -> RenderResult<Self> {
        let create_info = vk::CommandPoolCreateInfoBuilder::new()
            .queue_family_index(queue_family_index)
            .flags(if reset {
                vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER
            } else {
                vk::CommandPoolCreateFlags::empty()
            });
        let handle = unsafe { device.create_command_pool(&create_info, None) }.result()?;

        Ok(Self { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_command_pool(self.handle, None);
        }
    }

    pub fn allocate(&self, device: &DeviceLoader, count: u32) -> RenderResult<Vec<CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfoBuilder::new()
            .command_pool(self.handle)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);

        let command_buffers = unsafe { device.allocate_command_buffers(&alloc_info) }.result()?;

        Ok(command_buffers
            .iter()
            .map(|cb| CommandBuffer::new(*cb))
            .collect::<Vec<_>>())
    }

    pub fn free_command_buffers(&self, device: &DeviceLoader, command_buffers: &[CommandBuffer]) {
        let command_buffer_handles = command_buffers
            .iter()
            .map(|cb| cb.handle())
            .collect::<SmallVec<_>>();
        unsafe {
            device.free_command_buffers(self.handle, &command_buffer_handles);
        }
    }
}
