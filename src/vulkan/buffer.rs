use crate::error::RenderResult;
use crate::vulkan::device::Device;
use bytemuck::Pod;
use erupt::vk;
use gpu_alloc::{MemoryBlock, UsageFlags};
use gpu_alloc_erupt::EruptMemoryDevice;
use std::mem::{size_of, size_of_val};

pub struct Buffer {
    handle: vk::Buffer,
    memory: Option<MemoryBlock<vk::DeviceMemory>>,
    size: u64,
}

impl Buffer {
    pub fn handle(&self) -> vk::Buffer {
        self.handle
    }

    /// Creates a buffer of `size` bytes backed by memory chosen from
    /// `allocation_flags`.
    pub fn empty(
        device: &Device,
        size: u64,
        usage: vk::BufferUsageFlags,
        allocation_flags: UsageFlags,
    ) -> RenderResult<Self> {
        let create_info = vk::BufferCreateInfoBuilder::new()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let handle = unsafe { device.create_buffer(&create_info, None) }.result()?;

        let mem_reqs = unsafe { device.get_buffer_memory_requirements(handle) };
        let memory = device.alloc_memory(mem_reqs, allocation_flags)?;
        unsafe { device.bind_buffer_memory(handle, *memory.memory(), memory.offset()) }
            .result()?;

        Ok(Buffer {
            handle,
            memory: Some(memory),
            size,
        })
    }

    pub fn with_data<T: Pod>(
        device: &Device,
        data: &[T],
        usage: vk::BufferUsageFlags,
    ) -> RenderResult<Self> {
        let size = size_of_val(data) as u64;

        let mut buffer = Buffer::empty(
            device,
            size,
            usage,
            UsageFlags::HOST_ACCESS | UsageFlags::UPLOAD,
        )?;
        buffer.write_data(device, data, 0)?;

        Ok(buffer)
    }

    /// Copies `data` into the buffer starting at element `offset`.
    pub fn write_data<T: Pod>(
        &mut self,
        device: &Device,
        data: &[T],
        offset: u64,
    ) -> RenderResult<()> {
        let byte_offset = offset * size_of::<T>() as u64;
        debug_assert!(byte_offset + size_of_val(data) as u64 <= self.size);

        if let Some(memory) = self.memory.as_mut() {
            unsafe {
                memory.write_bytes(
                    EruptMemoryDevice::wrap(device.handle()),
                    byte_offset,
                    bytemuck::cast_slice(data),
                )
            }?;
        }
        Ok(())
    }

    pub fn destroy(&mut self, device: &Device) {
        unsafe {
            device.destroy_buffer(self.handle, None);
        }
        if let Some(memory) = self.memory.take() {
            device.dealloc_memory(memory);
        }
    }
}
