use crate::error::RenderResult;
use crate::vulkan::buffer::Buffer;
use bytemuck::Pod;
use erupt::{vk, DeviceLoader};
use std::ffi::c_void;
use std::mem::size_of;

#[derive(Copy, Clone)]
pub struct CommandBuffer {
    handle: vk::CommandBuffer,
}

impl CommandBuffer {
    pub fn handle(&self) -> vk::CommandBuffer {
        self.handle
    }

    pub fn new(handle: vk::CommandBuffer) -> Self {
        CommandBuffer { handle }
    }

    pub fn begin(
        &self,
        device: &DeviceLoader,
        flags: vk::CommandBufferUsageFlags,
    ) -> RenderResult<()> {
        let begin_info = vk::CommandBufferBeginInfoBuilder::new().flags(flags);

        unsafe { device.begin_command_buffer(self.handle, &begin_info) }.result()?;
        Ok(())
    }

    pub fn end(&self, device: &DeviceLoader) -> RenderResult<()> {
        unsafe { device.end_command_buffer(self.handle) }.result()?;
        Ok(())
    }

    pub fn begin_rendering(&self, device: &DeviceLoader, rendering_info: &vk::RenderingInfo) {
        unsafe {
            device.cmd_begin_rendering(self.handle, rendering_info);
        }
    }

    pub fn end_rendering(&self, device: &DeviceLoader) {
        unsafe {
            device.cmd_end_rendering(self.handle);
        }
    }

    pub fn pipeline_barrier(
        &self,
        device: &DeviceLoader,
        image_barriers: &[vk::ImageMemoryBarrier2Builder],
    ) {
        let dependency_info =
            vk::DependencyInfoBuilder::new().image_memory_barriers(image_barriers);
        unsafe {
            device.cmd_pipeline_barrier2(self.handle, &dependency_info);
        }
    }

    pub fn set_scissor(
        &self,
        device: &DeviceLoader,
        first_scissor: u32,
        scissors: &[vk::Rect2DBuilder],
    ) {
        unsafe {
            device.cmd_set_scissor(self.handle, first_scissor, scissors);
        }
    }

    pub fn set_viewport(
        &self,
        device: &DeviceLoader,
        first_viewport: u32,
        viewports: &[vk::ViewportBuilder],
    ) {
        unsafe {
            device.cmd_set_viewport(self.handle, first_viewport, viewports);
        }
    }

    pub fn bind_pipeline(
        &self,
        device: &DeviceLoader,
        bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    ) {
        unsafe {
            device.cmd_bind_pipeline(self.handle, bind_point, pipeline);
        }
    }

    pub fn bind_descriptor_sets(
        &self,
        device: &DeviceLoader,
        bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        descriptor_sets: &[vk::DescriptorSet],
    ) {
        unsafe {
            device.cmd_bind_descriptor_sets(
                self.handle,
                bind_point,
                layout,
                0,
                descriptor_sets,
                &[],
            );
        }
    }

    pub fn push_constants<T: Pod>(
        &self,
        device: &DeviceLoader,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        constants: &T,
    ) {
        unsafe {
            device.cmd_push_constants(
                self.handle,
                layout,
                stages,
                offset,
                size_of::<T>() as u32,
                constants as *const T as *const c_void,
            );
        }
    }

    pub fn bind_vertex_buffer(
        &self,
        device: &DeviceLoader,
        vertex_buffers: &[&Buffer],
        offsets: &[u64],
    ) {
        let vertex_buffers = vertex_buffers
            .iter()
            .map(|buffer| buffer.handle())
            .collect::<Vec<_>>();
        unsafe {
            device.cmd_bind_vertex_buffers(self.handle, 0, &vertex_buffers, offsets);
        }
    }

    pub fn bind_index_buffer(&self, device: &DeviceLoader, index_buffer: &Buffer, offset: u64) {
        unsafe {
            device.cmd_bind_index_buffer(
                self.handle,
                index_buffer.handle(),
                offset,
                vk::IndexType::UINT32,
            )
        }
    }

    pub fn draw(
        &self,
        device: &DeviceLoader,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        unsafe {
            device.cmd_draw(
                self.handle,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            );
        }
    }

    pub fn draw_indexed(&self, device: &DeviceLoader, index_count: u32) {
        unsafe {
            device.cmd_draw_indexed(self.handle, index_count, 1, 0, 0, 0);
        }
    }

    pub fn copy_buffer_to_image(
        &self,
        device: &DeviceLoader,
        buffer: &Buffer,
        image: vk::Image,
        regions: &[vk::BufferImageCopyBuilder],
    ) {
        unsafe {
            device.cmd_copy_buffer_to_image(
                self.handle,
                buffer.handle(),
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                regions,
            );
        }
    }
}
