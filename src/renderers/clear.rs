use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::device::Device;
use crate::vulkan::image::layout_barrier;
use erupt::vk;
use erupt_bootstrap::AcquiredFrame;
use std::slice;

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Opens and closes dynamic rendering on the acquired swapchain image.
pub struct Clear {
    clear_color: [f32; 4],
}

impl Clear {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Clear { clear_color }
    }

    pub fn begin(&self, device: &Device, command_buffer: &CommandBuffer, frame: &AcquiredFrame) {
        puffin::profile_function!();
        let image = device.swapchain_image(frame.image_index);
        command_buffer.pipeline_barrier(
            device,
            &[layout_barrier(
                image,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            )],
        );

        let render_area = render_area(device.swapchain().extent());
        let color_attachment = vk::RenderingAttachmentInfoBuilder::new()
            .image_view(device.swapchain_image_view(frame.image_index).handle())
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .clear_value(vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            })
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE);

        let rendering_info = vk::RenderingInfoBuilder::new()
            .color_attachments(slice::from_ref(&color_attachment))
            .layer_count(1)
            .render_area(render_area);

        command_buffer.begin_rendering(device, &rendering_info);

        command_buffer.set_scissor(device, 0, &[render_area.into_builder()]);
        let viewport = vk::ViewportBuilder::new()
            .width(render_area.extent.width as f32)
            .height(render_area.extent.height as f32)
            .max_depth(1.0);
        command_buffer.set_viewport(device, 0, &[viewport]);
    }

    pub fn end(&self, device: &Device, command_buffer: &CommandBuffer, frame: &AcquiredFrame) {
        command_buffer.end_rendering(device);

        let image = device.swapchain_image(frame.image_index);
        command_buffer.pipeline_barrier(
            device,
            &[layout_barrier(
                image,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::ImageLayout::PRESENT_SRC_KHR,
            )],
        );
    }
}

fn render_area(extent: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: Default::default(),
        extent,
    }
}
