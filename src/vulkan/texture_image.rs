use crate::error::RenderResult;
use crate::vulkan::buffer::Buffer;
use crate::vulkan::device::Device;
use crate::vulkan::image::Image;
use crate::vulkan::image_view::ImageView;
use crate::vulkan::sampler::{Sampler, SamplerInfo};
use erupt::vk;

const TEXTURE_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

/// Sampled RGBA8 texture, uploaded through a staging buffer.
pub struct TextureImage {
    image: Image,
    image_view: ImageView,
    sampler: Sampler,
}

impl TextureImage {
    pub fn image_view(&self) -> &ImageView {
        &self.image_view
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn new(device: &Device, width: u32, height: u32, pixels: &[u8]) -> RenderResult<Self> {
        let image = Image::new(
            device,
            vk::Extent2D { width, height },
            TEXTURE_FORMAT,
            vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
        )?;
        let image_view = ImageView::new(
            device,
            image.handle(),
            image.format(),
            vk::ImageAspectFlags::COLOR,
        )?;
        let sampler = Sampler::new(device, &SamplerInfo::default())?;

        let mut texture = TextureImage {
            image,
            image_view,
            sampler,
        };
        texture.upload(device, [0, 0], width, height, pixels)?;

        Ok(texture)
    }

    /// Replaces the `width` x `height` region starting at `offset`.
    pub fn upload(
        &mut self,
        device: &Device,
        offset: [u32; 2],
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> RenderResult<()> {
        let mut staging_buffer =
            Buffer::with_data(device, pixels, vk::BufferUsageFlags::TRANSFER_SRC)?;

        let image = &mut self.image;
        let result = device.single_time_submit(|command_buffer| {
            image.transition(device, command_buffer, vk::ImageLayout::TRANSFER_DST_OPTIMAL);

            let region = vk::BufferImageCopyBuilder::new()
                .buffer_offset(0)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D {
                    x: offset[0] as i32,
                    y: offset[1] as i32,
                    z: 0,
                })
                .image_extent(vk::Extent3D {
                    width,
                    height,
                    depth: 1,
                });
            command_buffer.copy_buffer_to_image(
                device,
                &staging_buffer,
                image.handle(),
                &[region],
            );

            image.transition(
                device,
                command_buffer,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            );
        });

        staging_buffer.destroy(device);
        result
    }

    pub fn destroy(&mut self, device: &Device) {
        self.sampler.destroy(device);
        self.image_view.destroy(device);
        self.image.destroy(device);
    }
}
