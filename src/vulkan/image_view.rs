use crate::error::RenderResult;
use crate::vulkan::image::subresource_range;
use erupt::{vk, DeviceLoader};

pub struct ImageView {
    handle: vk::ImageView,
}

impl ImageView {
    pub fn handle(&self) -> vk::ImageView {
        self.handle
    }

    pub fn new(
        device: &DeviceLoader,
        image: vk::Image,
        format: vk::Format,
        aspect_flags: vk::ImageAspectFlags,
    ) -> RenderResult<Self> {
        let create_info = vk::ImageViewCreateInfoBuilder::new()
            .image(image)
            .view_type(vk::ImageViewType::_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(subresource_range(aspect_flags));

        let handle = unsafe { device.create_image_view(&create_info, None) }.result()?;

        Ok(ImageView { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_image_view(self.handle, None);
        }
    }
}
