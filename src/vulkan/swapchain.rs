use crate::error::RenderResult;
use crate::vulkan::instance::Instance;
use crate::vulkan::surface::Surface;
use erupt::{vk, DeviceLoader};
use erupt_bootstrap::{AcquiredFrame, SwapchainOptions};

const FORMAT_CANDIDATES: &[vk::Format] = &[
    vk::Format::R8G8B8A8_UNORM,
    vk::Format::B8G8R8A8_UNORM,
    vk::Format::A8B8G8R8_UNORM_PACK32,
];

pub struct Swapchain {
    handle: erupt_bootstrap::Swapchain,
    surface_format: vk::SurfaceFormatKHR,
}

impl Swapchain {
    pub fn new(
        instance: &Instance,
        surface: &Surface,
        physical_device: vk::PhysicalDevice,
        device: &DeviceLoader,
        extent: vk::Extent2D,
        vsync: bool,
    ) -> RenderResult<Self> {
        let surface_formats = unsafe {
            instance.handle().get_physical_device_surface_formats_khr(
                physical_device,
                surface.handle(),
                None,
            )
        }
        .result()?;
        let surface_format = pick_surface_format(&surface_formats);
        log::info!(
            "Swapchain format: {:?}, color space: {:?}",
            surface_format.format,
            surface_format.color_space
        );

        let mut swapchain_options = SwapchainOptions::default();
        swapchain_options.format_preference(&[surface_format]);
        if !vsync {
            swapchain_options.present_mode_preference(&[
                vk::PresentModeKHR::MAILBOX_KHR,
                vk::PresentModeKHR::IMMEDIATE_KHR,
                vk::PresentModeKHR::FIFO_KHR,
            ]);
        }

        let handle = erupt_bootstrap::Swapchain::new(
            swapchain_options,
            surface.handle(),
            physical_device,
            device,
            extent,
        );

        Ok(Swapchain {
            handle,
            surface_format,
        })
    }

    pub fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.surface_format
    }

    pub fn resize(&mut self, extent: vk::Extent2D) {
        self.handle.update(extent)
    }

    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.handle.frames_in_flight()
    }

    #[inline]
    pub fn images(&self) -> &[vk::Image] {
        self.handle.images()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.handle.extent()
    }

    #[inline]
    pub fn acquire(
        &mut self,
        instance: &Instance,
        device: &DeviceLoader,
        timeout_ns: u64,
    ) -> RenderResult<AcquiredFrame> {
        let frame = unsafe { self.handle.acquire(instance.handle(), device, timeout_ns) }
            .result()?;
        Ok(frame)
    }

    #[inline]
    pub fn queue_present(
        &mut self,
        device: &DeviceLoader,
        queue: vk::Queue,
        render_complete: vk::Semaphore,
        image_index: usize,
    ) -> RenderResult<()> {
        unsafe {
            self.handle
                .queue_present(device, queue, render_complete, image_index)
        }
        .result()?;
        Ok(())
    }

    pub fn destroy(&mut self, device: &DeviceLoader) {
        unsafe {
            self.handle.destroy(device);
        }
    }
}

/// Prefers a non-sRGB 8 bit format so egui colors are written unchanged.
fn pick_surface_format(surface_formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    match surface_formats {
        [single] if single.format == vk::Format::UNDEFINED => vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: single.color_space,
        },
        _ => surface_formats
            .iter()
            .find(|surface_format| FORMAT_CANDIDATES.contains(&surface_format.format))
            .or_else(|| surface_formats.first())
            .copied()
            .unwrap_or(vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_UNORM,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR_KHR,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR {
            format,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR_KHR,
        }
    }

    #[test]
    fn undefined_surface_format_falls_back_to_bgra() {
        let picked = pick_surface_format(&[format(vk::Format::UNDEFINED)]);
        assert_eq!(picked.format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn unorm_formats_are_preferred() {
        let picked = pick_surface_format(&[
            format(vk::Format::B8G8R8A8_SRGB),
            format(vk::Format::B8G8R8A8_UNORM),
        ]);
        assert_eq!(picked.format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn first_format_is_used_without_candidates() {
        let picked = pick_surface_format(&[format(vk::Format::R16G16B16A16_SFLOAT)]);
        assert_eq!(picked.format, vk::Format::R16G16B16A16_SFLOAT);
    }
}
