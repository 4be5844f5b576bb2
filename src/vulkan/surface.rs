use crate::error::RenderResult;
use crate::vulkan::instance::Instance;
use erupt::utils::surface;
use erupt::vk;
use winit::window::Window;

pub struct Surface {
    handle: vk::SurfaceKHR,
}

impl Surface {
    pub fn new(instance: &Instance, window: &Window) -> RenderResult<Self> {
        let handle = unsafe { surface::create_surface(instance.handle(), window, None) }.result()?;

        Ok(Surface { handle })
    }

    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }

    pub fn destroy(&self, instance: &Instance) {
        unsafe {
            instance.handle().destroy_surface_khr(self.handle, None);
        }
    }
}
