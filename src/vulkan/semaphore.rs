use crate::error::RenderResult;
use erupt::{vk, DeviceLoader};

pub struct Semaphore {
    handle: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: &DeviceLoader) -> RenderResult<Self> {
        let create_info = vk::SemaphoreCreateInfoBuilder::new();
        let handle = unsafe { device.create_semaphore(&create_info, None) }.result()?;

        Ok(Self { handle })
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_semaphore(self.handle, None);
        }
    }

    pub fn handle(&self) -> vk::Semaphore {
        self.handle
    }
}
