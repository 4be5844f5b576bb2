use crate::error::{RenderError, RenderResult};
use crate::vulkan::debug_utils::debug_callback;
use erupt::{vk, EntryLoader, InstanceLoader};
use erupt_bootstrap::{DebugMessenger, InstanceBuilder, InstanceMetadata, ValidationLayers};
use std::ops::Deref;
use std::ptr;
use winit::window::Window;

pub struct Instance {
    handle: InstanceLoader,
    metadata: InstanceMetadata,
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    _entry: EntryLoader,
}

impl Deref for Instance {
    type Target = InstanceLoader;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Instance {
    pub fn new(window: &Window) -> RenderResult<Self> {
        let entry = EntryLoader::new().map_err(|err| RenderError::Loader(format!("{}", err)))?;

        let validation_layers = if cfg!(debug_assertions) {
            ValidationLayers::Request
        } else {
            ValidationLayers::Disable
        };
        let debug_messenger = if cfg!(debug_assertions) {
            DebugMessenger::Custom {
                callback: Some(debug_callback),
                user_data_pointer: ptr::null_mut(),
            }
        } else {
            DebugMessenger::Disable
        };

        let instance_builder = InstanceBuilder::new()
            .app_name("Color Blending")
            .map_err(|err| RenderError::Instance(format!("{:?}", err)))?
            .app_version(0, 1)
            .require_api_version(1, 3)
            .validation_layers(validation_layers)
            .request_debug_messenger(debug_messenger)
            .require_surface_extensions(window)
            .map_err(RenderError::Vulkan)?;

        let (handle, debug_messenger, metadata) = unsafe { instance_builder.build(&entry) }
            .map_err(|err| RenderError::Instance(format!("{:?}", err)))?;

        log::info!("Created vulkan instance");

        Ok(Instance {
            handle,
            metadata,
            debug_messenger,
            _entry: entry,
        })
    }

    pub fn handle(&self) -> &InstanceLoader {
        &self.handle
    }

    pub fn metadata(&self) -> &InstanceMetadata {
        &self.metadata
    }

    pub fn destroy(&mut self) {
        unsafe {
            if let Some(debug_messenger) = self.debug_messenger.take() {
                self.handle
                    .destroy_debug_utils_messenger_ext(debug_messenger, None);
            }
            self.handle.destroy_instance(None);
        }
    }
}
