pub mod buffer;
pub mod command_buffer;
pub mod command_pool;
pub mod debug_utils;
pub mod descriptor_binding;
pub mod descriptor_set_layout;
pub mod descriptor_set_manager;
pub mod device;
pub mod graphics_pipeline;
pub mod image;
pub mod image_view;
pub mod instance;
pub mod pipeline_layout;
pub mod push_constants;
pub mod sampler;
pub mod semaphore;
pub mod shader_module;
pub mod surface;
pub mod swapchain;
pub mod texture_image;
pub mod vertex;
