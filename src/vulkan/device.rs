use crate::error::{RenderError, RenderResult};
use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::command_pool::CommandPool;
use crate::vulkan::image_view::ImageView;
use crate::vulkan::instance::Instance;
use crate::vulkan::semaphore::Semaphore;
use crate::vulkan::surface::Surface;
use crate::vulkan::swapchain::Swapchain;
use erupt::{vk, DeviceLoader, ExtendableFrom};
use erupt_bootstrap::{AcquiredFrame, DeviceBuilder, QueueFamilyCriteria};
use gpu_alloc::{GpuAllocator, MemoryBlock, Request, UsageFlags};
use gpu_alloc_erupt::EruptMemoryDevice;
use parking_lot::Mutex;
use std::ffi::CStr;
use std::ops::Deref;
use std::slice;
use winit::window::Window;

/// Logical device plus everything tied to its lifetime: the presentation
/// surface, the swapchain, per frame command buffers and the allocator.
pub struct Device {
    handle: DeviceLoader,
    properties: vk::PhysicalDeviceProperties,
    allocator: Mutex<GpuAllocator<vk::DeviceMemory>>,
    queue: vk::Queue,
    surface: Surface,
    swapchain: Swapchain,
    swapchain_image_views: Vec<ImageView>,
    command_pool: CommandPool,
    command_buffers: Vec<CommandBuffer>,
    render_complete: Vec<Semaphore>,
}

impl Device {
    pub fn new(instance: &Instance, window: &Window, vsync: bool) -> RenderResult<Self> {
        let surface = Surface::new(instance, window)?;

        let graphics_present = QueueFamilyCriteria::graphics_present();
        let mut vulkan_13_features = vk::PhysicalDeviceVulkan13FeaturesBuilder::new()
            .dynamic_rendering(true)
            .synchronization2(true);
        let features =
            vk::PhysicalDeviceFeatures2Builder::new().extend_from(&mut vulkan_13_features);

        let device_builder = DeviceBuilder::new()
            .require_version(1, 3)
            .require_extension(vk::KHR_SWAPCHAIN_EXTENSION_NAME)
            .queue_family(graphics_present)
            .require_features(&features)
            .for_surface(surface.handle());
        let (handle, metadata) =
            unsafe { device_builder.build(instance.handle(), instance.metadata()) }
                .map_err(|err| RenderError::Device(format!("{:?}", err)))?;

        let (queue, queue_family_index) =
            unsafe { metadata.device_queue(instance.handle(), &handle, graphics_present, 0) }?
                .ok_or(RenderError::MissingQueue)?;

        let physical_device = metadata.physical_device();
        let properties = unsafe {
            instance
                .handle()
                .get_physical_device_properties(physical_device)
        };
        let device_name =
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy();
        log::info!("Using device: {}", device_name);

        let allocator = Mutex::new(GpuAllocator::new(
            gpu_alloc::Config::i_am_prototyping(),
            unsafe { gpu_alloc_erupt::device_properties(instance.handle(), physical_device) }?,
        ));

        let size = window.inner_size();
        let swapchain = Swapchain::new(
            instance,
            &surface,
            physical_device,
            &handle,
            vk::Extent2D {
                width: size.width,
                height: size.height,
            },
            vsync,
        )?;

        let frames_in_flight = swapchain.frames_in_flight();
        let command_pool = CommandPool::new(&handle, queue_family_index, true)?;
        let command_buffers = command_pool.allocate(&handle, frames_in_flight as u32)?;
        let render_complete = (0..frames_in_flight)
            .map(|_| Semaphore::new(&handle))
            .collect::<RenderResult<Vec<_>>>()?;

        let mut device = Device {
            handle,
            properties,
            allocator,
            queue,
            surface,
            swapchain,
            swapchain_image_views: vec![],
            command_pool,
            command_buffers,
            render_complete,
        };
        device.recreate_swapchain()?;

        Ok(device)
    }

    pub fn handle(&self) -> &DeviceLoader {
        &self.handle
    }

    /// Largest texture side egui may ask for.
    pub fn max_texture_side(&self) -> usize {
        self.properties.limits.max_image_dimension2_d as usize
    }

    pub fn surface_format(&self) -> vk::SurfaceFormatKHR {
        self.swapchain.surface_format()
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn frames_in_flight(&self) -> usize {
        self.swapchain.frames_in_flight()
    }

    pub fn swapchain_image(&self, image_index: usize) -> vk::Image {
        self.swapchain.images()[image_index]
    }

    pub fn swapchain_image_view(&self, image_index: usize) -> &ImageView {
        &self.swapchain_image_views[image_index]
    }

    pub fn command_buffer(&self, frame_index: usize) -> &CommandBuffer {
        &self.command_buffers[frame_index]
    }

    pub fn semaphore(&self, frame_index: usize) -> &Semaphore {
        &self.render_complete[frame_index]
    }

    /// Waits for the frame slot to become free and acquires the next image.
    pub fn acquire_swapchain_frame(
        &mut self,
        instance: &Instance,
        timeout_ns: u64,
    ) -> RenderResult<AcquiredFrame> {
        self.swapchain.acquire(instance, &self.handle, timeout_ns)
    }

    pub fn resize_swapchain(&mut self, extent: vk::Extent2D) {
        self.swapchain.resize(extent);
    }

    /// Rebuilds the image views after the swapchain images changed.
    pub fn recreate_swapchain(&mut self) -> RenderResult<()> {
        for image_view in self.swapchain_image_views.drain(..) {
            image_view.destroy(&self.handle);
        }

        let format = self.swapchain.surface_format().format;
        self.swapchain_image_views = self
            .swapchain
            .images()
            .iter()
            .map(|image| ImageView::new(&self.handle, *image, format, vk::ImageAspectFlags::COLOR))
            .collect::<RenderResult<Vec<_>>>()?;

        log::debug!(
            "Swapchain recreated: {}x{}, {} images",
            self.swapchain.extent().width,
            self.swapchain.extent().height,
            self.swapchain_image_views.len()
        );
        Ok(())
    }

    pub fn submit(
        &self,
        wait_semaphores: &[vk::SemaphoreSubmitInfoBuilder],
        signal_semaphores: &[vk::SemaphoreSubmitInfoBuilder],
        command_buffers: &[vk::CommandBufferSubmitInfoBuilder],
        fence: vk::Fence,
    ) -> RenderResult<()> {
        let submit_info = vk::SubmitInfo2Builder::new()
            .wait_semaphore_infos(wait_semaphores)
            .signal_semaphore_infos(signal_semaphores)
            .command_buffer_infos(command_buffers);

        unsafe {
            self.handle
                .queue_submit2(self.queue, slice::from_ref(&submit_info), fence)
        }
        .result()?;
        Ok(())
    }

    pub fn queue_present(
        &mut self,
        render_complete: vk::Semaphore,
        image_index: usize,
    ) -> RenderResult<()> {
        self.swapchain
            .queue_present(&self.handle, self.queue, render_complete, image_index)
    }

    /// Records `action` into a throwaway command buffer and blocks until the
    /// queue has executed it.
    pub fn single_time_submit(&self, action: impl FnOnce(&CommandBuffer)) -> RenderResult<()> {
        let command_buffers = self.command_pool.allocate(&self.handle, 1)?;
        let command_buffer = &command_buffers[0];

        command_buffer.begin(&self.handle, vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT)?;
        action(command_buffer);
        command_buffer.end(&self.handle)?;

        let command_buffer_info =
            vk::CommandBufferSubmitInfoBuilder::new().command_buffer(command_buffer.handle());
        let result = self
            .submit(
                &[],
                &[],
                slice::from_ref(&command_buffer_info),
                vk::Fence::null(),
            )
            .and_then(|_| self.wait_queue_idle());

        self.command_pool
            .free_command_buffers(&self.handle, &command_buffers);
        result
    }

    pub fn alloc_memory(
        &self,
        mem_reqs: vk::MemoryRequirements,
        usage: UsageFlags,
    ) -> RenderResult<MemoryBlock<vk::DeviceMemory>> {
        let block = unsafe {
            self.allocator.lock().alloc(
                EruptMemoryDevice::wrap(&self.handle),
                Request {
                    size: mem_reqs.size,
                    align_mask: mem_reqs.alignment - 1,
                    usage,
                    memory_types: mem_reqs.memory_type_bits,
                },
            )
        }?;
        Ok(block)
    }

    pub fn dealloc_memory(&self, block: MemoryBlock<vk::DeviceMemory>) {
        unsafe {
            self.allocator
                .lock()
                .dealloc(EruptMemoryDevice::wrap(&self.handle), block);
        }
    }

    pub fn wait_queue_idle(&self) -> RenderResult<()> {
        unsafe { self.handle.queue_wait_idle(self.queue) }.result()?;
        Ok(())
    }

    pub fn wait_idle(&self) -> RenderResult<()> {
        unsafe { self.handle.device_wait_idle() }.result()?;
        Ok(())
    }

    pub fn destroy(&mut self, instance: &Instance) {
        log::debug!("Destroying device");
        for semaphore in &self.render_complete {
            semaphore.destroy(&self.handle);
        }
        self.command_pool
            .free_command_buffers(&self.handle, &self.command_buffers);
        self.command_pool.destroy(&self.handle);
        for image_view in self.swapchain_image_views.drain(..) {
            image_view.destroy(&self.handle);
        }
        self.swapchain.destroy(&self.handle);
        unsafe {
            self.allocator
                .lock()
                .cleanup(EruptMemoryDevice::wrap(&self.handle));
            self.handle.destroy_device(None);
        }
        self.surface.destroy(instance);
    }
}

impl Deref for Device {
    type Target = DeviceLoader;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
