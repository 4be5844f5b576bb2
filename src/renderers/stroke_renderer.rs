use crate::config::Config;
use crate::error::RenderResult;
use crate::renderers::Renderer;
use crate::stroke::{DirtyRanges, StrokeCanvas};
use crate::user_interface::UserInterface;
use crate::vulkan::buffer::Buffer;
use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::descriptor_binding::DescriptorBinding;
use crate::vulkan::descriptor_set_manager::DescriptorSetManager;
use crate::vulkan::device::Device;
use crate::vulkan::graphics_pipeline::{alpha_blending, GraphicsPipeline, PipelineDescription};
use crate::vulkan::pipeline_layout::PipelineLayout;
use crate::vulkan::push_constants::PushConstantRanges;
use crate::vulkan::shader_module::Shader;
use erupt::vk;
use erupt_bootstrap::AcquiredFrame;
use glam::{vec2, Vec2, Vec4};
use gpu_alloc::UsageFlags;
use shared::{Brightness, BufferId, StrokeCount, ViewportConstants};
use std::mem::size_of;

/// Smallest power-of-two multiple of `current` that holds `required`.
pub fn grown_capacity(current: usize, required: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < required {
        capacity *= 2;
    }
    capacity
}

/// Appends can be written while older frames still read the buffers. A
/// reset rewrites offsets those frames may be indexing.
pub fn needs_drain(dirty: &DirtyRanges) -> bool {
    dirty.reset
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Capacity {
    pub strokes: usize,
    pub vertices: usize,
}

/// The per-stroke and per-vertex storage buffers, sized in elements.
struct StorageBuffers {
    colors: Buffer,
    vertex_counts: Buffer,
    vertices: Buffer,
    capacity: Capacity,
}

impl StorageBuffers {
    fn new(device: &Device, capacity: Capacity) -> RenderResult<Self> {
        let storage = |size: usize| {
            Buffer::empty(
                device,
                size as u64,
                vk::BufferUsageFlags::STORAGE_BUFFER,
                UsageFlags::HOST_ACCESS | UsageFlags::UPLOAD,
            )
        };

        Ok(StorageBuffers {
            colors: storage(capacity.strokes * size_of::<Vec4>())?,
            vertex_counts: storage(capacity.strokes * size_of::<u32>())?,
            vertices: storage(capacity.vertices * size_of::<Vec2>())?,
            capacity,
        })
    }

    fn destroy(&mut self, device: &Device) {
        self.colors.destroy(device);
        self.vertex_counts.destroy(device);
        self.vertices.destroy(device);
    }
}

/// Draws every stroke of the canvas as alpha blended quads.
pub struct StrokeRenderer {
    pipeline: GraphicsPipeline,
    pipeline_layout: PipelineLayout,
    descriptor_set_manager: DescriptorSetManager,
    stroke_counts: Vec<Buffer>,
    brightness: Vec<Buffer>,
    storage: StorageBuffers,
    vertex_count: u32,
}

impl StrokeRenderer {
    pub fn new(device: &Device, config: &Config) -> RenderResult<Self> {
        let descriptor_bindings = BufferId::ALL.map(DescriptorBinding::for_buffer);
        let frames_in_flight = device.frames_in_flight();
        let descriptor_set_manager =
            DescriptorSetManager::new(device, &descriptor_bindings, frames_in_flight)?;

        let pipeline_layout = PipelineLayout::new(
            device,
            &[descriptor_set_manager.descriptor_set_layout()],
            &[PushConstantRanges::of::<ViewportConstants>(
                vk::ShaderStageFlags::VERTEX,
            )],
        )?;

        let pipeline = GraphicsPipeline::new(
            device,
            &PipelineDescription {
                shader: Shader::Strokes,
                layout: pipeline_layout.handle(),
                color_format: device.surface_format().format,
                blending: alpha_blending(),
                vertex_bindings: &[],
                vertex_attributes: &[],
            },
        )?;

        let uniform = |size: usize| {
            Buffer::empty(
                device,
                size as u64,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                UsageFlags::HOST_ACCESS | UsageFlags::UPLOAD,
            )
        };
        let stroke_counts = (0..frames_in_flight)
            .map(|_| uniform(size_of::<StrokeCount>()))
            .collect::<RenderResult<Vec<_>>>()?;
        let brightness = (0..frames_in_flight)
            .map(|_| uniform(size_of::<Brightness>()))
            .collect::<RenderResult<Vec<_>>>()?;

        let storage = StorageBuffers::new(
            device,
            Capacity {
                strokes: config.initial_stroke_capacity as usize,
                vertices: config.initial_vertex_capacity as usize,
            },
        )?;

        let renderer = StrokeRenderer {
            pipeline,
            pipeline_layout,
            descriptor_set_manager,
            stroke_counts,
            brightness,
            storage,
            vertex_count: 0,
        };
        renderer.write_descriptors(device);

        Ok(renderer)
    }

    pub fn capacity(&self) -> Capacity {
        self.storage.capacity
    }

    fn buffer(&self, id: BufferId, frame_index: usize) -> &Buffer {
        match id {
            BufferId::StrokeCount => &self.stroke_counts[frame_index],
            BufferId::Color => &self.storage.colors,
            BufferId::VertexCount => &self.storage.vertex_counts,
            BufferId::Vertices => &self.storage.vertices,
            BufferId::Brightness => &self.brightness[frame_index],
        }
    }

    fn write_descriptors(&self, device: &Device) {
        for frame_index in 0..self.descriptor_set_manager.descriptor_set_count() {
            let buffer_infos = BufferId::ALL.map(|id| {
                [vk::DescriptorBufferInfoBuilder::new()
                    .buffer(self.buffer(id, frame_index).handle())
                    .offset(0)
                    .range(vk::WHOLE_SIZE)]
            });
            let descriptor_writes = BufferId::ALL
                .iter()
                .zip(&buffer_infos)
                .map(|(id, buffer_info)| {
                    self.descriptor_set_manager
                        .bind_buffer(frame_index, id.binding(), buffer_info)
                })
                .collect::<Vec<_>>();

            self.descriptor_set_manager
                .update_descriptors(device, &descriptor_writes);
        }
    }

    /// Replaces the storage buffers with larger ones. Every frame in flight
    /// may read them, so the device is drained first.
    fn grow(&mut self, device: &Device, required: Capacity) -> RenderResult<()> {
        let capacity = Capacity {
            strokes: grown_capacity(self.storage.capacity.strokes, required.strokes),
            vertices: grown_capacity(self.storage.capacity.vertices, required.vertices),
        };
        log::info!(
            "Growing stroke buffers to {} strokes, {} vertices",
            capacity.strokes,
            capacity.vertices
        );

        device.wait_idle()?;
        let storage = StorageBuffers::new(device, capacity)?;
        let mut previous = std::mem::replace(&mut self.storage, storage);
        previous.destroy(device);
        self.write_descriptors(device);
        Ok(())
    }

    fn upload(&mut self, device: &Device, canvas: &mut StrokeCanvas) -> RenderResult<()> {
        let required = Capacity {
            strokes: canvas.stroke_count() as usize,
            vertices: canvas.total_vertex_count() as usize,
        };
        let grown = required.strokes > self.storage.capacity.strokes
            || required.vertices > self.storage.capacity.vertices;
        if grown {
            self.grow(device, required)?;
            canvas.mark_all_dirty();
        }

        self.vertex_count = canvas.total_vertex_count();
        let dirty = canvas.take_dirty();
        if dirty.is_empty() {
            return Ok(());
        }
        if needs_drain(&dirty) && !grown {
            device.wait_idle()?;
        }

        if let Some(strokes) = dirty.strokes {
            self.storage.colors.write_data(
                device,
                &canvas.colors()[strokes.clone()],
                strokes.start as u64,
            )?;
            self.storage.vertex_counts.write_data(
                device,
                &canvas.vertex_counts()[strokes.clone()],
                strokes.start as u64,
            )?;
        }
        if let Some(vertices) = dirty.vertices {
            self.storage.vertices.write_data(
                device,
                &canvas.vertices()[vertices.clone()],
                vertices.start as u64,
            )?;
        }
        Ok(())
    }
}

impl Renderer for StrokeRenderer {
    fn update(
        &mut self,
        device: &mut Device,
        frame: &AcquiredFrame,
        canvas: &mut StrokeCanvas,
        ui: &UserInterface,
    ) -> RenderResult<()> {
        puffin::profile_function!();
        self.upload(device, canvas)?;

        self.stroke_counts[frame.frame_index].write_data(
            device,
            &[StrokeCount::new(canvas.stroke_count())],
            0,
        )?;
        self.brightness[frame.frame_index].write_data(
            device,
            &[Brightness::new(ui.settings().brightness)],
            0,
        )?;
        Ok(())
    }

    fn fill_command_buffer(
        &self,
        device: &Device,
        command_buffer: &CommandBuffer,
        frame: &AcquiredFrame,
    ) {
        puffin::profile_function!();
        if self.vertex_count == 0 {
            return;
        }

        command_buffer.bind_pipeline(
            device,
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline.handle(),
        );
        command_buffer.bind_descriptor_sets(
            device,
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline_layout.handle(),
            &[self.descriptor_set_manager.descriptor_set(frame.frame_index)],
        );

        let extent = device.swapchain().extent();
        command_buffer.push_constants(
            device,
            self.pipeline_layout.handle(),
            vk::ShaderStageFlags::VERTEX,
            0,
            &ViewportConstants {
                viewport_size: vec2(extent.width as f32, extent.height as f32),
            },
        );

        command_buffer.draw(device, self.vertex_count, 1, 0, 0);
    }

    fn destroy(&mut self, device: &mut Device) {
        self.storage.destroy(device);
        self.stroke_counts
            .iter_mut()
            .chain(self.brightness.iter_mut())
            .for_each(|buffer| buffer.destroy(device));
        self.descriptor_set_manager.destroy(device);
        self.pipeline_layout.destroy(device);
        self.pipeline.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_doubles_until_it_fits() {
        assert_eq!(grown_capacity(512, 513), 1024);
        assert_eq!(grown_capacity(512, 3000), 4096);
        assert_eq!(grown_capacity(8192, 8192), 8192);
    }

    #[test]
    fn clearing_drains_before_rewriting() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(10.0, 10.0), Vec4::ONE);
        assert!(!needs_drain(&canvas.take_dirty()));

        canvas.clear();
        canvas.begin_stroke(vec2(20.0, 20.0), Vec4::ONE);
        let dirty = canvas.take_dirty();
        assert_eq!(dirty.strokes, Some(0..1));
        assert!(needs_drain(&dirty));
    }

    #[test]
    fn appending_does_not_drain() {
        let mut canvas = StrokeCanvas::new(1.0);
        canvas.begin_stroke(vec2(10.0, 10.0), Vec4::ONE);
        canvas.take_dirty();
        canvas.extend_stroke(vec2(11.0, 10.0), Vec4::ONE);
        canvas.begin_stroke(vec2(30.0, 30.0), Vec4::ONE);
        assert!(!needs_drain(&canvas.take_dirty()));
    }

    #[test]
    fn zero_capacity_still_grows() {
        assert_eq!(grown_capacity(0, 5), 8);
        assert_eq!(grown_capacity(0, 0), 1);
    }
}
