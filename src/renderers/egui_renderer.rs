use crate::color::ColorExt;
use crate::error::RenderResult;
use crate::renderers::stroke_renderer::grown_capacity;
use crate::renderers::Renderer;
use crate::stroke::StrokeCanvas;
use crate::user_interface::UserInterface;
use crate::vulkan::buffer::Buffer;
use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::descriptor_binding::DescriptorBinding;
use crate::vulkan::descriptor_set_manager::DescriptorSetManager;
use crate::vulkan::device::Device;
use crate::vulkan::graphics_pipeline::{
    premultiplied_alpha_blending, GraphicsPipeline, PipelineDescription,
};
use crate::vulkan::pipeline_layout::PipelineLayout;
use crate::vulkan::push_constants::PushConstantRanges;
use crate::vulkan::shader_module::Shader;
use crate::vulkan::texture_image::TextureImage;
use crate::vulkan::vertex::{EguiVertex, Vertex};
use egui::epaint::Vertex as EpaintVertex;
use egui::{ImageData, Rect, TextureId};
use erupt::vk;
use erupt_bootstrap::AcquiredFrame;
use glam::{vec2, Vec4};
use gpu_alloc::UsageFlags;
use shared::UiConstants;
use std::collections::HashMap;
use std::mem::size_of;

const INITIAL_VERTEX_CAPACITY: usize = 16 * 1024;
const INITIAL_INDEX_CAPACITY: usize = 3 * INITIAL_VERTEX_CAPACITY;
const MAX_TEXTURES: usize = 16;

/// Scissor in framebuffer pixels for an egui clip rectangle given in points.
/// `None` when nothing of the rectangle is visible.
pub fn scissor_for_clip_rect(
    clip_rect: Rect,
    pixels_per_point: f32,
    extent: vk::Extent2D,
) -> Option<vk::Rect2D> {
    let min_x = (clip_rect.min.x * pixels_per_point).round().max(0.0) as u32;
    let min_y = (clip_rect.min.y * pixels_per_point).round().max(0.0) as u32;
    let max_x = ((clip_rect.max.x * pixels_per_point).round().max(0.0) as u32).min(extent.width);
    let max_y = ((clip_rect.max.y * pixels_per_point).round().max(0.0) as u32).min(extent.height);

    if min_x >= max_x || min_y >= max_y {
        return None;
    }

    Some(vk::Rect2D {
        offset: vk::Offset2D {
            x: min_x as i32,
            y: min_y as i32,
        },
        extent: vk::Extent2D {
            width: max_x - min_x,
            height: max_y - min_y,
        },
    })
}

/// Expands egui image data to tightly packed RGBA8.
pub fn image_pixels(image: &ImageData) -> Vec<u8> {
    match image {
        ImageData::Color(image) => image
            .pixels
            .iter()
            .flat_map(|color| color.to_array())
            .collect(),
        ImageData::Alpha(image) => image
            .pixels
            .iter()
            .flat_map(|&alpha| [alpha, alpha, alpha, alpha])
            .collect(),
    }
}

fn egui_vertex(vertex: &EpaintVertex) -> EguiVertex {
    EguiVertex::new(
        vec2(vertex.pos.x, vertex.pos.y),
        vec2(vertex.uv.x, vertex.uv.y),
        Vec4::from_color32(vertex.color),
    )
}

struct DrawIndexed {
    vertex_offset: u64,
    index_offset: u64,
    index_count: u32,
    scissor: vk::Rect2D,
    texture_id: TextureId,
}

struct FrameBuffers {
    vertices: Buffer,
    indices: Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl FrameBuffers {
    fn new(device: &Device, vertex_capacity: usize, index_capacity: usize) -> RenderResult<Self> {
        Ok(FrameBuffers {
            vertices: Buffer::empty(
                device,
                (vertex_capacity * size_of::<EguiVertex>()) as u64,
                vk::BufferUsageFlags::VERTEX_BUFFER,
                UsageFlags::HOST_ACCESS | UsageFlags::UPLOAD,
            )?,
            indices: Buffer::empty(
                device,
                (index_capacity * size_of::<u32>()) as u64,
                vk::BufferUsageFlags::INDEX_BUFFER,
                UsageFlags::HOST_ACCESS | UsageFlags::UPLOAD,
            )?,
            vertex_capacity,
            index_capacity,
        })
    }

    fn destroy(&mut self, device: &Device) {
        self.vertices.destroy(device);
        self.indices.destroy(device);
    }
}

struct Texture {
    image: TextureImage,
    descriptor_set: usize,
}

/// Draws the egui overlay on top of the strokes.
pub struct EguiRenderer {
    pipeline: GraphicsPipeline,
    pipeline_layout: PipelineLayout,
    descriptor_set_manager: DescriptorSetManager,
    frame_buffers: Vec<FrameBuffers>,
    draw_indexed: Vec<DrawIndexed>,
    textures: HashMap<TextureId, Texture>,
    free_descriptor_sets: Vec<usize>,
    screen_size: [f32; 2],
}

impl EguiRenderer {
    pub fn new(device: &Device) -> RenderResult<Self> {
        let descriptor_bindings = [DescriptorBinding::new(
            0,
            1,
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
            vk::ShaderStageFlags::FRAGMENT,
        )];
        let descriptor_set_manager =
            DescriptorSetManager::new(device, &descriptor_bindings, MAX_TEXTURES)?;

        let pipeline_layout = PipelineLayout::new(
            device,
            &[descriptor_set_manager.descriptor_set_layout()],
            &[PushConstantRanges::of::<UiConstants>(
                vk::ShaderStageFlags::VERTEX,
            )],
        )?;

        let vertex_bindings = EguiVertex::binding_descriptions();
        let vertex_attributes = EguiVertex::attribute_descriptions();
        let pipeline = GraphicsPipeline::new(
            device,
            &PipelineDescription {
                shader: Shader::Ui,
                layout: pipeline_layout.handle(),
                color_format: device.surface_format().format,
                blending: premultiplied_alpha_blending(),
                vertex_bindings: &vertex_bindings,
                vertex_attributes: &vertex_attributes,
            },
        )?;

        let frame_buffers = (0..device.frames_in_flight())
            .map(|_| FrameBuffers::new(device, INITIAL_VERTEX_CAPACITY, INITIAL_INDEX_CAPACITY))
            .collect::<RenderResult<Vec<_>>>()?;

        Ok(EguiRenderer {
            pipeline,
            pipeline_layout,
            descriptor_set_manager,
            frame_buffers,
            draw_indexed: vec![],
            textures: Default::default(),
            free_descriptor_sets: (0..MAX_TEXTURES).rev().collect(),
            screen_size: [0.0; 2],
        })
    }

    fn update_buffers(
        &mut self,
        device: &Device,
        frame_index: usize,
        ui: &UserInterface,
    ) -> RenderResult<()> {
        let pixels_per_point = ui.pixels_per_point();
        let extent = device.swapchain().extent();
        self.screen_size = [
            extent.width as f32 / pixels_per_point,
            extent.height as f32 / pixels_per_point,
        ];

        let meshes = ui.clipped_meshes();
        let vertex_total: usize = meshes.iter().map(|mesh| mesh.1.vertices.len()).sum();
        let index_total: usize = meshes.iter().map(|mesh| mesh.1.indices.len()).sum();

        let buffers = &mut self.frame_buffers[frame_index];
        if vertex_total > buffers.vertex_capacity || index_total > buffers.index_capacity {
            let vertex_capacity = grown_capacity(buffers.vertex_capacity, vertex_total);
            let index_capacity = grown_capacity(buffers.index_capacity, index_total);
            log::debug!(
                "Growing egui buffers to {} vertices, {} indices",
                vertex_capacity,
                index_capacity
            );
            let grown = FrameBuffers::new(device, vertex_capacity, index_capacity)?;
            std::mem::replace(buffers, grown).destroy(device);
        }

        let mut vertex_start = 0;
        let mut index_start = 0;
        self.draw_indexed.clear();
        for egui::ClippedMesh(clip_rect, mesh) in meshes {
            if mesh.vertices.is_empty() || mesh.indices.is_empty() {
                continue;
            }
            let scissor = match scissor_for_clip_rect(*clip_rect, pixels_per_point, extent) {
                Some(scissor) => scissor,
                None => continue,
            };

            let vertices = mesh.vertices.iter().map(egui_vertex).collect::<Vec<_>>();
            buffers
                .vertices
                .write_data(device, &vertices, vertex_start)?;
            buffers
                .indices
                .write_data(device, &mesh.indices, index_start)?;

            self.draw_indexed.push(DrawIndexed {
                vertex_offset: vertex_start * size_of::<EguiVertex>() as u64,
                index_offset: index_start * size_of::<u32>() as u64,
                index_count: mesh.indices.len() as u32,
                scissor,
                texture_id: mesh.texture_id,
            });

            vertex_start += mesh.vertices.len() as u64;
            index_start += mesh.indices.len() as u64;
        }
        Ok(())
    }

    fn update_textures(&mut self, device: &Device, ui: &UserInterface) -> RenderResult<()> {
        let textures_delta = ui.textures_delta();

        for (texture_id, delta) in &textures_delta.set {
            let pixels = image_pixels(&delta.image);
            let width = delta.image.width() as u32;
            let height = delta.image.height() as u32;

            if let Some(pos) = delta.pos {
                match self.textures.get_mut(texture_id) {
                    Some(texture) => texture.image.upload(
                        device,
                        [pos[0] as u32, pos[1] as u32],
                        width,
                        height,
                        &pixels,
                    )?,
                    None => log::warn!("Partial update of unknown texture {:?}", texture_id),
                }
                continue;
            }

            if self.textures.contains_key(texture_id) {
                self.free_texture(device, texture_id)?;
            }
            let descriptor_set = match self.free_descriptor_sets.pop() {
                Some(descriptor_set) => descriptor_set,
                None => {
                    log::warn!("Too many egui textures, dropping {:?}", texture_id);
                    continue;
                }
            };

            let image = TextureImage::new(device, width, height, &pixels)?;
            let image_info = [vk::DescriptorImageInfoBuilder::new()
                .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
                .image_view(image.image_view().handle())
                .sampler(image.sampler().handle())];
            let descriptor_writes =
                [self
                    .descriptor_set_manager
                    .bind_image(descriptor_set, 0, &image_info)];
            self.descriptor_set_manager
                .update_descriptors(device, &descriptor_writes);

            log::debug!("Uploaded egui texture {:?}: {}x{}", texture_id, width, height);
            self.textures.insert(
                *texture_id,
                Texture {
                    image,
                    descriptor_set,
                },
            );
        }

        for texture_id in &textures_delta.free {
            self.free_texture(device, texture_id)?;
        }
        Ok(())
    }

    /// Earlier frames may still sample the texture, so the device is drained
    /// before it goes away.
    fn free_texture(&mut self, device: &Device, texture_id: &TextureId) -> RenderResult<()> {
        if let Some(mut texture) = self.textures.remove(texture_id) {
            device.wait_idle()?;
            texture.image.destroy(device);
            self.free_descriptor_sets.push(texture.descriptor_set);
        }
        Ok(())
    }
}

impl Renderer for EguiRenderer {
    fn update(
        &mut self,
        device: &mut Device,
        frame: &AcquiredFrame,
        _canvas: &mut StrokeCanvas,
        ui: &UserInterface,
    ) -> RenderResult<()> {
        puffin::profile_function!();
        self.update_textures(device, ui)?;
        self.update_buffers(device, frame.frame_index, ui)
    }

    fn fill_command_buffer(
        &self,
        device: &Device,
        command_buffer: &CommandBuffer,
        frame: &AcquiredFrame,
    ) {
        puffin::profile_function!();
        if self.draw_indexed.is_empty() {
            return;
        }

        command_buffer.bind_pipeline(
            device,
            vk::PipelineBindPoint::GRAPHICS,
            self.pipeline.handle(),
        );

        command_buffer.push_constants(
            device,
            self.pipeline_layout.handle(),
            vk::ShaderStageFlags::VERTEX,
            0,
            &UiConstants {
                screen_size: vec2(self.screen_size[0], self.screen_size[1]),
            },
        );

        let buffers = &self.frame_buffers[frame.frame_index];
        for draw_indexed in &self.draw_indexed {
            let texture = match self.textures.get(&draw_indexed.texture_id) {
                Some(texture) => texture,
                None => continue,
            };
            command_buffer.bind_descriptor_sets(
                device,
                vk::PipelineBindPoint::GRAPHICS,
                self.pipeline_layout.handle(),
                &[self
                    .descriptor_set_manager
                    .descriptor_set(texture.descriptor_set)],
            );
            command_buffer.set_scissor(device, 0, &[draw_indexed.scissor.into_builder()]);
            command_buffer.bind_vertex_buffer(
                device,
                &[&buffers.vertices],
                &[draw_indexed.vertex_offset],
            );
            command_buffer.bind_index_buffer(device, &buffers.indices, draw_indexed.index_offset);
            command_buffer.draw_indexed(device, draw_indexed.index_count);
        }
    }

    fn destroy(&mut self, device: &mut Device) {
        self.textures
            .values_mut()
            .for_each(|texture| texture.image.destroy(device));
        self.frame_buffers
            .iter_mut()
            .for_each(|buffers| buffers.destroy(device));
        self.descriptor_set_manager.destroy(device);
        self.pipeline_layout.destroy(device);
        self.pipeline.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::{AlphaImage, ColorImage};
    use egui::{pos2, Color32};

    fn extent(width: u32, height: u32) -> vk::Extent2D {
        vk::Extent2D { width, height }
    }

    #[test]
    fn clip_rect_is_scaled_to_pixels() {
        let rect = Rect::from_min_max(pos2(10.0, 20.0), pos2(110.0, 70.0));
        let scissor = scissor_for_clip_rect(rect, 2.0, extent(1000, 1000)).unwrap();
        assert_eq!((scissor.offset.x, scissor.offset.y), (20, 40));
        assert_eq!((scissor.extent.width, scissor.extent.height), (200, 100));
    }

    #[test]
    fn clip_rect_is_clamped_to_framebuffer() {
        let rect = Rect::from_min_max(pos2(-50.0, -50.0), pos2(5000.0, 5000.0));
        let scissor = scissor_for_clip_rect(rect, 1.0, extent(800, 600)).unwrap();
        assert_eq!((scissor.offset.x, scissor.offset.y), (0, 0));
        assert_eq!((scissor.extent.width, scissor.extent.height), (800, 600));
    }

    #[test]
    fn offscreen_clip_rect_is_skipped() {
        let rect = Rect::from_min_max(pos2(900.0, 10.0), pos2(950.0, 20.0));
        assert!(scissor_for_clip_rect(rect, 1.0, extent(800, 600)).is_none());
    }

    #[test]
    fn alpha_images_expand_to_white() {
        let image = ImageData::Alpha(AlphaImage {
            size: [2, 1],
            pixels: vec![0, 128],
        });
        assert_eq!(image_pixels(&image), vec![0, 0, 0, 0, 128, 128, 128, 128]);
    }

    #[test]
    fn color_images_keep_channels() {
        let image = ImageData::Color(ColorImage {
            size: [1, 1],
            pixels: vec![Color32::from_rgb(1, 2, 3)],
        });
        assert_eq!(image_pixels(&image), vec![1, 2, 3, 255]);
    }

    #[test]
    fn vertices_convert_colors_to_floats() {
        let vertex = EpaintVertex {
            pos: pos2(1.0, 2.0),
            uv: pos2(0.5, 0.25),
            color: Color32::from_rgb(255, 0, 0),
        };
        let converted = egui_vertex(&vertex);
        assert_eq!(converted.position, vec2(1.0, 2.0));
        assert_eq!(converted.tex_coords, vec2(0.5, 0.25));
        assert_eq!(converted.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }
}
