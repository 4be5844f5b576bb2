use crate::error::RenderResult;
use crate::vulkan::shader_module::{
    Shader, ShaderModule, FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT,
};
use erupt::{vk, DeviceLoader, ExtendableFrom};
use std::slice;

/// Straight alpha: `src * src.a + dst * (1 - src.a)`.
pub fn alpha_blending() -> vk::PipelineColorBlendAttachmentStateBuilder<'static> {
    vk::PipelineColorBlendAttachmentStateBuilder::new()
        .color_write_mask(vk::ColorComponentFlags::all())
        .blend_enable(true)
        .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
        .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
        .color_blend_op(vk::BlendOp::ADD)
        .src_alpha_blend_factor(vk::BlendFactor::ONE)
        .dst_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
        .alpha_blend_op(vk::BlendOp::ADD)
}

/// Premultiplied alpha, as produced by egui.
pub fn premultiplied_alpha_blending() -> vk::PipelineColorBlendAttachmentStateBuilder<'static> {
    vk::PipelineColorBlendAttachmentStateBuilder::new()
        .color_write_mask(vk::ColorComponentFlags::all())
        .blend_enable(true)
        .src_color_blend_factor(vk::BlendFactor::ONE)
        .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
        .color_blend_op(vk::BlendOp::ADD)
        .src_alpha_blend_factor(vk::BlendFactor::ONE_MINUS_DST_ALPHA)
        .dst_alpha_blend_factor(vk::BlendFactor::ONE)
        .alpha_blend_op(vk::BlendOp::ADD)
}

pub struct PipelineDescription<'a> {
    pub shader: Shader,
    pub layout: vk::PipelineLayout,
    pub color_format: vk::Format,
    pub blending: vk::PipelineColorBlendAttachmentStateBuilder<'static>,
    pub vertex_bindings: &'a [vk::VertexInputBindingDescriptionBuilder<'static>],
    pub vertex_attributes: &'a [vk::VertexInputAttributeDescriptionBuilder<'static>],
}

/// Triangle list pipeline for dynamic rendering into a single color
/// attachment, with dynamic viewport and scissor.
pub struct GraphicsPipeline {
    handle: vk::Pipeline,
}

impl GraphicsPipeline {
    pub fn new(device: &DeviceLoader, description: &PipelineDescription) -> RenderResult<Self> {
        let shader_module = ShaderModule::new(device, description.shader)?;
        let pipeline = Self::create(device, &shader_module, description);
        shader_module.destroy(device);

        Ok(GraphicsPipeline { handle: pipeline? })
    }

    fn create(
        device: &DeviceLoader,
        shader_module: &ShaderModule,
        description: &PipelineDescription,
    ) -> RenderResult<vk::Pipeline> {
        let shader_stages = [
            shader_module.shader_stage(vk::ShaderStageFlagBits::VERTEX, VERTEX_ENTRY_POINT)?,
            shader_module.shader_stage(vk::ShaderStageFlagBits::FRAGMENT, FRAGMENT_ENTRY_POINT)?,
        ];

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfoBuilder::new()
            .vertex_binding_descriptions(description.vertex_bindings)
            .vertex_attribute_descriptions(description.vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfoBuilder::new()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        let mut pipeline_rendering_info = vk::PipelineRenderingCreateInfoBuilder::new()
            .color_attachment_formats(slice::from_ref(&description.color_format));

        let dynamic_pipeline_state = vk::PipelineDynamicStateCreateInfoBuilder::new()
            .dynamic_states(&[vk::DynamicState::SCISSOR, vk::DynamicState::VIEWPORT]);

        let viewport_state = vk::PipelineViewportStateCreateInfoBuilder::new()
            .scissor_count(1)
            .viewport_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfoBuilder::new()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfoBuilder::new()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlagBits::_1);

        let color_blend_attachments = [description.blending];
        let color_blend_state = vk::PipelineColorBlendStateCreateInfoBuilder::new()
            .logic_op_enable(false)
            .attachments(&color_blend_attachments);

        let pipeline_infos = [vk::GraphicsPipelineCreateInfoBuilder::new()
            .vertex_input_state(&vertex_input_state)
            .color_blend_state(&color_blend_state)
            .multisample_state(&multisample_state)
            .stages(&shader_stages)
            .layout(description.layout)
            .rasterization_state(&rasterization_state)
            .dynamic_state(&dynamic_pipeline_state)
            .viewport_state(&viewport_state)
            .input_assembly_state(&input_assembly_state)
            .extend_from(&mut pipeline_rendering_info)];

        let pipelines = unsafe {
            device.create_graphics_pipelines(vk::PipelineCache::null(), &pipeline_infos, None)
        }
        .result()?;

        Ok(pipelines[0])
    }

    pub fn destroy(&self, device: &DeviceLoader) {
        unsafe {
            device.destroy_pipeline(self.handle, None);
        }
    }

    pub fn handle(&self) -> vk::Pipeline {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strokes_blend_with_source_alpha() {
        let blending = alpha_blending();
        assert_eq!(blending.blend_enable, vk::TRUE);
        assert_eq!(blending.src_color_blend_factor, vk::BlendFactor::SRC_ALPHA);
        assert_eq!(
            blending.dst_color_blend_factor,
            vk::BlendFactor::ONE_MINUS_SRC_ALPHA
        );
    }

    #[test]
    fn egui_colors_are_premultiplied() {
        let blending = premultiplied_alpha_blending();
        assert_eq!(blending.src_color_blend_factor, vk::BlendFactor::ONE);
        assert_eq!(
            blending.dst_color_blend_factor,
            vk::BlendFactor::ONE_MINUS_SRC_ALPHA
        );
    }
}
