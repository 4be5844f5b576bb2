use erupt::vk;
use shared::BufferId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub descriptor_count: u32,
    pub descriptor_type: vk::DescriptorType,
    pub stages: vk::ShaderStageFlags,
}

impl DescriptorBinding {
    pub fn new(
        binding: u32,
        descriptor_count: u32,
        descriptor_type: vk::DescriptorType,
        stage: vk::ShaderStageFlags,
    ) -> Self {
        DescriptorBinding {
            binding,
            descriptor_count,
            descriptor_type,
            stages: stage,
        }
    }

    /// Layout entry for one of the stroke shader buffers.
    pub fn for_buffer(id: BufferId) -> Self {
        let (descriptor_type, stage) = match id {
            BufferId::StrokeCount => (
                vk::DescriptorType::UNIFORM_BUFFER,
                vk::ShaderStageFlags::VERTEX,
            ),
            BufferId::Color | BufferId::VertexCount | BufferId::Vertices => (
                vk::DescriptorType::STORAGE_BUFFER,
                vk::ShaderStageFlags::VERTEX,
            ),
            BufferId::Brightness => (
                vk::DescriptorType::UNIFORM_BUFFER,
                vk::ShaderStageFlags::FRAGMENT,
            ),
        };
        DescriptorBinding::new(id.binding(), 1, descriptor_type, stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{BRIGHTNESS_BUFFER_ID, STROKE_COUNT_BUFFER_ID, VERTICES_BUFFER_ID};

    #[test]
    fn buffer_bindings_follow_shared_ids() {
        let bindings = BufferId::ALL.map(DescriptorBinding::for_buffer);
        for (binding, id) in bindings.iter().zip(BufferId::ALL) {
            assert_eq!(binding.binding, id.binding());
            assert_eq!(binding.descriptor_count, 1);
        }
    }

    #[test]
    fn uniforms_and_storage_buffers() {
        let stroke_count = DescriptorBinding::for_buffer(BufferId::StrokeCount);
        assert_eq!(stroke_count.binding, STROKE_COUNT_BUFFER_ID);
        assert_eq!(
            stroke_count.descriptor_type,
            vk::DescriptorType::UNIFORM_BUFFER
        );

        let vertices = DescriptorBinding::for_buffer(BufferId::Vertices);
        assert_eq!(vertices.binding, VERTICES_BUFFER_ID);
        assert_eq!(vertices.descriptor_type, vk::DescriptorType::STORAGE_BUFFER);

        let brightness = DescriptorBinding::for_buffer(BufferId::Brightness);
        assert_eq!(brightness.binding, BRIGHTNESS_BUFFER_ID);
        assert_eq!(brightness.stages, vk::ShaderStageFlags::FRAGMENT);
    }
}
