use bytemuck::{Pod, Zeroable};
use erupt::vk;
use glam::{Vec2, Vec4};
use memoffset::offset_of;
use std::mem::size_of;

pub trait Vertex {
    fn binding_descriptions() -> Vec<vk::VertexInputBindingDescriptionBuilder<'static>>;
    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescriptionBuilder<'static>>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C)]
pub struct EguiVertex {
    pub position: Vec2,
    pub tex_coords: Vec2,
    pub color: Vec4,
}

unsafe impl Zeroable for EguiVertex {}
unsafe impl Pod for EguiVertex {}

impl EguiVertex {
    pub fn new(position: Vec2, tex_coords: Vec2, color: Vec4) -> Self {
        EguiVertex {
            position,
            tex_coords,
            color,
        }
    }
}

impl Vertex for EguiVertex {
    fn binding_descriptions() -> Vec<vk::VertexInputBindingDescriptionBuilder<'static>> {
        vec![vk::VertexInputBindingDescriptionBuilder::new()
            .binding(0)
            .stride(size_of::<Self>() as u32)
            .input_rate(vk::VertexInputRate::VERTEX)]
    }

    fn attribute_descriptions() -> Vec<vk::VertexInputAttributeDescriptionBuilder<'static>> {
        vec![
            vk::VertexInputAttributeDescriptionBuilder::new()
                .binding(0)
                .location(0)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(offset_of!(Self, position) as u32),
            vk::VertexInputAttributeDescriptionBuilder::new()
                .binding(0)
                .location(1)
                .format(vk::Format::R32G32_SFLOAT)
                .offset(offset_of!(Self, tex_coords) as u32),
            vk::VertexInputAttributeDescriptionBuilder::new()
                .binding(0)
                .location(2)
                .format(vk::Format::R32G32B32A32_SFLOAT)
                .offset(offset_of!(Self, color) as u32),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_match_layout() {
        let attributes = EguiVertex::attribute_descriptions();
        let offsets = attributes
            .iter()
            .map(|attribute| attribute.offset)
            .collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 8, 16]);

        let bindings = EguiVertex::binding_descriptions();
        assert_eq!(bindings[0].stride, 32);
    }
}
