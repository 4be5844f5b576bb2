use bytemuck::Pod;
use erupt::vk;
use std::mem::size_of;

pub struct PushConstantRanges {
    handle: vk::PushConstantRange,
}

impl PushConstantRanges {
    pub fn new(stages: vk::ShaderStageFlags, offset: u32, size: u32) -> Self {
        let handle = vk::PushConstantRangeBuilder::new()
            .stage_flags(stages)
            .offset(offset)
            .size(size)
            .build();

        PushConstantRanges { handle }
    }

    /// Range covering one `T` at offset zero.
    pub fn of<T: Pod>(stages: vk::ShaderStageFlags) -> Self {
        Self::new(stages, 0, size_of::<T>() as u32)
    }

    pub fn handle(&self) -> vk::PushConstantRange {
        self.handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{UiConstants, ViewportConstants};

    #[test]
    fn ranges_cover_shared_constants() {
        let viewport = PushConstantRanges::of::<ViewportConstants>(vk::ShaderStageFlags::VERTEX);
        assert_eq!(viewport.handle().size, 8);
        assert_eq!(viewport.handle().offset, 0);

        let ui = PushConstantRanges::of::<UiConstants>(vk::ShaderStageFlags::VERTEX);
        assert_eq!(ui.handle().size, 8);
    }
}
