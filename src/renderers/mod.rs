use crate::error::RenderResult;
use crate::stroke::StrokeCanvas;
use crate::user_interface::UserInterface;
use crate::vulkan::command_buffer::CommandBuffer;
use crate::vulkan::device::Device;
use downcast_rs::{impl_downcast, Downcast};
use erupt_bootstrap::AcquiredFrame;

pub mod clear;
pub mod egui_renderer;
pub mod stroke_renderer;

/// A step of the frame that draws inside the render pass opened by
/// [`clear::Clear`].
pub trait Renderer: Downcast {
    /// Uploads whatever changed since the last frame. Called after the frame
    /// slot was acquired, so resources owned by `frame.frame_index` are idle.
    fn update(
        &mut self,
        device: &mut Device,
        frame: &AcquiredFrame,
        canvas: &mut StrokeCanvas,
        ui: &UserInterface,
    ) -> RenderResult<()>;

    fn fill_command_buffer(
        &self,
        device: &Device,
        command_buffer: &CommandBuffer,
        frame: &AcquiredFrame,
    );

    fn destroy(&mut self, device: &mut Device);
}
impl_downcast!(Renderer);
