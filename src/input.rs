use glam::{vec2, Vec2};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton};

/// Phase of a drag over the canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PanGesture {
    Began(Vec2),
    Changed(Vec2),
    Ended,
}

/// Turns raw pointer events into pan gestures.
#[derive(Default)]
pub struct Input {
    position: Vec2,
    panning: bool,
}

impl Input {
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<PanGesture> {
        self.position = vec2(position.x as f32, position.y as f32);
        self.panning.then(|| PanGesture::Changed(self.position))
    }

    /// `captured` is set when the press landed on the user interface; such a
    /// press never starts a pan.
    pub fn mouse_input(
        &mut self,
        button: MouseButton,
        state: ElementState,
        captured: bool,
    ) -> Option<PanGesture> {
        if button != MouseButton::Left {
            return None;
        }

        match state {
            ElementState::Pressed if !captured && !self.panning => {
                self.panning = true;
                Some(PanGesture::Began(self.position))
            }
            ElementState::Released if self.panning => {
                self.panning = false;
                Some(PanGesture::Ended)
            }
            _ => None,
        }
    }

    /// Cancels a pan, e.g. when the cursor leaves the window.
    pub fn cancel(&mut self) -> Option<PanGesture> {
        std::mem::take(&mut self.panning).then(|| PanGesture::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    #[test]
    fn press_move_release() {
        let mut input = Input::default();
        assert_eq!(input.cursor_moved(at(10.0, 20.0)), None);
        assert_eq!(
            input.mouse_input(MouseButton::Left, ElementState::Pressed, false),
            Some(PanGesture::Began(vec2(10.0, 20.0)))
        );
        assert_eq!(
            input.cursor_moved(at(12.0, 21.0)),
            Some(PanGesture::Changed(vec2(12.0, 21.0)))
        );
        assert_eq!(
            input.mouse_input(MouseButton::Left, ElementState::Released, false),
            Some(PanGesture::Ended)
        );
        assert_eq!(input.cursor_moved(at(30.0, 30.0)), None);
    }

    #[test]
    fn captured_press_does_not_pan() {
        let mut input = Input::default();
        assert_eq!(
            input.mouse_input(MouseButton::Left, ElementState::Pressed, true),
            None
        );
        assert_eq!(input.cursor_moved(at(1.0, 1.0)), None);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut input = Input::default();
        assert_eq!(
            input.mouse_input(MouseButton::Right, ElementState::Pressed, false),
            None
        );
        assert_eq!(input.cursor_moved(at(1.0, 1.0)), None);
    }

    #[test]
    fn cancel_ends_active_pan_once() {
        let mut input = Input::default();
        input.mouse_input(MouseButton::Left, ElementState::Pressed, false);
        assert_eq!(input.cancel(), Some(PanGesture::Ended));
        assert_eq!(input.cancel(), None);
    }
}
