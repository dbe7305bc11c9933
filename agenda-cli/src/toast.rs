use agenda_core::notifier::{Toast, ToastId, ToastSurface};

use crate::render::Render;

/// Prints toasts as status lines. A terminal cannot take a line back, so
/// dismissing is a no-op.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl ToastSurface for TerminalSurface {
    fn show(&mut self, toast: &Toast) {
        println!("{}", toast.render());
    }

    fn dismiss(&mut self, _id: ToastId) {}

    fn update(&mut self, toast: &Toast) {
        self.show(toast);
    }
}
