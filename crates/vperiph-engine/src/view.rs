use crate::message::ScreenId;
use crate::screen::Screen;

/// Presentation collaborator.
///
/// The engine owns no rendering; it reports log and debug text and screen
/// lifecycle through this trait.
pub trait View {
    /// Text for the log channel (`dL`).
    fn notify_log(&mut self, text: &str);

    /// Text for the debug channel (`dD`, peer errors, local diagnostics).
    fn notify_debug(&mut self, text: &str);

    /// A screen became active and should be presented.
    fn activate_screen(&mut self, id: ScreenId, screen: &dyn Screen);

    /// Resources of a previously active screen can be released.
    ///
    /// Always called before the next screen is activated.
    fn release_screen(&mut self, _id: ScreenId) {}

    /// A screen changed its state.
    fn screen_updated(&mut self, _id: ScreenId, _screen: &dyn Screen) {}
}

impl<V: View + ?Sized> View for &mut V {
    fn notify_log(&mut self, text: &str) {
        (**self).notify_log(text)
    }

    fn notify_debug(&mut self, text: &str) {
        (**self).notify_debug(text)
    }

    fn activate_screen(&mut self, id: ScreenId, screen: &dyn Screen) {
        (**self).activate_screen(id, screen)
    }

    fn release_screen(&mut self, id: ScreenId) {
        (**self).release_screen(id)
    }

    fn screen_updated(&mut self, id: ScreenId, screen: &dyn Screen) {
        (**self).screen_updated(id, screen)
    }
}

impl<V: View + ?Sized> View for Box<V> {
    fn notify_log(&mut self, text: &str) {
        (**self).notify_log(text)
    }

    fn notify_debug(&mut self, text: &str) {
        (**self).notify_debug(text)
    }

    fn activate_screen(&mut self, id: ScreenId, screen: &dyn Screen) {
        (**self).activate_screen(id, screen)
    }

    fn release_screen(&mut self, id: ScreenId) {
        (**self).release_screen(id)
    }

    fn screen_updated(&mut self, id: ScreenId, screen: &dyn Screen) {
        (**self).screen_updated(id, screen)
    }
}

/// One call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Log(String),
    Debug(String),
    Activated(ScreenId),
    Released(ScreenId),
    /// Carries the screen summary at the time of the update.
    Updated(ScreenId, String),
}

/// A headless view that records every call, for embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Log(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn debugs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Debug(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl View for RecordingView {
    fn notify_log(&mut self, text: &str) {
        self.events.push(ViewEvent::Log(text.to_string()));
    }

    fn notify_debug(&mut self, text: &str) {
        self.events.push(ViewEvent::Debug(text.to_string()));
    }

    fn activate_screen(&mut self, id: ScreenId, _screen: &dyn Screen) {
        self.events.push(ViewEvent::Activated(id));
    }

    fn release_screen(&mut self, id: ScreenId) {
        self.events.push(ViewEvent::Released(id));
    }

    fn screen_updated(&mut self, id: ScreenId, screen: &dyn Screen) {
        self.events.push(ViewEvent::Updated(id, screen.summary()));
    }
}
