//! The home screen: a large clock and the date. Tapping it opens the drawer.

use super::clock::format_time;
use super::launcher::LAUNCHER_APP;
use crate::bus::{EventListener, SystemEvent};
use crate::components::{App, ComponentModule};
use crate::input::{MOUSE_DOWN, TIME};
use crate::ui::{Anchor, Color, Label, Point};

/// Name of the home app.
pub const HOME_APP: &str = "Home";

/// Contributes the `Home` app.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeModule;

impl ComponentModule for HomeModule {
    fn name(&self) -> &str {
        HOME_APP
    }

    fn define_app(&self) -> Option<App> {
        let mut app = App::new(HOME_APP).with_background(Color(0, 0, 40));

        let time = Label::new("--:--:--", Anchor::Center, Point::new(0, -12));
        let date = Label::new("--- -- ---", Anchor::Center, Point::new(0, 12)).with_color(Color::GREY);
        let (time_text, date_text) = (time.text_cell(), date.text_cell());
        app.main_activity_mut().add(time).add(date);

        app.on(TIME, move |event, _| {
            if let Some(now) = format_time(event.payload(), "%H:%M:%S") {
                *time_text.borrow_mut() = now;
            }
            if let Some(today) = format_time(event.payload(), "%a %d %b") {
                *date_text.borrow_mut() = today;
            }
        });

        app.on(MOUSE_DOWN, |_, outbox| {
            outbox.push(SystemEvent::StartApp(LAUNCHER_APP.to_string()));
        });

        Some(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::system::START_APP;
    use crate::bus::{Event, EventHandler};
    use crate::ui::{HeadlessSurface, Surface, Viewport};
    use serde_json::json;

    #[test]
    fn time_updates_both_labels() {
        let mut app = HomeModule.define_app().unwrap();
        app.start(Viewport::default()).unwrap();
        app.deliver(&Event::new(TIME).with_payload(86_400 * 365));

        let mut surface = HeadlessSurface::default();
        app.draw(&mut surface);
        surface.present();
        let texts = surface.last_texts();
        assert_eq!(texts.len(), 2);
        assert!(!texts.contains(&"--:--:--"));
    }

    #[test]
    fn tap_opens_the_drawer() {
        let mut app = HomeModule.define_app().unwrap();
        app.deliver(&Event::new(MOUSE_DOWN).with_payload(json!([1, 1])));
        let pending = app.queue().events();
        assert_eq!(pending[0].tag(), START_APP);
        assert_eq!(pending[0].payload(), &json!(LAUNCHER_APP));
    }
}
