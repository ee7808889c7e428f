//! The app drawer: lists every registered app and starts the one tapped.
//!
//! The list is not known at construction time. On first start the drawer asks
//! the orchestrator for the `apps` variable and fills its rows from the reply.

use super::{pointer, variable_pair};
use crate::bus::system::VARIABLE_RETURN;
use crate::bus::{EventListener, SystemEvent};
use crate::components::{App, ComponentModule};
use crate::input::MOUSE_DOWN;
use crate::ui::{Anchor, Color, Label, Point, TextCell};
use std::cell::RefCell;
use std::rc::Rc;

/// Name of the launcher app.
pub const LAUNCHER_APP: &str = "appdrawer";

const ROWS: usize = 8;
const TOP: i64 = 32;
const ROW_HEIGHT: i64 = 24;

/// Contributes the `appdrawer` app.
#[derive(Debug, Clone, Copy, Default)]
pub struct LauncherModule;

impl ComponentModule for LauncherModule {
    fn name(&self) -> &str {
        LAUNCHER_APP
    }

    fn define_app(&self) -> Option<App> {
        Some(launcher_app())
    }
}

fn launcher_app() -> App {
    let mut app = App::new(LAUNCHER_APP).with_background(Color(20, 20, 20));
    let main = app.main_activity_mut();
    main.add(Label::new("Apps", Anchor::MidTop, Point::new(0, 4)));

    let mut rows: Vec<TextCell> = Vec::with_capacity(ROWS);
    for row in 0..ROWS {
        let y = i32::try_from(TOP + ROW_HEIGHT * row as i64).unwrap_or(i32::MAX);
        let label = Label::new("", Anchor::TopLeft, Point::new(16, y));
        rows.push(label.text_cell());
        main.add(label);
    }

    let entries: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

    app.on_start(|outbox| outbox.push(SystemEvent::GetVariable("apps".to_string())));

    let listed = Rc::clone(&entries);
    app.on(VARIABLE_RETURN, move |event, _| {
        let Some(("apps", value)) = variable_pair(event.payload()) else {
            return;
        };
        let names: Vec<String> = value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|name| name.as_str())
            .filter(|name| *name != LAUNCHER_APP)
            .map(String::from)
            .collect();

        for (row, text) in rows.iter().enumerate() {
            *text.borrow_mut() = names.get(row).cloned().unwrap_or_default();
        }
        tracing::debug!(apps = names.len(), "launcher list refreshed");
        *listed.borrow_mut() = names;
    });

    app.on(MOUSE_DOWN, move |event, outbox| {
        let Some((_, y)) = pointer(event.payload()) else {
            return;
        };
        if y < TOP {
            return;
        }
        let row = usize::try_from((y - TOP) / ROW_HEIGHT).unwrap_or(usize::MAX);
        if let Some(name) = entries.borrow().get(row) {
            outbox.push(SystemEvent::StartApp(name.clone()));
        }
    });

    app
}
