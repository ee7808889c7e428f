//! Components shipped with the runtime.
//!
//! | Module | Contributes |
//! |---|---|
//! | [`notification`] | overlay `notification`, started on demand |
//! | [`clock`] | overlay `clock` |
//! | [`fps`] | overlay `fps counter` |
//! | [`launcher`] | app `appdrawer` |
//! | [`home`] | app `Home` |
//! | [`bluetooth`] | service `bluetooth service` and app `bluetooth app` |
//!
//! Hosts pass [`modules`] (plus their own) to [`crate::initialize`].

pub mod bluetooth;
pub mod clock;
pub mod fps;
pub mod home;
pub mod launcher;
pub mod notification;

pub use bluetooth::{BluetoothModule, BluetoothService, FixedScanner, Scanner};
pub use clock::ClockModule;
pub use fps::FpsModule;
pub use home::HomeModule;
pub use launcher::LauncherModule;
pub use notification::NotificationModule;

use crate::bus::Payload;
use crate::components::ComponentModule;

/// Every built-in module, with default settings.
#[must_use]
pub fn modules() -> Vec<Box<dyn ComponentModule>> {
    vec![
        Box::new(NotificationModule::default()),
        Box::new(ClockModule),
        Box::new(FpsModule),
        Box::new(LauncherModule),
        Box::new(HomeModule),
        Box::new(BluetoothModule::new(FixedScanner::default())),
    ]
}

/// Reads a `[x, y]` pointer payload.
fn pointer(payload: &Payload) -> Option<(i64, i64)> {
    match payload.as_array()?.as_slice() {
        [x, y] => Some((x.as_i64()?, y.as_i64()?)),
        _ => None,
    }
}

/// Reads a `[key, value]` variable-return payload.
fn variable_pair(payload: &Payload) -> Option<(&str, &Payload)> {
    match payload.as_array()?.as_slice() {
        [key, value] => Some((key.as_str()?, value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Catalog;
    use serde_json::json;

    #[test]
    fn builtin_catalog() {
        let catalog = Catalog::from_modules(&modules());
        assert_eq!(catalog.app_names(), vec!["Home", "appdrawer", "bluetooth app"]);
        assert_eq!(catalog.overlay_names(), vec!["clock", "fps counter", "notification"]);
        assert_eq!(catalog.service_names(), vec!["bluetooth service"]);
    }

    #[test]
    fn payload_helpers() {
        assert_eq!(pointer(&json!([3, 4])), Some((3, 4)));
        assert_eq!(pointer(&json!([3])), None);
        assert_eq!(variable_pair(&json!(["fps", 15])), Some(("fps", &json!(15))));
        assert_eq!(variable_pair(&json!([1, 2])), None);
    }
}
