//! Typed form of the orchestrator-reserved events.
//!
//! On the wire a reserved event is an ordinary [`Event`] whose tag starts with
//! `"main "`. Components may build them by hand or through [`SystemEvent`]; the
//! orchestrator always parses them back into the closed enum before acting, so a
//! malformed payload is caught at one place.
//!
//! | Tag | Payload |
//! |---|---|
//! | `main start app` | app name |
//! | `main start service` | service name |
//! | `main close service` | service name |
//! | `main start overlay` | overlay name |
//! | `main close overlay` | overlay name |
//! | `main notification` | message |
//! | `main get variable` | key |
//! | `main set variable` | `[key, value]` |
//! | `main sleep` | none |
//! | `main exit` | none |

use super::event::{Event, Payload};
use crate::domain::{Result, RuntimeError};

pub const START_APP: &str = "main start app";
pub const START_SERVICE: &str = "main start service";
pub const CLOSE_SERVICE: &str = "main close service";
pub const START_OVERLAY: &str = "main start overlay";
pub const CLOSE_OVERLAY: &str = "main close overlay";
pub const NOTIFICATION: &str = "main notification";
pub const GET_VARIABLE: &str = "main get variable";
pub const SET_VARIABLE: &str = "main set variable";
pub const SLEEP: &str = "main sleep";
pub const EXIT: &str = "main exit";

/// Tag of the targeted reply to a `main get variable` request.
pub const VARIABLE_RETURN: &str = "variable return";

/// An operation requested of the orchestrator.
///
/// # Example
///
/// ```
/// use tickbus::bus::{Event, SystemEvent};
///
/// let event = SystemEvent::StartApp("Home".into()).into_event();
/// assert_eq!(event.tag(), "main start app");
///
/// let parsed = SystemEvent::from_event(&Event::new("main start app").with_payload("Home"))?;
/// assert_eq!(parsed, SystemEvent::StartApp("Home".into()));
/// # Ok::<(), tickbus::RuntimeError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SystemEvent {
    /// Make the named app current.
    StartApp(String),
    /// Add the named service to the running set.
    StartService(String),
    /// Remove the named service from the running set.
    CloseService(String),
    /// Append the named overlay to the running overlays.
    StartOverlay(String),
    /// Remove the named overlay from the running overlays.
    CloseOverlay(String),
    /// Show a message through the built-in notification overlay.
    Notification(Payload),
    /// Ask for a shared variable; answered with a targeted `variable return`.
    GetVariable(String),
    /// Store a shared variable.
    SetVariable(String, Payload),
    /// Toggle between awake and dormant.
    Sleep,
    /// Stop the loop.
    Exit,
}

impl SystemEvent {
    /// The reserved tag of this operation.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::StartApp(_) => START_APP,
            Self::StartService(_) => START_SERVICE,
            Self::CloseService(_) => CLOSE_SERVICE,
            Self::StartOverlay(_) => START_OVERLAY,
            Self::CloseOverlay(_) => CLOSE_OVERLAY,
            Self::Notification(_) => NOTIFICATION,
            Self::GetVariable(_) => GET_VARIABLE,
            Self::SetVariable(..) => SET_VARIABLE,
            Self::Sleep => SLEEP,
            Self::Exit => EXIT,
        }
    }

    /// Encodes the operation as a bus event.
    #[must_use]
    pub fn into_event(self) -> Event {
        let tag = self.tag();
        let payload = match self {
            Self::StartApp(name)
            | Self::StartService(name)
            | Self::CloseService(name)
            | Self::StartOverlay(name)
            | Self::CloseOverlay(name)
            | Self::GetVariable(name) => Payload::String(name),
            Self::Notification(message) => message,
            Self::SetVariable(key, value) => Payload::Array(vec![Payload::String(key), value]),
            Self::Sleep | Self::Exit => Payload::Null,
        };
        Event::new(tag).with_payload(payload)
    }

    /// Parses a reserved event.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::UnknownTag`] if the tag names no operation
    /// - [`RuntimeError::InvalidPayload`] if the payload has the wrong shape
    pub fn from_event(event: &Event) -> Result<Self> {
        let tag = event.tag();
        let payload = event.payload();
        Ok(match tag {
            START_APP => Self::StartApp(name_payload(tag, payload)?),
            START_SERVICE => Self::StartService(name_payload(tag, payload)?),
            CLOSE_SERVICE => Self::CloseService(name_payload(tag, payload)?),
            START_OVERLAY => Self::StartOverlay(name_payload(tag, payload)?),
            CLOSE_OVERLAY => Self::CloseOverlay(name_payload(tag, payload)?),
            NOTIFICATION => Self::Notification(payload.clone()),
            GET_VARIABLE => Self::GetVariable(name_payload(tag, payload)?),
            SET_VARIABLE => {
                let (key, value) = pair_payload(tag, payload)?;
                Self::SetVariable(key, value)
            }
            SLEEP => Self::Sleep,
            EXIT => Self::Exit,
            other => return Err(RuntimeError::UnknownTag(other.to_string())),
        })
    }
}

impl From<SystemEvent> for Event {
    fn from(system: SystemEvent) -> Self {
        system.into_event()
    }
}

fn name_payload(tag: &str, payload: &Payload) -> Result<String> {
    payload
        .as_str()
        .map(String::from)
        .ok_or_else(|| RuntimeError::InvalidPayload {
            tag: tag.to_string(),
            reason: format!("expected a name, got {payload}"),
        })
}

fn pair_payload(tag: &str, payload: &Payload) -> Result<(String, Payload)> {
    match payload.as_array().map(Vec::as_slice) {
        Some([Payload::String(key), value]) => Ok((key.clone(), value.clone())),
        _ => Err(RuntimeError::InvalidPayload {
            tag: tag.to_string(),
            reason: format!("expected [key, value], got {payload}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_variable_round_trips_through_an_event() {
        let event = SystemEvent::SetVariable("volume".into(), json!(7)).into_event();
        assert_eq!(event.tag(), SET_VARIABLE);
        assert_eq!(event.payload(), &json!(["volume", 7]));
        assert_eq!(
            SystemEvent::from_event(&event).ok(),
            Some(SystemEvent::SetVariable("volume".into(), json!(7)))
        );
    }

    #[test]
    fn unknown_reserved_tag_is_rejected() {
        let err = SystemEvent::from_event(&Event::new("main reboot")).unwrap_err();
        assert!(matches!(err, RuntimeError::UnknownTag(tag) if tag == "main reboot"));
    }

    #[test]
    fn start_app_requires_a_name() {
        let event = Event::new(START_APP).with_payload(json!(3));
        let err = SystemEvent::from_event(&event).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidPayload { .. }));
    }

    #[test]
    fn set_variable_rejects_a_bare_value() {
        let event = Event::new(SET_VARIABLE).with_payload("volume");
        assert!(SystemEvent::from_event(&event).is_err());
    }

    #[test]
    fn sleep_ignores_its_payload() {
        let event = Event::new(SLEEP).with_payload("whatever");
        assert_eq!(SystemEvent::from_event(&event).ok(), Some(SystemEvent::Sleep));
    }
}
