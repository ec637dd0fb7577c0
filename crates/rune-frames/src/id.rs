//! Frame and view identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Composite identity of a content frame: the routing id the renderer
/// assigned plus the id of the process hosting it.
///
/// Textual form is `"<routing>-<process>"`, which is also the serde form so
/// ids can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameId {
    pub process_id: i32,
    pub routing_id: i32,
}

impl FrameId {
    pub const fn new(routing_id: i32, process_id: i32) -> Self {
        Self {
            process_id,
            routing_id,
        }
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.routing_id, self.process_id)
    }
}

/// Error returned when a frame id string is not `"<routing>-<process>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFrameIdError(String);

impl fmt::Display for ParseFrameIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid frame id {:?}, expected <routing>-<process>", self.0)
    }
}

impl std::error::Error for ParseFrameIdError {}

impl FromStr for FrameId {
    type Err = ParseFrameIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Routing ids may be negative, so split on the last dash.
        let err = || ParseFrameIdError(s.to_string());
        let split = s.rfind('-').filter(|&i| i > 0).ok_or_else(err)?;
        let routing_id = s[..split].parse().map_err(|_| err())?;
        let process_id = s[split + 1..].parse().map_err(|_| err())?;
        Ok(Self::new(routing_id, process_id))
    }
}

impl TryFrom<String> for FrameId {
    type Error = ParseFrameIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameId> for String {
    fn from(id: FrameId) -> Self {
        id.to_string()
    }
}

/// A top-level content view (one page in one tab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// A live top-level view as enumerated by the host, with the id of the
/// main frame rooting its frame tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewHandle {
    pub id: ViewId,
    pub main_frame: FrameId,
}
