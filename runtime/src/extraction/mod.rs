//! On-page zone extraction and keyword presence matching.
//!
//! [`zones`] pulls the text of seven structural zones out of a parsed page;
//! [`presence`] checks a keyword against them.

pub mod presence;
pub mod zones;

pub use presence::{match_presence, PresenceError, PresenceResult};
pub use zones::{extract_zones, Zone, ZoneText};
