//! Automation masking for the headless browser.
//!
//! Some sites serve a stripped page (or a challenge) to obvious automation,
//! which would make every zone read as absent. The primary render profile
//! therefore launches with automation flags off and patches the fingerprint
//! signals pages most commonly check.

pub mod fingerprint;
