//! Text control channel between the bridge and the presentation surface.
//!
//! # Inbound
//!
//! User edits arrive as URL-like strings:
//!
//! ```text
//! rupture:reverb:roomSize=0.75
//! ```
//!
//! Scheme `rupture`, category `reverb`, then one of the six parameter keys
//! (`roomSize`, `damping`, `wetLevel`, `dryLevel`, `width`, `freezeMode`) and
//! a float literal. [`decode`] turns these into a [`ParamAssignment`];
//! anything else is a [`ProtocolError`] that the inbox swallows.
//!
//! # Outbound
//!
//! State pushes are script calls evaluated by the surface:
//!
//! ```text
//! window.setAudioState(12.3, 11.9, 40.0, 38.2)
//! window.setReverbValues(0.5, 0.5, 0.33, 0.4, 1, 0)
//! window.updateOscilloscopeData([0.01,-0.02,0.5])
//! ```
//!
//! Meter values carry one decimal digit. Parameter and waveform values use
//! the shortest representation that round-trips to the same `f32`.

use rupture_core::{MeterLevels, ParamId, ParamSnapshot};
use std::fmt::{self, Write};
use thiserror::Error;

/// Inbound scheme.
pub const SCHEME: &str = "rupture";

/// Inbound category for reverb parameters.
pub const CATEGORY: &str = "reverb";

/// A decoded user edit: set one parameter to one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamAssignment {
    /// Target parameter.
    pub param: ParamId,
    /// Requested value, before clamping.
    pub value: f32,
}

/// A state push from the bridge to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundUpdate {
    /// Four display meter levels, 0..100.
    AudioState(MeterLevels),
    /// All six parameter values.
    ReverbValues(ParamSnapshot),
    /// Downsampled oscilloscope curve.
    Oscilloscope(Vec<f32>),
}

/// One message on the control channel, in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Parameter edit from the surface.
    Inbound(ParamAssignment),
    /// State push to the surface.
    Outbound(OutboundUpdate),
}

/// Why an inbound string is not a recognized command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Does not start with `rupture:`.
    #[error("not a rupture: message")]
    UnknownScheme,
    /// Category other than `reverb`.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    /// No `key=value` pair.
    #[error("missing '=' in assignment")]
    MissingValue,
    /// Key is not one of the six parameters.
    #[error("unknown parameter '{0}'")]
    UnknownKey(String),
    /// Value is not a finite float literal.
    #[error("invalid value '{0}'")]
    InvalidValue(String),
}

/// Parse an inbound control string.
///
/// Leading and trailing whitespace is ignored.
pub fn decode(text: &str) -> Result<ParamAssignment, ProtocolError> {
    let rest = text
        .trim()
        .strip_prefix(SCHEME)
        .and_then(|r| r.strip_prefix(':'))
        .ok_or(ProtocolError::UnknownScheme)?;

    let (category, assignment) = rest
        .split_once(':')
        .ok_or_else(|| ProtocolError::UnknownCategory(rest.to_owned()))?;
    if category != CATEGORY {
        return Err(ProtocolError::UnknownCategory(category.to_owned()));
    }

    let (key, value) = assignment
        .split_once('=')
        .ok_or(ProtocolError::MissingValue)?;
    let param = ParamId::from_key(key).ok_or_else(|| ProtocolError::UnknownKey(key.to_owned()))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidValue(value.to_owned()))?;
    if !value.is_finite() {
        return Err(ProtocolError::InvalidValue(value.to_string()));
    }

    Ok(ParamAssignment { param, value })
}

/// Format an assignment the way the surface sends it.
pub fn encode_assignment(assignment: &ParamAssignment) -> String {
    format!(
        "{SCHEME}:{CATEGORY}:{}={}",
        assignment.param.key(),
        assignment.value
    )
}

impl OutboundUpdate {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundUpdate::AudioState(_) => "audio_state",
            OutboundUpdate::ReverbValues(_) => "reverb_values",
            OutboundUpdate::Oscilloscope(_) => "oscilloscope",
        }
    }

    /// Append the script for this update to `out`.
    pub fn write_script(&self, out: &mut impl Write) -> fmt::Result {
        match self {
            OutboundUpdate::AudioState(levels) => {
                let [a, b, c, d] = levels.to_array();
                write!(
                    out,
                    "window.setAudioState({:.1}, {:.1}, {:.1}, {:.1})",
                    a, b, c, d
                )
            }
            OutboundUpdate::ReverbValues(params) => {
                out.write_str("window.setReverbValues(")?;
                for (i, value) in params.to_array().into_iter().enumerate() {
                    if i > 0 {
                        out.write_str(", ")?;
                    }
                    write!(out, "{value}")?;
                }
                out.write_char(')')
            }
            OutboundUpdate::Oscilloscope(points) => {
                out.write_str("window.updateOscilloscopeData([")?;
                for (i, &value) in points.iter().enumerate() {
                    if i > 0 {
                        out.write_char(',')?;
                    }
                    let value = if value.is_finite() { value } else { 0.0 };
                    write!(out, "{value}")?;
                }
                out.write_str("])")
            }
        }
    }
}

impl fmt::Display for OutboundUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_script(f)
    }
}

/// Render an update as a script string.
pub fn encode(update: &OutboundUpdate) -> String {
    update.to_string()
}

impl ControlMessage {
    /// Parse an inbound string into a message.
    pub fn parse_inbound(text: &str) -> Result<Self, ProtocolError> {
        decode(text).map(ControlMessage::Inbound)
    }
}

impl fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::Inbound(assignment) => f.write_str(&encode_assignment(assignment)),
            ControlMessage::Outbound(update) => update.fmt(f),
        }
    }
}
