use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use iceman_core::PlayerAction;
use serde::{Deserialize, Serialize};

const REPLAY_DOMAIN: &str = "iceman";
const REPLAY_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded replay payload.
pub(crate) const REPLAY_HEADER: &str = "iceman:v1";
/// Delimiter separating the prefix, the level and seed pair, and the payload.
const FIELD_DELIMITER: char = ':';

/// Everything needed to reproduce a scripted run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SessionReplay {
    /// Level the run played.
    pub(crate) level: u32,
    /// Seed shared by the world and spawning random sources.
    pub(crate) seed: u64,
    /// Number of ticks the run lasted.
    pub(crate) ticks: u64,
    /// Player actions in tick order.
    pub(crate) actions: Vec<PlayerAction>,
}

impl SessionReplay {
    /// Encodes the replay into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, ReplayTransferError> {
        let payload = SerializableReplay {
            ticks: self.ticks,
            actions: self.actions.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(ReplayTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{REPLAY_HEADER}:{}x{}:{encoded}", self.level, self.seed))
    }

    /// Decodes a replay from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, ReplayTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReplayTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(ReplayTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(ReplayTransferError::MissingVersion)?;
        let run = parts.next().ok_or(ReplayTransferError::MissingRun)?;
        let payload = parts.next().ok_or(ReplayTransferError::MissingPayload)?;

        if domain != REPLAY_DOMAIN {
            return Err(ReplayTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != REPLAY_VERSION {
            return Err(ReplayTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (level, seed) = parse_run(run)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(ReplayTransferError::InvalidEncoding)?;
        let decoded: SerializableReplay =
            serde_json::from_slice(&bytes).map_err(ReplayTransferError::InvalidPayload)?;

        Ok(Self {
            level,
            seed,
            ticks: decoded.ticks,
            actions: decoded.actions,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableReplay {
    ticks: u64,
    actions: Vec<PlayerAction>,
}

/// Errors that can occur while encoding or decoding replay strings.
#[derive(Debug)]
pub(crate) enum ReplayTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The level and seed segment was missing.
    MissingRun,
    /// The payload segment was missing.
    MissingPayload,
    /// The prefix segment named another format.
    InvalidPrefix(String),
    /// The version identifier is not supported.
    UnsupportedVersion(String),
    /// The level and seed could not be parsed.
    InvalidRun(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for ReplayTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "replay string was empty"),
            Self::MissingPrefix => write!(f, "replay string is missing the prefix"),
            Self::MissingVersion => write!(f, "replay string is missing the version"),
            Self::MissingRun => write!(f, "replay string is missing the level and seed"),
            Self::MissingPayload => write!(f, "replay string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "replay prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "replay version '{version}' is not supported")
            }
            Self::InvalidRun(run) => write!(f, "could not parse level and seed '{run}'"),
            Self::InvalidEncoding(error) => write!(f, "could not decode replay payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not process replay payload: {error}"),
        }
    }
}

impl Error for ReplayTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_run(run: &str) -> Result<(u32, u64), ReplayTransferError> {
    let (level, seed) = run
        .split_once(['x', 'X'])
        .ok_or_else(|| ReplayTransferError::InvalidRun(run.to_owned()))?;

    let level = level
        .trim()
        .parse::<u32>()
        .map_err(|_| ReplayTransferError::InvalidRun(run.to_owned()))?;
    let seed = seed
        .trim()
        .parse::<u64>()
        .map_err(|_| ReplayTransferError::InvalidRun(run.to_owned()))?;

    Ok((level, seed))
}
