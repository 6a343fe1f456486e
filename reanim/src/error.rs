use crate::{CommandId, EntityId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("entity {entity} has no animation component")]
    MissingComponent { entity: EntityId },

    #[error("entity {entity} has no animation definition bound")]
    MissingAnimationData { entity: EntityId },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("animation '{name}' has no visible frames")]
    EmptyAnimation { name: String },

    #[error("unknown track: {name}")]
    UnknownTrack { name: String },

    #[error("unknown skeleton: {name}")]
    UnknownSkeleton { name: String },

    #[error("unknown combo '{combo}' for skeleton '{skeleton}'")]
    UnknownCombo { skeleton: String, combo: String },

    #[error("invalid command {command}: neither an animation name nor a combo was supplied")]
    InvalidCommand { command: CommandId },

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse {context} JSON: {message}")]
    JsonParse { context: String, message: String },
}
