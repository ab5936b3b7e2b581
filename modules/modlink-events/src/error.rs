use thiserror::Error;

use crate::event::EventKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Kind collision on kind {kind}: handler expects {expected}, event is {actual}")]
    KindCollision {
        kind: EventKind,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid collision policy: {0} (expected \"strict\" or \"skip\")")]
    InvalidPolicy(String),
}
