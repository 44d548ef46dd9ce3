//! Error type shared by the timeline, the stage implementations and the wasm glue.

use wasm_bindgen::JsValue;

use crate::timeline::Scene;

pub type CardResult<T> = Result<T, CardError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CardError {
    #[error("missing element #{id}")]
    MissingElement { id: String },

    #[error("element #{id} is not a {expected}")]
    WrongElementType { id: String, expected: &'static str },

    #[error("no {0} available")]
    NoContext(&'static str),

    #[error("js error: {0}")]
    Js(String),

    #[error("timeline already started")]
    AlreadyStarted,

    #[error("scene cannot move backwards from {from:?} to {to:?}")]
    SceneRegression { from: Scene, to: Scene },

    #[error("invalid script: {0}")]
    InvalidScript(String),

    #[error("config error: {0}")]
    Config(String),
}

impl CardError {
    pub fn missing(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }

    pub fn invalid_script(msg: impl Into<String>) -> Self {
        Self::InvalidScript(msg.into())
    }
}

impl From<JsValue> for CardError {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(s) => Self::Js(s),
            None => Self::Js(format!("{value:?}")),
        }
    }
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for CardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_element() {
        let err = CardError::missing("scene1Text");
        assert_eq!(err.to_string(), "missing element #scene1Text");
    }

    #[test]
    fn regression_mentions_both_scenes() {
        let err = CardError::SceneRegression {
            from: Scene::Reaction,
            to: Scene::Together,
        };
        let msg = err.to_string();
        assert!(msg.contains("Reaction") && msg.contains("Together"));
    }
}
