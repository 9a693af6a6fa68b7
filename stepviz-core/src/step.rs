use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{VizError, VizResult};

/// Common surface of every step record.
pub trait Step {
    /// Explanation shown in the message region.
    fn message(&self) -> &str;
}

/// Immutable, non-empty run of steps. Index 0 is the initial state.
#[derive(Clone, Debug, PartialEq)]
pub struct StepSequence<S> {
    steps: Vec<S>,
}

impl<S> StepSequence<S> {
    pub fn new(steps: Vec<S>) -> VizResult<Self> {
        if steps.is_empty() {
            return Err(VizError::EmptySequence);
        }
        Ok(StepSequence { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Never true; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.steps.get(index)
    }

    /// Clamp an arbitrary request into `[0, len-1]`.
    pub fn clamp(&self, index: i64) -> usize {
        index.clamp(0, self.last_index() as i64) as usize
    }

    pub fn as_slice(&self) -> &[S] {
        &self.steps
    }
}

/// Decoded response body: the steps plus any envelope metadata.
#[derive(Clone, Debug)]
pub struct Fetched<S> {
    pub steps: Vec<S>,
    pub meta: Map<String, Value>,
}

/// Decode a response body.
///
/// Accepted shapes are a bare array of steps, an envelope
/// `{"steps": [...], ...}` whose remaining keys become metadata, and an
/// error object `{"error": "..."}`.
pub fn decode_steps<S: DeserializeOwned>(text: &str) -> VizResult<Fetched<S>> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Object(mut obj) => {
            if let Some(err) = obj.get("error").filter(|e| !e.is_null()) {
                let msg = err
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string());
                return Err(VizError::Server(msg));
            }
            match obj.remove("steps") {
                Some(steps) => {
                    let steps = serde_json::from_value(steps)?;
                    Ok(Fetched { steps, meta: obj })
                }
                // Let serde describe the mismatch.
                None => Err(serde_json::from_value::<Vec<S>>(Value::Object(obj))
                    .err()
                    .map(VizError::from)
                    .unwrap_or(VizError::EmptySequence)),
            }
        }
        other => Ok(Fetched {
            steps: serde_json::from_value(other)?,
            meta: Map::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Msg {
        msg: String,
    }

    impl Step for Msg {
        fn message(&self) -> &str {
            &self.msg
        }
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(matches!(
            StepSequence::<Msg>::new(vec![]),
            Err(VizError::EmptySequence)
        ));
    }

    #[test]
    fn clamp_keeps_cursor_in_range() {
        let seq = StepSequence::new(vec![1, 2, 3]).unwrap();
        assert_eq!(seq.clamp(-4), 0);
        assert_eq!(seq.clamp(1), 1);
        assert_eq!(seq.clamp(99), 2);
    }

    #[test]
    fn decodes_bare_array() {
        let f: Fetched<Msg> = decode_steps(r#"[{"msg":"a"},{"msg":"b"}]"#).unwrap();
        assert_eq!(f.steps.len(), 2);
        assert_eq!(f.steps[1].message(), "b");
        assert!(f.meta.is_empty());
    }

    #[test]
    fn decodes_envelope_and_keeps_metadata() {
        let f: Fetched<Msg> = decode_steps(r#"{"n":3,"steps":[{"msg":"x"}]}"#).unwrap();
        assert_eq!(f.steps.len(), 1);
        assert_eq!(f.meta.get("n").and_then(Value::as_u64), Some(3));
    }

    #[test]
    fn error_object_becomes_server_error() {
        let err = decode_steps::<Msg>(r#"{"error":"bad input"}"#).unwrap_err();
        assert_eq!(err.to_string(), "server reported an error: bad input");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode_steps::<Msg>("<html>"), Err(VizError::Decode(_))));
        assert!(matches!(decode_steps::<Msg>(r#"{"n":1}"#), Err(VizError::Decode(_))));
    }
}
