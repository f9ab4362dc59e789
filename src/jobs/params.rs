//! Typed reading of a job's raw parameter map.

use serde::de::DeserializeOwned;

use crate::config::ConfigIssue;
use crate::foundation::error::{PcboothError, PcboothResult};

/// Reads keys from an `OUTPUTS` parameter map, collecting every type error.
///
/// Missing keys (and explicit `null`s) take the given default, unknown keys are ignored.
/// Call [`ParamReader::finish`] to turn the collected issues into one configuration error.
#[derive(Debug)]
pub struct ParamReader<'a> {
    job: &'static str,
    map: Option<&'a serde_json::Map<String, serde_json::Value>>,
    issues: Vec<ConfigIssue>,
}

impl<'a> ParamReader<'a> {
    pub fn new(job: &'static str, params: &'a serde_json::Value) -> PcboothResult<Self> {
        let map = match params {
            serde_json::Value::Null => None,
            serde_json::Value::Object(map) => Some(map),
            other => {
                return Err(PcboothError::config(format!(
                    "{job}: parameters must be a map, got {other}"
                )));
            }
        };
        Ok(Self {
            job,
            map,
            issues: Vec::new(),
        })
    }

    pub fn get<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        let Some(value) = self.map.and_then(|m| m.get(key)) else {
            return default;
        };
        if value.is_null() {
            return default;
        }
        match serde_json::from_value(value.clone()) {
            Ok(v) => v,
            Err(e) => {
                self.issues
                    .push(ConfigIssue::new("OUTPUTS", format!("{}.{key}", self.job), e.to_string()));
                default
            }
        }
    }

    pub fn strings(&mut self, key: &str, default: &[&str]) -> Vec<String> {
        self.get(key, default.iter().map(|s| s.to_string()).collect())
    }

    /// Issues collected so far, keyed `OUTPUTS.<JOB>.<KEY>`.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn finish(self) -> PcboothResult<()> {
        if self.issues.is_empty() {
            return Ok(());
        }
        let joined: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        Err(PcboothError::config(joined.join("; ")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/params.rs"]
mod tests;
