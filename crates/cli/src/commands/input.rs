use std::fs;
use std::path::Path;

use anyhow::Context;
use basketcast_core::ApplicationError;
use serde::de::DeserializeOwned;

/// Reads a JSON document produced by the ingestion stage.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    parse_json_file(path).map_err(|error| ApplicationError::Input(format!("{error:#}")))
}

fn parse_json_file<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("could not parse `{}`", path.display()))
}
