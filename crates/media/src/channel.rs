//! Method-channel bridge between an application shell and the saver.
//!
//! Calls arrive as `{"method": "saveImage", "arguments": {...}}` and are
//! answered with a boolean. Malformed calls are bridge errors rather than a
//! `false` answer, so the shell can tell "not saved" from "not understood".

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::debug,
};

use crate::saver::{GallerySaver, SaveRequest};

pub const SAVE_IMAGE: &str = "saveImage";
pub const SAVE_VIDEO: &str = "saveVideo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    #[must_use]
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("method not implemented: {0}")]
    NotImplemented(String),
    #[error("invalid arguments for {method}: {source}")]
    InvalidArguments {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveArguments {
    path: String,
    #[serde(default)]
    album_name: Option<String>,
    to_dcim: bool,
}

impl SaveArguments {
    fn into_request(self) -> Result<SaveRequest, ChannelError> {
        if self.path.trim().is_empty() {
            return Err(ChannelError::MissingArgument("path"));
        }
        Ok(SaveRequest::new(
            self.path,
            self.album_name.unwrap_or_default(),
            self.to_dcim,
        ))
    }
}

/// Decode a method call into a save request without running it.
pub fn decode_request(call: &MethodCall) -> Result<SaveRequest, ChannelError> {
    if call.method != SAVE_IMAGE && call.method != SAVE_VIDEO {
        return Err(ChannelError::NotImplemented(call.method.clone()));
    }
    let args: SaveArguments = serde_json::from_value(call.arguments.clone()).map_err(|source| {
        ChannelError::InvalidArguments {
            method: call.method.clone(),
            source,
        }
    })?;
    args.into_request()
}

/// Run a method call against `saver` and return the shell-facing answer.
pub async fn dispatch(saver: &GallerySaver, call: MethodCall) -> Result<bool, ChannelError> {
    let request = decode_request(&call)?;
    debug!(method = %call.method, path = %request.path.display(), "dispatching method call");
    let saved = match call.method.as_str() {
        SAVE_VIDEO => saver.save_video(request).await,
        _ => saver.save_image(request).await,
    };
    Ok(saved)
}
