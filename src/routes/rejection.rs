use serde::Serialize;
use warp::reject;

use crate::errors::BackendError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: BackendError,
}

impl Rejection {
    pub fn new(context: Context, error: BackendError) -> Self {
        Rejection { context, error }
    }

    /// The response body. Echo failures carry no detail beyond `ok`.
    pub fn flatten(&self) -> FlattenedRejection {
        match self.context {
            Context::Echo => FlattenedRejection {
                ok: false,
                context: None,
                message: None,
            },
            context => FlattenedRejection {
                ok: false,
                context: Some(context),
                message: Some(format!("{}", self.error)),
            },
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    pub(crate) ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    Clear,
    Echo,
    Export,
    Listing,
    Submit,
}

impl Context {
    pub fn clear() -> Context {
        Context::Clear
    }

    pub fn echo() -> Context {
        Context::Echo
    }

    pub fn export() -> Context {
        Context::Export
    }

    pub fn listing() -> Context {
        Context::Listing
    }

    pub fn submit() -> Context {
        Context::Submit
    }
}
