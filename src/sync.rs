use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use url::Url;

use crate::errors::BackendError;
use crate::submission::Submission;

/// Best-effort delivery of a submission to the echo endpoint. Callers
/// never branch on the result beyond logging it.
pub trait RemoteSync: Send + Sync {
    fn sync<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<(), BackendError>>;
}

/// Posts submissions as JSON over HTTP.
pub struct HttpSync {
    client: reqwest::Client,
    url: Url,
}

impl HttpSync {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BackendError::RemoteSync)?;

        Ok(Self { client, url })
    }
}

impl RemoteSync for HttpSync {
    fn sync<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<(), BackendError>> {
        post(self, submission).boxed()
    }
}

async fn post(sync: &HttpSync, submission: &Submission) -> Result<(), BackendError> {
    let response = sync
        .client
        .post(sync.url.clone())
        .json(submission)
        .send()
        .await
        .map_err(BackendError::RemoteSync)?;

    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        Err(BackendError::RemoteStatus(status.as_u16()))
    }
}
