use std::sync::Arc;

use log::Logger;
use time::UtcOffset;

use crate::form::SubmitTokens;
use crate::store::LocalStore;
use crate::sync::RemoteSync;

/// Everything a route handler needs, cloned into each request.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub store: LocalStore,
    pub sync: Arc<dyn RemoteSync>,
    pub tokens: Arc<SubmitTokens>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        store: LocalStore,
        sync: Arc<dyn RemoteSync>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            store,
            sync,
            tokens: Arc::new(SubmitTokens::new()),
            config,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) display_offset: UtcOffset,
}

impl Config {
    pub fn new(display_offset: UtcOffset) -> Self {
        Self { display_offset }
    }
}
