//! Per-invocation client state.

use anyhow::{Result, bail};

use crate::api::ApiClient;
use crate::store::{Session, SessionStore};

/// Built once in `main` and handed to every command by reference.
#[derive(Debug)]
pub struct ClientContext {
    pub api: ApiClient,
    pub store: SessionStore,
    session: Option<Session>,
}

impl ClientContext {
    pub fn new(api: ApiClient, store: SessionStore) -> Result<Self> {
        let session = store.load()?;
        Ok(Self {
            api,
            store,
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn access_token(&self) -> Result<&str> {
        match &self.session {
            Some(s) => Ok(&s.access_token),
            None => bail!("Not logged in. Run `devassist login` first."),
        }
    }

    pub fn set_session(&mut self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        self.session = Some(session);
        Ok(())
    }

    /// Returns the session that was active, if any.
    pub fn clear_session(&mut self) -> Result<Option<Session>> {
        self.store.clear()?;
        Ok(self.session.take())
    }
}
