use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use mavwire_message::MessageHandler;

/// Exchangeable, non-owning handler reference.
#[derive(Default)]
pub(crate) struct HandlerSlot {
    inner: RwLock<Option<Weak<dyn MessageHandler>>>,
}

impl HandlerSlot {
    pub(crate) fn replace(&self, handler: Option<Weak<dyn MessageHandler>>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = handler;
    }

    /// The registered handler, if one is set and still alive.
    pub(crate) fn current(&self) -> Option<Arc<dyn MessageHandler>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }
}

impl fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("live", &self.current().is_some())
            .finish()
    }
}
