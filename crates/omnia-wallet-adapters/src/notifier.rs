use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use omnia_wallet_core::{Notice, NotifierPort};

const MAX_PENDING_NOTICES: usize = 32;

/// Collects notices until the UI drains them as toasts.
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    inner: Arc<Mutex<VecDeque<Notice>>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        match self.inner.lock() {
            Ok(mut g) => g.drain(..).collect(),
            Err(e) => {
                warn!(error = %e, "toast queue lock poisoned");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotifierPort for ToastQueue {
    fn notify(&self, notice: Notice) {
        info!(title = %notice.title, description = %notice.description, "notice");
        match self.inner.lock() {
            Ok(mut g) => {
                if g.len() == MAX_PENDING_NOTICES {
                    g.pop_front();
                }
                g.push_back(notice);
            }
            Err(e) => warn!(error = %e, "toast queue lock poisoned; notice dropped"),
        }
    }
}
