use std::sync::{Mutex, PoisonError};

/// Non-blocking, user-visible feedback.
pub trait Notifier: Send + Sync {
    fn show(&self, message: String);
}

/// Keeps the message on screen until it is dismissed or replaced.
#[derive(Debug, Default)]
pub struct Snackbar {
    message: Mutex<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl Snackbar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismiss(&self) -> Option<String> {
        self.message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Every message shown so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for Snackbar {
    fn show(&self, message: String) {
        debug!("snackbar: {}", message);
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        *self.message.lock().unwrap_or_else(PoisonError::into_inner) = Some(message);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_snackbar_show_and_dismiss() {
        let snackbar = Snackbar::new();
        assert_eq!(snackbar.dismiss(), None);

        snackbar.show("first".to_string());
        snackbar.show("second".to_string());

        assert_eq!(snackbar.dismiss().as_deref(), Some("second"));
        assert_eq!(snackbar.dismiss(), None);
        assert_eq!(snackbar.history(), vec!["first", "second"]);
    }
}
