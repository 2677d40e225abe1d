use crate::{Email, Mailer, MailerError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Captures messages instead of delivering them. Used by tests that need
/// to read the code out of the mail that "went out".
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }

    pub fn last(&self) -> Option<Email> {
        self.sent.lock().expect("mailer mutex poisoned").last().cloned()
    }
}

#[async_trait]
impl Mailer for MemoryTransport {
    async fn send_email(&self, email: Email) -> Result<(), MailerError> {
        email.validate()?;
        self.sent.lock().expect("mailer mutex poisoned").push(email);
        Ok(())
    }
}
