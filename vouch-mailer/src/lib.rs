pub mod config;
pub mod email;
pub mod email_types;
pub mod error;
pub mod mailer;
pub mod templates;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use email_types::AccessCodeEmail;
pub use error::MailerError;
pub use mailer::Mailer;
pub use templates::TemplateContext;
pub use transports::{FileTransport, MemoryTransport, SmtpTransport};

pub mod prelude {
    pub use crate::{
        AccessCodeEmail, Email, EmailBuilder, FileTransport, Mailer, MailerConfig, MailerError,
        MemoryTransport, SmtpTransport, TemplateContext,
    };
}
