//! Email notifications for form submissions.
//!
//! This crate turns a [`palmsure_core::Submission`] into an outbound email:
//! - **Rendering** (`render`) - tera templates with autoescaping for the HTML body
//! - **Transport** (`transport`) - delivery through the Resend HTTP API, with
//!   noop and recording implementations behind the same trait
//! - **Service** (`service`) - the [`Mailer`] façade: subject, recipients,
//!   reply-to, structured logs, delivery
//!
//! # Key Types
//!
//! - `Mailer` - builds and dispatches the notification email
//! - `MailTransport` - delivery seam (`ResendTransport`, `NoopMailTransport`,
//!   `RecordingMailTransport`)
//! - `EmailMessage` / `DeliveryReceipt` - the assembled mail and the
//!   provider's acknowledgement

pub mod message;
pub mod render;
pub mod service;
pub mod transport;

pub use message::{DeliveryReceipt, EmailMessage};
pub use render::{EmailRenderer, RenderError};
pub use service::{Mailer, MailerError};
pub use transport::{
    MailTransport, NoopMailTransport, RecordingMailTransport, ResendTransport, TransportError,
};
