use std::{error::Error, io};

use super::MailError;

/// Maps an opaque transport failure onto [`MailError`].
///
/// Swapping the provider means swapping the classifier; call sites only ever
/// see the mapped category.
pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, error: &(dyn Error + 'static)) -> MailError;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&(dyn Error + 'static)) -> MailError + Send + Sync,
{
    fn classify(&self, error: &(dyn Error + 'static)) -> MailError {
        self(error)
    }
}

/// Classifier for errors produced by lettre's SMTP transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpErrorClassifier;

impl ErrorClassifier for SmtpErrorClassifier {
    fn classify(&self, error: &(dyn Error + 'static)) -> MailError {
        classify_signal(&FailureSignal::from_error(error))
    }
}

/// The facts a classifier needs, pulled out of an error chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureSignal {
    /// Three digit SMTP reply code, when the relay answered negatively
    pub code: Option<u16>,
    pub io_kind: Option<io::ErrorKind>,
    pub timed_out: bool,
    pub auth_rejected: bool,
    pub resolution_failed: bool,
    pub message: String,
}

const RESOLUTION_MARKERS: [&str; 5] = [
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
    "temporary failure in name resolution",
];

impl FailureSignal {
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut signal = Self {
            message: error.to_string(),
            ..Self::default()
        };

        let mut current: Option<&(dyn Error + 'static)> = Some(error);
        while let Some(err) = current {
            if let Some(smtp) = err.downcast_ref::<lettre::transport::smtp::Error>() {
                if let Some(code) = smtp.status() {
                    signal.code = code.to_string().parse().ok();
                }
                if smtp.is_timeout() {
                    signal.timed_out = true;
                }
                if smtp.is_client() && smtp.to_string().to_lowercase().contains("authentication")
                {
                    signal.auth_rejected = true;
                }
            }

            if let Some(io_err) = err.downcast_ref::<io::Error>() {
                signal.io_kind.get_or_insert(io_err.kind());
            }

            let text = err.to_string().to_lowercase();
            if RESOLUTION_MARKERS.iter().any(|marker| text.contains(marker)) {
                signal.resolution_failed = true;
            }

            current = err.source();
        }

        signal
    }
}

/// Applies the fixed category order: auth, connection, timeout, resolution,
/// recipient rejection, content rejection, then pass-through.
pub fn classify_signal(signal: &FailureSignal) -> MailError {
    use io::ErrorKind;

    if signal.auth_rejected || matches!(signal.code, Some(530 | 534 | 535)) {
        return MailError::Auth;
    }

    if matches!(
        signal.io_kind,
        Some(
            ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::NotConnected
                | ErrorKind::AddrNotAvailable
                | ErrorKind::HostUnreachable
                | ErrorKind::NetworkUnreachable
        )
    ) {
        return MailError::Connection;
    }

    if signal.timed_out || signal.io_kind == Some(ErrorKind::TimedOut) {
        return MailError::Timeout;
    }

    if signal.resolution_failed {
        return MailError::Resolution;
    }

    match signal.code {
        Some(550) => MailError::RecipientRejected,
        Some(554) => MailError::ContentRejected,
        _ => MailError::Transport(signal.message.clone()),
    }
}
