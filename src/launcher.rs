//! URL and mail launching
//!
//! Dispatch opens sites and composes mail through this capability so the
//! core can detect a refused launch (the desktop equivalent of a blocked
//! pop-up) and degrade to a spoken warning instead of failing.

use std::process::Command;

use crate::{Error, Result};

/// Subject line used for composed messages
const MAIL_SUBJECT: &str = "Message from Trushna";

/// External launcher collaborator
pub trait Launcher: Send + Sync {
    /// Open a URL in the user's default handler
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatchBlocked`] if the host refused the launch
    fn open(&self, url: &str) -> Result<()>;

    /// Compose a mail message, optionally addressed
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatchBlocked`] if the mail client could not
    /// be opened
    fn compose_mail(&self, to: Option<&str>, body: &str) -> Result<()>;
}

/// Launcher backed by the platform opener
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, url: &str) -> Result<()> {
        tracing::debug!(url, "launching");

        let status = opener_command(url)
            .status()
            .map_err(|e| Error::DispatchBlocked(format!("{url}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::DispatchBlocked(format!("{url}: opener exited with {status}")))
        }
    }

    fn compose_mail(&self, to: Option<&str>, body: &str) -> Result<()> {
        self.open(&compose_mailto(to, body))
    }
}

#[cfg(target_os = "linux")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

/// Build a `mailto:` URL with percent-encoded subject and body
#[must_use]
pub fn compose_mailto(to: Option<&str>, body: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        to.unwrap_or(""),
        urlencoding::encode(MAIL_SUBJECT),
        urlencoding::encode(body)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_mailto_with_recipient() {
        let url = compose_mailto(Some("a@b.com"), "hello world");
        assert!(url.starts_with("mailto:a@b.com?"));
        assert!(url.contains("subject=Message%20from%20Trushna"));
        assert!(url.ends_with("body=hello%20world"));
    }

    #[test]
    fn test_compose_mailto_without_recipient() {
        let url = compose_mailto(None, "hi");
        assert!(url.starts_with("mailto:?"));
    }
}
