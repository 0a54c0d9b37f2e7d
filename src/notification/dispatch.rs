// Hand-off of a composed message to the outside world

use anyhow::Result;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::compose::Notification;

/// `mailto:` URI with comma-joined recipients and percent-encoded fields
pub fn mailto_link(notification: &Notification) -> String {
    let recipients: Vec<&str> = notification
        .recipients
        .iter()
        .map(String::as_str)
        .filter(|r| !r.is_empty())
        .collect();

    format!(
        "mailto:{}?subject={}&body={}",
        recipients.join(","),
        urlencoding::encode(&notification.subject),
        urlencoding::encode(&notification.body)
    )
}

/// Three-part block put on the clipboard
pub fn clipboard_text(notification: &Notification) -> String {
    format!(
        "宛先: {}\n件名: {}\n本文:\n{}",
        notification.recipients.join(", "),
        notification.subject,
        notification.body
    )
}

/// External mail client and clipboard
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait Dispatcher: Send + Sync {
    /// Open the user's mail client on a `mailto:` link
    fn open_mail(&self, link: &str) -> Result<()>;

    fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}
