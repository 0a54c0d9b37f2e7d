// Notification Module - recipients, templates and dispatch rendering
//
// Everything here is a pure function of the catalog and the current
// selection, except for the clock read when stamping `{time}`.

pub mod clock;
pub mod compose;
pub mod dispatch;
pub mod recipients;
pub mod template;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compose::{guidance_text, resolve_action, summarize, Composer, Notification, ResultSummary};
pub use dispatch::{clipboard_text, mailto_link, Dispatcher};
pub use recipients::resolve_recipients;
pub use template::{render_template, TemplateVars};

#[cfg(any(test, feature = "testing"))]
pub use clock::MockClock;
#[cfg(any(test, feature = "testing"))]
pub use dispatch::MockDispatcher;
