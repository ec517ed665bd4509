//! Chromium host for the download listener: cookies, the indicator node and
//! element URLs are read and written through small page scripts.

mod page;
mod session;
pub mod shared;

pub use page::ChromiumPage;
pub use session::ChromiumSession;
pub use shared::LaunchConfig;
