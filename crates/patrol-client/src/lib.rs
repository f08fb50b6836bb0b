pub mod caller;

pub use caller::ReqwestCaller;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::{BrowserSession, SessionConfig};
