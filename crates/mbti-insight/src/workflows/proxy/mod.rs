//! Same-origin chat proxy that injects the upstream credential server-side.

mod forward;
pub mod router;

pub use forward::{ChatProxy, ProxyError, ProxyRequest};
pub use router::{chat_proxy_router, PROXY_PATH};
