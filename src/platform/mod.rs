pub mod environment;
pub mod page;

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub mod browser;

pub use environment::{Environment, ProcessEnvironment, StaticEnvironment};
pub use page::{PageContext, StaticPage};
