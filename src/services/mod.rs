pub mod details;
pub mod feed;
pub mod hydration;
pub mod providers;
pub mod session;

pub use details::{DetailResolver, OpenedMovie};
pub use feed::FeedComposer;
pub use session::{FeedFetch, FeedSession, FeedSessionHandle, FeedView};
