pub mod audit;
pub mod context;
pub mod resolved;
pub mod stamp;

pub use context::{RequestContext, RequestSource};
pub use resolved::{permission_name, ResolvedPermissions};
pub use stamp::CacheStamp;
