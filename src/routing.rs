pub mod codec;
pub mod headers;
pub mod model;
pub mod sync;

pub use codec::{Codec, DefaultPoolPolicy, ROUTING_PORT};
pub use headers::{HeaderMapping, HeaderTable};
pub use model::{Pool, RoutingConfig, RoutingRule, RulePatch};
pub use sync::Synchronizer;
