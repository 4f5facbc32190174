pub mod schema;
pub mod validate;

pub use schema::{ChartDescriptor, ChartKind, DataPoint, Margin, RenderOptions};
pub use validate::{decode_descriptor, decode_fragment, RejectReason};
