pub mod classifier;
pub mod dom;
pub mod errors;
pub mod range;
pub mod render;
pub mod spans;
pub mod text;

pub use classifier::{ExclusionRule, HostPattern, TargetClassifier, TargetShape};
pub use dom::{Document, DomEvent, Handlers, NodeId, Rect};
pub use errors::{OverlayError, RangeError};
pub use render::{
    find_highlights, hide_highlights, resolve_owner, OverlayBackend, OverlayRenderer,
    PlainControlBackend, RenderReport, RichRegionBackend,
};
pub use spans::{HighlightSpan, SpanList};
