//! Message text projection: fenced-block splitting, language sniffing and the
//! streaming view that ties them together.

pub mod sniffer;
pub mod splitter;
pub mod view;

pub use sniffer::{FALLBACK_LANGUAGE, detect};
pub use splitter::{CodeBlock, FENCE, Segment, count_fences, has_complete_blocks, join, split};
pub use view::{AppendOutcome, DeleteHandler, MessageView, ViewState};
