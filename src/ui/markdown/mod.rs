mod block;
mod inline;
mod scope;
mod widget;

pub use widget::MarkdownError;
pub use widget::MarkdownWidget;
