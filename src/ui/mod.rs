pub mod highlight;
pub mod markdown;
pub mod notice;
pub mod theme;
