mod report_view;
mod ui_fmt;

pub use report_view::{cached_note, render as render_report};
