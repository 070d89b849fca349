use thiserror::Error;

/// Hard layout failures. Content that merely does not fit is never an
/// error; it surfaces as [`crate::LayoutOutcome::Halted`] instead.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("component {0} has an impossible style configuration: {1}")]
    InvalidStyle(String, String),
    #[error("page content area is empty: page size {0:.2}x{1:.2} leaves no room inside margins")]
    EmptyContentArea(f32, f32),
    #[error("unsupported layout operation: {0}")]
    Unsupported(String),
}
