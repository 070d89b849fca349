//! The component tree consumed by the layout engine.
//!
//! Components arrive here with fully resolved styles; parsing a markup
//! language into this tree and running the style cascade both happen
//! upstream. The tree is arena-backed so layout items can refer back to
//! their originating component with a copyable id.

mod component;
mod document;
mod frames;

pub use component::{
    CellDefinition, Component, ComponentId, ComponentKind, ComponentTree, ImageDefinition,
    ListDefinition, ListMarker, PageDefinition, PanelDefinition, RowDefinition,
    TableColumnDefinition, TableDefinition, TextContent,
};
pub use document::{Document, DocumentInfo};
pub use frames::{
    Conformance, FrameDefinition, FrameSource, FramesetDefinition, OverlayDefinition,
    OverlayRepeat, PageCount,
};
