use folio_style::dimension::Dimension;
use folio_style::{NumberingStyle, Style};
use std::fmt;
use std::sync::Arc;

/// Handle into a [`ComponentTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Component {
    pub kind: ComponentKind,
    pub style: Style,
    pub children: Vec<ComponentId>,
    /// Anchor name; becomes a named destination in the output.
    pub name: Option<String>,
    /// When set, an outline (bookmark) entry pointing at this component.
    pub outline_title: Option<String>,
}

impl Component {
    pub fn new(kind: ComponentKind, style: Style) -> Self {
        Self {
            kind,
            style,
            children: Vec::new(),
            name: None,
            outline_title: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_outline(mut self, title: impl Into<String>) -> Self {
        self.outline_title = Some(title.into());
        self
    }

    pub fn panel(style: Style) -> Self {
        Self::new(ComponentKind::Panel(PanelDefinition::default()), style)
    }

    pub fn text(value: impl Into<String>, style: Style) -> Self {
        Self::new(
            ComponentKind::Text(TextContent {
                text: value.into(),
                link: None,
            }),
            style,
        )
    }

    pub fn canvas(style: Style) -> Self {
        Self::new(ComponentKind::Canvas, style)
    }

    pub fn page(style: Style) -> Self {
        Self::new(ComponentKind::Page(PageDefinition::default()), style)
    }

    /// A string identifier for the component kind, used for engine dispatch
    /// diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ComponentKind::Page(_) => "page",
            ComponentKind::PageGroup => "page-group",
            ComponentKind::Panel(_) => "panel",
            ComponentKind::Canvas => "canvas",
            ComponentKind::Text(_) => "text",
            ComponentKind::PageNumberField => "page-number",
            ComponentKind::Image(_) => "image",
            ComponentKind::Table(_) => "table",
            ComponentKind::Row(_) => "row",
            ComponentKind::Cell(_) => "cell",
            ComponentKind::List(_) => "list",
            ComponentKind::ListItem => "list-item",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ComponentKind {
    Page(PageDefinition),
    /// A run of pages sharing one numbering group. Children are pages.
    PageGroup,
    Panel(PanelDefinition),
    /// Absolutely positioned children, no flow.
    Canvas,
    Text(TextContent),
    /// Replaced at layout time with the current page's formatted number.
    PageNumberField,
    Image(ImageDefinition),
    Table(TableDefinition),
    Row(RowDefinition),
    Cell(CellDefinition),
    List(ListDefinition),
    ListItem,
}

/// Header/footer templates are tree nodes outside the body `children` list;
/// they are laid out fresh for every page or continuation that shows them.
#[derive(Debug, Clone, Default)]
pub struct PageDefinition {
    pub header: Option<ComponentId>,
    pub footer: Option<ComponentId>,
    pub continuation_footer: Option<ComponentId>,
}

#[derive(Debug, Clone, Default)]
pub struct PanelDefinition {
    pub header: Option<ComponentId>,
    pub footer: Option<ComponentId>,
    pub continuation_footer: Option<ComponentId>,
}

impl PanelDefinition {
    pub fn has_furniture(&self) -> bool {
        self.header.is_some() || self.footer.is_some() || self.continuation_footer.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct TextContent {
    pub text: String,
    /// `#name` for an in-document destination, otherwise an external URI.
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageDefinition {
    /// Resource key; also the XObject name stem in the output.
    pub name: String,
    /// Intrinsic pixel dimensions.
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Raw 8-bit RGB samples, row-major. A placeholder sample is emitted
    /// when absent so the object graph stays valid.
    pub data: Option<Arc<Vec<u8>>>,
}

#[derive(Debug, Clone, Default)]
pub struct TableDefinition {
    pub columns: Vec<TableColumnDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct TableColumnDefinition {
    pub width: Dimension,
}

#[derive(Debug, Clone, Default)]
pub struct RowDefinition {
    /// Header rows repeat at the top of every grid the table spans.
    pub repeat_at_top: bool,
}

#[derive(Debug, Clone)]
pub struct CellDefinition {
    pub row_span: usize,
    pub col_span: usize,
}

impl Default for CellDefinition {
    fn default() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListMarker {
    Bullet,
    Numbered(NumberingStyle),
}

#[derive(Debug, Clone)]
pub struct ListDefinition {
    pub marker: ListMarker,
    pub start: usize,
}

impl Default for ListDefinition {
    fn default() -> Self {
        Self {
            marker: ListMarker::Numbered(NumberingStyle::Decimal),
            start: 1,
        }
    }
}

/// Arena of components. Children are stored as handles so the layout tree
/// can reference components without ownership cycles.
#[derive(Debug, Default)]
pub struct ComponentTree {
    nodes: Vec<Component>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, component: Component) -> ComponentId {
        let id = ComponentId(self.nodes.len());
        self.nodes.push(component);
        id
    }

    /// Adds a component and links it as the last child of `parent`.
    pub fn add_child(&mut self, parent: ComponentId, component: Component) -> ComponentId {
        let id = self.add(component);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: ComponentId) -> &Component {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: ComponentId) -> &mut Component {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        &self.nodes[id.0].children
    }

    pub fn style(&self, id: ComponentId) -> &Style {
        &self.nodes[id.0].style
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ComponentId> + '_ {
        (0..self.nodes.len()).map(ComponentId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_child_links_parent() {
        let mut tree = ComponentTree::new();
        let parent = tree.add(Component::panel(Style::default()));
        let child = tree.add_child(parent, Component::text("hello", Style::default()));
        assert_eq!(tree.children(parent), &[child]);
        assert_eq!(tree.get(child).kind_name(), "text");
    }
}
