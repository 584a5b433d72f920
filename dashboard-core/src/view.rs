//! Display-independent view tree.
//!
//! A [`ViewNode`] is what the render pipeline produces instead of touching a
//! real display surface: a tag, ordered attributes, children and the named
//! actions bound to its events. Front ends walk the tree to draw it.

use parking_lot::Mutex;
use serde::Serialize;

/// What an event binding asks the widget to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Open the settings dialog.
    OpenSettings,
    /// The location search input changed; read its current value.
    SearchInput,
    /// Save the location currently typed into the search input.
    SaveSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventBinding {
    pub event: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewChild {
    Element(ViewNode),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewChild>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<EventBinding>,
}

impl ViewNode {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string(), attributes: Vec::new(), children: Vec::new(), bindings: Vec::new() }
    }

    /// Set an attribute, replacing an earlier value with the same name.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    /// Append one class to the existing class list.
    pub fn add_class(self, class: &str) -> Self {
        let merged = match self.get_attr("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attr("class", merged)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(ViewChild::Text(text.into()));
        self
    }

    pub fn child(mut self, child: ViewNode) -> Self {
        self.children.push(ViewChild::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children.extend(children.into_iter().map(ViewChild::Element));
        self
    }

    pub fn on(mut self, event: &str, action: Action) -> Self {
        self.bindings.push(EventBinding { event: event.to_string(), action });
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn elements(&self) -> impl Iterator<Item = &ViewNode> {
        self.children.iter().filter_map(|c| match c {
            ViewChild::Element(node) => Some(node),
            ViewChild::Text(_) => None,
        })
    }

    /// Concatenated text of this node and all descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                ViewChild::Text(text) => out.push_str(text),
                ViewChild::Element(node) => node.collect_text(out),
            }
        }
    }

    /// Depth-first search including `self`.
    pub fn find(&self, pred: &dyn Fn(&ViewNode) -> bool) -> Option<&ViewNode> {
        if pred(self) {
            return Some(self);
        }
        self.elements().find_map(|node| node.find(pred))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ViewNode> {
        self.find(&|node: &ViewNode| node.id() == Some(id))
    }

    /// Every node carrying a binding for `action`.
    pub fn bound_to(&self, action: Action) -> Vec<&ViewNode> {
        let mut out = Vec::new();
        self.walk(&mut |node| {
            if node.bindings.iter().any(|b| b.action == action) {
                out.push(node);
            }
        });
        out
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a ViewNode)) {
        visit(self);
        for node in self.elements() {
            node.walk(visit);
        }
    }
}

/// The slot the weather container is mounted into.
///
/// Mounting replaces whatever was there before; nothing is patched in place.
#[derive(Debug, Default)]
pub struct Surface {
    mounted: Mutex<Option<ViewNode>>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, view: ViewNode) {
        let mut mounted = self.mounted.lock();
        if mounted.take().is_some() {
            tracing::debug!("removed previously rendered weather container");
        }
        *mounted = Some(view);
    }

    pub fn current(&self) -> Option<ViewNode> {
        self.mounted.lock().clone()
    }
}
