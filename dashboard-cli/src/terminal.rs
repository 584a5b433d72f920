//! Terminal implementations of the dashboard's UI collaborators.

use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::Mutex;

use dashboard_core::{
    BusyIndicator, Dialog, ModalHost, Notifier, Ui, ViewNode,
    view::ViewChild,
};

/// Prints a loading line when the first cycle starts.
#[derive(Debug, Default)]
pub struct TerminalBusy {
    depth: AtomicUsize,
}

impl BusyIndicator for TerminalBusy {
    fn show(&self) {
        if self.depth.fetch_add(1, Ordering::SeqCst) == 0 {
            eprintln!("Loading weather data...");
        }
    }

    fn hide(&self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, title: &str, detail: &str) {
        eprintln!("error: {title}\n  {detail}");
    }
}

/// Remembers which dialogs exist; the `settings` command stands in for them.
#[derive(Debug, Default)]
pub struct TerminalModals {
    ids: Mutex<BTreeSet<String>>,
}

impl ModalHost for TerminalModals {
    fn has_dialog(&self, id: &str) -> bool {
        self.ids.lock().contains(id)
    }

    fn create_dialog(&self, dialog: Dialog) {
        tracing::debug!(id = %dialog.id, title = %dialog.title, "registered dialog");
        self.ids.lock().insert(dialog.id);
    }
}

pub fn ui() -> Ui {
    Ui {
        busy: Arc::new(TerminalBusy::default()),
        notifier: Arc::new(TerminalNotifier),
        modals: Arc::new(TerminalModals::default()),
    }
}

/// Plain-text rendering of a view tree, one line per text-bearing element.
pub fn view_to_text(node: &ViewNode) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

fn write_node(node: &ViewNode, depth: usize, out: &mut String) {
    // tiles and hourly entries read better on a single line
    if node.get_attr("data-tile").is_some() || node.get_attr("data-hourly").is_some() {
        let parts: Vec<String> = node.elements().map(inline).filter(|s| !s.is_empty()).collect();
        push_line(out, depth, &parts.join("  "));
        return;
    }

    let own: String = node
        .children
        .iter()
        .filter_map(|c| match c {
            ViewChild::Text(text) => Some(text.as_str()),
            ViewChild::Element(_) => None,
        })
        .collect();

    let depth = if own.is_empty() {
        depth
    } else {
        push_line(out, depth, &own);
        depth + 1
    };

    for child in node.elements() {
        write_node(child, depth, out);
    }
}

fn inline(node: &ViewNode) -> String {
    if node.tag == "img" {
        return node.get_attr("src").map(icon_name).unwrap_or_default();
    }
    match node.elements().next() {
        Some(img) if img.tag == "img" => inline(img),
        _ => node.elements().map(inline).chain(own_text(node)).collect::<Vec<_>>().join(" "),
    }
}

fn own_text(node: &ViewNode) -> Option<String> {
    let text = node.text_content();
    (node.elements().next().is_none() && !text.is_empty()).then_some(text)
}

fn icon_name(src: &str) -> String {
    let file = src.rsplit('/').next().unwrap_or(src);
    format!("[{}]", file.trim_end_matches("-s.png"))
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(text);
    out.push('\n');
}
