use crate::graph::{BinNode, NodeId, SourceBinGraph};
use std::fmt::Write;

/// Formats a source's bin hierarchy as an indented tree:
///
/// ```text
/// BIN HIERARCHY for source 'ePIC' (x -> q2, 4 leaves):
/// --------------------------------------------------
/// |-- x[0] [0.01, 0.1)
/// |  |-- q2[0] [1, 10) => x0_q20
/// ```
pub fn format_tree(graph: &SourceBinGraph) -> String {
    let mut printer = TreePrinter { graph, output: String::new() };
    let order: Vec<&str> = graph.axes().iter().map(|a| a.variable()).collect();
    let _ = writeln!(
        printer.output,
        "BIN HIERARCHY for source '{}' ({}, {} leaves):",
        graph.title(),
        order.join(" -> "),
        graph.leaf_count()
    );
    let _ = writeln!(printer.output, "--------------------------------------------------");
    printer.print_children(graph.root(), "");
    printer.output
}

struct TreePrinter<'a> {
    graph: &'a SourceBinGraph,
    output: String,
}

impl<'a> TreePrinter<'a> {
    fn print_children(&mut self, node: NodeId, stem: &str) {
        let children = self.graph.children(node);
        for (i, &child) in children.iter().enumerate() {
            let is_last = i == children.len() - 1;
            let connector = if is_last { "`--" } else { "|--" };
            self.print_node(child, &format!("{}{}", stem, connector));
        }
    }

    fn print_node(&mut self, id: NodeId, prefix: &str) {
        let BinNode::Bin { bin, payload, .. } = *self.graph.node(id) else { return };
        let Some(axis) = self.graph.axis_of(id) else { return };

        let range = match axis.edges(bin) {
            Some((lo, hi)) => format!("[{}, {})", lo, hi),
            None => "[?]".to_string(),
        };
        match payload {
            Some(pid) => {
                let name = &self.graph.payload(pid).name;
                let _ = writeln!(self.output, "{} {}[{}] {} => {}", prefix, axis.variable(), bin, range, name);
            }
            None => {
                let _ = writeln!(self.output, "{} {}[{}] {}", prefix, axis.variable(), bin, range);
                self.print_children(id, &build_child_stem(prefix));
            }
        }
    }
}

fn build_child_stem(current_prefix: &str) -> String {
    current_prefix.replace("`--", "   ").replace("|--", "|  ")
}
