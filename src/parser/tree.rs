use crowbook_text_processing::escape;
use serde::Serialize;

use crate::grammar::SymbolId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTreeNode {
    /// 1-based, in creation order.
    pub index: usize,
    /// Grammar symbol name, or the matched literal for terminals.
    pub symbol: String,
    /// Index of the owning node, 0 for the root.
    pub parent: usize,
    /// Index of the next sibling, 0 for the last child.
    pub next_sibling: usize,
    #[serde(skip)]
    pub grammar_symbol: SymbolId,
}

/// Append-only arena of nodes. Node `i` lives at `nodes[i - 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    nodes: Vec<ParseTreeNode>,
    #[serde(skip)]
    first_child: Vec<usize>,
}

pub struct Children<'a> {
    tree: &'a ParseTree,
    next: usize,
}

impl<'a> Iterator for Children<'a> {
    type Item = &'a ParseTreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.next)?;
        self.next = node.next_sibling;
        Some(node)
    }
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_node(&mut self, grammar_symbol: SymbolId, symbol: &str, parent: usize) -> usize {
        let index = self.nodes.len() + 1;
        self.nodes.push(ParseTreeNode {
            index,
            symbol: symbol.to_string(),
            parent,
            next_sibling: 0,
            grammar_symbol,
        });
        self.first_child.push(0);
        index
    }

    /// Creates the children of `parent` left to right and links them as
    /// siblings. Returns their indices in the same order.
    pub fn add_children<'s>(
        &mut self,
        parent: usize,
        symbols: impl IntoIterator<Item = (SymbolId, &'s str)>,
    ) -> Vec<usize> {
        let children: Vec<usize> = symbols
            .into_iter()
            .map(|(id, name)| self.create_node(id, name, parent))
            .collect();
        for pair in children.windows(2) {
            self.nodes[pair[0] - 1].next_sibling = pair[1];
        }
        if let (Some(&first), Some(slot)) = (
            children.first(),
            parent.checked_sub(1).and_then(|i| self.first_child.get_mut(i)),
        ) {
            *slot = first;
        }
        children
    }

    pub(crate) fn relabel(&mut self, index: usize, symbol: &str) {
        if let Some(node) = index.checked_sub(1).and_then(|i| self.nodes.get_mut(i)) {
            node.symbol = symbol.to_string();
        }
    }

    pub fn get(&self, index: usize) -> Option<&ParseTreeNode> {
        index.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    pub fn root(&self) -> Option<&ParseTreeNode> {
        self.nodes.first()
    }

    pub fn nodes(&self) -> &[ParseTreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, index: usize) -> Children<'_> {
        let next = index
            .checked_sub(1)
            .and_then(|i| self.first_child.get(i))
            .cloned()
            .unwrap_or(0);
        Children { tree: self, next }
    }

    pub fn is_leaf(&self, index: usize) -> bool {
        self.children(index).next().is_none()
    }

    /// Labels of the leaves, left to right.
    pub fn frontier(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&ParseTreeNode> = self.root().into_iter().collect();
        while let Some(node) = stack.pop() {
            let children: Vec<&ParseTreeNode> = self.children(node.index).collect();
            if children.is_empty() {
                leaves.push(node.symbol.as_str());
            }
            stack.extend(children.into_iter().rev());
        }
        leaves
    }

    pub fn to_plaintext(&self) -> String {
        let width = self
            .nodes
            .iter()
            .map(|n| n.symbol.chars().count())
            .max()
            .unwrap_or(0)
            .max(30);
        let rule = "=".repeat(width + 33);
        let mut lines = vec![
            rule.clone(),
            format!(
                "{:<10} {:<width$} {:<10} {:<10}",
                "Index",
                "Symbol",
                "Father",
                "Sibling",
                width = width
            )
            .trim_end()
            .to_string(),
            "-".repeat(width + 33),
        ];
        lines.extend(self.nodes.iter().map(|n| {
            format!(
                "{:<10} {:<width$} {:<10} {:<10}",
                n.index,
                n.symbol,
                n.parent,
                n.next_sibling,
                width = width
            )
            .trim_end()
            .to_string()
        }));
        lines.push(rule);
        lines.join("\n")
    }

    pub fn to_visual(&self) -> String {
        let mut lines = Vec::new();
        // (node, prefix, is_last)
        let mut stack: Vec<(&ParseTreeNode, String, bool)> = self
            .root()
            .map(|root| (root, String::new(), true))
            .into_iter()
            .collect();
        while let Some((node, prefix, is_last)) = stack.pop() {
            let connector = if is_last { "└── " } else { "├── " };
            lines.push(format!("{}{}{} ({})", prefix, connector, node.symbol, node.index));
            let child_prefix = prefix + if is_last { "    " } else { "│   " };
            let children: Vec<&ParseTreeNode> = self.children(node.index).collect();
            let count = children.len();
            for (i, child) in children.into_iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i + 1 == count));
            }
        }
        lines.join("\n")
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .nodes
            .iter()
            .map(|n| {
                format!(
                    "{} & {} & {} & {}",
                    n.index,
                    escape::tex(n.symbol.as_str()),
                    n.parent,
                    n.next_sibling
                )
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        "\\begin{tabular}{r|l|r|r}\n".to_string()
            + "Index & Symbol & Father & Sibling\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
