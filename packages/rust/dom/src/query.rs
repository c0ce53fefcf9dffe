//! Generic tree queries: tag search, text extraction, parent lookup.
//!
//! All walks use an explicit stack so arbitrarily deep documents cannot
//! overflow the call stack. Results are in pre-order (document order).

use std::slice::Iter;

use crate::Node;

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Pre-order iterator over a node and all of its descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Walk `root` and everything below it, root first.
pub fn descendants(root: &Node) -> Descendants<'_> {
    Descendants { stack: vec![root] }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Every element named `tag` in `root`'s subtree, `root` included.
pub fn find_by_tag_name<'a>(root: &'a Node, tag: &str) -> Vec<&'a Node> {
    descendants(root).filter(|node| node.is_element(tag)).collect()
}

/// Text content of `node`.
///
/// Text nodes yield their raw value. Elements concatenate the text of their
/// children and trim the result, so every nested element is trimmed on its
/// own before being joined into its parent.
pub fn extract_text(node: &Node) -> String {
    let root = match node {
        Node::Text(value) => return value.clone(),
        Node::Element(el) => el,
    };

    let mut stack: Vec<(Iter<'_, Node>, String)> = vec![(root.children.iter(), String::new())];
    while let Some((children, buf)) = stack.last_mut() {
        match children.next() {
            Some(Node::Text(value)) => buf.push_str(value),
            Some(Node::Element(child)) => stack.push((child.children.iter(), String::new())),
            None => {
                let finished = buf.trim().to_owned();
                stack.pop();
                match stack.last_mut() {
                    Some((_, parent)) => parent.push_str(&finished),
                    None => return finished,
                }
            }
        }
    }
    String::new()
}

/// First node under `root` (pre-order) that lists `target` among its direct
/// children.
///
/// Children are matched by address, so only the exact node instance counts;
/// a structurally equal copy elsewhere in the tree does not. Scans the whole
/// tree on every call.
pub fn find_parent<'a>(target: &Node, root: &'a Node) -> Option<&'a Node> {
    descendants(root).find(|candidate| {
        candidate
            .children()
            .iter()
            .any(|child| std::ptr::eq(child, target))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, children: Vec<Node>) -> Node {
        Node::element(tag, vec![], children)
    }

    fn sample_tree() -> Node {
        el(
            "div",
            vec![
                el("p", vec![Node::text("  one "), el("b", vec![Node::text(" two ")])]),
                el("ul", vec![el("li", vec![el("p", vec![Node::text("three")])])]),
                Node::text("\n"),
            ],
        )
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = sample_tree();
        let tags: Vec<&str> = descendants(&tree).map(Node::tag_name).collect();
        assert_eq!(
            tags,
            ["div", "p", "#text", "b", "#text", "ul", "li", "p", "#text", "#text"]
        );
    }

    #[test]
    fn find_by_tag_name_includes_root_and_keeps_order() {
        let tree = sample_tree();
        let ps = find_by_tag_name(&tree, "p");
        assert_eq!(ps.len(), 2);
        assert_eq!(extract_text(ps[0]), "onetwo");
        assert_eq!(extract_text(ps[1]), "three");

        let divs = find_by_tag_name(&tree, "div");
        assert_eq!(divs.len(), 1);
        assert!(std::ptr::eq(divs[0], &tree));
    }

    #[test]
    fn find_by_tag_name_ignores_text_nodes() {
        let tree = sample_tree();
        assert!(find_by_tag_name(&tree, "#text").is_empty());
        assert!(find_by_tag_name(&tree, "table").is_empty());
    }

    #[test]
    fn extract_text_trims_each_element() {
        // "  one " + trim(" two ") -> "  one two" -> "one two"
        let p = el("p", vec![Node::text("  one "), el("b", vec![Node::text(" two ")])]);
        assert_eq!(extract_text(&p), "one two");
    }

    #[test]
    fn extract_text_of_text_node_is_raw() {
        assert_eq!(extract_text(&Node::text("  raw  ")), "  raw  ");
    }

    #[test]
    fn extract_text_of_empty_element_is_empty() {
        assert_eq!(extract_text(&el("td", vec![])), "");
        assert_eq!(extract_text(&el("td", vec![el("br", vec![])])), "");
    }

    #[test]
    fn extract_text_handles_deep_nesting() {
        let mut node = Node::text("deep");
        for _ in 0..100_000 {
            node = el("span", vec![node]);
        }
        assert_eq!(extract_text(&node), "deep");
        // Drop iteratively to keep the test's own stack shallow.
        let mut current = node;
        while let Node::Element(mut e) = current {
            current = e.children.pop().unwrap_or_else(|| Node::text(""));
        }
    }

    #[test]
    fn find_parent_returns_direct_parent() {
        let tree = sample_tree();
        let b = find_by_tag_name(&tree, "b")[0];
        let parent = find_parent(b, &tree).expect("b has a parent");
        assert_eq!(parent.tag_name(), "p");
        assert!(std::ptr::eq(parent, &tree.children()[0]));
    }

    #[test]
    fn find_parent_of_root_is_none() {
        let tree = sample_tree();
        assert!(find_parent(&tree, &tree).is_none());
    }

    #[test]
    fn find_parent_uses_identity_not_structure() {
        let detached = el("b", vec![Node::text(" two ")]);
        let tree = sample_tree();
        // Structurally equal to the <b> inside the tree, but a different node.
        assert!(find_parent(&detached, &tree).is_none());
    }

    #[test]
    fn find_parent_distinguishes_duplicate_subtrees() {
        let twin = || el("h4", vec![Node::text("5.1. Same")]);
        let tree = el(
            "body",
            vec![el("div", vec![twin()]), el("section", vec![twin()])],
        );
        let headers = find_by_tag_name(&tree, "h4");
        assert_eq!(headers[0], headers[1]);
        assert_eq!(find_parent(headers[0], &tree).map(Node::tag_name), Some("div"));
        assert_eq!(
            find_parent(headers[1], &tree).map(Node::tag_name),
            Some("section")
        );
    }
}
