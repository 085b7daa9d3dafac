//! Event locator for schema-less trace documents.
//!
//! Observations can sit under any key and at any depth (`observations`,
//! `spans`, nested children, ...), so the locator never assumes a layout:
//! every map value and every sequence element is visited.

use serde_json::Value;

/// `type` tag carried by inference-call observations
pub const GENERATION_TYPE: &str = "GENERATION";

/// `type` tag carried by named processing spans
pub const SPAN_TYPE: &str = "SPAN";

/// Depth-first pre-order walk over `document`.
///
/// Map entries are visited in the map's iteration order and sequence elements
/// in index order, so two walks over the same document always agree. The
/// callback receives each node together with its depth (the root is 0).
pub fn visit<'a, F>(document: &'a Value, visitor: &mut F)
where
    F: FnMut(&'a Value, usize),
{
    visit_at(document, 0, visitor);
}

fn visit_at<'a, F>(node: &'a Value, depth: usize, visitor: &mut F)
where
    F: FnMut(&'a Value, usize),
{
    visitor(node, depth);
    match node {
        Value::Object(map) => {
            for child in map.values() {
                visit_at(child, depth + 1, visitor);
            }
        }
        Value::Array(items) => {
            for child in items {
                visit_at(child, depth + 1, visitor);
            }
        }
        _ => {}
    }
}

/// Collect every node below the root that satisfies `predicate`.
pub fn find_nodes<'a, P>(document: &'a Value, predicate: P) -> Vec<&'a Value>
where
    P: Fn(&Value) -> bool,
{
    let mut found = Vec::new();
    visit(document, &mut |node, depth| {
        if depth > 0 && predicate(node) {
            found.push(node);
        }
    });
    found
}

/// Returns the `type` tag of a node, if it is a map carrying one.
pub fn observation_type(node: &Value) -> Option<&str> {
    node.as_object()?.get("type")?.as_str()
}

pub fn is_generation(node: &Value) -> bool {
    observation_type(node) == Some(GENERATION_TYPE)
}

pub fn is_observation(node: &Value) -> bool {
    observation_type(node).is_some()
}

/// All inference-call observations, in traversal order.
pub fn find_generations(document: &Value) -> Vec<&Value> {
    find_nodes(document, is_generation)
}

/// All typed observations regardless of their type, in traversal order.
pub fn find_observations(document: &Value) -> Vec<&Value> {
    find_nodes(document, is_observation)
}
