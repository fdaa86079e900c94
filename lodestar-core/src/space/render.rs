//! Space rendering for debugging and visualization.
//!
//! Spaces are lazy and can be very deep, so every renderer stops at a
//! maximum depth. The root is at depth 0.

use super::ExampleSpace;
use std::fmt::Display;

impl<T> ExampleSpace<T>
where
    T: Display + Clone + 'static,
{
    /// Render the space as an indented tree, down to `max_depth`.
    pub fn render(&self, max_depth: usize) -> String {
        let mut result = String::new();
        self.render_recursive(&mut result, "", true, max_depth);
        result
    }

    fn render_recursive(&self, result: &mut String, prefix: &str, is_last: bool, depth: usize) {
        result.push_str(prefix);
        result.push_str(if is_last { "└── " } else { "├── " });
        result.push_str(&format!("{}\n", self.current.value));

        if depth == 0 {
            return;
        }

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        let children: Vec<ExampleSpace<T>> = self.subspace().collect();
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i == children.len() - 1;
            child.render_recursive(result, &child_prefix, child_is_last, depth - 1);
        }
    }

    /// Render the space compactly, showing only values.
    pub fn render_compact(&self, max_depth: usize) -> String {
        if max_depth == 0 {
            return format!("{}", self.current.value);
        }

        let children: Vec<String> = self
            .subspace()
            .map(|child| child.render_compact(max_depth - 1))
            .collect();
        if children.is_empty() {
            format!("{}", self.current.value)
        } else {
            format!("{}[{}]", self.current.value, children.join(", "))
        }
    }

    /// Render the root followed by its immediate simplifications.
    pub fn render_shrinks(&self) -> String {
        let shrinks: Vec<String> = self
            .subspace()
            .map(|child| format!("{}", child.current.value))
            .collect();
        if shrinks.is_empty() {
            format!("{} (no shrinks)", self.current.value)
        } else {
            format!("{} → [{}]", self.current.value, shrinks.join(", "))
        }
    }

    /// Render the immediate simplifications with their distances, numbered
    /// by subspace index.
    pub fn render_numbered(&self) -> String {
        let mut children = self.subspace().peekable();
        if children.peek().is_none() {
            return format!("{} (no shrinks)", self.current.value);
        }

        let mut result = format!(
            "Original: {} (distance {:.2})\nShrinks:\n",
            self.current.value, self.current.distance
        );
        for (i, child) in children.enumerate() {
            result.push_str(&format!(
                "  {}: {} (distance {:.2})\n",
                i, child.current.value, child.current.distance
            ));
        }
        result
    }
}
