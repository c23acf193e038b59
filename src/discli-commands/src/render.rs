//! Help and diagnostics text.

use std::fmt::Write as _;

use crate::node::CommandNode;
use crate::permission::InvocationContext;

impl<C: InvocationContext, R> CommandNode<C, R> {
    /// One-line synopsis, e.g. `Usage: user ban <target_id> [-r <reason>] [-s]`.
    pub fn usage_line(&self) -> String {
        let params = self.parameters();
        let mut line = format!("Usage: {}", self.command_string());

        for argument in params.arguments().iter() {
            let _ = write!(line, " <{}>", argument.name());
        }
        for option in params.options().iter() {
            let _ = write!(line, " [-{} <{}>]", option.letter(), option.name());
        }
        for tag in params.tags().iter() {
            let _ = write!(line, " [-{}]", tag.letter());
        }
        if self.has_children() && params.arguments().is_empty() {
            line.push_str(" <sub-command>");
        }
        line
    }

    /// Usage line, description, parameter summaries and the sub-commands
    /// `ctx` is allowed to enter.
    pub async fn usage_message(&self, ctx: &C) -> String {
        let params = self.parameters();
        let mut lines = vec![self.usage_line()];
        if let Some(description) = self.description() {
            lines.push(description.to_string());
        }

        push_section(&mut lines, "Arguments:", params.arguments().iter().map(|a| a.to_string()));
        push_section(&mut lines, "Options:", params.options().iter().map(|o| o.to_string()));
        push_section(&mut lines, "Tags:", params.tags().iter().map(|t| t.to_string()));

        let mut visible = Vec::new();
        for child in self.children() {
            if child.permissions().evaluate(ctx).await {
                visible.push(match child.description() {
                    Some(description) => format!("{} - {}", child.name(), description),
                    None => child.name().to_string(),
                });
            }
        }
        push_section(&mut lines, "Sub-commands:", visible);

        lines.join("\n")
    }

    /// Indented tree of this node's descendants, headed by its name.
    ///
    /// ```text
    /// bot
    /// |
    /// +-+ user
    ///   |
    ///   +-+ ban
    /// ```
    ///
    /// With `details`, every node also lists its parameters and permissions.
    pub fn tree_string(&self, details: bool) -> String {
        let mut out = format!("{}\n", self.name());
        self.write_tree(&mut out, details, "");
        out
    }

    fn write_tree(&self, out: &mut String, details: bool, prefix: &str) {
        if details {
            self.write_details(out, prefix);
        }

        let count = self.children().count();
        for (i, child) in self.children().enumerate() {
            let _ = write!(out, "{prefix}|\n{prefix}+-+ {}\n", child.name());
            let child_prefix = if i + 1 < count {
                format!("{prefix}| ")
            } else {
                format!("{prefix}  ")
            };
            child.write_tree(out, details, &child_prefix);
        }
    }

    fn write_details(&self, out: &mut String, prefix: &str) {
        let bar = if self.has_children() { "|" } else { " " };
        let params = self.parameters();

        let mut line = |kind: &str, text: String| {
            let _ = writeln!(out, "{prefix}{bar} ({kind}) {text}");
        };
        for argument in params.arguments().iter() {
            line("argument", argument.to_string());
        }
        for option in params.options().iter() {
            line("option", option.to_string());
        }
        for tag in params.tags().iter() {
            line("tag", tag.to_string());
        }
        for permission in self.permissions().iter() {
            line("permission", permission.to_string());
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, entries: impl IntoIterator<Item = String>) {
    let entries: Vec<String> = entries.into_iter().collect();
    if entries.is_empty() {
        return;
    }
    lines.push(title.to_string());
    lines.extend(entries.into_iter().map(|e| format!("  {e}")));
}
