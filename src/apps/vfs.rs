//! Read-only in-memory file tree browsed by the terminal's file commands.

use std::collections::BTreeMap;

use indoc::indoc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File {
        summary: &'static str,
        content: &'static str,
        /// Shown by `ls` but refused by `cat`.
        binary: bool,
    },
    Dir {
        summary: &'static str,
        children: BTreeMap<&'static str, Node>,
    },
}

impl Node {
    fn text(summary: &'static str, content: &'static str) -> Self {
        Node::File {
            summary,
            content,
            binary: false,
        }
    }

    fn dir<I>(summary: &'static str, children: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Node)>,
    {
        Node::Dir {
            summary,
            children: children.into_iter().collect(),
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Node::File { summary, .. } | Node::Dir { summary, .. } => *summary,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Dir { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    NotFound,
    IsDirectory,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFs {
    root: BTreeMap<&'static str, Node>,
}

impl Default for VirtualFs {
    fn default() -> Self {
        let root = [
            (
                "about.txt",
                Node::text(
                    "What this desktop is",
                    indoc! {"
                        folio-wm is a desktop of floating windows that runs inside a terminal.
                        Open apps from the desktop icons or from this terminal, drag windows
                        by their title bar and resize them from any border cell.
                    "},
                ),
            ),
            (
                "keys.txt",
                Node::text(
                    "Keyboard shortcuts",
                    indoc! {"
                        Ctrl+M        minimize the focused window
                        Alt+Enter     maximize or restore the focused window
                        Ctrl+W        close the focused window
                        Space/Enter   open a terminal from an empty desktop
                        Ctrl+Q        quit
                    "},
                ),
            ),
            (
                "resume.pdf",
                Node::File {
                    summary: "Document for the PDF viewer",
                    content: "",
                    binary: true,
                },
            ),
            (
                "apps",
                Node::dir(
                    "Hosted applications",
                    [
                        (
                            "terminal.txt",
                            Node::text(
                                "The command line",
                                "A line editor with history (Up/Down) and Tab completion.\n",
                            ),
                        ),
                        (
                            "pdf-viewer.txt",
                            Node::text(
                                "The document reader",
                                "Turns pages with Left/Right, PgUp/PgDn, n/p, Home and End.\n",
                            ),
                        ),
                        (
                            "ai-chat.txt",
                            Node::text(
                                "The chat assistant",
                                "Answers from the attached document. Try status, analyze, restart, clear.\n",
                            ),
                        ),
                    ],
                ),
            ),
            (
                "notes",
                Node::dir(
                    "Scratch notes",
                    [
                        (
                            "windows.md",
                            Node::text(
                                "How windows behave",
                                indoc! {"
                                    # Windows
                                    Each app instance gets its own window. Raising a window gives it a
                                    fresh stacking slot, so the last one touched is always on top.
                                    Closing plays a short animation before the window goes away.
                                "},
                            ),
                        ),
                    ],
                ),
            ),
        ];
        Self {
            root: root.into_iter().collect(),
        }
    }
}

impl VirtualFs {
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &Node)> {
        self.root.iter().map(|(name, node)| (*name, node))
    }

    /// Look up a `/`-separated path relative to the root.
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut parts = path.trim_matches('/').split('/').filter(|p| !p.is_empty());
        let mut node = self.root.get(parts.next()?)?;
        for part in parts {
            match node {
                Node::Dir { children, .. } => node = children.get(part)?,
                Node::File { .. } => return None,
            }
        }
        Some(node)
    }

    pub fn read(&self, path: &str) -> Result<&'static str, ReadError> {
        match self.get(path) {
            None => Err(ReadError::NotFound),
            Some(Node::Dir { .. }) => Err(ReadError::IsDirectory),
            Some(Node::File { binary: true, .. }) => Err(ReadError::Binary),
            Some(Node::File { content, .. }) => Ok(*content),
        }
    }

    /// Every path in the tree, parents before children.
    pub fn paths(&self) -> Vec<String> {
        fn walk(prefix: &str, nodes: &BTreeMap<&'static str, Node>, out: &mut Vec<String>) {
            for (name, node) in nodes {
                let path = format!("{prefix}{name}");
                out.push(path.clone());
                if let Node::Dir { children, .. } = node {
                    walk(&format!("{path}/"), children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk("", &self.root, &mut out);
        out
    }

    /// Box-drawn outline of the tree.
    pub fn tree(&self) -> Vec<String> {
        fn walk(indent: &str, nodes: &BTreeMap<&'static str, Node>, out: &mut Vec<String>) {
            let last = nodes.len().saturating_sub(1);
            for (idx, (name, node)) in nodes.iter().enumerate() {
                let (branch, next) = if idx == last {
                    ("└── ", "    ")
                } else {
                    ("├── ", "│   ")
                };
                let slash = if node.is_dir() { "/" } else { "" };
                out.push(format!("{indent}{branch}{name}{slash}"));
                if let Node::Dir { children, .. } = node {
                    walk(&format!("{indent}{next}"), children, out);
                }
            }
        }
        let mut out = vec![".".to_string()];
        walk("", &self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lookup() {
        let fs = VirtualFs::default();
        assert!(fs.get("apps").unwrap().is_dir());
        assert!(fs.read("apps/terminal.txt").unwrap().contains("Tab completion"));
        assert!(fs.get("/apps/terminal.txt/").is_some());
        assert_eq!(fs.read("apps"), Err(ReadError::IsDirectory));
        assert_eq!(fs.read("resume.pdf"), Err(ReadError::Binary));
        assert_eq!(fs.read("about.txt/x"), Err(ReadError::NotFound));
        assert_eq!(fs.read(""), Err(ReadError::NotFound));
    }

    #[test]
    fn paths_list_parents_first() {
        let paths = VirtualFs::default().paths();
        let apps = paths.iter().position(|p| p == "apps").unwrap();
        let child = paths.iter().position(|p| p == "apps/ai-chat.txt").unwrap();
        assert!(apps < child);
        assert!(paths.contains(&"notes/windows.md".to_string()));
    }

    #[test]
    fn tree_draws_branches() {
        let tree = VirtualFs::default().tree();
        assert_eq!(tree[0], ".");
        assert_eq!(tree[1], "├── about.txt");
        assert!(tree.contains(&"│   ├── ai-chat.txt".to_string()));
        assert!(tree.contains(&"│   └── windows.md".to_string()));
        assert_eq!(tree.last().map(String::as_str), Some("└── resume.pdf"));
    }
}
