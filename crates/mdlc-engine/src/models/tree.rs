use serde::{Deserialize, Serialize};

/// Id of the single root folder every tree hangs from
pub const ROOT_ID: &str = "root";

/// Kind of item a caller asks the tree store to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    File,
    Folder,
}

/// Payload that distinguishes files from folders.
///
/// Serialized as an internally tagged `"type"` field so the persisted JSON
/// reads `{"id", "name", "type": "file", "content"}` or
/// `{"id", "name", "type": "folder", "children"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File {
        #[serde(default)]
        content: String,
    },
    Folder {
        #[serde(default)]
        children: Vec<TreeNode>,
    },
}

/// A file or folder in the notes hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn new_file(id: String, name: String) -> Self {
        Self {
            id,
            name,
            kind: NodeKind::File {
                content: String::new(),
            },
        }
    }

    pub fn new_folder(id: String, name: String) -> Self {
        Self {
            id,
            name,
            kind: NodeKind::Folder {
                children: Vec::new(),
            },
        }
    }

    /// An empty root folder
    pub fn root() -> Self {
        Self::new_folder(ROOT_ID.to_string(), ROOT_ID.to_string())
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn item_type(&self) -> ItemType {
        match self.kind {
            NodeKind::File { .. } => ItemType::File,
            NodeKind::Folder { .. } => ItemType::Folder,
        }
    }

    /// File content, `None` for folders
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content.as_str()),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Child nodes, `None` for files
    pub fn children(&self) -> Option<&[TreeNode]> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children.as_slice()),
            NodeKind::File { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<TreeNode>> {
        match &mut self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Depth-first pre-order lookup of `id` within this subtree (self included)
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Folder whose children directly contain `id`
    pub fn parent_of(&self, id: &str) -> Option<&TreeNode> {
        let children = self.children()?;
        if children.iter().any(|child| child.id == id) {
            return Some(self);
        }
        children.iter().find_map(|child| child.parent_of(id))
    }

    /// Whether `id` appears anywhere in this subtree, self included
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Detach the descendant `id` (never self) and return it with its subtree
    pub(crate) fn remove_descendant(&mut self, id: &str) -> Option<TreeNode> {
        let children = self.children_mut()?;
        if let Some(index) = children.iter().position(|child| child.id == id) {
            return Some(children.remove(index));
        }
        children
            .iter_mut()
            .find_map(|child| child.remove_descendant(id))
    }

    /// Number of nodes in this subtree, self included
    pub fn count(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(TreeNode::count).sum())
            .unwrap_or(0)
    }

    /// Every id in this subtree in pre-order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        if let Some(children) = self.children() {
            for child in children {
                child.collect_ids(ids);
            }
        }
    }
}

/// A tree node flattened for list display
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem {
    pub id: String,
    pub name: String,
    pub is_folder: bool,
    pub is_expanded: bool,
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TreeNode {
        let mut root = TreeNode::root();
        let mut projects = TreeNode::new_folder("f1".into(), "Projects".into());
        projects
            .children_mut()
            .unwrap()
            .push(TreeNode::new_file("a".into(), "alpha.md".into()));
        root.children_mut().unwrap().push(projects);
        root.children_mut()
            .unwrap()
            .push(TreeNode::new_file("b".into(), "beta.md".into()));
        root
    }

    #[test]
    fn test_find_is_preorder_and_includes_self() {
        let tree = sample();
        assert_eq!(tree.find("root").unwrap().name, "root");
        assert_eq!(tree.find("a").unwrap().name, "alpha.md");
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_parent_of() {
        let tree = sample();
        assert_eq!(tree.parent_of("a").unwrap().id, "f1");
        assert_eq!(tree.parent_of("b").unwrap().id, "root");
        assert!(tree.parent_of("root").is_none());
    }

    #[test]
    fn test_remove_descendant_takes_subtree() {
        let mut tree = sample();
        let removed = tree.remove_descendant("f1").unwrap();
        assert_eq!(removed.count(), 2);
        assert_eq!(tree.count(), 2);
        assert!(!tree.contains("a"));
    }

    #[test]
    fn test_ids_preorder() {
        let tree = sample();
        assert_eq!(tree.ids(), vec!["root", "f1", "a", "b"]);
    }

    #[test]
    fn test_json_shape() {
        let tree = sample();
        let json = serde_json::to_value(&tree).unwrap();

        assert_eq!(json["type"], "folder");
        assert_eq!(json["children"][0]["type"], "folder");
        assert_eq!(json["children"][1]["type"], "file");
        assert_eq!(json["children"][1]["content"], "");
        assert!(json["children"][1].get("children").is_none());
        assert!(json.get("content").is_none());
    }

    #[test]
    fn test_missing_content_and_children_default() {
        let json = r#"{"id":"root","name":"root","type":"folder","children":[
            {"id":"x","name":"x.md","type":"file"},
            {"id":"y","name":"Y","type":"folder"}
        ]}"#;
        let tree: TreeNode = serde_json::from_str(json).unwrap();

        assert_eq!(tree.find("x").unwrap().content(), Some(""));
        assert_eq!(tree.find("y").unwrap().children().map(|c| c.len()), Some(0));
    }
}
