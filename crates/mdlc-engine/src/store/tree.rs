use std::collections::HashSet;

use crate::models::ids::{FILE_PREFIX, FOLDER_PREFIX};
use crate::models::{ItemType, NodeKind, ROOT_ID, TreeItem, TreeNode, new_id};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("No item with id {0}")]
    NotFound(String),
    #[error("{0} is not a folder")]
    NotAFolder(String),
    #[error("{0} is not a file")]
    NotAFile(String),
    #[error("The root folder cannot be moved or deleted")]
    RootIsFixed,
    #[error("Cannot move {0} into itself")]
    MoveIntoSelf(String),
    #[error("Cannot move {item} into its own descendant {target}")]
    MoveIntoDescendant { item: String, target: String },
    #[error("No file is open")]
    NoOpenFile,
    #[error("Tree root must be a folder with id \"root\", found {0}")]
    InvalidRoot(String),
    #[error("Id {0} appears more than once in the tree")]
    DuplicateId(String),
}

/// Check the structural invariants of a tree loaded from outside the store
pub fn validate_tree(tree: &TreeNode) -> Result<(), TreeError> {
    if tree.id != ROOT_ID || !tree.is_folder() {
        return Err(TreeError::InvalidRoot(tree.id.clone()));
    }

    let mut seen = HashSet::new();
    for id in tree.ids() {
        if !seen.insert(id) {
            return Err(TreeError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

/// Working copy of the file open in the editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorSession {
    current_file_id: Option<String>,
    current_content: String,
}

impl EditorSession {
    pub fn current_file_id(&self) -> Option<&str> {
        self.current_file_id.as_deref()
    }

    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    pub fn is_open(&self) -> bool {
        self.current_file_id.is_some()
    }
}

/// Owner of the file/folder hierarchy and the single editing session.
///
/// Every operation either succeeds completely or returns a [`TreeError`]
/// with the tree left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStore {
    tree: TreeNode,
    session: EditorSession,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore {
    /// A store holding just the empty root folder
    pub fn new() -> Self {
        Self {
            tree: TreeNode::root(),
            session: EditorSession::default(),
        }
    }

    pub fn from_tree(tree: TreeNode) -> Result<Self, TreeError> {
        validate_tree(&tree)?;
        Ok(Self {
            tree,
            session: EditorSession::default(),
        })
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Replace the whole hierarchy; any open file is closed
    pub fn load_tree(&mut self, tree: TreeNode) -> Result<(), TreeError> {
        validate_tree(&tree)?;
        self.tree = tree;
        self.session = EditorSession::default();
        Ok(())
    }

    pub fn find_node_by_id(&self, id: &str) -> Option<&TreeNode> {
        self.tree.find(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&TreeNode> {
        self.tree.parent_of(id)
    }

    /// Whether `candidate` sits strictly below `ancestor`
    pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
        ancestor != candidate
            && self
                .tree
                .find(ancestor)
                .is_some_and(|node| node.contains(candidate))
    }

    /// Append a new file or folder to `parent_id` and return its id
    pub fn create_item(
        &mut self,
        item_type: ItemType,
        name: &str,
        parent_id: &str,
    ) -> Result<String, TreeError> {
        let parent = self
            .tree
            .find_mut(parent_id)
            .ok_or_else(|| TreeError::NotFound(parent_id.to_string()))?;
        let children = parent
            .children_mut()
            .ok_or_else(|| TreeError::NotAFolder(parent_id.to_string()))?;

        let node = match item_type {
            ItemType::File => TreeNode::new_file(new_id(FILE_PREFIX), name.to_string()),
            ItemType::Folder => TreeNode::new_folder(new_id(FOLDER_PREFIX), name.to_string()),
        };
        let id = node.id.clone();
        children.push(node);

        log::debug!("Created {item_type:?} {id} under {parent_id}");
        Ok(id)
    }

    /// Overwrite a file's stored content directly, bypassing the session
    pub fn set_file_content(&mut self, id: &str, content: String) -> Result<(), TreeError> {
        let node = self
            .tree
            .find_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let NodeKind::File { content: stored } = &mut node.kind else {
            return Err(TreeError::NotAFile(id.to_string()));
        };

        if self.session.current_file_id.as_deref() == Some(id) {
            self.session.current_content.clone_from(&content);
        }
        *stored = content;
        Ok(())
    }

    pub fn rename_item(&mut self, id: &str, new_name: &str) -> Result<(), TreeError> {
        let node = self
            .tree
            .find_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        node.name = new_name.to_string();
        Ok(())
    }

    /// Remove `id` with its whole subtree and return what was removed.
    ///
    /// Closes the editor when the open file was part of the removed subtree.
    pub fn delete_item(&mut self, id: &str) -> Result<TreeNode, TreeError> {
        if id == ROOT_ID {
            return Err(TreeError::RootIsFixed);
        }
        let removed = self
            .tree
            .remove_descendant(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;

        let open_file_removed = self
            .session
            .current_file_id
            .as_deref()
            .is_some_and(|open| removed.contains(open));
        if open_file_removed {
            self.close_file();
        }

        log::debug!("Deleted {id} ({} nodes)", removed.count());
        Ok(removed)
    }

    /// Move `item_id` to the end of `target_parent_id`'s children
    pub fn move_item(&mut self, item_id: &str, target_parent_id: &str) -> Result<(), TreeError> {
        if self.tree.find(item_id).is_none() {
            return Err(TreeError::NotFound(item_id.to_string()));
        }
        if item_id == ROOT_ID {
            return Err(TreeError::RootIsFixed);
        }
        let target = self
            .tree
            .find(target_parent_id)
            .ok_or_else(|| TreeError::NotFound(target_parent_id.to_string()))?;
        if !target.is_folder() {
            return Err(TreeError::NotAFolder(target_parent_id.to_string()));
        }
        if item_id == target_parent_id {
            return Err(TreeError::MoveIntoSelf(item_id.to_string()));
        }
        if self.is_descendant(item_id, target_parent_id) {
            return Err(TreeError::MoveIntoDescendant {
                item: item_id.to_string(),
                target: target_parent_id.to_string(),
            });
        }

        // The target is outside the item's subtree, so it survives the detach.
        let item = self
            .tree
            .remove_descendant(item_id)
            .ok_or_else(|| TreeError::NotFound(item_id.to_string()))?;
        match self
            .tree
            .find_mut(target_parent_id)
            .and_then(TreeNode::children_mut)
        {
            Some(children) => children.push(item),
            None => return Err(TreeError::NotFound(target_parent_id.to_string())),
        }

        log::debug!("Moved {item_id} into {target_parent_id}");
        Ok(())
    }

    /// Start editing the file `id`
    pub fn open_file(&mut self, id: &str) -> Result<(), TreeError> {
        let node = self
            .tree
            .find(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let content = node
            .content()
            .ok_or_else(|| TreeError::NotAFile(id.to_string()))?;

        self.session = EditorSession {
            current_file_id: Some(id.to_string()),
            current_content: content.to_string(),
        };
        Ok(())
    }

    /// Replace the working copy and mirror it into the open file's node
    pub fn update_file_content(&mut self, content: &str) -> Result<(), TreeError> {
        let id = self
            .session
            .current_file_id
            .clone()
            .ok_or(TreeError::NoOpenFile)?;
        let node = self
            .tree
            .find_mut(&id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        let NodeKind::File { content: stored } = &mut node.kind else {
            return Err(TreeError::NotAFile(id));
        };

        *stored = content.to_string();
        self.session.current_content = content.to_string();
        Ok(())
    }

    pub fn close_file(&mut self) {
        self.session = EditorSession::default();
    }

    /// Commit the working copy into the open file; nothing to do when closed
    pub fn save_current_file(&mut self) -> Result<(), TreeError> {
        let Some(id) = self.session.current_file_id.clone() else {
            return Ok(());
        };
        let node = self
            .tree
            .find_mut(&id)
            .ok_or_else(|| TreeError::NotFound(id.clone()))?;
        match &mut node.kind {
            NodeKind::File { content } => {
                content.clone_from(&self.session.current_content);
                Ok(())
            }
            NodeKind::Folder { .. } => Err(TreeError::NotAFile(id)),
        }
    }

    /// Node behind the open session, if any
    pub fn current_file(&self) -> Option<&TreeNode> {
        self.session
            .current_file_id
            .as_deref()
            .and_then(|id| self.tree.find(id))
    }

    /// Flatten the tree for list display.
    ///
    /// The root is always expanded; other folders only when listed in
    /// `expanded`. Within a folder, sub-folders come before files and each
    /// group is sorted case-insensitively. Stored child order is untouched.
    pub fn visible_items(&self, expanded: &HashSet<String>) -> Vec<TreeItem> {
        let mut items = Vec::new();
        push_visible(&self.tree, 0, expanded, &mut items);
        items
    }
}

fn push_visible(
    node: &TreeNode,
    depth: usize,
    expanded: &HashSet<String>,
    items: &mut Vec<TreeItem>,
) {
    let is_expanded = node.id == ROOT_ID || expanded.contains(&node.id);
    items.push(TreeItem {
        id: node.id.clone(),
        name: node.name.clone(),
        is_folder: node.is_folder(),
        is_expanded,
        depth,
    });

    let Some(children) = node.children() else {
        return;
    };
    if !is_expanded {
        return;
    }

    let mut sorted: Vec<_> = children.iter().collect();
    sorted.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    for child in sorted {
        push_visible(child, depth + 1, expanded, items);
    }
}
