//! Reply trees assembled from a flat comment list.
//!
//! Comments live in one arena; the tree is an index-based adjacency map, so no
//! comment owns another.

use std::collections::HashMap;

use super::Comment;

/// Comments of one post indexed by reply relation.
#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
    index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl CommentThread {
    /// Index a flat list. Siblings keep input order. A reply whose parent is not
    /// in the list is promoted to a root, and so is the first member of a reply
    /// cycle, so every comment is reachable from some root.
    pub fn build(comments: Vec<Comment>) -> Self {
        let index: HashMap<String, usize> = comments
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let mut children = vec![Vec::new(); comments.len()];
        let mut parents = vec![None; comments.len()];
        let mut roots = Vec::new();

        for (i, comment) in comments.iter().enumerate() {
            let parent = comment
                .parent_comment_id
                .as_deref()
                .and_then(|id| index.get(id).copied())
                .filter(|&p| p != i);

            parents[i] = parent;
            match parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
        }

        let mut reached = vec![false; comments.len()];
        mark_reachable(&children, &roots, &mut reached);

        for i in 0..comments.len() {
            if reached[i] {
                continue;
            }
            tracing::warn!(
                comment_id = %comments[i].id,
                "Reply cycle in comment thread; treating comment as top-level"
            );
            if let Some(p) = parents[i] {
                children[p].retain(|&c| c != i);
            }
            roots.push(i);
            mark_reachable(&children, &[i], &mut reached);
        }
        roots.sort_unstable();

        Self {
            comments,
            index,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.index.get(id).map(|&i| &self.comments[i])
    }

    /// Top-level comments.
    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        self.roots.iter().map(|&i| &self.comments[i])
    }

    /// Direct replies to `id`. Empty for unknown ids.
    pub fn replies(&self, id: &str) -> impl Iterator<Item = &Comment> {
        self.index
            .get(id)
            .map(|&i| self.children[i].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.comments[i])
    }

    /// Depth-first walk yielding each comment with its nesting depth (roots are 0).
    pub fn walk(&self) -> Vec<(usize, &Comment)> {
        let mut out = Vec::with_capacity(self.comments.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&i| (0, i)).collect();
        let mut seen = vec![false; self.comments.len()];

        while let Some((depth, i)) = stack.pop() {
            if std::mem::replace(&mut seen[i], true) {
                continue;
            }
            out.push((depth, &self.comments[i]));
            stack.extend(self.children[i].iter().rev().map(|&c| (depth + 1, c)));
        }

        out
    }

    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }
}

fn mark_reachable(children: &[Vec<usize>], from: &[usize], reached: &mut [bool]) {
    let mut stack = from.to_vec();
    while let Some(i) = stack.pop() {
        if std::mem::replace(&mut reached[i], true) {
            continue;
        }
        stack.extend(children[i].iter().copied());
    }
}
