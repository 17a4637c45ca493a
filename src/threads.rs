//! Assembly of flat comment rows into reply trees

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{Comment, CommentWithAuthor, RecordId};

/// Anything that can sit in a reply tree
pub trait ThreadItem {
    fn id(&self) -> &RecordId;
    fn parent_id(&self) -> Option<&RecordId>;
    /// `None` sorts below every date, so undated items come out oldest
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl ThreadItem for Comment {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        self.parent_id.as_ref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl ThreadItem for CommentWithAuthor {
    fn id(&self) -> &RecordId {
        &self.comment.id
    }

    fn parent_id(&self) -> Option<&RecordId> {
        self.comment.parent_id.as_ref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.comment.created_at
    }
}

/// A comment and its direct replies, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode<T> {
    pub item: T,
    pub replies: Vec<CommentNode<T>>,
}

impl<T> CommentNode<T> {
    /// This node plus everything below it
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::len).sum::<usize>()
    }

    pub fn is_leaf(&self) -> bool {
        self.replies.is_empty()
    }

    /// Depth-first walk yielding each item with its nesting level
    pub fn walk<'a>(&'a self, depth: usize, visit: &mut dyn FnMut(&'a T, usize)) {
        visit(&self.item, depth);
        for reply in &self.replies {
            reply.walk(depth + 1, visit);
        }
    }
}

/// The root comments of one product
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread<T> {
    pub roots: Vec<CommentNode<T>>,
}

impl<T: ThreadItem + Clone> CommentThread<T> {
    /// Build the forest. Replies whose parent is missing from `items` become
    /// roots. Every sibling list is sorted newest first; ties keep input order.
    pub fn build(items: &[T]) -> Self {
        let mut seen = HashSet::new();
        let items: Vec<&T> = items.iter().filter(|item| seen.insert(item.id())).collect();

        let index: HashMap<&RecordId, usize> = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id(), position))
            .collect();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
        let mut roots = Vec::new();
        for (position, item) in items.iter().enumerate() {
            match item
                .parent_id()
                .and_then(|parent| index.get(parent))
                .filter(|&&parent| parent != position)
            {
                Some(&parent) => children[parent].push(position),
                None => roots.push(position),
            }
        }

        let mut placed = vec![false; items.len()];
        let mut nodes = assemble(&items, &children, roots, &mut placed);

        // Members of a parent cycle are unreachable from any root; lift them
        // to the top so nothing is dropped.
        for position in 0..items.len() {
            if !placed[position] {
                nodes.extend(assemble(&items, &children, vec![position], &mut placed));
            }
        }
        sort_newest_first(&mut nodes);

        Self { roots: nodes }
    }
}

impl<T> CommentThread<T> {
    /// Every node in the forest
    pub fn total(&self) -> usize {
        self.roots.iter().map(CommentNode::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first walk over all roots
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a T, usize)) {
        for root in &self.roots {
            root.walk(0, &mut visit);
        }
    }
}

fn assemble<T: ThreadItem + Clone>(
    items: &[&T],
    children: &[Vec<usize>],
    positions: Vec<usize>,
    placed: &mut [bool],
) -> Vec<CommentNode<T>> {
    let mut nodes = Vec::with_capacity(positions.len());
    for position in positions {
        if placed[position] {
            continue;
        }
        placed[position] = true;
        let replies = assemble(items, children, children[position].clone(), placed);
        nodes.push(CommentNode {
            item: items[position].clone(),
            replies,
        });
    }
    sort_newest_first(&mut nodes);
    nodes
}

fn sort_newest_first<T: ThreadItem>(nodes: &mut [CommentNode<T>]) {
    nodes.sort_by(|a, b| b.item.created_at().cmp(&a.item.created_at()));
}

/// Shorthand for `CommentThread::build(items).roots`
pub fn build_comment_tree<T: ThreadItem + Clone>(items: &[T]) -> Vec<CommentNode<T>> {
    CommentThread::build(items).roots
}

/// `id` and the ids of every transitive reply to it
pub fn descendants_of<T: ThreadItem>(items: &[T], id: &RecordId) -> HashSet<RecordId> {
    let mut found = HashSet::new();
    let mut pending = vec![id.clone()];
    while let Some(current) = pending.pop() {
        if !found.insert(current.clone()) {
            continue;
        }
        pending.extend(
            items
                .iter()
                .filter(|item| item.parent_id() == Some(&current))
                .map(|item| item.id().clone()),
        );
    }
    found
}

/// Flat copy sorted newest first
pub fn latest_first<T: ThreadItem + Clone>(items: &[T]) -> Vec<T> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        parent: Option<RecordId>,
        at: Option<DateTime<Utc>>,
    }

    impl ThreadItem for Row {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn parent_id(&self) -> Option<&RecordId> {
            self.parent.as_ref()
        }

        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.at
        }
    }

    fn row(id: &str, parent: Option<&str>, secs: Option<i64>) -> Row {
        Row {
            id: id.into(),
            parent: parent.map(RecordId::from),
            at: secs.map(|secs| Utc.timestamp_opt(secs, 0).unwrap()),
        }
    }

    fn ids<T: ThreadItem>(nodes: &[CommentNode<T>]) -> Vec<String> {
        nodes.iter().map(|node| node.item.id().to_string()).collect()
    }

    #[test]
    fn without_parents_every_comment_is_a_root() {
        let rows = vec![row("a", None, Some(1)), row("b", None, Some(2))];
        let roots = build_comment_tree(&rows);
        assert_eq!(ids(&roots), vec!["b", "a"]);
        assert!(roots.iter().all(CommentNode::is_leaf));
    }

    #[test]
    fn replies_nest_once_and_orphans_become_roots() {
        let rows = vec![
            row("a", None, Some(1)),
            row("b", Some("a"), Some(2)),
            row("c", Some("z"), Some(3)),
        ];
        let thread = CommentThread::build(&rows);
        assert_eq!(ids(&thread.roots), vec!["c", "a"]);
        assert_eq!(ids(&thread.roots[1].replies), vec!["b"]);
        assert_eq!(thread.total(), 3);
    }

    #[test]
    fn siblings_are_sorted_newest_first_at_every_level() {
        let rows = vec![
            row("root", None, Some(0)),
            row("r1", Some("root"), Some(1)),
            row("r3", Some("root"), Some(3)),
            row("r2", Some("root"), Some(2)),
            row("r2-old", Some("r2"), Some(5)),
            row("r2-new", Some("r2"), Some(9)),
        ];
        let roots = build_comment_tree(&rows);
        assert_eq!(ids(&roots[0].replies), vec!["r3", "r2", "r1"]);
        assert_eq!(ids(&roots[0].replies[1].replies), vec!["r2-new", "r2-old"]);
        assert_eq!(roots[0].len(), 6);
    }

    #[test]
    fn undated_comments_sort_below_dates_before_1970() {
        let rows = vec![row("undated", None, None), row("old", None, Some(-14_182_940))];
        assert_eq!(ids(&build_comment_tree(&rows)), vec!["old", "undated"]);
        assert_eq!(
            latest_first(&rows).iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
            vec!["old", "undated"]
        );
    }

    #[test]
    fn missing_timestamps_sort_last_and_ties_keep_input_order() {
        let rows = vec![
            row("undated", None, None),
            row("first", None, Some(10)),
            row("second", None, Some(10)),
        ];
        assert_eq!(ids(&build_comment_tree(&rows)), vec!["first", "second", "undated"]);
    }

    #[test]
    fn building_twice_gives_the_same_tree() {
        let rows = vec![
            row("a", None, Some(1)),
            row("b", Some("a"), Some(2)),
            row("c", Some("a"), Some(2)),
        ];
        assert_eq!(build_comment_tree(&rows), build_comment_tree(&rows));
    }

    #[test]
    fn self_parents_and_cycles_are_kept() {
        let rows = vec![
            row("self", Some("self"), Some(1)),
            row("x", Some("y"), Some(2)),
            row("y", Some("x"), Some(3)),
        ];
        let thread = CommentThread::build(&rows);
        assert_eq!(thread.total(), 3);
        assert_eq!(ids(&thread.roots), vec!["x", "self"]);
        assert_eq!(ids(&thread.roots[0].replies), vec!["y"]);
    }

    #[test]
    fn descendants_cover_the_whole_subtree() {
        let rows = vec![
            row("a", None, Some(1)),
            row("b", Some("a"), Some(2)),
            row("c", Some("b"), Some(3)),
            row("d", None, Some(4)),
        ];
        let gone = descendants_of(&rows, &RecordId::from("a"));
        assert_eq!(gone.len(), 3);
        assert!(!gone.contains(&RecordId::from("d")));
    }

    #[test]
    fn latest_first_flattens_by_time() {
        let rows = vec![row("a", None, Some(1)), row("b", Some("a"), Some(2))];
        let flat = latest_first(&rows);
        assert_eq!(flat[0].id.as_str(), "b");
    }

    #[test]
    fn walk_reports_depth() {
        let rows = vec![row("a", None, Some(1)), row("b", Some("a"), Some(2))];
        let thread = CommentThread::build(&rows);
        let mut seen = Vec::new();
        thread.walk(|item, depth| seen.push((item.id.to_string(), depth)));
        assert_eq!(seen, vec![("a".to_string(), 0), ("b".to_string(), 1)]);
    }
}
