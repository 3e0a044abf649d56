//! Package tree nodes: directories with ordered children and classified image leaves.
use tracing::warn;

use crate::index::Orientation;

/// A classified image discovered inside a package.
///
/// The `name` is the path segment of the file itself; the full path is
/// reconstructed during traversal from the ancestor directory names.
/// Immutable once classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl ImageRecord {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.width, self.height)
    }
}

/// One node of a package's content tree.
///
/// Child order is the order handed to [`PackageNode::dir`] and is never
/// re-sorted; traversal order must stay stable across peers for the draw
/// engine's determinism guarantee to hold.
#[derive(Debug, Clone)]
pub enum PackageNode {
    Dir {
        name: String,
        children: Vec<PackageNode>,
    },
    Image(ImageRecord),
}

impl PackageNode {
    pub fn dir(name: impl Into<String>, children: Vec<PackageNode>) -> Self {
        PackageNode::Dir {
            name: name.into(),
            children,
        }
    }

    pub fn image(name: impl Into<String>, width: u32, height: u32) -> Self {
        PackageNode::Image(ImageRecord::new(name, width, height))
    }

    pub fn name(&self) -> &str {
        match self {
            PackageNode::Dir { name, .. } => name,
            PackageNode::Image(record) => &record.name,
        }
    }

    /// Number of image leaves in this subtree, unfiltered.
    pub fn leaf_count(&self) -> usize {
        match self {
            PackageNode::Image(_) => 1,
            PackageNode::Dir { children, .. } => children.iter().map(PackageNode::leaf_count).sum(),
        }
    }

    /// Build a package content tree from discovered `(path, width, height)`
    /// records, as supplied once per package at (re)build time.
    ///
    /// Paths are `/`-separated relative to the package root. Record order is
    /// preserved: directories appear where first seen, files in discovery
    /// order. Records with an empty path are skipped with a warning.
    pub fn tree_from_records(
        records: impl IntoIterator<Item = (String, u32, u32)>,
    ) -> Vec<PackageNode> {
        let mut roots = Vec::new();
        for (path, width, height) in records {
            let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let Some(file) = segments.pop() else {
                warn!(%path, "discovered record has an empty path, skipping");
                continue;
            };
            insert_record(&mut roots, &segments, file, width, height);
        }
        roots
    }

    /// Number of image leaves in this subtree matching `mask`.
    pub fn count_matching(&self, mask: Orientation) -> usize {
        match self {
            PackageNode::Image(record) => usize::from(record.orientation().intersects(mask)),
            PackageNode::Dir { children, .. } => children
                .iter()
                .map(|child| child.count_matching(mask))
                .sum(),
        }
    }
}

fn insert_record(
    children: &mut Vec<PackageNode>,
    dirs: &[&str],
    file: &str,
    width: u32,
    height: u32,
) {
    match dirs.split_first() {
        None => children.push(PackageNode::image(file, width, height)),
        Some((head, rest)) => {
            let found = children
                .iter()
                .position(|child| matches!(child, PackageNode::Dir { name, .. } if name == head));
            let index = match found {
                Some(index) => index,
                None => {
                    children.push(PackageNode::dir(*head, Vec::new()));
                    children.len() - 1
                }
            };
            if let PackageNode::Dir { children: sub, .. } = &mut children[index] {
                insert_record(sub, rest, file, width, height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> PackageNode {
        PackageNode::dir(
            "pack",
            vec![
                PackageNode::image("wide.png", 1920, 1080),
                PackageNode::dir(
                    "sub",
                    vec![
                        PackageNode::image("tall.png", 700, 1000),
                        PackageNode::image("square.png", 512, 512),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn leaf_count_ignores_orientation() {
        assert_eq!(sample_tree().leaf_count(), 3);
    }

    #[test]
    fn tree_from_records_preserves_discovery_order() {
        let records = vec![
            ("wide.png".to_owned(), 1920, 1080),
            ("sub/tall.png".to_owned(), 700, 1000),
            ("sub/deep/square.png".to_owned(), 512, 512),
            ("sub/tall2.png".to_owned(), 700, 1000),
            ("".to_owned(), 10, 10),
        ];
        let children = PackageNode::tree_from_records(records);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name(), "wide.png");
        assert_eq!(children[1].name(), "sub");
        match &children[1] {
            PackageNode::Dir { children: sub, .. } => {
                assert_eq!(sub.len(), 3);
                assert_eq!(sub[0].name(), "tall.png");
                assert_eq!(sub[1].name(), "deep");
                assert_eq!(sub[2].name(), "tall2.png");
            }
            other => panic!("expected directory, got {other:?}"),
        }

        let total: usize = children.iter().map(PackageNode::leaf_count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn count_matching_filters_by_mask() {
        let tree = sample_tree();
        assert_eq!(tree.count_matching(Orientation::LANDSCAPE), 1);
        assert_eq!(tree.count_matching(Orientation::PORTRAIT), 1);
        assert_eq!(tree.count_matching(Orientation::SQUARE), 1);
        assert_eq!(
            tree.count_matching(Orientation::PORTRAIT | Orientation::SQUARE),
            2
        );
        assert_eq!(tree.count_matching(Orientation::all()), 3);
        assert_eq!(tree.count_matching(Orientation::empty()), 0);
    }
}
