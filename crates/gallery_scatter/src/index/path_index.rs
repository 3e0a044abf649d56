//! Ordered package index answering windowed, orientation-filtered path queries.
//!
//! Packages form a logical ring visited round-robin from package 0. A query
//! for `size` paths starting at logical offset `start` skips whole packages
//! without descending when their cached count is covered by the remaining
//! skip, and wraps around the ring when the corpus is smaller than the
//! requested window. Traversal order inside a package is the tree's natural
//! child order; both orders are fixed across calls so that independently
//! running peers observe the same logical sequence.
use tracing::debug;

use crate::index::node::PackageNode;
use crate::index::Orientation;

/// One discovered content package: a named root with cached per-orientation
/// counts computed bottom-up once at construction.
#[derive(Debug, Clone)]
struct Package {
    name: String,
    children: Vec<PackageNode>,
    landscape: usize,
    portrait: usize,
    square: usize,
}

impl Package {
    fn new(name: String, children: Vec<PackageNode>) -> Self {
        let mut package = Self {
            name,
            children,
            landscape: 0,
            portrait: 0,
            square: 0,
        };
        package.landscape = package.count_children(Orientation::LANDSCAPE);
        package.portrait = package.count_children(Orientation::PORTRAIT);
        package.square = package.count_children(Orientation::SQUARE);
        package
    }

    fn count_children(&self, mask: Orientation) -> usize {
        self.children
            .iter()
            .map(|child| child.count_matching(mask))
            .sum()
    }

    fn count(&self, mask: Orientation) -> usize {
        let mut count = 0;
        if mask.intersects(Orientation::LANDSCAPE) {
            count += self.landscape;
        }
        if mask.intersects(Orientation::PORTRAIT) {
            count += self.portrait;
        }
        if mask.intersects(Orientation::SQUARE) {
            count += self.square;
        }
        count
    }

    /// Append up to `take` matching leaf paths, skipping the first `skip`
    /// matches, and return the remaining `(skip, take)` budget.
    fn collect_paths(
        &self,
        mask: Orientation,
        mut skip: usize,
        mut take: usize,
        prefix: &str,
        out: &mut Vec<String>,
    ) -> (usize, usize) {
        let base = format!("{prefix}/{}", self.name);
        for child in &self.children {
            if take == 0 {
                break;
            }
            (skip, take) = collect_node(child, mask, skip, take, &base, out);
        }
        (skip, take)
    }
}

fn collect_node(
    node: &PackageNode,
    mask: Orientation,
    mut skip: usize,
    mut take: usize,
    prefix: &str,
    out: &mut Vec<String>,
) -> (usize, usize) {
    if take == 0 {
        return (skip, take);
    }
    match node {
        PackageNode::Image(record) => {
            if record.orientation().intersects(mask) {
                if skip > 0 {
                    skip -= 1;
                } else {
                    out.push(format!("{prefix}/{}", record.name));
                    take -= 1;
                }
            }
        }
        PackageNode::Dir { name, children } => {
            let base = format!("{prefix}/{name}");
            for child in children {
                if take == 0 {
                    break;
                }
                (skip, take) = collect_node(child, mask, skip, take, &base, out);
            }
        }
    }
    (skip, take)
}

/// Index over every discovered package, rooted at one on-disk location.
///
/// Built once at startup and rebuilt on demand by constructing a fresh
/// index; packages are never mutated after insertion.
#[derive(Debug, Clone)]
pub struct PathIndex {
    root_path: String,
    packages: Vec<Package>,
}

impl PathIndex {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            packages: Vec::new(),
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Canonical location of a package's content directory under the root.
    pub fn package_root(&self, name: &str) -> String {
        format!("{}/{name}", self.root_path)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Register a discovered package. Insertion is idempotent per name:
    /// a second registration under the same name is a no-op. Packages with
    /// no matching leaves are still inserted and contribute zero counts.
    pub fn add_package(&mut self, name: impl Into<String>, children: Vec<PackageNode>) {
        let name = name.into();
        if self.packages.iter().any(|package| package.name == name) {
            debug!(package = %name, "package already registered, ignoring");
            return;
        }
        self.packages.push(Package::new(name, children));
    }

    /// Register a package straight from its discovered
    /// `(path, width, height)` records. See [`PackageNode::tree_from_records`].
    pub fn add_package_records(
        &mut self,
        name: impl Into<String>,
        records: impl IntoIterator<Item = (String, u32, u32)>,
    ) {
        self.add_package(name, PackageNode::tree_from_records(records));
    }

    /// Total number of indexed images matching `mask`, over all packages.
    pub fn total_count(&self, mask: Orientation) -> usize {
        self.packages
            .iter()
            .map(|package| package.count(mask))
            .sum()
    }

    /// Ordered window of up to `size` paths matching `mask`, starting at
    /// logical offset `start_index` on the package ring.
    ///
    /// When `size` exceeds the matching total the window wraps and entries
    /// repeat from the start; the iteration bound
    /// `ceil((start_index + size) / total) * package_count` guarantees
    /// termination. An empty corpus for `mask` yields an empty result.
    pub fn paths(&self, mask: Orientation, start_index: usize, size: usize) -> Vec<String> {
        let total = self.total_count(mask);
        if total == 0 || size == 0 {
            return Vec::new();
        }

        let mut skip = start_index;
        let mut take = size;
        let max_iterations = (start_index + size).div_ceil(total) * self.packages.len();

        let mut out = Vec::with_capacity(size);
        let mut package_index = 0;
        let mut iteration = 0;
        while take > 0 && iteration < max_iterations {
            let package = &self.packages[package_index];
            let package_count = package.count(mask);

            if skip >= package_count {
                skip -= package_count;
            } else {
                (skip, take) = package.collect_paths(mask, skip, take, &self.root_path, &mut out);
            }

            package_index = (package_index + 1) % self.packages.len();
            iteration += 1;
        }
        out
    }
}
