use std::f64::consts::TAU;

use super::format::LinkTemplate;
use super::model::{GrantDataset, GrantRecord};

/// Ring labels, innermost first.
pub const HIERARCHY_LEVELS: [&str; 4] = ["Program", "Strategy", "Organization", "Project"];

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// One node of the program → strategy → organization → project tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SunburstNode {
    pub label: String,
    /// Sum of grant amounts beneath this node.
    pub value: f64,
    /// Reference links; only populated on project (leaf) nodes.
    pub links: Vec<String>,
    pub children: Vec<SunburstNode>,
}

impl SunburstNode {
    fn new(label: &str) -> Self {
        SunburstNode {
            label: label.to_string(),
            value: 0.0,
            links: Vec::new(),
            children: Vec::new(),
        }
    }

    fn insert(&mut self, path: &[&str], amount: f64, link: &str) {
        self.value += amount;
        let Some((head, rest)) = path.split_first() else {
            self.links.push(link.to_string());
            return;
        };
        let idx = match self.children.iter().position(|c| c.label == *head) {
            Some(idx) => idx,
            None => {
                self.children.push(SunburstNode::new(head));
                self.children.len() - 1
            }
        };
        self.children[idx].insert(rest, amount, link);
    }

    /// Largest segments first, ties broken by label.
    fn sort(&mut self) {
        self.children.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.label.cmp(&b.label))
        });
        for child in &mut self.children {
            child.sort();
        }
    }
}

/// Chart-ready hierarchy of a (filtered) dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SunburstTree {
    /// Program nodes.
    pub roots: Vec<SunburstNode>,
    pub total: f64,
}

impl SunburstTree {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn path_of(record: &GrantRecord) -> [&str; 4] {
    [
        &record.program,
        &record.strategy,
        &record.organization,
        &record.project_title,
    ]
}

/// Build the nested hierarchy, weighting each leaf by amount and attaching
/// the reference link generated from the record's request identifier.
pub fn build_hierarchy(dataset: &GrantDataset, links: &LinkTemplate) -> SunburstTree {
    let mut root = SunburstNode::new("");
    for record in dataset.records() {
        let link = links.url_for(&record.request_id);
        root.insert(&path_of(record), record.amount, &link);
    }
    root.sort();
    SunburstTree {
        total: root.value,
        roots: root.children,
    }
}

// ---------------------------------------------------------------------------
// Polar layout
// ---------------------------------------------------------------------------

/// An annular sector of the sunburst. Angles are radians in `[0, TAU]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SunburstSegment {
    /// Ring index, 0 = programs.
    pub depth: usize,
    pub start: f64,
    pub end: f64,
    pub label: String,
    pub value: f64,
    /// Labels from the program down to this segment.
    pub path: Vec<String>,
    pub links: Vec<String>,
}

impl SunburstSegment {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

/// Lay out every node as a sector whose sweep is proportional to its value.
pub fn layout(tree: &SunburstTree) -> Vec<SunburstSegment> {
    let mut segments = Vec::new();
    if tree.total <= 0.0 {
        return segments;
    }
    let mut path = Vec::new();
    place(&tree.roots, 0, 0.0, TAU / tree.total, &mut path, &mut segments);
    segments
}

fn place(
    nodes: &[SunburstNode],
    depth: usize,
    mut angle: f64,
    radians_per_unit: f64,
    path: &mut Vec<String>,
    out: &mut Vec<SunburstSegment>,
) {
    for node in nodes {
        let start = angle;
        let end = (start + node.value * radians_per_unit).min(TAU);
        path.push(node.label.clone());
        out.push(SunburstSegment {
            depth,
            start,
            end,
            label: node.label.clone(),
            value: node.value,
            path: path.clone(),
            links: node.links.clone(),
        });
        place(&node.children, depth + 1, start, radians_per_unit, path, out);
        path.pop();
        angle = end;
    }
}

/// The segment on ring `depth` covering `angle`, if any.
pub fn hit_test(
    segments: &[SunburstSegment],
    depth: usize,
    angle: f64,
) -> Option<&SunburstSegment> {
    let angle = angle.rem_euclid(TAU);
    segments
        .iter()
        .find(|s| s.depth == depth && s.start <= angle && angle < s.end)
}

/// Total amount per strategy, largest first.
pub fn amount_by_strategy(dataset: &GrantDataset) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for record in dataset.records() {
        match totals.iter().position(|(s, _)| *s == record.strategy) {
            Some(idx) => totals[idx].1 += record.amount,
            None => totals.push((record.strategy.clone(), record.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}
