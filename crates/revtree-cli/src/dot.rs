//! Graphviz DOT export for trees and proof paths

use revtree_core::{Digest, MerkleTree, NodeId, Proof, Side};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Hex characters shown per node label
pub const LABEL_HEX_CHARS: usize = 16;

const ROOT_COLOR: &str = "#FFD700";
const LEAF_COLOR: &str = "#98FB98";
const INTERNAL_COLOR: &str = "#87CEEB";

fn label(digest: &Digest) -> String {
    format!("{}...", digest.short(LABEL_HEX_CHARS))
}

/// Write the tree breadth-first down to `max_levels` (root is level 0)
pub fn write_tree_dot<W: Write>(
    tree: &MerkleTree,
    max_levels: usize,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "digraph MerkleTree {{")?;
    writeln!(out, "node [shape=box, style=filled, fontname=\"Courier\"];")?;

    if let Some(root) = tree.root() {
        let mut counter = 0usize;
        let mut fresh_name = || {
            let name = format!("node{}", counter);
            counter += 1;
            name
        };

        let mut queue: VecDeque<(NodeId, String, usize)> = VecDeque::new();
        queue.push_back((root, fresh_name(), 0));

        while let Some((id, node_name, level)) = queue.pop_front() {
            let node = tree.node(id);
            let color = if id == root {
                ROOT_COLOR
            } else if node.is_leaf() {
                LEAF_COLOR
            } else {
                INTERNAL_COLOR
            };
            writeln!(
                out,
                "{} [label=\"{}\", fillcolor=\"{}\"];",
                node_name,
                label(node.digest()),
                color
            )?;

            if level < max_levels {
                for child in node.children() {
                    let child_name = fresh_name();
                    writeln!(out, "{} -> {};", node_name, child_name)?;
                    queue.push_back((child, child_name, level + 1));
                }
            }
        }
    }

    writeln!(out, "}}")
}

/// Write a proof path from `leaf` to `root`, with the path edges in red
pub fn write_proof_dot<W: Write>(
    leaf: &Digest,
    proof: &Proof,
    root: &Digest,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "digraph MerkleProofTree {{")?;
    writeln!(out, "rankdir=TB;")?;
    writeln!(out, "node [shape=box, style=filled, fontname=\"Courier\"];")?;
    writeln!(out, "leaf [label=\"Leaf\\n{}\", fillcolor=\"#FFA07A\"];", label(leaf))?;

    let mut prev = String::from("leaf");
    for (i, step) in proof.iter().enumerate() {
        let sibling = format!("s{}", i);
        let parent = format!("p{}", i);

        writeln!(
            out,
            "{} [label=\"Sibling\\n{}\", fillcolor=\"#B0E0E6\"];",
            sibling,
            label(&step.sibling)
        )?;
        writeln!(out, "{} [label=\"Parent {}\", fillcolor=\"#87CEFA\"];", parent, i)?;

        // Edge order follows operand order so dot lays siblings out left to right
        match step.side {
            Side::Left => {
                writeln!(out, "{} -> {} [penwidth=1];", sibling, parent)?;
                writeln!(out, "{} -> {} [penwidth=3, color=\"red\"];", prev, parent)?;
            }
            Side::Right => {
                writeln!(out, "{} -> {} [penwidth=3, color=\"red\"];", prev, parent)?;
                writeln!(out, "{} -> {} [penwidth=1];", sibling, parent)?;
            }
        }
        prev = parent;
    }

    writeln!(out, "{} -> root;", prev)?;
    writeln!(
        out,
        "root [label=\"Merkle Root\\n{}\", fillcolor=\"#90EE90\"];",
        label(root)
    )?;
    writeln!(out, "}}")
}

/// Render `dot_file` to a PNG next to it with Graphviz
///
/// Failures are logged and reported as `None`; rendering is never required.
pub fn render_png(dot_file: &Path) -> Option<PathBuf> {
    let png = dot_file.with_extension("png");
    match Command::new("dot")
        .arg("-Tpng")
        .arg(dot_file)
        .arg("-o")
        .arg(&png)
        .status()
    {
        Ok(status) if status.success() => {
            info!("rendered {}", png.display());
            Some(png)
        }
        Ok(status) => {
            warn!(%status, "graphviz failed to render {}", dot_file.display());
            None
        }
        Err(e) => {
            warn!(error = %e, "could not run graphviz `dot`");
            None
        }
    }
}
