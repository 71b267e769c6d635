//! Weighted GraphViz DOT output, plus PNG rendering through an external
//! `dot` binary.

use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};

use crate::tree::{edges, flatten, Position, Tree};

/// Errors from rendering through the external GraphViz binary
#[derive(Debug, thiserror::Error)]
pub enum DotError {
    #[error("Could not launch GraphViz binary {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not stream DOT source to {binary}: {source}")]
    Stream {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("GraphViz binary {binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Quote a DOT identifier. GraphViz does not accept bare names
/// containing a dot, so every name is quoted.
fn esc(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Node size from the user count; sublinear so big leaves don't drown
/// the layout
fn users_to_weight(users: u64) -> f64 {
    ((users + 1) as f64).sqrt() / 10.0
}

/// Edge length from the link lag
fn lag_to_len(lag: i64) -> f64 {
    ((lag + 1) as f64).log10()
}

/// Render the annotated tree as an undirected weighted DOT graph.
///
/// Leaf and unknown nodes scale with their user count, hubs render as
/// fixed-size diamonds. With `display_all` off, unclassified servers
/// and links touching them are omitted.
pub fn build_dot(tree: &Tree, display_all: bool) -> String {
    let records = flatten(tree);

    let mut dot = String::new();
    dot.push_str("graph relaymap {\n");

    for record in &records {
        if !display_all && record.position == Position::Unknown {
            continue;
        }
        if record.position == Position::Hub {
            dot.push_str(&format!(
                "    {} [label={}, tooltip={}, shape=diamond, fixedsize=shape, width=1, height=1];\n",
                esc(&record.name),
                esc(&record.label),
                esc(&record.description),
            ));
        } else {
            let weight = users_to_weight(record.users);
            dot.push_str(&format!(
                "    {} [label={}, tooltip={}, fixedsize=shape, width={}, height={}];\n",
                esc(&record.name),
                esc(&record.label),
                esc(&record.description),
                weight,
                weight,
            ));
        }
    }

    dot.push('\n');

    let unknown: Vec<&str> = records
        .iter()
        .filter(|r| r.position == Position::Unknown)
        .map(|r| r.name.as_str())
        .collect();

    for edge in edges(tree) {
        if !display_all
            && (unknown.contains(&edge.source.as_str()) || unknown.contains(&edge.target.as_str()))
        {
            continue;
        }
        dot.push_str(&format!(
            "    {} -- {} [len={}, tooltip={}, penwidth={}];\n",
            esc(&edge.source),
            esc(&edge.target),
            lag_to_len(edge.lag),
            esc(&edge.lag.to_string()),
            users_to_weight(edge.transit),
        ));
    }

    dot.push_str("}\n");
    dot
}

/// Pipe DOT source through the external GraphViz binary and return the
/// produced PNG bytes.
pub fn render_png(dot_source: &str, dot_binary: &str) -> Result<Vec<u8>, DotError> {
    let mut child = Command::new(dot_binary)
        .arg("-Tpng")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| DotError::Launch {
            binary: dot_binary.to_string(),
            source,
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(dot_source.as_bytes())
            .map_err(|source| DotError::Stream {
                binary: dot_binary.to_string(),
                source,
            })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|source| DotError::Stream {
            binary: dot_binary.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(DotError::Failed {
            binary: dot_binary.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{assemble, ServerRecord};

    fn record(name: &str, parent: &str, lag: i64, users: u64, position: Position) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            label: name.to_string(),
            parent_name: parent.to_string(),
            lag,
            users,
            position,
            ..ServerRecord::default()
        }
    }

    fn example_tree() -> Tree {
        assemble(&[
            record("hub.x", "", 0, 10, Position::Hub),
            record("irc.y", "hub.x", 4, 5, Position::Leaf),
            record("odd.z", "hub.x", 2, 1, Position::Unknown),
        ])
    }

    #[test]
    fn test_dot_nodes_and_edges() {
        let dot = build_dot(&example_tree(), true);

        assert!(dot.starts_with("graph relaymap {"));
        assert!(dot.trim_end().ends_with('}'));
        // Hubs are diamonds, leaves scale with their user count.
        assert!(dot.contains("\"hub.x\" [label=\"hub.x\", tooltip=\"\", shape=diamond"));
        assert!(dot.contains("\"irc.y\""));
        assert!(dot.contains("\"hub.x\" -- \"irc.y\""));
        assert!(dot.contains("tooltip=\"4\""));
    }

    #[test]
    fn test_dot_filters_unknown_by_default() {
        let dot = build_dot(&example_tree(), false);
        assert!(!dot.contains("odd.z"));
        assert!(dot.contains("irc.y"));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let mut server = record("hub.x", "", 0, 1, Position::Hub);
        server.description = "say \"hi\"".to_string();
        let dot = build_dot(&assemble(&[server]), true);
        assert!(dot.contains("tooltip=\"say \\\"hi\\\"\""));
    }

    #[test]
    fn test_users_to_weight_is_sublinear() {
        assert!(users_to_weight(0) > 0.0);
        assert!(users_to_weight(100) < users_to_weight(400));
        assert!((users_to_weight(99) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_render_png_reports_missing_binary() {
        let err = render_png("graph g {}\n", "/nonexistent/graphviz-dot").unwrap_err();
        assert!(matches!(err, DotError::Launch { .. }));
    }

    fn fake_binary(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-dot");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_render_png_pipes_source_through_binary() {
        // A script echoing stdin stands in for GraphViz: the plumbing
        // is what's under test, not the rasterizer.
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_binary(&dir, "cat");

        let bytes = render_png("graph g {}\n", &binary).unwrap();
        assert_eq!(bytes, b"graph g {}\n");
    }

    #[test]
    fn test_render_png_reports_failing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_binary(&dir, "cat >/dev/null\necho boom >&2\nexit 3");

        let err = render_png("graph g {}\n", &binary).unwrap_err();
        match err {
            DotError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
