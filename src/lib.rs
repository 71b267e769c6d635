//! # Relaymap - Topology mapper for spanning-tree relay networks
//!
//! This library turns the stats XML document published by an IRC-style
//! relay daemon into an annotated topology tree and renders it for
//! visualization.
//!
//! ## Overview
//!
//! Relay networks are spanning trees: every server links to exactly one
//! uplink, and the daemon reports the resulting flat server list with
//! cumulative lag and user counts. Relaymap rebuilds the tree from that
//! flat list, re-roots it onto the best-connected hub for balanced
//! layouts, estimates per-node and per-link traffic, and emits the
//! result as a d3 node/link JSON graph, a weighted GraphViz DOT graph, a
//! PNG, or an indented text hierarchy.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `stats_parser`: decoder for the daemon's stats XML document
//! - `scrub`: name-based hub/leaf classification and label derivation
//! - `tree`: the topology engine (build, reroot, transit, traversal)
//! - `formatters`: d3 JSON and DOT/PNG output
//! - `config`: render configuration structures and YAML parsing
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use relaymap::config::RenderConfig;
//! use relaymap::formatters::build_dot;
//! use relaymap::{scrub, stats_parser, tree};
//!
//! let document = std::fs::read_to_string("stats.xml")?;
//! let mut records = stats_parser::parse_stats(&document)?;
//!
//! let config = RenderConfig::default();
//! scrub::scrub(&mut records, &config.scrub);
//!
//! let map = tree::assemble(&records);
//! print!("{}", build_dot(&map, config.display_all));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! The library uses `color_eyre` for error reporting with context.
//! Fallible public functions return `Result<T, color_eyre::eyre::Error>`;
//! components with a closed failure set (configuration validation,
//! GraphViz invocation) expose typed `thiserror` enums.
//!
//! The engine itself is a pure, bounded, deterministic computation: a
//! well-formed record list always produces a tree, and records whose
//! parent chain cannot be resolved are dropped with a logged warning
//! rather than an error.

pub mod config;
pub mod formatters;
pub mod scrub;
pub mod stats_parser;
pub mod tree;
