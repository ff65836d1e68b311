//! Integration tests for the wikigraph extraction pipeline.
//!
//! These cover the complete data flow from (optionally BZ2-compressed) XML
//! input through graph construction, redirect finalization, and the two
//! output files. Tests are organized into logical sections:
//!
//! - **Parser Tests** -- XML parsing, BZ2 decompression, page classification
//! - **Graph Tests** -- ID assignment order, deferred redirect rewriting
//! - **Output Tests** -- edge-list contents, node-title round-trip
//!
//! # Test Strategy
//!
//! Most tests share a `sample_xml()` fixture representing a minimal
//! Wikipedia dump with two articles and two redirects, one of each redirect
//! flavor: a redirect whose title was already linked to (deferred, rewritten
//! at finalization) and one referencing an unseen target (registered on the
//! spot). Each test writes into its own `TempDir`, and file contents are
//! compared as sorted line sets because adjacency-map iteration order is
//! unspecified.

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::fs;
use std::io::Write;
use tempfile::{Builder, NamedTempFile, TempDir};
use wikigraph::graph::build_graph;
use wikigraph::models::PageKind;
use wikigraph::output::{read_node_titles, write_edges, write_node_titles};
use wikigraph::parser::DumpReader;

/// Helper: write `xml` to a temp file with the given suffix, optionally
/// BZ2-compressing it first. The suffix drives the reader's decompression
/// detection, so compressed fixtures must end in `.bz2`.
fn create_dump(xml: &str, suffix: &str, compress: bool) -> NamedTempFile {
    let mut tmp = Builder::new().suffix(suffix).tempfile().unwrap();
    if compress {
        let mut encoder = BzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(xml.as_bytes()).unwrap();
        tmp.write_all(&encoder.finish().unwrap()).unwrap();
    } else {
        tmp.write_all(xml.as_bytes()).unwrap();
    }
    tmp.flush().unwrap();
    tmp
}

/// Sample dump: two articles, a redirect whose title is already linked to
/// (defers to finalization), and a redirect to a title nothing has seen yet.
///
/// Expected ID assignment, in stream order:
/// 0 = Rust (programming language), 1 = Python (programming language),
/// 2 = C++, 3 = Rust, 4 = Cargo, 5 = Cargo (package manager).
/// Finalization rewrites 3 -> 0 and 4 -> 5.
fn sample_xml() -> &'static str {
    r#"<mediawiki>
        <page>
            <title>Rust (programming language)</title>
            <ns>0</ns>
            <id>1</id>
            <revision>
                <id>100</id>
                <text>Rust is a systems language. See [[Python (programming language)]] and [[C++|C plus plus]].
Tooling lives at [[Rust]] and [[Cargo]]. Compare [[Python (programming language)]] again.</text>
            </revision>
        </page>
        <page>
            <title>Python (programming language)</title>
            <ns>0</ns>
            <id>2</id>
            <revision>
                <id>200</id>
                <text>Related: [[Rust (programming language)]].</text>
            </revision>
        </page>
        <page>
            <title>Rust</title>
            <ns>0</ns>
            <id>3</id>
            <redirect title="Rust (programming language)" />
            <revision>
                <id>300</id>
                <text>#REDIRECT [[Rust (programming language)]]</text>
            </revision>
        </page>
        <page>
            <title>Cargo</title>
            <ns>0</ns>
            <id>4</id>
            <redirect title="Cargo (package manager)" />
        </page>
    </mediawiki>"#
}

// ---------------------------------------------------------------------------
// Parser Tests
// ---------------------------------------------------------------------------

#[test]
fn parses_plain_xml_dump() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let pages: Vec<_> = DumpReader::open(dump.path().to_str().unwrap())
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(pages.len(), 4);
    assert_eq!(pages[0].title, "Rust (programming language)");
    assert!(matches!(pages[0].kind, PageKind::Article(_)));
    assert_eq!(
        pages[2].kind,
        PageKind::Redirect("Rust (programming language)".to_string())
    );
}

#[test]
fn parses_bz2_compressed_dump() {
    let dump = create_dump(sample_xml(), ".xml.bz2", true);
    let pages: Vec<_> = DumpReader::open(dump.path().to_str().unwrap())
        .unwrap()
        .collect::<anyhow::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(pages.len(), 4);
    assert_eq!(pages[3].title, "Cargo");
    assert_eq!(
        pages[3].kind,
        PageKind::Redirect("Cargo (package manager)".to_string())
    );
}

#[test]
fn redirect_page_text_body_is_not_an_article() {
    // The "Rust" redirect page carries a #REDIRECT text body; it must not
    // produce an adjacency list.
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    assert_eq!(graph.stats.articles, 2);
    assert_eq!(graph.stats.redirects, 2);
    assert_eq!(graph.adjacency.len(), 2);
}

#[test]
fn malformed_dump_aborts() {
    let dump = create_dump("<mediawiki><page><title>X</wrong>", ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    assert!(build_graph(reader, None).is_err());
}

#[test]
fn missing_dump_file_fails_to_open() {
    assert!(DumpReader::open("/nonexistent/dump.xml").is_err());
}

// ---------------------------------------------------------------------------
// Graph Tests
// ---------------------------------------------------------------------------

#[test]
fn ids_assigned_in_first_seen_order() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    assert_eq!(graph.registry.id_of("Rust (programming language)"), Some(0));
    assert_eq!(graph.registry.id_of("Python (programming language)"), Some(1));
    assert_eq!(graph.registry.id_of("C++"), Some(2));
    assert_eq!(graph.registry.id_of("Cargo (package manager)"), Some(5));
}

#[test]
fn deferred_redirect_is_rewritten_everywhere() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    // "Rust" (3) and "Cargo" (4) were linked to before their redirect pages
    // arrived; both IDs must be gone from the graph.
    assert_eq!(graph.stats.deferred_redirects, 2);
    assert_eq!(graph.registry.title_of(3), None);
    assert_eq!(graph.registry.title_of(4), None);
    assert_eq!(graph.registry.id_of("Rust"), Some(0));
    assert_eq!(graph.registry.id_of("Cargo"), Some(5));
    for targets in graph.adjacency.values() {
        assert!(!targets.contains(&3));
        assert!(!targets.contains(&4));
    }

    // Link order preserved through the rewrite, duplicates intact; the
    // article linking its own redirect becomes a self-edge.
    assert_eq!(graph.adjacency[&0], vec![1, 2, 0, 5, 1]);
    assert_eq!(graph.adjacency[&1], vec![0]);
}

#[test]
fn limit_truncates_the_stream() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, Some(2)).unwrap();

    assert_eq!(graph.stats.pages, 2);
    assert_eq!(graph.stats.redirects, 0);
}

// ---------------------------------------------------------------------------
// Output Tests
// ---------------------------------------------------------------------------

#[test]
fn edge_list_matches_rewritten_adjacency() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    let out = TempDir::new().unwrap();
    let edges_path = out.path().join("edges.csv");
    let count = write_edges(&graph, edges_path.to_str().unwrap()).unwrap();
    assert_eq!(count, 6);

    let content = fs::read_to_string(&edges_path).unwrap();
    let mut rows: Vec<&str> = content.lines().collect();
    rows.sort_unstable();
    assert_eq!(rows, vec!["0 0", "0 1", "0 1", "0 2", "0 5", "1 0"]);
}

#[test]
fn node_titles_roundtrip_and_exclude_redirected_ids() {
    let dump = create_dump(sample_xml(), ".xml", false);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    let out = TempDir::new().unwrap();
    let titles_path = out.path().join("titles.txt");
    let count = write_node_titles(&graph, titles_path.to_str().unwrap()).unwrap();
    assert_eq!(count, 4);

    let titles = read_node_titles(titles_path.to_str().unwrap()).unwrap();
    assert_eq!(titles.len(), 4);
    assert_eq!(
        titles.get(&0).map(String::as_str),
        Some("Rust (programming language)")
    );
    assert_eq!(
        titles.get(&5).map(String::as_str),
        Some("Cargo (package manager)")
    );
    assert!(!titles.contains_key(&3));
    assert!(!titles.contains_key(&4));
}

#[test]
fn full_pipeline_from_bz2_to_output_files() {
    let dump = create_dump(sample_xml(), ".xml.bz2", true);
    let reader = DumpReader::open(dump.path().to_str().unwrap()).unwrap();
    let graph = build_graph(reader, None).unwrap();

    let out = TempDir::new().unwrap();
    let edges_path = out.path().join("edges.csv");
    let titles_path = out.path().join("titles.txt");

    let edges = write_edges(&graph, edges_path.to_str().unwrap()).unwrap();
    let nodes = write_node_titles(&graph, titles_path.to_str().unwrap()).unwrap();

    assert_eq!(edges, graph.edge_count());
    assert_eq!(nodes as usize, graph.node_count());

    // Every edge endpoint must denote a surviving node or be reconstructible
    // from the title map.
    let titles = read_node_titles(titles_path.to_str().unwrap()).unwrap();
    for line in fs::read_to_string(&edges_path).unwrap().lines() {
        for id in line.split(' ') {
            let id: u32 = id.parse().unwrap();
            assert!(titles.contains_key(&id), "edge endpoint {} has no title", id);
        }
    }
}
