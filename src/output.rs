use crate::config::WRITER_BUFFER_SIZE;
use crate::graph::LinkGraph;
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use tracing::error;

/// Writes the edge list: one `"<src> <dst>"` row per link, adjacency-map
/// iteration order, link order within a page. Returns the edge count.
pub fn write_edges(graph: &LinkGraph, path: &str) -> Result<u64> {
    let file =
        File::create(path).with_context(|| format!("Failed to create edge list: {}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_writer(BufWriter::with_capacity(WRITER_BUFFER_SIZE, file));

    let mut src_buf = itoa::Buffer::new();
    let mut dst_buf = itoa::Buffer::new();
    let mut count = 0u64;

    for (&src, targets) in &graph.adjacency {
        for &dst in targets {
            writer.write_record([src_buf.format(src), dst_buf.format(dst)])?;
            count += 1;
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush edge list: {}", path))?;
    Ok(count)
}

/// Writes the node-title map: one `<id>:::"""<repr>"""` line per surviving
/// ID. Only the ID-to-title direction is written; consumers rebuild the
/// reverse map at load. Returns the node count.
pub fn write_node_titles(graph: &LinkGraph, path: &str) -> Result<u64> {
    let file =
        File::create(path).with_context(|| format!("Failed to create node titles: {}", path))?;
    let mut writer = BufWriter::with_capacity(WRITER_BUFFER_SIZE, file);

    let mut count = 0u64;
    for (id, title) in graph.registry.iter_ids() {
        // {:?} escapes newlines and quotes, keeping one node per line.
        writeln!(writer, "{}:::\"\"\"{:?}\"\"\"", id, title)?;
        count += 1;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush node titles: {}", path))?;
    Ok(count)
}

/// Reads a node-title file back into an ID-to-title map.
///
/// A malformed line is reported with its number and content, then the error
/// propagates; there is no skip-and-continue.
pub fn read_node_titles(path: &str) -> Result<FxHashMap<u32, String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open node titles: {}", path))?;
    let reader = BufReader::new(file);

    let mut titles = FxHashMap::default();
    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {} of {}", line_number, path))?;
        match parse_node_title_line(&line) {
            Ok((id, title)) => {
                titles.insert(id, title);
            }
            Err(e) => {
                error!(line = line_number, content = %line, "Malformed node-title line");
                return Err(e.context(format!("Line {} of {}", line_number, path)));
            }
        }
    }
    Ok(titles)
}

fn parse_node_title_line(line: &str) -> Result<(u32, String)> {
    let (id_part, rest) = line
        .split_once(":::")
        .context("Missing ':::' separator")?;
    let id: u32 = id_part.parse().context("Invalid page ID")?;
    let repr = rest
        .strip_prefix("\"\"\"")
        .and_then(|r| r.strip_suffix("\"\"\""))
        .context("Missing triple-quote wrapper")?;
    let title = parse_repr(repr)?;
    Ok((id, title))
}

/// Inverts the `{:?}` rendering used by [`write_node_titles`].
fn parse_repr(repr: &str) -> Result<String> {
    let inner = repr
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .context("Title repr is not double-quoted")?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\'') => out.push('\''),
            Some('u') => {
                if chars.next() != Some('{') {
                    bail!("Malformed unicode escape in title repr");
                }
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(h) => hex.push(h),
                        None => bail!("Unterminated unicode escape in title repr"),
                    }
                }
                let code = u32::from_str_radix(&hex, 16)
                    .context("Invalid unicode escape in title repr")?;
                out.push(char::from_u32(code).context("Escape is not a unicode scalar")?);
            }
            other => bail!("Unknown escape sequence in title repr: {:?}", other),
        }
    }
    Ok(out)
}
