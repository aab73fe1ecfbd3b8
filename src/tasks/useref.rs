// src/tasks/useref.rs

//! Parsing and rewriting of HTML reference blocks.
//!
//! ```html
//! <!-- build:js(app,node_modules) js/main.min.js -->
//! <script src="js/a.js"></script>
//! <script src="/js/b.js"></script>
//! <!-- endbuild -->
//! ```
//!
//! Everything outside a block is left byte-for-byte intact.

use std::ops::Range;

use anyhow::{Context, Result};
use regex::Regex;

const MARKER_PATTERN: &str = r"<!--\s*(?:build:(?P<kind>[A-Za-z0-9_-]*)(?:\((?P<alt>[^)]*)\))?(?:[ \t]+(?P<out>[^\s]+?))?|(?P<end>endbuild))\s*-->";
const SCRIPT_SRC_PATTERN: &str = r#"(?i)<script\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#;
const LINK_HREF_PATTERN: &str = r#"(?i)<link\b[^>]*?\shref\s*=\s*["']([^"']+)["']"#;

/// What a reference block produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Js,
    Css,
    Remove,
}

impl BlockKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "js" => Some(BlockKind::Js),
            "css" => Some(BlockKind::Css),
            "remove" => Some(BlockKind::Remove),
            _ => None,
        }
    }
}

/// One `build:` ... `endbuild` block found in an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceBlock {
    pub kind: BlockKind,
    /// Bundle path relative to the output root; `None` for `remove` blocks.
    pub output: Option<String>,
    /// Extra directories from `build:js(dir1,dir2)`, searched first.
    pub search_paths: Vec<String>,
    /// Referenced assets in document order, as written in the HTML.
    pub assets: Vec<String>,
    /// Byte range of the whole block, markers included.
    span: Range<usize>,
}

impl ReferenceBlock {
    /// The tag that replaces this block in the rewritten document.
    pub fn replacement(&self) -> String {
        match (self.kind, &self.output) {
            (BlockKind::Js, Some(out)) => format!(r#"<script src="{out}"></script>"#),
            (BlockKind::Css, Some(out)) => format!(r#"<link rel="stylesheet" href="{out}">"#),
            _ => String::new(),
        }
    }
}

struct OpenBlock {
    kind: BlockKind,
    output: Option<String>,
    search_paths: Vec<String>,
    start: usize,
    body_start: usize,
}

/// Compiled marker and tag patterns.
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    marker: Regex,
    script_src: Regex,
    link_href: Regex,
}

impl ReferenceParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            marker: Regex::new(MARKER_PATTERN).context("compiling build marker regex")?,
            script_src: Regex::new(SCRIPT_SRC_PATTERN).context("compiling script regex")?,
            link_href: Regex::new(LINK_HREF_PATTERN).context("compiling link regex")?,
        })
    }

    /// Find every reference block in `html`.
    ///
    /// Errors (returned as a message) on an unknown block type, a js/css
    /// block without an output path, nested openers, a stray `endbuild` or a
    /// block that is never closed.
    pub fn parse_blocks(&self, html: &str) -> std::result::Result<Vec<ReferenceBlock>, String> {
        let mut blocks = Vec::new();
        let mut open: Option<OpenBlock> = None;

        for caps in self.marker.captures_iter(html) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let line = line_of(html, whole.start());

            if caps.name("end").is_some() {
                let Some(block) = open.take() else {
                    return Err(format!("line {line}: endbuild without matching build marker"));
                };
                let body = &html[block.body_start..whole.start()];
                blocks.push(ReferenceBlock {
                    assets: self.collect_assets(block.kind, body),
                    kind: block.kind,
                    output: block.output,
                    search_paths: block.search_paths,
                    span: block.start..whole.end(),
                });
                continue;
            }

            if open.is_some() {
                return Err(format!("line {line}: nested build marker"));
            }

            let raw_kind = caps.name("kind").map_or("", |m| m.as_str());
            let kind = BlockKind::parse(raw_kind)
                .ok_or_else(|| format!("line {line}: unknown block type '{raw_kind}'"))?;

            let output = caps.name("out").map(|m| m.as_str().to_string());
            if kind != BlockKind::Remove && output.is_none() {
                return Err(format!("line {line}: build:{raw_kind} block has no output path"));
            }

            let search_paths = caps
                .name("alt")
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            open = Some(OpenBlock {
                kind,
                output,
                search_paths,
                start: whole.start(),
                body_start: whole.end(),
            });
        }

        if let Some(block) = open {
            let line = line_of(html, block.start);
            return Err(format!("line {line}: build marker is never closed by endbuild"));
        }

        Ok(blocks)
    }

    fn collect_assets(&self, kind: BlockKind, body: &str) -> Vec<String> {
        let re = match kind {
            BlockKind::Js => &self.script_src,
            BlockKind::Css => &self.link_href,
            BlockKind::Remove => return Vec::new(),
        };
        re.captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Replace each block in `html` with its replacement tag.
///
/// `blocks` must come from [`ReferenceParser::parse_blocks`] on the same
/// document.
pub fn rewrite_html(html: &str, blocks: &[ReferenceBlock]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for block in blocks {
        out.push_str(&html[cursor..block.span.start]);
        out.push_str(&block.replacement());
        cursor = block.span.end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Strip the parts of a reference that don't name a file: a leading `/`, a
/// `?query` and a `#fragment`.
pub fn normalize_reference(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    reference[..end].trim_start_matches('/')
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}
