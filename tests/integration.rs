//! Integration tests for datadown.
//!
//! These tests drive the public `convert` entry point end to end and
//! inspect the JSON output as a generic value tree.

use datadown::{convert, convert_with, Config, ConvertError, Document, ErrorKind, Mode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Convert to JSON and parse the output back into a value.
fn json(markdown: &str) -> Value {
    init();
    let out = convert(markdown, "json").unwrap();
    serde_json::from_str(&out).unwrap()
}

/// Top-level blocks of the converted document.
fn blocks(markdown: &str) -> Vec<Value> {
    match json(markdown) {
        Value::Object(mut map) => {
            assert_eq!(map["type"], "document");
            match map.remove("children") {
                Some(Value::Array(children)) => children,
                other => panic!("no children array: {:?}", other),
            }
        }
        other => panic!("not an object: {}", other),
    }
}

fn text(value: &str) -> Value {
    json!({"type": "text", "value": value})
}

fn para(children: Vec<Value>) -> Value {
    json!({"type": "paragraph", "children": children})
}

// =============================================================================
// Literal scenarios
// =============================================================================

#[test]
fn test_heading_and_strong() {
    assert_eq!(
        blocks("# Hello world\n\nThis is **bold**."),
        vec![
            json!({"type": "heading", "level": 1, "children": [text("Hello world")]}),
            para(vec![
                text("This is "),
                json!({"type": "strong", "children": [text("bold")]}),
                text("."),
            ]),
        ]
    );
}

#[test]
fn test_two_item_list() {
    assert_eq!(
        blocks("- a\n- b\n"),
        vec![json!({
            "type": "list",
            "ordered": false,
            "tight": true,
            "items": [
                {"type": "list_item", "children": [para(vec![text("a")])]},
                {"type": "list_item", "children": [para(vec![text("b")])]},
            ]
        })]
    );
}

#[test]
fn test_code_span_shields_content() {
    assert_eq!(
        blocks("`code`"),
        vec![para(vec![json!({"type": "code_span", "value": "code"})])]
    );
    assert_eq!(
        blocks("`*not emphasis*`"),
        vec![para(vec![json!({"type": "code_span", "value": "*not emphasis*"})])]
    );
}

#[test]
fn test_link() {
    assert_eq!(
        blocks("[text](http://x.com)"),
        vec![para(vec![json!({
            "type": "link",
            "url": "http://x.com",
            "children": [text("text")]
        })])]
    );
}

#[test]
fn test_strong_inside_emphasis() {
    assert_eq!(
        blocks("*a **b** c*"),
        vec![para(vec![json!({
            "type": "emphasis",
            "children": [
                text("a "),
                {"type": "strong", "children": [text("b")]},
                text(" c"),
            ]
        })])]
    );
}

#[test]
fn test_ordered_list_items() {
    assert_eq!(
        blocks("1. one\n2. two\n3. three"),
        vec![json!({
            "type": "list",
            "ordered": true,
            "start": 1,
            "tight": true,
            "items": [
                {"type": "list_item", "children": [para(vec![text("one")])]},
                {"type": "list_item", "children": [para(vec![text("two")])]},
                {"type": "list_item", "children": [para(vec![text("three")])]},
            ]
        })]
    );
}

#[test]
fn test_unclosed_emphasis_is_literal() {
    assert_eq!(blocks("*unclosed"), vec![para(vec![text("*unclosed")])]);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unsupported_format() {
    init();
    let err = convert("anything", "xml-not-registered").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    match err {
        ConvertError::UnsupportedFormat(id) => assert_eq!(id, "xml-not-registered"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_format_lookup_is_case_insensitive() {
    init();
    assert_eq!(
        convert("# x", "JSON").unwrap(),
        convert("# x", "json").unwrap()
    );
    assert_eq!(
        convert("# x", "yml").unwrap(),
        convert("# x", "Yaml").unwrap()
    );
}

// =============================================================================
// Properties on a fixed corpus
// =============================================================================

const CORPUS: &str = r#"# Title

Intro with *emphasis*, **strong**, `code` and a [link](http://x.com "T").

## Lists

1. first
2. second
   - nested *item*
   - ![img](a.png)

- loose

- list

> quoted
lazy line
> > inner

```rust
fn main() {}
```

| a | b |
|:--|--:|
| 1 | 2 |

***
Setext
======
"#;

#[test]
fn test_determinism() {
    init();
    for format in ["json", "yaml", "toml", "xml", "text"] {
        let first = convert(CORPUS, format).unwrap();
        let second = convert(CORPUS, format).unwrap();
        assert_eq!(first, second, "format {}", format);
    }
}

#[test]
fn test_json_round_trip() {
    init();
    let out = convert(CORPUS, "json").unwrap();
    let back: Document = serde_json::from_str(&out).unwrap();
    let again = serde_json::to_string_pretty(&back).unwrap();
    assert_eq!(again, out);
}

#[test]
fn test_yaml_and_toml_round_trip() {
    init();
    let from_json: Document = serde_json::from_str(&convert(CORPUS, "json").unwrap()).unwrap();
    let from_yaml: Document = serde_yaml::from_str(&convert(CORPUS, "yaml").unwrap()).unwrap();
    let from_toml: Document = toml::from_str(&convert(CORPUS, "toml").unwrap()).unwrap();
    assert_eq!(from_yaml, from_json);
    assert_eq!(from_toml, from_json);
}

#[test]
fn test_every_format_renders() {
    init();
    let xml = convert(CORPUS, "xml").unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<table alignments=\"left,right\">"));

    let text = convert(CORPUS, "outline").unwrap();
    assert!(text.starts_with("# Title\n"));
    assert!(text.contains("    fn main() {}"));

    let yaml = convert(CORPUS, "yaml").unwrap();
    assert!(yaml.contains("type: block_quote"));
}

// =============================================================================
// Block structure
// =============================================================================

#[test]
fn test_lazy_continuation_in_list() {
    let blocks = blocks("- item\ncontinued");
    assert_eq!(blocks.len(), 1);
    assert_eq!(
        blocks[0]["items"][0]["children"],
        json!([para(vec![
            text("item"),
            json!({"type": "soft_break"}),
            text("continued"),
        ])])
    );
}

#[test]
fn test_lazy_continuation_in_quote() {
    let blocks = blocks("> quoted\nlazy");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["type"], "block_quote");
    assert_eq!(blocks[0]["children"][0]["children"][2], text("lazy"));
}

#[test]
fn test_blank_line_ends_quote() {
    let blocks = blocks("> quoted\n\nafter");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1], para(vec![text("after")]));
}

#[test]
fn test_ordered_list_start() {
    let blocks = blocks("3. c\n4. d");
    assert_eq!(blocks[0]["ordered"], true);
    assert_eq!(blocks[0]["start"], 3);
}

#[test]
fn test_unterminated_fence_runs_to_end() {
    assert_eq!(
        blocks("~~~\nno close\n\nstill code"),
        vec![json!({"type": "code_block", "content": "no close\n\nstill code\n"})]
    );
}

#[test]
fn test_no_nested_links() {
    let blocks = blocks("[a [b](u1) c](u2)");
    let children = blocks[0]["children"].as_array().unwrap();
    let links: Vec<&Value> = children.iter().filter(|c| c["type"] == "link").collect();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["url"], "u1");
}

#[test]
fn test_deep_nesting_is_total() {
    init();
    let quotes = format!("{}deep", "> ".repeat(500));
    assert!(convert(&quotes, "json").is_ok());
    let brackets = format!("{}x{}", "[".repeat(500), "](u)".repeat(500));
    assert!(convert(&brackets, "json").is_ok());
    let stars = format!("{}x{}", "*".repeat(1000), "*".repeat(1000));
    assert!(convert(&stars, "json").is_ok());
}

#[test]
fn test_deepest_default_tree_round_trips() {
    init();
    let mut markdown = String::new();
    for level in 0..40 {
        markdown.push_str(&"  ".repeat(level));
        markdown.push_str("- item\n");
    }
    markdown.push_str(&"  ".repeat(40));
    markdown.push_str(&format!("{}x{}", "[*".repeat(40), "*](u)".repeat(40)));

    let out = convert(&markdown, "json").unwrap();
    let back: Document = serde_json::from_str(&out).unwrap();
    assert_eq!(serde_json::to_string_pretty(&back).unwrap(), out);
}

#[test]
fn test_ordered_item_with_second_paragraph() {
    let blocks = blocks("1. a\n\n   b\n2. c\n\ntext");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(blocks[0]["tight"], false);
    assert_eq!(blocks[1], para(vec![text("text")]));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_tables_can_be_disabled() {
    init();
    let config = Config::from_toml_str("[parse]\nTables = false").unwrap();
    let out = convert_with("| a |\n|---|", "json", &config).unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["children"][0]["type"], "paragraph");
}

#[test]
fn test_minified_mode_nests_headings() {
    init();
    let mut config = Config::default();
    config.render.mode = Mode::Minified;
    let markdown = "preamble\n\n# Project\n\nintro\n\n## Features\n\n- fast\n- small\n\n## License\n\nMIT\n\n# Other\n\ntext";
    let out = convert_with(markdown, "json", &config).unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        value,
        json!({
            "Project": {"Features": ["fast", "small"], "License": "MIT"},
            "Other": "text"
        })
    );
}

#[test]
fn test_minified_xml_sanitizes_keys() {
    init();
    let mut config = Config::default();
    config.render.mode = Mode::Minified;
    config.render.pretty = false;
    let out = convert_with("# My Section\n\nbody", "xml", &config).unwrap();
    assert!(out.ends_with("<data><My_Section>body</My_Section></data>"));
}
