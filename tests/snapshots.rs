//! Snapshot tests for datadown output.
//!
//! Snapshots are kept inline; run `cargo insta review` after an
//! intended output change.

use datadown::{convert, convert_with, Config, Mode};

fn minified() -> Config {
    let mut config = Config::default();
    config.render.mode = Mode::Minified;
    config
}

// =============================================================================
// Outline Snapshots
// =============================================================================

#[test]
fn test_snapshot_outline_document() {
    let markdown = r#"# Title

Some *emphasis* and a [link](http://x.com).

- one
- two
  1. nested
  2. more

> quoted
> text

---

```python
print("hi")
```
"#;
    let output = convert(markdown, "text").unwrap();
    insta::assert_snapshot!(output, @r#"
    # Title

    Some emphasis and a link.

    - one
    - two
      1. nested
      2. more

    > quoted text

    ---

        print("hi")
    "#);
}

#[test]
fn test_snapshot_outline_table() {
    let markdown = "| Name | Qty |\n|:-----|----:|\n| apple | 3 |\n| kiwi | 12 |";
    let output = convert(markdown, "text").unwrap();
    insta::assert_snapshot!(output, @r"
    Name  | Qty
    ------+----
    apple |   3
    kiwi  |  12
    ");
}

#[test]
fn test_snapshot_outline_minified() {
    let markdown = "# Project\n\nA tool.\n\n## Features\n\n- fast\n- small\n\n## Usage\n\n```sh\nrun\n```";
    let output = convert_with(markdown, "outline", &minified()).unwrap();
    insta::assert_snapshot!(output, @r"
    Project:
      Features:
        - fast
        - small
      Usage:
        ```sh
        run
        ```
    ");
}

// =============================================================================
// JSON Snapshots
// =============================================================================

#[test]
fn test_snapshot_compact_json() {
    let config = Config::from_toml_str("[render]\nPretty = false").unwrap();
    let output = convert_with("# Hi\n\n`x` *y*", "json", &config).unwrap();
    insta::assert_snapshot!(output, @r#"{"type":"document","children":[{"type":"heading","level":1,"children":[{"type":"text","value":"Hi"}]},{"type":"paragraph","children":[{"type":"code_span","value":"x"},{"type":"text","value":" "},{"type":"emphasis","children":[{"type":"text","value":"y"}]}]}]}"#);
}

#[test]
fn test_snapshot_image_with_title() {
    let config = Config::from_toml_str("[render]\nPretty = false").unwrap();
    let output = convert_with(r#"![alt *text*](img.png "Title")"#, "json", &config).unwrap();
    insta::assert_snapshot!(output, @r#"{"type":"document","children":[{"type":"paragraph","children":[{"type":"image","url":"img.png","title":"Title","alt":"alt text"}]}]}"#);
}
