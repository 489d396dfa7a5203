mod fixture;

use pretty_assertions::assert_eq;
use tape_markdown::{Renderer, RendererConfig};

fn plain_renderer() -> Renderer {
    Renderer::new(RendererConfig {
        theme: "plain".into(),
        syntax_highlighting: false,
        ..RendererConfig::default()
    })
    .with_terminal_columns(|| None)
    .with_hyperlinks(false)
}

fn assert_markdown_fixture(input_fixture: &str, expected_fixture: &str, width: usize) {
    let input = fixture::read_fixture(input_fixture);
    let rendered = plain_renderer().render_markdown_to_ansi(&input, Some(width));
    let actual: Vec<String> = rendered.split('\n').map(str::to_string).collect();
    let expected = fixture::read_lines_unescaped(expected_fixture);
    assert_eq!(
        actual, expected,
        "markdown golden mismatch for {input_fixture} at width={width}"
    );
}

#[test]
fn markdown_lists_golden() {
    assert_markdown_fixture("markdown_lists.md", "markdown_lists.txt", 30);
}

#[test]
fn markdown_blocks_golden() {
    assert_markdown_fixture("markdown_blocks.md", "markdown_blocks.txt", 40);
}

#[test]
fn markdown_code_golden() {
    assert_markdown_fixture("markdown_code.md", "markdown_code.txt", 44);
}
