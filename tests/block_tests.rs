//! Block structure tests.
//!
//! These run the block phase only (`parse_blocks`), so paragraph and
//! heading text stays raw: one text fragment per source line.

use markdown_tree::{Block, ListType, MarkdownParser, Text, TextFragment};

fn parse_blocks(input: &str) -> Vec<Block> {
    match MarkdownParser::standard().parse_blocks(input) {
        Block::Document(blocks) => blocks,
        other => panic!("expected document, got {other:?}"),
    }
}

/// Raw paragraph lines separated by soft breaks.
fn lines(lines: &[&str]) -> Text {
    let mut text = Text::new();
    for line in lines {
        text.append_line(line, false);
    }
    text
}

fn para(text: &[&str]) -> Block {
    Block::Paragraph(lines(text))
}

fn heading(level: u8, text: &str) -> Block {
    let text = if text.is_empty() { Text::new() } else { Text::plain(text) };
    Block::Heading { level, text }
}

fn code(lines: &[&str]) -> Block {
    Block::IndentedCode(lines.iter().map(|s| s.to_string()).collect())
}

fn html(lines: &[&str]) -> Block {
    Block::HtmlBlock(lines.iter().map(|s| s.to_string()).collect())
}

fn reference(label: &str, destination: &str, title: &[&str]) -> Block {
    Block::ReferenceDef {
        label: label.into(),
        destination: destination.into(),
        title: title.iter().map(|s| s.to_string()).collect(),
    }
}

/// Summary of a list: start number, tightness and item count.
fn list_shape(block: &Block) -> (Option<u64>, bool, usize) {
    match block {
        Block::List { start, tight, items } => (*start, *tight, items.len()),
        other => panic!("expected list, got {other:?}"),
    }
}

fn item_content(list: &Block, index: usize) -> &[Block] {
    let Block::List { items, .. } = list else {
        panic!("expected list, got {list:?}");
    };
    match &items[index] {
        Block::ListItem { content, .. } => content,
        other => panic!("expected list item, got {other:?}"),
    }
}

// === Paragraphs ===

/// Empty and blank input produce an empty document.
#[test]
fn empty_documents() {
    assert_eq!(parse_blocks(""), vec![]);
    assert_eq!(parse_blocks("\n"), vec![]);
    assert_eq!(parse_blocks("  \n\t\n"), vec![]);
}

/// Consecutive lines form one paragraph; blank lines separate paragraphs.
#[test]
fn paragraphs() {
    assert_eq!(parse_blocks("foo"), vec![para(&["foo"])]);
    assert_eq!(parse_blocks("foo\nbar\n\nbaz"), vec![para(&["foo", "bar"]), para(&["baz"])]);
    assert_eq!(parse_blocks("  foo\n bar  "), vec![para(&["foo", "bar"])]);
}

/// Two trailing spaces end a line with a hard break.
#[test]
fn hard_breaks() {
    assert_eq!(
        parse_blocks("foo  \nbar"),
        vec![Block::Paragraph(Text::from(vec![
            TextFragment::text("foo"),
            TextFragment::HardBreak,
            TextFragment::text("bar"),
        ]))]
    );
    assert_eq!(
        parse_blocks("foo\\\nbar"),
        vec![Block::Paragraph(Text::from(vec![
            TextFragment::text("foo"),
            TextFragment::HardBreak,
            TextFragment::text("bar"),
        ]))]
    );
    // Trailing break at the end of a paragraph is dropped.
    assert_eq!(parse_blocks("foo  "), vec![para(&["foo"])]);
}

/// Carriage returns are line terminators too.
#[test]
fn line_endings() {
    assert_eq!(parse_blocks("a\r\nb\rc"), vec![para(&["a", "b", "c"])]);
}

// === Thematic breaks ===

#[test]
fn thematic_breaks() {
    assert_eq!(
        parse_blocks("***\n---\n___"),
        vec![Block::ThematicBreak, Block::ThematicBreak, Block::ThematicBreak]
    );
    assert_eq!(parse_blocks(" - - -"), vec![Block::ThematicBreak]);
    assert_eq!(parse_blocks("+++"), vec![para(&["+++"])]);
    assert_eq!(parse_blocks("--"), vec![para(&["--"])]);
    assert_eq!(parse_blocks("_ _ _ a"), vec![para(&["_ _ _ a"])]);
}

/// A thematic break interrupts a paragraph.
#[test]
fn thematic_break_interrupts_paragraph() {
    assert_eq!(
        parse_blocks("Foo\n***\nbar"),
        vec![para(&["Foo"]), Block::ThematicBreak, para(&["bar"])]
    );
}

// === ATX headings ===

#[test]
fn atx_headings() {
    assert_eq!(
        parse_blocks("# foo\n## foo\n###### foo\n####### foo"),
        vec![heading(1, "foo"), heading(2, "foo"), heading(6, "foo"), para(&["####### foo"])]
    );
    assert_eq!(parse_blocks("#5 bolt"), vec![para(&["#5 bolt"])]);
    assert_eq!(parse_blocks("# foo *bar* \\*baz\\*"), vec![heading(1, "foo *bar* \\*baz\\*")]);
    assert_eq!(parse_blocks("#                  foo                     "), vec![heading(1, "foo")]);
}

/// Closing sequences are stripped only when preceded by a space.
#[test]
fn atx_closing_sequence() {
    assert_eq!(parse_blocks("## foo ##"), vec![heading(2, "foo")]);
    assert_eq!(parse_blocks("### foo ###     "), vec![heading(3, "foo")]);
    assert_eq!(parse_blocks("# foo#"), vec![heading(1, "foo#")]);
    assert_eq!(parse_blocks("### foo \\###"), vec![heading(3, "foo \\###")]);
}

/// A heading may be empty.
#[test]
fn atx_empty_headings() {
    assert_eq!(parse_blocks("#"), vec![heading(1, "")]);
    assert_eq!(parse_blocks("## "), vec![heading(2, "")]);
    assert_eq!(parse_blocks("# ###"), vec![heading(1, "")]);
}

/// Four spaces of indentation make code, not a heading.
#[test]
fn atx_indented_is_code() {
    assert_eq!(parse_blocks("    ###"), vec![code(&["###"])]);
    assert_eq!(parse_blocks("   # foo"), vec![heading(1, "foo")]);
}

// === Setext headings ===

#[test]
fn setext_headings() {
    assert_eq!(parse_blocks("Foo\n==="), vec![heading(1, "Foo")]);
    assert_eq!(parse_blocks("Foo\n---"), vec![heading(2, "Foo")]);
    assert_eq!(parse_blocks("Foo *bar*\n========="), vec![heading(1, "Foo *bar*")]);
    assert_eq!(parse_blocks("Foo\n   ==  "), vec![heading(1, "Foo")]);
}

/// The heading takes all lines of the preceding paragraph.
#[test]
fn setext_multiline() {
    assert_eq!(
        parse_blocks("Foo\nBar\n---"),
        vec![Block::Heading {
            level: 2,
            text: lines(&["Foo", "Bar"]),
        }]
    );
}

/// An underline with inner spaces is not an underline.
#[test]
fn setext_broken_underline() {
    assert_eq!(parse_blocks("Foo\n= ="), vec![para(&["Foo", "= ="])]);
}

/// A lazy line cannot underline a paragraph inside a container.
#[test]
fn setext_not_lazy() {
    assert_eq!(
        parse_blocks("> Foo\n---"),
        vec![Block::Blockquote(vec![para(&["Foo"])]), Block::ThematicBreak]
    );
}

// === Blockquotes ===

#[test]
fn blockquotes() {
    assert_eq!(
        parse_blocks("> # Foo\n> bar\n> baz"),
        vec![Block::Blockquote(vec![heading(1, "Foo"), para(&["bar", "baz"])])]
    );
    assert_eq!(
        parse_blocks("># Foo\n>bar\n> baz"),
        vec![Block::Blockquote(vec![heading(1, "Foo"), para(&["bar", "baz"])])]
    );
    assert_eq!(parse_blocks(">"), vec![Block::Blockquote(vec![])]);
}

/// Paragraph continuation lines may omit the `>` prefix.
#[test]
fn blockquote_lazy_continuation() {
    assert_eq!(
        parse_blocks("> bar\nbaz\n> foo"),
        vec![Block::Blockquote(vec![para(&["bar", "baz", "foo"])])]
    );
}

/// A blank line ends the blockquote.
#[test]
fn blockquote_blank_line_separates() {
    assert_eq!(
        parse_blocks("> foo\n\n> bar"),
        vec![
            Block::Blockquote(vec![para(&["foo"])]),
            Block::Blockquote(vec![para(&["bar"])]),
        ]
    );
    assert_eq!(
        parse_blocks("> foo\n>\n> bar"),
        vec![Block::Blockquote(vec![para(&["foo"]), para(&["bar"])])]
    );
}

#[test]
fn nested_blockquotes() {
    assert_eq!(
        parse_blocks("> > foo\n> > bar"),
        vec![Block::Blockquote(vec![Block::Blockquote(vec![para(&["foo", "bar"])])])]
    );
}

// === Code blocks ===

#[test]
fn indented_code() {
    assert_eq!(
        parse_blocks("    a simple\n      indented code block"),
        vec![code(&["a simple\n", "  indented code block"])]
    );
    assert_eq!(
        parse_blocks("    foo\n\n    bar"),
        vec![code(&["foo\n", "\n", "bar"])]
    );
}

/// Trailing blank lines are not part of the code block.
#[test]
fn indented_code_trailing_blank_lines() {
    assert_eq!(
        parse_blocks("    foo\n\nbar"),
        vec![code(&["foo\n"]), para(&["bar"])]
    );
}

/// Indented code cannot interrupt a paragraph.
#[test]
fn indented_code_does_not_interrupt() {
    assert_eq!(parse_blocks("Foo\n    bar"), vec![para(&["Foo", "bar"])]);
}

#[test]
fn fenced_code() {
    assert_eq!(
        parse_blocks("```rust\nfn main() {}\n```"),
        vec![Block::FencedCode {
            info: Some("rust".into()),
            lines: vec!["fn main() {}\n".into()],
        }]
    );
    assert_eq!(
        parse_blocks("~~~\n<\n >\n~~~"),
        vec![Block::FencedCode {
            info: None,
            lines: vec!["<\n".into(), " >\n".into()],
        }]
    );
}

/// The closing fence must be at least as long as the opening one.
#[test]
fn fenced_code_closing_length() {
    assert_eq!(
        parse_blocks("````\naaa\n```\n``````"),
        vec![Block::FencedCode {
            info: None,
            lines: vec!["aaa\n".into(), "```\n".into()],
        }]
    );
}

/// An unclosed fence runs to the end of its container.
#[test]
fn fenced_code_unclosed() {
    assert_eq!(
        parse_blocks("> ```\n> aaa\n\nbbb"),
        vec![
            Block::Blockquote(vec![Block::FencedCode {
                info: None,
                lines: vec!["aaa\n".into()],
            }]),
            para(&["bbb"]),
        ]
    );
}

/// Content is unindented by the indentation of the opening fence.
#[test]
fn fenced_code_indentation() {
    assert_eq!(
        parse_blocks("  ```\n aaa\n  aaa\naaa\n  ```"),
        vec![Block::FencedCode {
            info: None,
            lines: vec!["aaa\n".into(), "aaa\n".into(), "aaa\n".into()],
        }]
    );
}

// === List items ===

#[test]
fn bullet_list() {
    let blocks = parse_blocks("- foo\n- bar");
    assert_eq!(blocks.len(), 1);
    assert_eq!(list_shape(&blocks[0]), (None, true, 2));
    assert_eq!(item_content(&blocks[0], 0), &[para(&["foo"])]);
    assert_eq!(item_content(&blocks[0], 1), &[para(&["bar"])]);
}

/// A blank line between items makes the list loose.
#[test]
fn loose_list() {
    let blocks = parse_blocks("- a\n\n- b");
    assert_eq!(list_shape(&blocks[0]), (None, false, 2));
}

/// An item with several blocks makes the list loose.
#[test]
fn list_item_with_paragraphs() {
    let blocks = parse_blocks(" - One\n\n   Two");
    assert_eq!(blocks.len(), 1);
    assert_eq!(list_shape(&blocks[0]), (None, false, 1));
    assert_eq!(item_content(&blocks[0], 0), &[para(&["One"]), para(&["Two"])]);
}

/// Content indented less than the item's content column leaves the item.
#[test]
fn list_item_insufficient_indent() {
    let blocks = parse_blocks("- one\n\n two");
    assert_eq!(blocks.len(), 2);
    assert_eq!(item_content(&blocks[0], 0), &[para(&["one"])]);
    assert_eq!(blocks[1], para(&["two"]));
}

/// Ordered items with a different delimiter start a new list.
#[test]
fn ordered_lists() {
    let blocks = parse_blocks("1.  O\nT\n\n2.  Three\n\n4)  Four");
    assert_eq!(blocks.len(), 2);
    assert_eq!(list_shape(&blocks[0]), (Some(1), false, 2));
    assert_eq!(item_content(&blocks[0], 0), &[para(&["O", "T"])]);
    assert_eq!(item_content(&blocks[0], 1), &[para(&["Three"])]);
    assert_eq!(list_shape(&blocks[1]), (Some(4), true, 1));
}

/// Changing the bullet character starts a new list.
#[test]
fn bullet_change_starts_new_list() {
    let blocks = parse_blocks("- foo\n- bar\n+ baz");
    assert_eq!(blocks.len(), 2);
    assert_eq!(list_shape(&blocks[0]), (None, true, 2));
    assert_eq!(list_shape(&blocks[1]), (None, true, 1));
    let Block::List { items, .. } = &blocks[1] else { unreachable!() };
    assert!(matches!(items[0], Block::ListItem { kind: ListType::Bullet('+'), .. }));
}

/// Item content may start with a code block or be empty.
#[test]
fn list_item_start() {
    let blocks = parse_blocks("-\n  foo");
    assert_eq!(item_content(&blocks[0], 0), &[para(&["foo"])]);
    let blocks = parse_blocks("1.     indented code");
    assert_eq!(item_content(&blocks[0], 0), &[code(&["indented code"])]);
    assert_eq!(parse_blocks("-one"), vec![para(&["-one"])]);
}

#[test]
fn nested_lists() {
    let blocks = parse_blocks("- foo\n  - bar\n    - baz");
    assert_eq!(blocks.len(), 1);
    let outer = item_content(&blocks[0], 0);
    assert_eq!(outer[0], para(&["foo"]));
    assert_eq!(list_shape(&outer[1]), (None, false, 1));
    let inner = item_content(&outer[1], 0);
    assert_eq!(inner[0], para(&["bar"]));
    assert_eq!(item_content(&inner[1], 0), &[para(&["baz"])]);
}

/// Insufficiently indented markers stay siblings.
#[test]
fn sibling_list_items() {
    let blocks = parse_blocks("- a\n - b\n  - c\n   - d");
    assert_eq!(blocks.len(), 1);
    assert_eq!(list_shape(&blocks[0]), (None, true, 4));
}

/// A thematic break wins over a list item and ends the list.
#[test]
fn thematic_break_after_list() {
    let blocks = parse_blocks("- foo\n***\n- bar");
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1], Block::ThematicBreak);
}

#[test]
fn blockquote_in_list() {
    let blocks = parse_blocks("- > quoted\n  > more\n- plain");
    assert_eq!(list_shape(&blocks[0]), (None, true, 2));
    assert_eq!(
        item_content(&blocks[0], 0),
        &[Block::Blockquote(vec![para(&["quoted", "more"])])]
    );
}

#[test]
fn list_in_blockquote() {
    let blocks = parse_blocks("> 1. one\n>\n>    two");
    let Block::Blockquote(inner) = &blocks[0] else {
        panic!("expected blockquote, got {:?}", blocks[0]);
    };
    assert_eq!(list_shape(&inner[0]), (Some(1), false, 1));
    assert_eq!(item_content(&inner[0], 0), &[para(&["one"]), para(&["two"])]);
}

// === Link reference definitions ===

#[test]
fn reference_definitions() {
    assert_eq!(parse_blocks("[foo]: /url \"title\""), vec![reference("foo", "/url", &["title"])]);
    assert_eq!(
        parse_blocks("[foo]:\n     /url  \n           \"title\"  "),
        vec![reference("foo", "/url", &["title"])]
    );
    assert_eq!(
        parse_blocks("[Foo*bar\\]]:my_(url) 'title (with parens)'"),
        vec![reference("Foo*bar\\]", "my_(url)", &["title (with parens)"])]
    );
    assert_eq!(
        parse_blocks("[ Foo  bar ]:\n      <my url>\n      'title'"),
        vec![reference("Foo bar", "my url", &["title"])]
    );
}

/// Titles may span lines but not blank lines.
#[test]
fn reference_definition_titles() {
    assert_eq!(
        parse_blocks("[foo   ]: /url '\ntitle\nline1\nline2\n'"),
        vec![reference("foo", "/url", &["", "title", "line1", "line2", ""])]
    );
    assert_eq!(
        parse_blocks("[foo]: /url 'title\n\nwith blank line'"),
        vec![para(&["[foo]: /url 'title"]), para(&["with blank line'"])]
    );
    assert_eq!(
        parse_blocks("[foo]: /url \"title\" ok"),
        vec![para(&["[foo]: /url \"title\" ok"])]
    );
    assert_eq!(
        parse_blocks("[foo]: /url\n\"title\" ok"),
        vec![reference("foo", "/url", &[]), para(&["\"title\" ok"])]
    );
}

#[test]
fn reference_definition_destinations() {
    assert_eq!(
        parse_blocks("[  foo]: /url\n\none"),
        vec![reference("foo", "/url", &[]), para(&["one"])]
    );
    assert_eq!(parse_blocks("[foo]:\n\none"), vec![para(&["[foo]:"]), para(&["one"])]);
    assert_eq!(
        parse_blocks("[foo]: <>\n\none"),
        vec![reference("foo", "", &[]), para(&["one"])]
    );
    assert_eq!(
        parse_blocks("[foo]: <bar>(baz)\n\none"),
        vec![para(&["[foo]: <bar>(baz)"]), para(&["one"])]
    );
    assert_eq!(
        parse_blocks("[foo]: /url\\bar\\*baz \"foo\\\"bar\\baz\""),
        vec![reference("foo", "/url\\bar\\*baz", &["foo\\\"bar\\baz"])]
    );
}

/// Labels may span lines; whitespace collapses.
#[test]
fn reference_definition_multiline_label() {
    assert_eq!(
        parse_blocks("[\nfoo\nbar\n]:\n/url\nbar"),
        vec![reference("foo bar", "/url", &[]), para(&["bar"])]
    );
}

/// A definition cannot interrupt a paragraph.
#[test]
fn reference_definition_in_paragraph() {
    assert_eq!(
        parse_blocks("Foo\n[bar]: /baz\nBar"),
        vec![para(&["Foo", "[bar]: /baz", "Bar"])]
    );
    assert_eq!(
        parse_blocks("# [Foo]\n[foo]: /url\n> bar"),
        vec![
            heading(1, "[Foo]"),
            reference("foo", "/url", &[]),
            Block::Blockquote(vec![para(&["bar"])]),
        ]
    );
}

// === HTML blocks ===

#[test]
fn html_blocks() {
    assert_eq!(
        parse_blocks("<div><a href=\"bar\">*foo*</a></div>"),
        vec![html(&["<div><a href=\"bar\">*foo*</a></div>"])]
    );
    assert_eq!(parse_blocks("</div>\n*foo*\n"), vec![html(&["</div>\n", "*foo*\n"])]);
    assert_eq!(
        parse_blocks(" <div>\n  *hello*\n         <foo><a>"),
        vec![html(&[" <div>\n", "  *hello*\n", "         <foo><a>"])]
    );
}

/// Tag blocks end at a blank line.
#[test]
fn html_block_blank_line() {
    assert_eq!(
        parse_blocks("<DIV CLASS=\"foo\">\n\n_Markdown_\n\n</DIV>\n"),
        vec![html(&["<DIV CLASS=\"foo\">\n"]), para(&["_Markdown_"]), html(&["</DIV>\n"])]
    );
}

/// Raw blocks run to their end tag, across blank lines.
#[test]
fn html_raw_block() {
    assert_eq!(
        parse_blocks("<pre language=\"haskell\"><code>\nimport Text.HTML.TagSoup\n\nmain :: IO ()\n</code></pre>\nokay"),
        vec![
            html(&[
                "<pre language=\"haskell\"><code>\n",
                "import Text.HTML.TagSoup\n",
                "\n",
                "main :: IO ()\n",
                "</code></pre>\n",
            ]),
            para(&["okay"]),
        ]
    );
}

#[test]
fn html_comment_in_blockquote() {
    assert_eq!(
        parse_blocks("> <!--\n> *foo*\n> -->\nbar"),
        vec![
            Block::Blockquote(vec![html(&["<!--\n", "*foo*\n", "-->\n"])]),
            para(&["bar"]),
        ]
    );
    assert_eq!(
        parse_blocks("> <!--\n> *foo*\nbar"),
        vec![Block::Blockquote(vec![html(&["<!--\n", "*foo*\n"])]), para(&["bar"])]
    );
}

// === Plain text ===

/// `plain_text` strips markup and joins blocks with line breaks.
#[test]
fn plain_text() {
    let parser = MarkdownParser::standard();
    assert_eq!(parser.parse(" # First\n ## Second  \n### Third").plain_text(), "First\nSecond\nThird");
    assert_eq!(
        parser.parse(">  # Hello\n>  Next line\n And last line").plain_text(),
        "Hello\nNext line And last line"
    );
    assert_eq!(parser.parse("one\n\n      foo\n    bar\n\ntwo").plain_text(), "one\n  foo\nbar\n\ntwo");
    assert_eq!(parser.parse("- foo\n - bar\n  - baz\n   - boo").plain_text(), "foo\nbar\nbaz\nboo");
}
