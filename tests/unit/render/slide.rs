use super::*;

fn renderer() -> SlideRenderer {
    SlideRenderer::new(
        Canvas::HD,
        SlideStyle::default(),
        Arc::new(usvg::fontdb::Database::new()),
    )
}

fn text_content(markup: &str) -> &str {
    let start = markup.find("<text").unwrap();
    let open_end = start + markup[start..].find('>').unwrap() + 1;
    let close = markup.find("</text>").unwrap();
    &markup[open_end..close]
}

#[test]
fn markup_sensitive_characters_are_escaped() {
    let svg = renderer().compose(r#"Tom & "Jerry" <3 'ok'"#, 0);
    let content = text_content(&svg.markup);
    assert_eq!(
        content,
        "Tom &amp; &quot;Jerry&quot; &lt;3 &#39;ok&#39;"
    );
    for bad in ['<', '>', '"', '\''] {
        assert!(!content.contains(bad), "unescaped {bad:?} in {content}");
    }
    let stripped = ["&amp;", "&quot;", "&lt;", "&#39;"]
        .iter()
        .fold(content.to_string(), |s, entity| s.replace(entity, ""));
    assert!(!stripped.contains('&'));
}

#[test]
fn escaped_markup_still_parses() {
    let svg = renderer().compose("a < b && c > d", 2);
    let opts = usvg::Options::default();
    assert!(usvg::Tree::from_str(&svg.markup, &opts).is_ok());
}

#[test]
fn long_title_is_truncated_before_escaping() {
    let svg = renderer().compose(&"A".repeat(200), 0);
    assert_eq!(svg.text, format!("{}…", "A".repeat(77)));
    assert_eq!(text_content(&svg.markup), svg.text);
}

#[test]
fn truncation_does_not_cut_escape_sequences() {
    // 79 ampersands stay under the limit and escape in full.
    let title = "&".repeat(79);
    let svg = renderer().compose(&title, 0);
    assert_eq!(text_content(&svg.markup), "&amp;".repeat(79));
}

#[test]
fn gradient_ids_are_unique_per_compose() {
    let r = renderer();
    let a = r.compose("Same", 1);
    let b = r.compose("Same", 1);
    assert!(a.gradient_id.starts_with("bg-1-"));
    assert_ne!(a.gradient_id, b.gradient_id);
    assert!(a.markup.contains(&format!("fill=\"url(#{})\"", a.gradient_id)));
}

#[test]
fn canvas_and_colors_land_in_markup() {
    let svg = renderer().compose("Hello", 0);
    assert!(svg.markup.contains(r#"width="1280" height="720""#));
    assert!(svg.markup.contains("#1b1035"));
    assert!(svg.markup.contains("#ff2d95"));
    assert!(svg.markup.contains(r##"fill="#ffffff""##));
    assert!(svg.markup.contains(r#"font-weight="700""#));
    assert!(svg.markup.contains(r#"text-anchor="middle""#));
}

#[test]
fn font_size_shrinks_for_long_titles() {
    let style = SlideStyle::default();
    assert_eq!(style.fitted_font_size(5, Canvas::HD), style.font_size);
    let long = style.fitted_font_size(78, Canvas::HD);
    assert!(long < style.font_size);
    assert!(long >= style.min_font_size);
}

#[test]
fn render_writes_one_png_named_by_ordinal() {
    let dir = tempfile::tempdir().unwrap();
    let slide = renderer().render("Hello", 3, dir.path()).unwrap();

    assert_eq!(slide.ordinal, 3);
    assert_eq!(slide.path, dir.path().join("slide-3.png"));
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let img = image::open(&slide.path).unwrap();
    assert_eq!((img.width(), img.height()), (1280, 720));
}

#[test]
fn render_into_missing_workspace_is_a_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let gone = dir.path().join("gone");
    let err = renderer().render("Hello", 7, &gone).unwrap_err();
    assert!(matches!(err, CardreelError::Render { ordinal: 7, .. }));
}

#[test]
fn control_characters_become_spaces() {
    assert_eq!(escape_markup("Hello\u{1}World"), "Hello World");
    assert_eq!(escape_markup("A\u{0}B\u{b}C\u{fffe}"), "A B C ");
    assert_eq!(escape_markup("tab\tnew\nline"), "tab\tnew\nline");
    assert_eq!(escape_markup("emoji 🎬"), "emoji 🎬");
}

#[test]
fn titles_with_control_characters_still_render() {
    let dir = tempfile::tempdir().unwrap();
    let r = renderer();

    let slide = r.render("Hello\u{1}World", 0, dir.path()).unwrap();
    assert!(slide.path.is_file());
    let slide = r.render("A\u{0}B", 1, dir.path()).unwrap();
    assert!(slide.path.is_file());

    let svg = r.compose("x\u{1f}y\u{ffff}", 2);
    assert_eq!(text_content(&svg.markup), "x y ");
    assert!(usvg::Tree::from_str(&svg.markup, &usvg::Options::default()).is_ok());
}
