//! Whole-pipeline tests: content tree in, PDF bytes out
//!
//! Pages are 600x800pt with 50pt margins and a 1000px viewport, so one
//! canvas pixel is half a point and a page shows 1400px of content.

use super::*;
use content_tree::testing::ScriptedRenderer;
use content_tree::{
    Color, ComputedStyle, ContentDocument, ContentNode, DataFlags, FontFace, FontStyle, Rect,
    TextContent, Word,
};
use pdf_model::{PageLayout, PageMode};

/// `RUST_LOG=layout_engine=debug` shows page decisions in test output
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn options() -> PdfOptions {
    init_tracing();
    PdfOptions::new()
        .with_page_size(PageSize::Custom {
            width: 600.0,
            height: 800.0,
        })
        .with_margin(Margin::Uniform(50.0))
        .with_viewport_width(1000.0)
        .with_compression(false)
}

fn words(text: &str) -> TextContent {
    TextContent::new(
        text.split_whitespace()
            .map(|w| Word::new(w, w.len() as f32 * 8.0))
            .collect(),
        4.0,
    )
}

fn text(content: &str, bounds: Rect) -> ContentNode {
    ContentNode::text(words(content), bounds, ComputedStyle::default())
}

/// Element holding a single text node
fn para(tag: &str, y: f32, height: f32, content: &str) -> ContentNode {
    let bounds = Rect::new(0.0, y, 1000.0, height);
    ContentNode::element(tag, bounds).with_child(text(content, bounds))
}

/// Painted leaf box
fn block(y: f32, height: f32) -> ContentNode {
    ContentNode::element("div", Rect::new(0.0, y, 1000.0, height)).with_style(ComputedStyle {
        background_color: Some(Color::rgb(230, 230, 230)),
        ..Default::default()
    })
}

fn body(height: f32, children: impl IntoIterator<Item = ContentNode>) -> ContentNode {
    ContentNode::element("body", Rect::new(0.0, 0.0, 1000.0, height)).with_children(children)
}

fn run(root: ContentNode, options: PdfOptions) -> (GeneratedPdf, ScriptedRenderer) {
    let mut renderer = ScriptedRenderer::new();
    let pdf = generate(&ContentDocument::new(root), options, &mut renderer).unwrap();
    (pdf, renderer)
}

fn output(pdf: &GeneratedPdf) -> String {
    String::from_utf8_lossy(&pdf.bytes).into_owned()
}

fn flagged(tag: &str, bounds: Rect, flags: DataFlags) -> ContentNode {
    ContentNode::element(tag, bounds).with_flags(flags)
}

#[test]
fn test_single_page_document() {
    let root = body(200.0, [para("p", 0.0, 20.0, "Hello world")]);
    let (pdf, renderer) = run(root, options().with_title("Greeting"));

    assert_eq!(pdf.page_count(), 1);
    assert_eq!(pdf.filename, "document.pdf");
    let out = output(&pdf);
    assert!(out.starts_with("%PDF-"));
    assert!(out.contains("(Hello) Tj"));
    assert!(out.contains("(world) Tj"));
    assert!(out.contains("/Title (Greeting)"));
    assert!(out.contains("W n"));
    assert!(pdf.warnings.is_empty());
    // Pre-measured words need no measurement round trips
    assert_eq!(renderer.count("measure_text"), 0);
}

#[test]
fn test_empty_tree_still_has_a_page() {
    let (pdf, _) = run(body(100.0, []), options());
    assert_eq!(pdf.page_count(), 1);
    assert!(pdf.bookmarks.is_empty());
}

fn avoid_break_tree() -> ContentNode {
    let lines: Vec<Word> = (0..41).map(|i| Word::new(format!("w{}", i), 400.0)).collect();
    let kept = Rect::new(0.0, 600.0, 400.0, 820.0);
    let section = ContentNode::element("section", kept).with_child(ContentNode::text(
        TextContent::new(lines, 10.0),
        kept,
        ComputedStyle {
            line_height: Some(20.0),
            ..Default::default()
        },
    ));
    body(2020.0, [block(0.0, 600.0), section, block(1420.0, 600.0)])
}

#[test]
fn test_avoid_break_moves_whole_box() {
    let (pdf, _) = run(avoid_break_tree(), options().with_avoid_break("section"));
    assert_eq!(pdf.page_count(), 3);
    assert_eq!(pdf.pages[0].y_end, 600.0);
    assert_eq!(pdf.pages[1].y_start, 600.0);
    assert_eq!(pdf.pages[2].y_start, 1420.0);
}

#[test]
fn test_without_avoid_break_lines_split() {
    let (pdf, _) = run(avoid_break_tree(), options());
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[1].y_start, 1400.0);
}

#[test]
fn test_page_number_of_later_element() {
    let placeholder = flagged(
        "span",
        Rect::new(0.0, 0.0, 100.0, 20.0),
        DataFlags {
            page_number_for: Some("target".to_string()),
            ..Default::default()
        },
    )
    .with_child(text("?", Rect::new(0.0, 0.0, 100.0, 20.0)));
    let target = block(2820.0, 80.0).with_element_id("target");
    let root = body(
        2900.0,
        [placeholder, block(20.0, 1400.0), block(1420.0, 1400.0), target],
    );

    let (pdf, renderer) = run(root, options());
    assert_eq!(pdf.page_count(), 4);
    let out = output(&pdf);
    assert!(out.contains("(4) Tj"));
    assert!(!out.contains("(?) Tj"));
    assert_eq!(renderer.count("measure_text"), 1);
    assert!(pdf.warnings.is_empty());
}

#[test]
fn test_unresolved_page_number_keeps_text() {
    let placeholder = flagged(
        "span",
        Rect::new(0.0, 0.0, 100.0, 20.0),
        DataFlags {
            page_number_for: Some("nowhere".to_string()),
            ..Default::default()
        },
    )
    .with_child(text("?", Rect::new(0.0, 0.0, 100.0, 20.0)));

    let (pdf, _) = run(body(100.0, [placeholder]), options());
    assert!(output(&pdf).contains("(?) Tj"));
    assert_eq!(
        pdf.warnings,
        vec![LayoutWarning::UnresolvedReference {
            target: "nowhere".to_string()
        }]
    );
}

#[test]
fn test_skipped_heading_level_fails() {
    let root = body(
        100.0,
        [para("h1", 0.0, 40.0, "Title"), para("h3", 40.0, 30.0, "Deep")],
    );
    let err = generate(&ContentDocument::new(root), options(), ScriptedRenderer::new()).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::OutlineHierarchy { level: 3, deepest: 1, .. }
    ));
}

#[test]
fn test_outline_from_headings() {
    let root = body(
        2000.0,
        [
            para("h1", 0.0, 40.0, "Guide"),
            para("h2", 100.0, 30.0, "Setup"),
            para("h3", 200.0, 20.0, "Install"),
            para("h2", 1500.0, 30.0, "Usage"),
        ],
    );
    let (pdf, _) = run(root, options());

    assert_eq!(pdf.bookmarks.len(), 1);
    let guide = &pdf.bookmarks[0];
    assert_eq!(guide.title, "Guide");
    assert_eq!(guide.page_number, 1);
    assert_eq!(guide.top, 750.0);
    assert_eq!(guide.children.len(), 2);
    assert_eq!(guide.children[0].children[0].title, "Install");
    let usage = &guide.children[1];
    assert_eq!(usage.page_number, 2);
    assert_eq!(usage.top, 750.0);

    let out = output(&pdf);
    assert!(out.contains("/Type /Outlines"));
    assert!(out.contains("/PageMode /UseOutlines"));
}

#[test]
fn test_outline_disabled_and_opt_out() {
    let opted_out = para("h1", 0.0, 40.0, "Hidden").with_flags(DataFlags {
        no_outline: true,
        ..Default::default()
    });
    let root = body(200.0, [opted_out, para("h1", 50.0, 40.0, "Shown")]);
    let (pdf, _) = run(root.clone(), options());
    assert_eq!(pdf.bookmarks.len(), 1);
    assert_eq!(pdf.bookmarks[0].title, "Shown");

    let (pdf, _) = run(root, options().with_outline(false));
    assert!(pdf.bookmarks.is_empty());
    assert!(!output(&pdf).contains("/PageMode"));
}

#[test]
fn test_explicit_page_mode_and_layout() {
    let root = body(100.0, [para("h1", 0.0, 40.0, "Title")]);
    let options = options()
        .with_page_mode(PageMode::UseThumbs)
        .with_page_layout(PageLayout::TwoColumnLeft);
    let (pdf, _) = run(root, options);
    let out = output(&pdf);
    assert!(out.contains("/PageMode /UseThumbs"));
    assert!(!out.contains("/PageMode /UseOutlines"));
    assert!(out.contains("/PageLayout /TwoColumnLeft"));
}

#[test]
fn test_break_before_skips_empty_first_page() {
    let root = body(
        200.0,
        [para("section", 0.0, 100.0, "One"), para("section", 100.0, 100.0, "Two")],
    );
    let (pdf, _) = run(root, options().with_break_before("section"));
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[1].y_start, 100.0);
}

#[test]
fn test_break_after_leaves_trailing_page() {
    let root = body(100.0, [para("section", 0.0, 100.0, "Only")]);
    let (pdf, _) = run(root, options().with_break_after("section"));
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[1].y_start, 100.0);
}

/// Container with a red background around `children`
fn painted(tag: &str, y: f32, height: f32, children: impl IntoIterator<Item = ContentNode>) -> ContentNode {
    ContentNode::element(tag, Rect::new(0.0, y, 1000.0, height))
        .with_style(ComputedStyle {
            background_color: Some(Color::rgb(255, 0, 0)),
            ..Default::default()
        })
        .with_children(children)
}

const RED_FILL: &str = "1.0 0.0 0.0 rg";

#[test]
fn test_break_before_inside_painted_wrapper() {
    let main = painted(
        "main",
        0.0,
        200.0,
        [para("section", 0.0, 100.0, "One"), para("section", 100.0, 100.0, "Two")],
    );
    let (pdf, _) = run(body(200.0, [main]), options().with_break_before("section"));

    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[0].y_start, 0.0);
    assert_eq!(pdf.pages[0].y_end, 100.0);
    assert_eq!(pdf.pages[1].y_start, 100.0);
    // Wrapper painted once per page
    assert_eq!(output(&pdf).matches(RED_FILL).count(), 2);
}

#[test]
fn test_break_before_with_leading_gap_under_wrapper() {
    // First section starts below the wrapper's top; still no blank page
    let main = painted(
        "main",
        0.0,
        300.0,
        [para("section", 50.0, 100.0, "One"), para("section", 150.0, 100.0, "Two")],
    );
    let (pdf, _) = run(body(300.0, [main]), options().with_break_before("section"));
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[1].y_start, 150.0);
}

#[test]
fn test_break_after_inside_painted_wrapper() {
    let main = painted(
        "main",
        0.0,
        200.0,
        [para("section", 0.0, 100.0, "First"), para("p", 100.0, 100.0, "Next")],
    );
    let (pdf, _) = run(body(200.0, [main]), options().with_break_after("section"));

    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[1].y_start, 100.0);
    let out = output(&pdf);
    assert_eq!(out.matches(RED_FILL).count(), 2);
    assert!(out.contains("(Next) Tj"));
}

#[test]
fn test_avoid_break_under_painted_wrapper() {
    let wrapped = painted("main", 0.0, 2020.0, avoid_break_tree().children);
    let (pdf, _) = run(body(2020.0, [wrapped]), options().with_avoid_break("section"));

    assert_eq!(pdf.page_count(), 3);
    assert_eq!(pdf.pages[1].y_start, 600.0);
    assert_eq!(pdf.pages[2].y_start, 1420.0);
}

#[test]
fn test_avoid_break_as_first_content_stays_put() {
    // Only the wrapper is painted above the kept box; moving it would
    // leave page 1 without content
    let lines: Vec<Word> = (0..70).map(|i| Word::new(format!("w{}", i), 400.0)).collect();
    let kept = Rect::new(0.0, 100.0, 400.0, 1400.0);
    let section = ContentNode::element("section", kept).with_child(ContentNode::text(
        TextContent::new(lines, 10.0),
        kept,
        ComputedStyle {
            line_height: Some(20.0),
            ..Default::default()
        },
    ));
    let main = painted("main", 0.0, 1600.0, [section]);

    let (pdf, _) = run(body(1600.0, [main]), options().with_avoid_break("section"));
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[0].y_start, 0.0);
    assert_eq!(pdf.pages[1].y_start, 1400.0);
    let out = output(&pdf);
    assert!(out.contains("(w0) Tj"));
    assert!(out.contains("(w69) Tj"));
}

#[test]
fn test_disabled_header_flows_as_content() {
    let masthead = flagged(
        "header",
        Rect::new(0.0, 0.0, 1000.0, 40.0),
        DataFlags {
            header_template: true,
            ..Default::default()
        },
    )
    .with_child(text("Masthead", Rect::new(0.0, 0.0, 1000.0, 20.0)));
    let root = body(100.0, [masthead, para("p", 40.0, 20.0, "Body")]);

    let mut options = options();
    options.header = false;
    let (pdf, _) = run(root, options);

    assert_eq!(pdf.page_count(), 1);
    assert_eq!(pdf.pages[0].header_height, 0.0);
    let out = output(&pdf);
    assert_eq!(out.matches("(Masthead) Tj").count(), 1);
    assert!(out.contains("(Body) Tj"));
}

#[test]
fn test_ignored_subtrees() {
    let root = body(
        300.0,
        [
            para("div", 0.0, 20.0, "Secret").with_class("no-print"),
            para("aside", 20.0, 20.0, "Hidden"),
            para("p", 40.0, 20.0, "Visible"),
        ],
    );
    let options = options().with_ignore_class("no-print").with_ignore_tag("ASIDE");
    let (pdf, _) = run(root, options);
    let out = output(&pdf);
    assert!(out.contains("(Visible) Tj"));
    assert!(!out.contains("(Secret)"));
    assert!(!out.contains("(Hidden)"));
}

#[test]
fn test_unsupported_element_warns() {
    let canvas = ContentNode::element("canvas", Rect::new(0.0, 0.0, 300.0, 150.0));
    let (pdf, renderer) = run(body(200.0, [canvas, para("p", 150.0, 20.0, "After")]), options());
    assert_eq!(
        pdf.warnings,
        vec![LayoutWarning::UnsupportedElement {
            tag: "canvas".to_string()
        }]
    );
    assert_eq!(renderer.count("rasterize"), 0);
    assert!(output(&pdf).contains("(After) Tj"));
}

#[test]
fn test_links() {
    let link = |y: f32, href: &str| para("a", y, 20.0, "link").with_href(href);
    let root = body(
        1600.0,
        [
            link(0.0, "#details"),
            link(20.0, "#missing"),
            link(40.0, "https://example.com/docs"),
            block(1500.0, 100.0).with_element_id("details"),
        ],
    );
    let (pdf, _) = run(root, options().with_link_border(Color::rgb(0, 0, 255), 1.0));

    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.links.len(), 2);
    let internal = &pdf.links[0];
    assert_eq!(internal.source_page, 1);
    assert_eq!(internal.destination_page, Some(2));
    assert_eq!(internal.destination_top, Some(750.0));
    assert_eq!(
        pdf.links[1].target,
        LinkTarget::External("https://example.com/docs".to_string())
    );
    assert_eq!(
        pdf.warnings,
        vec![LayoutWarning::UnresolvedLink {
            target: "missing".to_string()
        }]
    );

    let out = output(&pdf);
    assert_eq!(out.matches("/Subtype /Link").count(), 2);
    assert!(out.contains("/S /URI"));
    assert!(out.contains("(https://example.com/docs)"));
    assert!(out.contains("/XYZ"));
    assert!(out.contains("/Border"));
}

#[test]
fn test_identical_font_files_embedded_once() {
    let styled = |family: &str, y: f32, content: &str| {
        let bounds = Rect::new(0.0, y, 1000.0, 20.0);
        ContentNode::text(
            words(content),
            bounds,
            ComputedStyle {
                font_family: family.to_string(),
                ..Default::default()
            },
        )
    };
    let document = ContentDocument::new(body(
        100.0,
        [styled("Alpha", 0.0, "first"), styled("Beta", 20.0, "second")],
    ))
    .with_font_faces(vec![
        FontFace::new("Alpha", 400, FontStyle::Normal, "fonts/alpha.ttf"),
        FontFace::new("Beta", 400, FontStyle::Normal, "fonts/beta.ttf"),
    ]);
    let mut renderer = ScriptedRenderer::new()
        .with_font_bytes("fonts/alpha.ttf", vec![7; 32])
        .with_font_bytes("fonts/beta.ttf", vec![7; 32]);

    let pdf = generate(&document, options(), &mut renderer).unwrap();
    assert_eq!(renderer.count("load_font"), 2);
    assert_eq!(output(&pdf).matches("/FontFile2").count(), 1);
}

#[test]
fn test_failed_font_falls_back_with_warning() {
    let bounds = Rect::new(0.0, 0.0, 1000.0, 20.0);
    let node = ContentNode::text(
        words("fallback"),
        bounds,
        ComputedStyle {
            font_family: "Brand, serif".to_string(),
            ..Default::default()
        },
    );
    let document = ContentDocument::new(body(100.0, [node])).with_font_faces(vec![FontFace::new(
        "Brand",
        400,
        FontStyle::Normal,
        "brand.ttf",
    )]);
    let mut renderer = ScriptedRenderer::new();
    renderer.failing_fonts.push("brand.ttf".to_string());

    let pdf = generate(&document, options(), &mut renderer).unwrap();
    assert!(matches!(
        &pdf.warnings[..],
        [LayoutWarning::FontFallback { source, .. }] if source == "brand.ttf"
    ));
    let out = output(&pdf);
    assert!(out.contains("/BaseFont /Times-Roman"));
    assert!(!out.contains("/FontFile2"));
}

#[test]
fn test_running_header_and_footer() {
    let number = flagged(
        "span",
        Rect::new(0.0, 5000.0, 200.0, 40.0),
        DataFlags {
            page_number: true,
            ..Default::default()
        },
    )
    .with_child(text("0", Rect::new(0.0, 5000.0, 200.0, 40.0)));
    let header = flagged(
        "header",
        Rect::new(0.0, 5000.0, 1000.0, 100.0),
        DataFlags {
            header_template: true,
            ..Default::default()
        },
    )
    .with_child(number);
    let footer = flagged(
        "footer",
        Rect::new(0.0, 5200.0, 1000.0, 60.0),
        DataFlags {
            footer_template: true,
            ..Default::default()
        },
    )
    .with_child(text("Footer", Rect::new(0.0, 5200.0, 1000.0, 20.0)));
    let root = body(5260.0, [block(0.0, 1200.0), block(1200.0, 1200.0), header, footer]);

    let (pdf, _) = run(root, options());
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[0].header_height, 100.0);
    assert_eq!(pdf.pages[0].footer_height, 60.0);
    assert_eq!(pdf.pages[1].y_start, 1200.0);
    // 1400px less the reserved 160px
    assert_eq!(pdf.pages[1].y_end, 2440.0);

    let out = output(&pdf);
    assert!(out.contains("(1) Tj"));
    assert!(out.contains("(2) Tj"));
    assert!(!out.contains("(0) Tj"));
    assert_eq!(out.matches("(Footer) Tj").count(), 2);
}

#[test]
fn test_header_skipped_on_first_page() {
    let header = flagged(
        "header",
        Rect::new(0.0, 5000.0, 1000.0, 100.0),
        DataFlags {
            header_template: true,
            ..Default::default()
        },
    )
    .with_child(text("Running", Rect::new(0.0, 5000.0, 1000.0, 20.0)));
    let root = body(5100.0, [block(0.0, 1400.0), block(1400.0, 100.0), header]);

    let (pdf, _) = run(root, options().with_header_footer_on_first_page(false));
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(pdf.pages[0].header_height, 0.0);
    assert_eq!(pdf.pages[1].header_height, 100.0);
    assert_eq!(output(&pdf).matches("(Running) Tj").count(), 1);
}

#[test]
fn test_tall_image_sliced_across_pages() {
    let image = ContentNode::element("img", Rect::new(0.0, 0.0, 1000.0, 3000.0));
    let (pdf, renderer) = run(body(3000.0, [image]), options());

    assert_eq!(pdf.page_count(), 3);
    assert_eq!(pdf.pages[1].y_start, 1400.0);
    assert_eq!(pdf.pages[2].y_start, 2800.0);
    assert_eq!(renderer.count("rasterize"), 1);
    assert_eq!(output(&pdf).matches("/Im1 Do").count(), 3);
}

#[test]
fn test_container_background_repeats_on_continued_pages() {
    let lines: Vec<ContentNode> = (0..3)
        .map(|i| para("p", i as f32 * 1000.0, 20.0, "line"))
        .collect();
    let panel = ContentNode::element("div", Rect::new(0.0, 0.0, 1000.0, 2100.0))
        .with_style(ComputedStyle {
            background_color: Some(Color::rgb(255, 0, 0)),
            ..Default::default()
        })
        .with_children(lines);

    let (pdf, _) = run(body(2100.0, [panel]), options());
    assert_eq!(pdf.page_count(), 2);
    assert_eq!(output(&pdf).matches("1.0 0.0 0.0 rg").count(), 2);
}

#[test]
fn test_invalid_config_rejected() {
    let result = LayoutEngine::new(
        options().with_margin(Margin::Uniform(-5.0)),
        ScriptedRenderer::new(),
    );
    assert!(matches!(result, Err(LayoutError::InvalidConfig(_))));

    let zero_width = ContentNode::element("body", Rect::new(0.0, 0.0, 0.0, 100.0));
    let mut options = options();
    options.viewport_width = None;
    let err = generate(&ContentDocument::new(zero_width), options, ScriptedRenderer::new())
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidConfig(_)));
}

#[test]
fn test_renderer_protocol_violation() {
    let placeholder = flagged(
        "span",
        Rect::new(0.0, 0.0, 100.0, 20.0),
        DataFlags {
            page_number: true,
            ..Default::default()
        },
    );
    let mut renderer = ScriptedRenderer::new();
    renderer.answer_wrong_kind = true;
    let image = ContentNode::element("img", Rect::new(0.0, 40.0, 100.0, 100.0));

    let err = generate(
        &ContentDocument::new(body(200.0, [placeholder, image])),
        options(),
        &mut renderer,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        LayoutError::UnexpectedResponse {
            expected: "rasterize",
            ..
        }
    ));
}

#[test]
fn test_json_input() {
    let document = ContentDocument::from_json(
        r##"{
            "root": {
                "tag": "body",
                "bounds": {"x": 0, "y": 0, "width": 1000, "height": 200},
                "children": [{
                    "tag": "#text",
                    "bounds": {"x": 0, "y": 0, "width": 1000, "height": 20},
                    "text": {"words": [{"text": "Hello", "width": 40}], "spaceWidth": 4}
                }]
            }
        }"##,
    )
    .unwrap();
    let options = PdfOptions::from_json(
        r#"{
            "pageSize": {"width": 600, "height": 800},
            "margin": 50,
            "viewportWidth": 1000,
            "compress": false,
            "title": "From JSON",
            "filename": "json.pdf"
        }"#,
    )
    .unwrap();

    let pdf = generate(&document, options, ScriptedRenderer::new()).unwrap();
    assert_eq!(pdf.filename, "json.pdf");
    let out = output(&pdf);
    assert!(out.contains("(Hello) Tj"));
    assert!(out.contains("/Title (From JSON)"));
    assert!(out.contains("/MediaBox [0.0 0.0 600.0 800.0]"));
}

#[test]
fn test_report_serializes() {
    let root = body(100.0, [para("h1", 0.0, 40.0, "Title"), ContentNode::element("video", Rect::default())]);
    let (pdf, _) = run(root, options());
    let pages = serde_json::to_value(&pdf.pages).unwrap();
    assert_eq!(pages[0]["pageNumber"], 1);
    let warnings = serde_json::to_value(&pdf.warnings).unwrap();
    assert_eq!(warnings[0]["kind"], "unsupportedElement");
    assert_eq!(warnings[0]["tag"], "video");
}
