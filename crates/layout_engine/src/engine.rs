//! Single-pass layout engine
//!
//! Walks the content tree once, in document order, and paints every node
//! onto the page its top edge lands on. Page breaks are decided box by box:
//! text lines and leaf boxes either fit, move to a fresh page, or (when
//! taller than a page) are sliced across pages. Containers are split at
//! their children, and their fills and decorations are repainted on every
//! page they continue on.
//!
//! Page numbers of other elements and fragment links are collected in a
//! deferred queue and resolved once the last page exists.

use crate::bridge::RendererBridge;
use crate::config::PdfOptions;
use crate::deferred::{
    DeferredQueue, LinkBorder, LinkTarget, PendingLink, PendingPageNumber, ResolvedLink,
};
use crate::font_binding::{BoundFont, FontBinder};
use crate::header_footer::{RunningTemplate, RunningTemplates, TemplateKind};
use crate::layout_tree::{Frame, PageGeometry, PageRecord, PageSummary};
use crate::line_breaker::pack_words;
use crate::outline::{Bookmark, OutlineBuilder};
use crate::paginator::{BreakDecision, Paginator};
use crate::{LayoutError, LayoutWarning, Result};
use content_tree::{
    Color, ComputedStyle, ContentDocument, ContentNode, FontSpec, NodeId, RasterTarget, Rect,
    Renderer, TextAlign,
};
use pdf_model::{
    xyz_destination, ContentStream, ImageData, ImageManager, ImageResource, OutlineEntry,
    PageMode, PdfDictionary, PdfDocument, PdfObject, StructureDictionary,
};
use std::collections::{BTreeMap, HashMap};

/// Elements the engine cannot express; hidden with a warning
pub const UNSUPPORTED_TAGS: &[&str] = &[
    "canvas", "video", "audio", "iframe", "object", "embed", "svg", "script", "noscript",
    "template", "dialog",
];

/// Result of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub pages: Vec<PageSummary>,
    pub bookmarks: Vec<Bookmark>,
    pub links: Vec<ResolvedLink>,
    pub warnings: Vec<LayoutWarning>,
}

impl GeneratedPdf {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Produces exactly one document, then is gone
pub struct LayoutEngine<R> {
    options: PdfOptions,
    renderer: R,
}

impl<R: Renderer> LayoutEngine<R> {
    pub fn new(options: PdfOptions, renderer: R) -> Result<Self> {
        options.validate()?;
        Ok(Self { options, renderer })
    }

    pub fn generate(self, document: &ContentDocument) -> Result<GeneratedPdf> {
        let root = &document.root;
        let viewport_width = self.options.viewport_width.unwrap_or(root.bounds.width);
        if viewport_width <= 0.0 || !viewport_width.is_finite() {
            return Err(LayoutError::InvalidConfig(
                "content root has no width and no viewport width is configured".to_string(),
            ));
        }

        let geometry = PageGeometry::new(
            self.options.page_size.media_box(),
            self.options.margin.edges(),
            root.bounds.x,
            viewport_width,
        );
        tracing::info!(
            filename = %self.options.filename,
            viewport_width,
            scale = geometry.scale,
            "layout started"
        );

        let mut doc = PdfDocument::new(self.options.pdf_version);
        doc.set_compression(self.options.compress);
        let info = doc.info_mut();
        info.title = self.options.title.clone();
        info.author = self.options.author.clone();
        info.subject = self.options.subject.clone();
        info.keywords = self.options.keywords.clone();

        let mut state = LayoutState {
            options: &self.options,
            geometry,
            root_top: root.bounds.y,
            doc,
            bridge: RendererBridge::new(self.renderer),
            fonts: FontBinder::new(document.font_faces.clone()),
            images: ImageManager::new(),
            templates: RunningTemplates::capture(root, &self.options),
            paginator: Paginator::new(),
            pages: Vec::new(),
            outline: OutlineBuilder::new(),
            deferred: DeferredQueue::new(),
            ancestors: Vec::new(),
            open_boxes: Vec::new(),
            rasters: HashMap::new(),
            warnings: Vec::new(),
        };
        state.visit(root)?;
        state.finish()
    }
}

/// Run the engine over `document`
pub fn generate<R: Renderer>(
    document: &ContentDocument,
    options: PdfOptions,
    renderer: R,
) -> Result<GeneratedPdf> {
    LayoutEngine::new(options, renderer)?.generate(document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    /// Main flow, clipped to the content area
    Content,
    /// Running templates and late drawing
    Overlay,
}

/// A painted box whose paint continues on following pages
#[derive(Debug, Clone)]
struct OpenBox {
    node: NodeId,
    bounds: Rect,
    background: Option<Color>,
    raster: Option<RasterTarget>,
}

impl OpenBox {
    fn new(node: &ContentNode, raster: Option<RasterTarget>) -> Self {
        Self {
            node: node.id,
            bounds: node.bounds,
            background: node.style.background_color.filter(|c| !c.is_transparent()),
            raster,
        }
    }

    fn for_element(node: &ContentNode) -> Self {
        let raster = node
            .style
            .needs_rasterization()
            .then_some(RasterTarget::Decoration);
        Self::new(node, raster)
    }

    fn paints(&self) -> bool {
        self.background.is_some() || self.raster.is_some()
    }
}

fn is_unsupported(node: &ContentNode) -> bool {
    UNSUPPORTED_TAGS.contains(&node.tag.as_str())
}

/// Text style of a placeholder: its first text node, else its own
fn label_style(node: &ContentNode) -> ComputedStyle {
    node.first_text_node()
        .map(|text| text.style.clone())
        .unwrap_or_else(|| node.style.clone())
}

struct LayoutState<'a, R> {
    options: &'a PdfOptions,
    geometry: PageGeometry,
    root_top: f32,
    doc: PdfDocument,
    bridge: RendererBridge<R>,
    fonts: FontBinder,
    images: ImageManager,
    templates: RunningTemplates,
    paginator: Paginator,
    pages: Vec<PageRecord>,
    outline: OutlineBuilder,
    deferred: DeferredQueue,
    /// Element ids from the root to the node being visited
    ancestors: Vec<NodeId>,
    /// Painted containers still being traversed
    open_boxes: Vec<OpenBox>,
    rasters: HashMap<NodeId, ImageResource>,
    warnings: Vec<LayoutWarning>,
}

impl<'a, R: Renderer> LayoutState<'a, R> {
    // =========================================================================
    // Pages
    // =========================================================================

    fn template_heights(&self, page_number: usize) -> (f32, f32) {
        let (header, footer) = self.templates.active(&self.ancestors, page_number);
        (
            header.map_or(0.0, RunningTemplate::height),
            footer.map_or(0.0, RunningTemplate::height),
        )
    }

    /// Height a page created now would offer
    fn next_capacity(&self) -> f32 {
        let (header, footer) = self.template_heights(self.pages.len() + 1);
        self.geometry.capacity(header, footer)
    }

    fn current_page(&self) -> Result<usize> {
        self.pages
            .len()
            .checked_sub(1)
            .ok_or_else(|| LayoutError::InvalidConfig("no page has been started".to_string()))
    }

    /// Whether text or a leaf box has been placed on the current page;
    /// repainted or opened container backgrounds do not count
    fn current_has_content(&self) -> bool {
        self.pages.last().is_some_and(|page| page.has_content)
    }

    /// Whether a forced break at `top` would leave flow content behind
    fn can_break_at(&self, top: f32) -> bool {
        self.current_has_content()
            && self
                .paginator
                .current()
                .is_some_and(|window| top > window.y_start)
    }

    fn mark_content(&mut self, page: usize) {
        if let Some(record) = self.pages.get_mut(page) {
            record.has_content = true;
        }
    }

    /// Start the first page lazily, at the top of the canvas
    fn ensure_page(&mut self) -> Result<usize> {
        if self.pages.is_empty() {
            self.start_page(self.root_top)?;
        }
        self.current_page()
    }

    /// Open a new page showing the canvas from `y_start`
    fn start_page(&mut self, y_start: f32) -> Result<usize> {
        let page_number = self.pages.len() + 1;
        let (header, footer) = self.templates.active(&self.ancestors, page_number);
        let header = header.cloned();
        let footer = footer.cloned();
        let header_height = header.as_ref().map_or(0.0, RunningTemplate::height);
        let footer_height = footer.as_ref().map_or(0.0, RunningTemplate::height);

        let capacity = self.geometry.capacity(header_height, footer_height);
        if capacity <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "header ({}px) and footer ({}px) leave no room for content",
                header_height, footer_height
            )));
        }

        let index = self.paginator.start_page(y_start, capacity);
        if let Some(previous) = index.checked_sub(1) {
            let window = self.paginator.windows()[previous];
            self.pages[previous].y_end = window.y_end;
        }

        let page_ref = self.doc.add_page(self.geometry.media_box)?;
        self.pages.push(PageRecord {
            page_ref,
            page_number,
            y_start,
            y_end: y_start + capacity,
            header_height,
            footer_height,
            frame: self.geometry.content_frame(y_start, header_height),
            content: ContentStream::new(),
            overlay: ContentStream::new(),
            resources: BTreeMap::new(),
            annotations: Vec::new(),
            has_content: false,
        });
        tracing::debug!(page = page_number, y_start, capacity, "page started");

        for template in header.iter().chain(footer.iter()) {
            self.paint_template(index, template)?;
        }

        // Containers that continue onto this page
        let open: Vec<OpenBox> = self
            .open_boxes
            .iter()
            .filter(|b| b.bounds.bottom() > y_start)
            .cloned()
            .collect();
        let frame = self.pages[index].frame;
        for open_box in &open {
            self.paint_box(index, Layer::Content, &frame, open_box)?;
        }
        Ok(index)
    }

    /// Make room for a box spanning `top..bottom` on the current page
    fn make_room(&mut self, top: f32, bottom: f32) -> Result<usize> {
        self.ensure_page()?;
        match self.paginator.decide(top, bottom, self.next_capacity()) {
            BreakDecision::Fits => self.current_page(),
            BreakDecision::MoveToNextPage => self.start_page(top),
            BreakDecision::Slice => match self.paginator.current() {
                Some(window) if top >= window.y_end => self.start_page(top),
                _ => self.current_page(),
            },
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    fn visit(&mut self, node: &ContentNode) -> Result<()> {
        if node.is_text() {
            return self.place_text(node);
        }
        if self.options.is_ignored(node) {
            tracing::trace!(tag = %node.tag, "ignored subtree skipped");
            return Ok(());
        }
        if self.templates.is_template_node(node) {
            return Ok(());
        }
        if is_unsupported(node) {
            let warning = LayoutWarning::UnsupportedElement {
                tag: node.tag.clone(),
            };
            tracing::warn!(%warning, "element hidden");
            self.warnings.push(warning);
            return Ok(());
        }

        self.ancestors.push(node.id);
        let result = self.visit_element(node);
        self.ancestors.pop();
        result
    }

    fn visit_element(&mut self, node: &ContentNode) -> Result<()> {
        let top = node.bounds.y;
        let bottom = node.bounds.bottom();

        if self.options.breaks_before(node) && self.can_break_at(top) {
            self.start_page(top)?;
        }
        if self.options.avoids_break(node)
            && self.can_break_at(top)
            && self
                .paginator
                .should_keep_together(top, bottom, self.next_capacity())
        {
            tracing::debug!(tag = %node.tag, top, bottom, "kept together on a new page");
            self.start_page(top)?;
        }

        if let Some(id) = &node.element_id {
            self.deferred.record_anchor(id, top);
        }
        if self.options.outline && !node.flags.no_outline {
            if let Some(level) = node.heading_level() {
                let title = node.text_content();
                if !title.is_empty() {
                    self.outline.push(level, title, top)?;
                }
            }
        }

        if node.flags.page_number || node.flags.page_number_for.is_some() {
            self.place_page_number(node)?;
        } else if node.tag == "img" {
            self.place_leaf(node, OpenBox::new(node, Some(RasterTarget::Replaced)))?;
        } else {
            let open_box = OpenBox::for_element(node);
            if node.children.is_empty() {
                if open_box.paints() {
                    self.place_leaf(node, open_box)?;
                }
            } else {
                self.place_container(node, open_box)?;
            }
        }

        if let Some(href) = &node.href {
            self.collect_link(node, href)?;
        }
        if self.options.breaks_after(node) {
            self.start_page(bottom)?;
        }
        Ok(())
    }

    fn place_container(&mut self, node: &ContentNode, open_box: OpenBox) -> Result<()> {
        let painted = open_box.paints();
        if painted {
            self.ensure_page()?;
            if let Some(window) = self.paginator.current() {
                if node.bounds.y >= window.y_end {
                    self.start_page(node.bounds.y)?;
                }
            }
            let page = self.current_page()?;
            let frame = self.pages[page].frame;
            self.paint_box(page, Layer::Content, &frame, &open_box)?;
            self.open_boxes.push(open_box);
        }

        let result = node.children.iter().try_for_each(|child| self.visit(child));
        if painted {
            self.open_boxes.pop();
        }
        result
    }

    /// A box without children; sliced across pages when taller than one
    fn place_leaf(&mut self, node: &ContentNode, open_box: OpenBox) -> Result<()> {
        let bottom = node.bounds.bottom();
        let page = self.make_room(node.bounds.y, bottom)?;
        let frame = self.pages[page].frame;
        self.paint_box(page, Layer::Content, &frame, &open_box)?;
        self.mark_content(page);

        let mut window_end = self.pages[page].y_end;
        if bottom > window_end {
            self.open_boxes.push(open_box);
            while bottom > window_end {
                let next = self.start_page(window_end)?;
                self.mark_content(next);
                window_end = self.pages[next].y_end;
            }
            self.open_boxes.pop();
        }
        Ok(())
    }

    fn place_text(&mut self, node: &ContentNode) -> Result<()> {
        let Some(text) = &node.text else {
            return Ok(());
        };
        let style = &node.style;
        let lines = pack_words(&text.words, text.space_width, node.bounds.width, style.text_align);
        if lines.is_empty() {
            return Ok(());
        }
        let font = self.bind_font(style)?;
        let line_height = style.effective_line_height();

        for (i, line) in lines.iter().enumerate() {
            let top = node.bounds.y + i as f32 * line_height;
            let page = self.make_room(top, top + line_height)?;
            let frame = self.pages[page].frame;
            let baseline = top + (line_height - style.font_size) / 2.0 + font.ascent * style.font_size;
            let words: Vec<(f32, &str)> = line
                .words
                .iter()
                .map(|w| (node.bounds.x + w.x, w.text.as_str()))
                .collect();
            self.draw_words(page, Layer::Content, &frame, &font, style, baseline, &words);
            self.mark_content(page);
        }
        Ok(())
    }

    fn place_page_number(&mut self, node: &ContentNode) -> Result<()> {
        let page = self.make_room(node.bounds.y, node.bounds.bottom())?;
        let frame = self.pages[page].frame;
        let style = label_style(node);
        match &node.flags.page_number_for {
            Some(target) => self.deferred.defer_page_number(PendingPageNumber {
                page,
                frame,
                bounds: node.bounds,
                style,
                target: target.clone(),
                fallback: node.text_content(),
            }),
            None => {
                let number = self.pages[page].page_number.to_string();
                self.draw_label(page, Layer::Content, &frame, &node.bounds, &style, &number)?;
            }
        }
        self.mark_content(page);
        Ok(())
    }

    fn collect_link(&mut self, node: &ContentNode, href: &str) -> Result<()> {
        let Some(target) = LinkTarget::from_href(href) else {
            return Ok(());
        };
        self.ensure_page()?;
        let page = self.paginator.locate(node.bounds.y).unwrap_or(0);
        let rect = self.pages[page].frame.rect(&node.bounds);
        let border = LinkBorder {
            color: node.flags.link_border_color.or(self.options.link_border_color),
            width: node
                .flags
                .link_border_width
                .unwrap_or(self.options.link_border_width),
        };
        self.deferred.defer_link(PendingLink {
            page,
            rect,
            target,
            border,
        });
        Ok(())
    }

    // =========================================================================
    // Painting
    // =========================================================================

    fn bind_font(&mut self, style: &ComputedStyle) -> Result<BoundFont> {
        self.fonts
            .bind(style, &mut self.doc, &mut self.bridge, &mut self.warnings)
    }

    fn stream(&mut self, page: usize, layer: Layer) -> &mut ContentStream {
        let record = &mut self.pages[page];
        match layer {
            Layer::Content => &mut record.content,
            Layer::Overlay => &mut record.overlay,
        }
    }

    /// Background fill, then rasterized decoration
    fn paint_box(&mut self, page: usize, layer: Layer, frame: &Frame, open_box: &OpenBox) -> Result<()> {
        let [x0, y0, x1, y1] = frame.rect(&open_box.bounds);
        if let Some(background) = open_box.background {
            let (r, g, b) = background.flatten_on_white().to_unit_rgb();
            self.stream(page, layer)
                .save_state()
                .set_fill_rgb(r, g, b)
                .rect(x0, y0, x1 - x0, y1 - y0)
                .fill()
                .restore_state();
        }
        if let Some(target) = open_box.raster {
            let image = self.raster(open_box, target)?;
            self.pages[page].add_resource("XObject", &image.name, image.reference);
            self.stream(page, layer)
                .draw_image(&image.name, x0, y0, x1 - x0, y1 - y0);
        }
        Ok(())
    }

    /// Rasterize once per node; later pages reuse the image
    fn raster(&mut self, open_box: &OpenBox, target: RasterTarget) -> Result<ImageResource> {
        if let Some(image) = self.rasters.get(&open_box.node) {
            return Ok(image.clone());
        }
        let raster = self
            .bridge
            .rasterize(open_box.node, open_box.bounds, target)?;
        let data = ImageData::from_rgba_on_white(&raster.rgba, raster.width, raster.height)?;
        let image = self.images.add(&mut self.doc, &data);
        self.rasters.insert(open_box.node, image.clone());
        Ok(image)
    }

    fn draw_words(
        &mut self,
        page: usize,
        layer: Layer,
        frame: &Frame,
        font: &BoundFont,
        style: &ComputedStyle,
        baseline: f32,
        words: &[(f32, &str)],
    ) {
        if words.is_empty() || style.color.is_transparent() {
            return;
        }
        self.pages[page].add_resource("Font", &font.resource.name, font.resource.reference);
        let (r, g, b) = style.color.flatten_on_white().to_unit_rgb();
        let y = frame.y(baseline);
        let stream = self.stream(page, layer);
        stream
            .set_fill_rgb(r, g, b)
            .begin_text()
            .set_font(&font.resource.name, frame.length(style.font_size));
        // Td is relative to the previous word's origin
        let mut previous_x = 0.0;
        for (i, (x, text)) in words.iter().enumerate() {
            let x = frame.x(*x);
            stream.move_text(x - previous_x, if i == 0 { y } else { 0.0 });
            stream.show_text(text);
            previous_x = x;
        }
        stream.end_text();
    }

    /// A single replaced string aligned inside `bounds`
    fn draw_label(
        &mut self,
        page: usize,
        layer: Layer,
        frame: &Frame,
        bounds: &Rect,
        style: &ComputedStyle,
        text: &str,
    ) -> Result<()> {
        let font = self.bind_font(style)?;
        let spec = FontSpec {
            family: style.font_families().next().unwrap_or("Helvetica").to_string(),
            weight: style.font_weight,
            style: style.font_style,
            size: style.font_size,
        };
        let width = self.bridge.measure_text(text, spec)?;
        let x = match style.text_align {
            TextAlign::Left | TextAlign::Justify => bounds.x,
            TextAlign::Center => bounds.x + (bounds.width - width) / 2.0,
            TextAlign::Right => bounds.right() - width,
        };
        let line_height = style.effective_line_height();
        let baseline = bounds.y + (line_height - style.font_size) / 2.0 + font.ascent * style.font_size;
        self.draw_words(page, layer, frame, &font, style, baseline, &[(x, text)]);
        Ok(())
    }

    fn paint_template(&mut self, page: usize, template: &RunningTemplate) -> Result<()> {
        let frame = match template.kind {
            TemplateKind::Header => self.geometry.header_frame(template.node.bounds.y),
            TemplateKind::Footer => self
                .geometry
                .footer_frame(template.node.bounds.y, template.height()),
        };
        self.paint_static(page, &template.node, &frame)
    }

    /// Paint a subtree at a fixed position, without page breaks
    fn paint_static(&mut self, page: usize, node: &ContentNode, frame: &Frame) -> Result<()> {
        if let Some(text) = &node.text {
            let lines = pack_words(&text.words, text.space_width, node.bounds.width, node.style.text_align);
            if lines.is_empty() {
                return Ok(());
            }
            let font = self.bind_font(&node.style)?;
            let line_height = node.style.effective_line_height();
            for (i, line) in lines.iter().enumerate() {
                let top = node.bounds.y + i as f32 * line_height;
                let baseline =
                    top + (line_height - node.style.font_size) / 2.0 + font.ascent * node.style.font_size;
                let words: Vec<(f32, &str)> = line
                    .words
                    .iter()
                    .map(|w| (node.bounds.x + w.x, w.text.as_str()))
                    .collect();
                self.draw_words(page, Layer::Overlay, frame, &font, &node.style, baseline, &words);
            }
            return Ok(());
        }
        if self.options.is_ignored(node) || is_unsupported(node) {
            return Ok(());
        }

        if node.flags.page_number || node.flags.page_number_for.is_some() {
            let style = label_style(node);
            match &node.flags.page_number_for {
                Some(target) => self.deferred.defer_page_number(PendingPageNumber {
                    page,
                    frame: *frame,
                    bounds: node.bounds,
                    style,
                    target: target.clone(),
                    fallback: node.text_content(),
                }),
                None => {
                    let number = self.pages[page].page_number.to_string();
                    self.draw_label(page, Layer::Overlay, frame, &node.bounds, &style, &number)?;
                }
            }
            return Ok(());
        }

        let open_box = if node.tag == "img" {
            OpenBox::new(node, Some(RasterTarget::Replaced))
        } else {
            OpenBox::for_element(node)
        };
        if open_box.paints() {
            self.paint_box(page, Layer::Overlay, frame, &open_box)?;
        }
        for child in &node.children {
            self.paint_static(page, child, frame)?;
        }
        Ok(())
    }

    // =========================================================================
    // Deferred resolution and output
    // =========================================================================

    fn page_of(&self, y: f32) -> Option<usize> {
        self.paginator.locate(y)
    }

    fn resolve_page_numbers(&mut self, pending: Vec<PendingPageNumber>) -> Result<()> {
        for placeholder in pending {
            let resolved = self
                .deferred
                .anchor(&placeholder.target)
                .and_then(|y| self.page_of(y));
            let text = match resolved {
                Some(index) => self.pages[index].page_number.to_string(),
                None => {
                    let warning = LayoutWarning::UnresolvedReference {
                        target: placeholder.target.clone(),
                    };
                    tracing::warn!(%warning, "placeholder left unresolved");
                    self.warnings.push(warning);
                    placeholder.fallback.clone()
                }
            };
            if text.is_empty() {
                continue;
            }
            self.draw_label(
                placeholder.page,
                Layer::Overlay,
                &placeholder.frame,
                &placeholder.bounds,
                &placeholder.style,
                &text,
            )?;
        }
        Ok(())
    }

    fn resolve_links(&mut self, pending: Vec<PendingLink>) -> Vec<ResolvedLink> {
        let version = self.doc.version();
        let mut resolved = Vec::with_capacity(pending.len());

        for link in pending {
            let mut annotation = StructureDictionary::annotation("Link", link.rect);
            let width = link.border.width as f64;
            annotation.set("Border", PdfObject::reals(&[0.0, 0.0, width]), version);
            if let Some(color) = link.border.color {
                let (r, g, b) = color.flatten_on_white().to_unit_rgb();
                annotation.set("C", PdfObject::reals(&[r, g, b]), version);
            }

            let mut entry = ResolvedLink {
                source_page: self.pages[link.page].page_number,
                rect: link.rect,
                target: link.target.clone(),
                destination_page: None,
                destination_top: None,
            };
            match &link.target {
                LinkTarget::Internal(id) => {
                    let Some((index, y)) = self
                        .deferred
                        .anchor(id)
                        .and_then(|y| self.page_of(y).map(|index| (index, y)))
                    else {
                        let warning = LayoutWarning::UnresolvedLink { target: id.clone() };
                        tracing::warn!(%warning, "link dropped");
                        self.warnings.push(warning);
                        continue;
                    };
                    let target_page = &self.pages[index];
                    let top = target_page.frame.y(y).min(target_page.frame.top);
                    annotation.set("Dest", xyz_destination(target_page.page_ref, None, top), version);
                    entry.destination_page = Some(target_page.page_number);
                    entry.destination_top = Some(top);
                }
                LinkTarget::External(uri) => {
                    let action = PdfDictionary::new()
                        .with("S", PdfObject::name("URI"))
                        .with("URI", PdfObject::string(uri.as_str()));
                    annotation.set("A", action, version);
                }
            }
            self.pages[link.page].annotations.push(annotation);
            resolved.push(entry);
        }
        resolved
    }

    fn resolve_bookmarks(&self, bookmarks: &mut [Bookmark]) {
        for root in bookmarks {
            root.walk_mut(&mut |bookmark| {
                let index = self.page_of(bookmark.y).unwrap_or(0);
                let page = &self.pages[index];
                bookmark.page_number = page.page_number;
                bookmark.top = page.frame.y(bookmark.y).min(page.frame.top);
            });
        }
    }

    fn outline_entries(&self, bookmarks: &[Bookmark]) -> Vec<OutlineEntry> {
        bookmarks
            .iter()
            .map(|bookmark| OutlineEntry {
                title: bookmark.title.clone(),
                page: self.pages[bookmark.page_number - 1].page_ref,
                top: bookmark.top,
                children: self.outline_entries(&bookmark.children),
            })
            .collect()
    }

    /// Clip the main flow to the content area, then the overlay on top
    fn page_stream(&self, page: &PageRecord) -> Vec<u8> {
        let margins = self.geometry.margins;
        let bottom = margins.bottom + page.footer_height as f64 * self.geometry.scale;
        let mut clip = ContentStream::new();
        clip.save_state()
            .rect(margins.left, bottom, self.geometry.content_width(), page.frame.top - bottom)
            .clip();

        let mut bytes = clip.into_bytes();
        bytes.extend_from_slice(page.content.as_bytes());
        let mut restore = ContentStream::new();
        restore.restore_state();
        bytes.extend_from_slice(restore.as_bytes());
        bytes.extend_from_slice(page.overlay.as_bytes());
        bytes
    }

    fn finish(mut self) -> Result<GeneratedPdf> {
        self.ensure_page()?;

        let (page_numbers, links) = self.deferred.drain();
        tracing::debug!(
            page_numbers = page_numbers.len(),
            links = links.len(),
            "draining deferred queue"
        );
        self.resolve_page_numbers(page_numbers)?;
        let links = self.resolve_links(links);

        let mut bookmarks = std::mem::take(&mut self.outline).finish();
        self.resolve_bookmarks(&mut bookmarks);
        let entries = self.outline_entries(&bookmarks);
        let has_outline = self.doc.set_outline(&entries)?.is_some();

        match self.options.page_mode {
            Some(mode) => {
                self.doc.set_page_mode(mode)?;
            }
            None if has_outline => {
                self.doc.set_page_mode(PageMode::UseOutlines)?;
            }
            None => {}
        }
        if let Some(layout) = self.options.page_layout {
            self.doc.set_page_layout(layout)?;
        }
        if !self.options.viewer_preferences.is_empty() {
            self.doc
                .set_viewer_preferences(self.options.viewer_preferences)?;
        }

        let pages = std::mem::take(&mut self.pages);
        for page in &pages {
            let content = self.page_stream(page);
            self.doc.set_page_contents(page.page_ref, content)?;
            for ((category, name), reference) in &page.resources {
                self.doc
                    .add_page_resource(page.page_ref, category, name, *reference)?;
            }
            for annotation in &page.annotations {
                self.doc.add_annotation(page.page_ref, annotation.clone())?;
            }
        }

        let bytes = self.doc.to_bytes()?;
        tracing::info!(
            pages = pages.len(),
            bytes = bytes.len(),
            fonts = self.fonts.font_count(),
            embedded_fonts = self.fonts.embedded_count(),
            warnings = self.warnings.len(),
            "pdf generated"
        );

        Ok(GeneratedPdf {
            bytes,
            filename: self.options.filename.clone(),
            pages: pages.iter().map(PageRecord::summary).collect(),
            bookmarks,
            links,
            warnings: self.warnings,
        })
    }
}
