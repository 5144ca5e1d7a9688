//! Running headers and footers
//!
//! The first node flagged as a header (or footer) template is captured once
//! and painted on every page at a fixed offset from the top (or bottom)
//! margin. Its height is taken from the main content area of each page
//! created while traversal is inside the template's parent element.

use crate::config::PdfOptions;
use content_tree::{ContentNode, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Header,
    Footer,
}

/// A captured header or footer subtree
#[derive(Debug, Clone, PartialEq)]
pub struct RunningTemplate {
    pub kind: TemplateKind,
    pub node: ContentNode,
    /// Structural parent; the reservation applies while inside it
    pub parent: NodeId,
}

impl RunningTemplate {
    pub fn height(&self) -> f32 {
        self.node.bounds.height.max(0.0)
    }
}

#[derive(Debug, Default)]
pub struct RunningTemplates {
    pub header: Option<RunningTemplate>,
    pub footer: Option<RunningTemplate>,
    on_first_page: bool,
}

impl RunningTemplates {
    /// Find the templates enabled by `options`
    pub fn capture(root: &ContentNode, options: &PdfOptions) -> Self {
        let mut templates = Self {
            header: None,
            footer: None,
            on_first_page: options.header_footer_on_first_page,
        };
        templates.visit(root, root.id, options);
        if let Some(header) = &templates.header {
            tracing::debug!(height = header.height(), "header template captured");
        }
        if let Some(footer) = &templates.footer {
            tracing::debug!(height = footer.height(), "footer template captured");
        }
        templates
    }

    fn visit(&mut self, node: &ContentNode, parent: NodeId, options: &PdfOptions) {
        if options.header && node.flags.header_template && self.header.is_none() {
            self.header = Some(RunningTemplate {
                kind: TemplateKind::Header,
                node: node.clone(),
                parent,
            });
            return;
        }
        if options.footer && node.flags.footer_template && self.footer.is_none() {
            self.footer = Some(RunningTemplate {
                kind: TemplateKind::Footer,
                node: node.clone(),
                parent,
            });
            return;
        }
        for child in &node.children {
            self.visit(child, node.id, options);
        }
    }

    /// Nodes captured as a running template rather than laid out in the
    /// flow. A flagged node whose template kind is disabled stays in the flow.
    pub fn is_template_node(&self, node: &ContentNode) -> bool {
        [&self.header, &self.footer]
            .into_iter()
            .flatten()
            .any(|template| template.node.id == node.id)
    }

    fn applies(&self, template: &RunningTemplate, ancestors: &[NodeId], page_number: usize) -> bool {
        (page_number > 1 || self.on_first_page) && ancestors.contains(&template.parent)
    }

    /// Header and footer for a page created with `ancestors` open
    pub fn active(
        &self,
        ancestors: &[NodeId],
        page_number: usize,
    ) -> (Option<&RunningTemplate>, Option<&RunningTemplate>) {
        let header = self
            .header
            .as_ref()
            .filter(|t| self.applies(t, ancestors, page_number));
        let footer = self
            .footer
            .as_ref()
            .filter(|t| self.applies(t, ancestors, page_number));
        (header, footer)
    }
}
