// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Report rendering: Tera templates to HTML, headless Chromium to PDF.

mod pdf;
mod stats;
mod template;

pub const CRATE_NAME: &str = "roster-render";

pub use pdf::{
    print_params, write_pdf, ChromiumRasterizer, RasterizeError, Rasterizer, RasterizerConfig,
    A4_HEIGHT_MM, A4_WIDTH_MM, PAGE_MARGIN_MM,
};
pub use stats::{format_currency, RosterStats};
pub use template::{
    build_context, RenderError, RenderedReport, ReportContext, TemplateRenderer, TemplateSource,
    DEFAULT_TEMPLATE_NAME, TEMPLATE_EXTENSION,
};
