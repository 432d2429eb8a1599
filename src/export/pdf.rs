use crate::errors::{AppError, AppResult};
use crate::export::model::{days_to_table, get_headers};
use crate::export::{Report, notify_export_success};
use crate::ui::messages::info;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs;
use std::path::Path;

type Rgb = (f32, f32, f32);

/// Light background of a status row, by status token.
fn tint_for(token: &str) -> Option<Rgb> {
    match token {
        "present" => Some((0.86, 0.95, 0.86)),
        "absent" => Some((0.98, 0.87, 0.87)),
        "pending-approval" => Some((0.99, 0.95, 0.80)),
        "regularized" => Some((0.86, 0.90, 0.98)),
        "shortage" => Some((0.95, 0.88, 0.96)),
        _ => None,
    }
}

/// Text bytes for the built-in Helvetica under WinAnsiEncoding.
///
/// Latin-1 maps byte for byte and a few typographic marks have their own
/// slot; anything else (Greek, Cyrillic, CJK...) has no glyph in the
/// standard font and is written as `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    page_refs: Vec<Ref>,
    current_content_id: Option<Ref>,

    page_w: f32,
    page_h: f32,
    margin: f32,
    row_h: f32,

    next_id: i32,
    font_id: Ref,

    font_size: f32,
    header_font_size: f32,
    title_font_size: f32,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfManager {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            page_refs: Vec::new(),
            current_content_id: None,

            page_w: 595.0,
            page_h: 842.0,
            margin: 50.0,
            row_h: 20.0,

            next_id: 4,
            font_id,

            font_size: 10.0,
            header_font_size: 11.0,
            title_font_size: 14.0,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, self.page_w, self.page_h))
            .contents(content_id);

        page.resources().fonts().pair(Name(b"F1"), self.font_id);

        self.current_content_id = Some(content_id);

        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn build_pages_tree(&mut self) {
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
    }

    fn draw_text(&self, content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
        content.begin_text();
        content.set_font(Name(b"F1"), size);
        content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
        content.show(Str(&win_ansi(text)));
        content.end_text();
    }

    fn fill_row(&self, content: &mut Content, y: f32, width: f32, (r, g, b): Rgb) {
        content.save_state();
        content.set_fill_rgb(r, g, b);
        content.rect(self.margin, y, width, self.row_h);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_row(&self, content: &mut Content, y: f32, col_widths: &[f32], row: &[String], size: f32) {
        let mut x = self.margin;

        for (text, w) in row.iter().zip(col_widths) {
            self.draw_text(content, x + 4.0, y + 5.0, size, text);

            content.save_state();
            content.set_stroke_rgb(0.65, 0.65, 0.65);
            content.rect(x, y, *w, self.row_h);
            content.stroke();
            content.restore_state();

            x += w;
        }
    }

    fn compute_col_widths(&self, headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
        let mut widths: Vec<f32> = headers.iter().map(|h| h.len() as f32 * 6.5 + 8.0).collect();

        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = w.max(cell.len() as f32 * 6.2 + 8.0);
            }
        }

        let total: f32 = widths.iter().sum();
        let max = self.page_w - 2.0 * self.margin;
        if total > max {
            let scale = max / total;
            for w in &mut widths {
                *w *= scale;
            }
        }

        widths
    }

    fn draw_page_header_footer(&self, content: &mut Content, title: &str, page: usize) {
        self.draw_text(
            content,
            self.margin,
            self.page_h - self.margin + 15.0,
            self.title_font_size,
            title,
        );

        self.draw_text(
            content,
            self.page_w - self.margin - 60.0,
            self.margin - 35.0,
            self.font_size,
            &format!("Page {page}"),
        );
    }

    /// Multi-page report: title and page number on every page, the meta
    /// lines on the first, then the status table with tinted rows.
    pub fn write_report(&mut self, report: &Report) {
        let title = report.title();
        let meta = report.meta_lines();
        let headers = get_headers();
        let rows = days_to_table(&report.days);
        let tints: Vec<Option<Rgb>> = report.days.iter().map(|d| tint_for(&d.token)).collect();

        let col_widths = self.compute_col_widths(&headers, &rows);
        let table_w: f32 = col_widths.iter().sum();
        let header_row: Vec<String> = headers.iter().map(|s| s.to_string()).collect();

        let mut start = 0;
        let mut page_idx = 1;

        // at least one page, even for a month with no elapsed day
        loop {
            let mut content = self.new_page();
            self.draw_page_header_footer(&mut content, &title, page_idx);

            let mut y = self.page_h - self.margin - 10.0;
            if page_idx == 1 {
                for line in &meta {
                    y -= 16.0;
                    self.draw_text(&mut content, self.margin, y, self.font_size, line);
                }
                y -= 14.0;
            }
            y -= self.row_h;

            self.fill_row(&mut content, y, table_w, (0.85, 0.87, 0.90));
            self.draw_row(&mut content, y, &col_widths, &header_row, self.header_font_size);
            y -= self.row_h;

            while start < rows.len() && y >= self.margin {
                if let Some(rgb) = tints[start] {
                    self.fill_row(&mut content, y, table_w, rgb);
                }
                self.draw_row(&mut content, y, &col_widths, &rows[start], self.font_size);
                y -= self.row_h;
                start += 1;
            }

            self.finalize_page(content);
            page_idx += 1;

            if start >= rows.len() {
                break;
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.build_pages_tree();
        self.pdf.finish()
    }
}

pub(crate) fn export_pdf(report: &Report, path: &Path) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let mut pdf = PdfManager::new();
    pdf.write_report(report);

    fs::write(path, pdf.finish())
        .map_err(|e| AppError::Export(format!("PDF export error: {e}")))?;

    notify_export_success("PDF", path);
    Ok(())
}
