/*============================================================
  Synavera Project: Syn-WP
  Module: synwp_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Assemble the human-readable update report from typed core,
    plugin, and theme records.

  Security / Safety Notes:
    Every value originating from WordPress metadata is HTML
    escaped before it enters the report text.

  Dependencies:
    None beyond std.

  Operational Scope:
    Built fresh for each run by the report runner and handed to
    stdout or the mail dispatcher.

  Revision History:
    2025-11-12 COD  Authored report builder.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fixed section ordering for reproducible output
    - One line per update item, explicit up-to-date lines
============================================================*/

use crate::updates::{CoreUpdateInfo, PackageUpdateInfo};

/// Update categories, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Core,
    Plugins,
    Themes,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Core, Category::Plugins, Category::Themes];

    pub fn heading(self) -> &'static str {
        match self {
            Category::Core => "WordPress Core:",
            Category::Plugins => "Plugin Updates:",
            Category::Themes => "Theme Updates:",
        }
    }

    pub fn up_to_date(self) -> &'static str {
        match self {
            Category::Core => "WordPress core is up-to-date.",
            Category::Plugins => "All plugins are up-to-date.",
            Category::Themes => "All themes are up-to-date.",
        }
    }
}

/// A block of report lines; category sections open with their heading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub lines: Vec<String>,
}

impl Section {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

/// Ordered report sections: header, core, plugins, themes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    /// Render every section followed by a blank line.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for section in &self.sections {
            text.push_str(&section.lines.join("\n"));
            text.push_str("\n\n");
        }
        text
    }
}

/// Per-run assembly state; never shared between runs.
#[derive(Debug, Default)]
pub struct ReportContext {
    report: Report,
    updates_found: bool,
}

impl ReportContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates_found(&self) -> bool {
        self.updates_found
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn header(&mut self, site: &str, generated: &str) {
        let mut section = Section::default();
        section.push(format!("Update check for {}", escape_html(site)));
        section.push(format!("Generated {}", escape_html(generated)));
        self.report.sections.push(section);
    }

    pub fn core_section(&mut self, records: &[CoreUpdateInfo]) {
        let lines = records.iter().map(core_line).collect();
        self.category(Category::Core, lines);
    }

    /// Plugins and themes share one line format.
    pub fn package_section(&mut self, category: Category, records: &[PackageUpdateInfo]) {
        let lines = records.iter().map(package_line).collect();
        self.category(category, lines);
    }

    fn category(&mut self, category: Category, lines: Vec<String>) {
        let mut section = Section::default();
        section.push(category.heading());
        if lines.is_empty() {
            section.push(category.up_to_date());
        } else {
            self.updates_found = true;
            section.lines.extend(lines);
        }
        self.report.sections.push(section);
    }
}

fn core_line(record: &CoreUpdateInfo) -> String {
    format!(
        "- [{}] WordPress version {} is now available, please upgrade as soon as possible.",
        escape_html(record.update_type.as_str()),
        escape_html(&record.version)
    )
}

fn package_line(record: &PackageUpdateInfo) -> String {
    format!(
        "- An update is available for {} ({} => {})",
        escape_html(&record.name),
        escape_html(&record.current_version),
        escape_html(&record.available_version)
    )
}

/// Escape text so it cannot be interpreted as markup when rendered.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
