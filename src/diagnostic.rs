use crate::span::Span;

/// A generator error about a registry or config file.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render as plain text lines, for diagnostics without a source file.
    pub fn to_plain(&self) -> String {
        let mut out = format!("error: {}", self.message);
        for note in &self.notes {
            out.push_str(&format!("\n  note: {}", note));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  help: {}", help));
        }
        out
    }

    fn build_report<'a>(
        &'a self,
        filename: &'a str,
        color: bool,
    ) -> ariadne::Report<'a, (&'a str, std::ops::Range<usize>)> {
        use ariadne::{Color, Config, Label, Report, ReportKind};

        let mut report = Report::build(ReportKind::Error, filename, self.span.start as usize)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish()
    }

    /// Render the diagnostic to stderr. Uses ariadne against `source` when
    /// the span points into it, plain text otherwise.
    pub fn render(&self, filename: &str, source: Option<&str>) {
        match source {
            Some(text) if !self.span.is_dummy() => {
                let report = self.build_report(filename, true);
                if report
                    .eprint((filename, ariadne::Source::from(text)))
                    .is_err()
                {
                    eprintln!("{}", self.to_plain());
                }
            }
            _ => eprintln!("{}", self.to_plain()),
        }
    }

    /// Render against `source` into a string without color codes.
    pub fn render_to_string(&self, filename: &str, source: &str) -> String {
        if self.span.is_dummy() {
            return self.to_plain();
        }
        let mut buf = Vec::new();
        let report = self.build_report(filename, false);
        match report.write((filename, ariadne::Source::from(source)), &mut buf) {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_plain(),
        }
    }
}
