//! Tree job templates
//!
//! A template is an XML document containing a `job` element, written either
//! as `<job/>` or `<job ...>...</job>`. Rendering keeps everything around and
//! inside that element and appends the generated host sections to it.

use std::{
    fs, io,
    ops::Range,
    path::{Path, PathBuf},
};

use quick_xml::{events::Event, Reader};
use tracing::trace;

use crate::render::RenderError;

const JOB: &[u8] = b"job";

/// A job template read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    path: PathBuf,
    text: String,
}

/// Byte ranges of the first `job` element within a template.
#[derive(Debug, PartialEq, Eq)]
struct JobElement {
    /// The whole element, from `<job` to the end of its closing tag.
    element: Range<usize>,
    /// The attributes, including leading whitespace.
    attrs: Range<usize>,
    /// The element's contents; empty for `<job/>`.
    inner: Range<usize>,
}

impl Template {
    /// Reads a template.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::TemplateNotFound`] if the file does not exist,
    /// or [`RenderError::Io`] if it cannot be read.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        trace!(path = %path.display(), "reading template");

        let text = fs::read_to_string(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => RenderError::TemplateNotFound(path.to_path_buf()),
            _ => RenderError::Io {
                path: path.to_path_buf(),
                error,
            },
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    #[cfg(test)]
    const fn from_text(path: PathBuf, text: String) -> Self {
        Self { path, text }
    }

    /// Where the template was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `body` to the contents of the first `job` element.
    ///
    /// The element's attributes and existing contents are kept, and the body
    /// is placed on its own lines. An empty body leaves the element with
    /// whitespace-only contents.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MissingJobElement`] if the template has no `job`
    /// element, or [`RenderError::MalformedTemplate`] if the template or the
    /// result is not well-formed XML.
    pub fn fill(&self, body: &str) -> Result<String, RenderError> {
        let job = self
            .find_job()?
            .ok_or_else(|| RenderError::MissingJobElement(self.path.clone()))?;

        let text = self.text.as_str();
        let attrs = text[job.attrs].trim_end();
        let inner = &text[job.inner];
        let body = if body.is_empty() {
            "\n".to_string()
        } else {
            format!("\n{body}\n")
        };

        let document = format!(
            "{}<job{attrs}>{inner}{body}</job>{}",
            &text[..job.element.start],
            &text[job.element.end..],
        );

        check_well_formed(&self.path, &document)?;
        Ok(document)
    }

    /// Locates the first `job` element, skipping comments, CDATA and
    /// processing instructions.
    fn find_job(&self) -> Result<Option<JobElement>, RenderError> {
        let text = self.text.as_str();
        let mut reader = Reader::from_str(text);

        loop {
            let event = reader.read_event().map_err(|e| self.malformed(&e))?;
            let end = position(&reader);
            match event {
                // `<` + name and attributes + `/>`
                Event::Empty(start) if start.name().as_ref() == JOB => {
                    let element = end - start.len() - 3..end;
                    let attrs = element.start + 1 + JOB.len()..end - 2;
                    return Ok(Some(JobElement {
                        element,
                        attrs,
                        inner: end..end,
                    }));
                }
                // `<` + name and attributes + `>`
                Event::Start(start) if start.name().as_ref() == JOB => {
                    let open = end - start.len() - 2..end;
                    let close = self.find_end(&mut reader)?;
                    return Ok(Some(JobElement {
                        element: open.start..close.end,
                        attrs: open.start + 1 + JOB.len()..open.end - 1,
                        inner: open.end..close.start,
                    }));
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Reads up to the end tag matching an already opened element and
    /// returns the range of that end tag.
    fn find_end(&self, reader: &mut Reader<&[u8]>) -> Result<Range<usize>, RenderError> {
        let mut depth = 1_usize;
        loop {
            match reader.read_event().map_err(|e| self.malformed(&e))? {
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        let end = position(reader);
                        // end tags cannot contain `<`
                        let start = self.text[..end].rfind("</").unwrap_or(end);
                        return Ok(start..end);
                    }
                }
                Event::Eof => {
                    return Err(self.malformed(&"unclosed <job> element"));
                }
                _ => {}
            }
        }
    }

    fn malformed(&self, error: &dyn std::fmt::Display) -> RenderError {
        RenderError::MalformedTemplate {
            path: self.path.clone(),
            message: error.to_string(),
        }
    }
}

fn position(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn check_well_formed(path: &Path, document: &str) -> Result<(), RenderError> {
    let mut reader = Reader::from_str(document);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {}
            Err(error) => {
                return Err(RenderError::MalformedTemplate {
                    path: path.to_path_buf(),
                    message: error.to_string(),
                });
            }
        }
    }
}
