use crate::models::{PageKind, WikiPage};
use anyhow::{bail, Context, Result};
use bzip2::read::BzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Which element's character data is currently being collected.
#[derive(PartialEq)]
enum Capture {
    None,
    Title,
    Text,
}

/// Streaming reader over a Wikipedia XML dump, plain or bz2-compressed.
///
/// Yields one [`WikiPage`] per `page` element as an iterator, consuming
/// events one at a time; the event buffer is cleared after every event, so
/// memory stays flat over multi-gigabyte dumps. A page is classified by the
/// first distinguishing child seen -- a `redirect` element or a `text`
/// element -- and the rest of the page element is then consumed without
/// effect. Pages with neither child yield nothing.
///
/// Malformed XML surfaces as an `Err` item with the byte offset attached;
/// iteration should not be resumed past it.
pub struct DumpReader {
    reader: Reader<Box<dyn BufRead>>,
    buf: Vec<u8>,
    in_page: bool,
    skip_page: bool,
    title: Option<String>,
    capture: Capture,
    capture_buf: String,
}

impl DumpReader {
    /// Opens a dump file, streaming through a bz2 decoder when the path ends
    /// in `.bz2`.
    pub fn open(path: &str) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open wiki dump at: {}", path))?;
        let reader: Box<dyn BufRead> = if path.ends_with(".bz2") {
            Box::new(BufReader::new(BzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_buf_read(reader))
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        Self::from_buf_read(Box::new(reader))
    }

    fn from_buf_read(reader: Box<dyn BufRead>) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
            in_page: false,
            skip_page: false,
            title: None,
            capture: Capture::None,
            capture_buf: String::new(),
        }
    }

    fn read_next(&mut self) -> Result<Option<WikiPage>> {
        loop {
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    let pos = self.reader.buffer_position();
                    return Err(anyhow::Error::from(e)
                        .context(format!("Malformed XML at byte offset {}", pos)));
                }
            };

            let mut emit = None;
            match event {
                Event::Eof => return Ok(None),
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"page" => {
                        self.in_page = true;
                        self.skip_page = false;
                        self.title = None;
                        self.capture = Capture::None;
                    }
                    b"title" if self.in_page && !self.skip_page => {
                        self.capture = Capture::Title;
                        self.capture_buf.clear();
                    }
                    b"text" if self.in_page && !self.skip_page && self.title.is_some() => {
                        self.capture = Capture::Text;
                        self.capture_buf.clear();
                    }
                    b"redirect" if self.in_page && !self.skip_page => {
                        if let Some(title) = self.title.take() {
                            let target = redirect_target(e, &title)?;
                            self.skip_page = true;
                            emit = Some(WikiPage {
                                title,
                                kind: PageKind::Redirect(target),
                            });
                        }
                    }
                    _ => {}
                },
                Event::Empty(ref e) if self.in_page && !self.skip_page => {
                    match e.local_name().as_ref() {
                        b"redirect" => {
                            if let Some(title) = self.title.take() {
                                let target = redirect_target(e, &title)?;
                                self.skip_page = true;
                                emit = Some(WikiPage {
                                    title,
                                    kind: PageKind::Redirect(target),
                                });
                            }
                        }
                        // An empty text element is a content page with an
                        // empty body, not a parse problem.
                        b"text" => {
                            if let Some(title) = self.title.take() {
                                self.skip_page = true;
                                emit = Some(WikiPage {
                                    title,
                                    kind: PageKind::Article(String::new()),
                                });
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref e) => {
                    if self.capture != Capture::None {
                        let chunk = e
                            .unescape()
                            .context("Failed to unescape character data")?;
                        self.capture_buf.push_str(&chunk);
                    }
                }
                Event::CData(ref e) => {
                    if self.capture != Capture::None {
                        let chunk =
                            std::str::from_utf8(e).context("Invalid UTF-8 in CDATA section")?;
                        self.capture_buf.push_str(chunk);
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"page" => {
                        self.in_page = false;
                        self.skip_page = false;
                        self.title = None;
                        self.capture = Capture::None;
                    }
                    b"title" if self.capture == Capture::Title => {
                        self.capture = Capture::None;
                        self.title = Some(std::mem::take(&mut self.capture_buf));
                    }
                    b"text" if self.capture == Capture::Text => {
                        self.capture = Capture::None;
                        self.skip_page = true;
                        if let Some(title) = self.title.take() {
                            emit = Some(WikiPage {
                                title,
                                kind: PageKind::Article(std::mem::take(&mut self.capture_buf)),
                            });
                        }
                    }
                    _ => {}
                },
                _ => {}
            }

            self.buf.clear();
            if let Some(page) = emit {
                return Ok(Some(page));
            }
        }
    }
}

fn redirect_target(e: &BytesStart, page_title: &str) -> Result<String> {
    let attr = e
        .try_get_attribute("title")
        .with_context(|| format!("Malformed redirect element in page {:?}", page_title))?;
    match attr {
        Some(attr) => Ok(attr
            .unescape_value()
            .with_context(|| format!("Malformed redirect target in page {:?}", page_title))?
            .into_owned()),
        None => bail!(
            "Redirect element missing title attribute in page {:?}",
            page_title
        ),
    }
}

impl Iterator for DumpReader {
    type Item = Result<WikiPage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().transpose()
    }
}
