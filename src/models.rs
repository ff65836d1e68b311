/// What a page turned out to be once its distinguishing child element was seen.
///
/// A page is exclusively one or the other: a redirect page's body (if any) is
/// never processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Content page with its raw wikitext body.
    Article(String),
    /// Redirect to the named target title.
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub kind: PageKind,
}
