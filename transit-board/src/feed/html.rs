//! Small helpers over `scraper` shared by the HTML parsers.

use scraper::{ElementRef, Selector};

use super::error::FeedError;

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector, FeedError> {
    Selector::parse(css).map_err(|e| FeedError::Decode(format!("bad selector {css:?}: {e}")))
}

/// All text inside an element, concatenated.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text with runs of whitespace collapsed to single spaces and trimmed.
pub(crate) fn collapsed_text(element: ElementRef<'_>) -> String {
    text_of(element).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text nodes that are direct children of an element, ignoring nested markup.
pub(crate) fn own_text(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.trim().to_string())
        .collect()
}

/// The nearest enclosing element.
pub(crate) fn parent(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Walk `levels` enclosing elements up.
pub(crate) fn ancestor(element: ElementRef<'_>, levels: usize) -> Option<ElementRef<'_>> {
    (0..levels).try_fold(element, |el, _| parent(el))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const DOC: &str = r#"<html><body>
        <div id="outer">Outer text<span>nested</span>
            <p id="inner">  lots   of
                space  </p>
        </div>
    </body></html>"#;

    #[test]
    fn text_helpers() {
        let doc = Html::parse_document(DOC);
        let inner = doc.select(&selector("#inner").unwrap()).next().unwrap();
        assert_eq!(collapsed_text(inner), "lots of space");

        let outer = doc.select(&selector("#outer").unwrap()).next().unwrap();
        let own: Vec<String> = own_text(outer).into_iter().filter(|s| !s.is_empty()).collect();
        assert_eq!(own, vec!["Outer text"]);
    }

    #[test]
    fn ancestors() {
        let doc = Html::parse_document(DOC);
        let inner = doc.select(&selector("#inner").unwrap()).next().unwrap();
        let outer = ancestor(inner, 1).unwrap();
        assert_eq!(outer.value().id(), Some("outer"));
        assert_eq!(ancestor(inner, 0).unwrap().value().id(), Some("inner"));
        assert_eq!(ancestor(inner, 2).unwrap().value().name(), "body");
        assert!(ancestor(inner, 50).is_none());
    }

    #[test]
    fn bad_selector() {
        assert!(matches!(selector("[[["), Err(FeedError::Decode(_))));
    }
}
