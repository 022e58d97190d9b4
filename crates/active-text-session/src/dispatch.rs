//! Routing of taps to host handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use active_text_core::{Element, ElementKind};

/// Handler receiving the text of a tapped element.
pub type TextHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Handler receiving the parsed address of a tapped URL.
pub type UrlHandler = Box<dyn Fn(&Url) + Send + Sync>;

/// Fallback receiver for taps without a dedicated handler.
pub trait ActiveTextDelegate: Send + Sync {
    /// Called with the element text (the canonical address for URLs).
    fn did_select(&self, text: &str, kind: &ElementKind);
}

/// Where a tap ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTarget {
    /// The kind's handler
    Handler,
    /// The delegate
    Delegate,
    /// Nobody was listening
    Dropped,
}

/// Per-kind tap handlers plus an optional delegate.
#[derive(Default)]
pub struct TapHandlers {
    mention: Option<TextHandler>,
    hashtag: Option<TextHandler>,
    url: Option<UrlHandler>,
    email: Option<TextHandler>,
    custom: HashMap<String, TextHandler>,
    delegate: Option<Arc<dyn ActiveTextDelegate>>,
}

impl TapHandlers {
    /// Create an empty handler set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle mention taps.
    pub fn on_mention(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.mention = Some(Box::new(handler));
    }

    /// Handle hashtag taps.
    pub fn on_hashtag(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.hashtag = Some(Box::new(handler));
    }

    /// Handle URL taps.
    pub fn on_url(&mut self, handler: impl Fn(&Url) + Send + Sync + 'static) {
        self.url = Some(Box::new(handler));
    }

    /// Handle email taps.
    pub fn on_email(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.email = Some(Box::new(handler));
    }

    /// Handle taps on a custom kind.
    pub fn on_custom(
        &mut self,
        tag: impl Into<String>,
        handler: impl Fn(&str) + Send + Sync + 'static,
    ) {
        self.custom.insert(tag.into(), Box::new(handler));
    }

    /// Set the fallback delegate.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn ActiveTextDelegate>>) {
        self.delegate = delegate;
    }

    /// Remove the handler of a kind. Returns whether one was installed.
    pub fn remove_handler(&mut self, kind: &ElementKind) -> bool {
        match kind {
            ElementKind::Mention => self.mention.take().is_some(),
            ElementKind::Hashtag => self.hashtag.take().is_some(),
            ElementKind::Url => self.url.take().is_some(),
            ElementKind::Email => self.email.take().is_some(),
            ElementKind::Custom(tag) => self.custom.remove(tag).is_some(),
        }
    }

    /// Whether a kind has a dedicated handler.
    pub fn has_handler(&self, kind: &ElementKind) -> bool {
        match kind {
            ElementKind::Mention => self.mention.is_some(),
            ElementKind::Hashtag => self.hashtag.is_some(),
            ElementKind::Url => self.url.is_some(),
            ElementKind::Email => self.email.is_some(),
            ElementKind::Custom(tag) => self.custom.contains_key(tag),
        }
    }

    /// Route a tapped element to its handler, or to the delegate.
    ///
    /// A URL whose canonical address does not parse goes to the delegate
    /// even if a URL handler is installed.
    pub fn dispatch(&self, element: &Element) -> DispatchTarget {
        let handled = match element {
            Element::Mention { text } => call(&self.mention, text),
            Element::Hashtag { text } => call(&self.hashtag, text),
            Element::Email { text } => call(&self.email, text),
            Element::Custom { tag, text } => match self.custom.get(tag) {
                Some(handler) => {
                    handler(text);
                    true
                }
                None => false,
            },
            Element::Url { original, .. } => match (&self.url, Url::parse(original)) {
                (Some(handler), Ok(url)) => {
                    handler(&url);
                    true
                }
                (Some(_), Err(e)) => {
                    debug!("Tapped URL '{}' does not parse: {}", original, e);
                    false
                }
                (None, _) => false,
            },
        };

        if handled {
            debug!("Tap on {} handled", element.type_name());
            return DispatchTarget::Handler;
        }

        match &self.delegate {
            Some(delegate) => {
                debug!("Tap on {} sent to delegate", element.type_name());
                delegate.did_select(element.text(), &element.kind());
                DispatchTarget::Delegate
            }
            None => DispatchTarget::Dropped,
        }
    }
}

fn call(handler: &Option<TextHandler>, text: &str) -> bool {
    match handler {
        Some(handler) => {
            handler(text);
            true
        }
        None => false,
    }
}

impl fmt::Debug for TapHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHandlers")
            .field("mention", &self.mention.is_some())
            .field("hashtag", &self.hashtag.is_some())
            .field("url", &self.url.is_some())
            .field("email", &self.email.is_some())
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, ElementKind)>>,
    }

    impl ActiveTextDelegate for Recorder {
        fn did_select(&self, text: &str, kind: &ElementKind) {
            self.calls.lock().unwrap().push((text.to_string(), kind.clone()));
        }
    }

    fn sink() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&seen);
        (seen, move |text: &str| writer.lock().unwrap().push(text.to_string()))
    }

    #[test]
    fn test_mention_handler() {
        let mut handlers = TapHandlers::new();
        let (seen, handler) = sink();
        handlers.on_mention(handler);

        let target = handlers.dispatch(&Element::Mention { text: "ann".into() });
        assert_eq!(target, DispatchTarget::Handler);
        assert_eq!(*seen.lock().unwrap(), vec!["ann"]);
    }

    #[test]
    fn test_url_handler_gets_parsed_url() {
        let mut handlers = TapHandlers::new();
        let seen = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&seen);
        handlers.on_url(move |url: &Url| *writer.lock().unwrap() = Some(url.host_str().map(String::from)));

        handlers.dispatch(&Element::Url {
            original: "https://example.com/a".into(),
            display: "example.com/a".into(),
        });
        assert_eq!(*seen.lock().unwrap(), Some(Some("example.com".to_string())));
    }

    #[test]
    fn test_unparsable_url_goes_to_delegate() {
        let mut handlers = TapHandlers::new();
        let recorder = Arc::new(Recorder::default());
        handlers.on_url(|_: &Url| panic!("handler must not run"));
        handlers.set_delegate(Some(recorder.clone()));

        let target = handlers.dispatch(&Element::Url {
            original: "https://exa mple.com".into(),
            display: "exa mple.com".into(),
        });

        assert_eq!(target, DispatchTarget::Delegate);
        assert_eq!(
            recorder.calls.lock().unwrap()[0],
            ("https://exa mple.com".to_string(), ElementKind::Url)
        );
    }

    #[test]
    fn test_custom_handler_by_tag() {
        let mut handlers = TapHandlers::new();
        let (seen, handler) = sink();
        handlers.on_custom("ticket", handler);

        let ticket = Element::Custom {
            tag: "ticket".into(),
            text: "T-1".into(),
        };
        let other = Element::Custom {
            tag: "other".into(),
            text: "x".into(),
        };

        assert_eq!(handlers.dispatch(&ticket), DispatchTarget::Handler);
        assert_eq!(handlers.dispatch(&other), DispatchTarget::Dropped);
        assert_eq!(*seen.lock().unwrap(), vec!["T-1"]);
    }

    #[test]
    fn test_missing_handler_falls_back_to_delegate() {
        let mut handlers = TapHandlers::new();
        let recorder = Arc::new(Recorder::default());
        handlers.set_delegate(Some(recorder.clone()));

        let target = handlers.dispatch(&Element::Hashtag { text: "rust".into() });
        assert_eq!(target, DispatchTarget::Delegate);
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![("rust".to_string(), ElementKind::Hashtag)]
        );
    }

    #[test]
    fn test_remove_handler() {
        let mut handlers = TapHandlers::new();
        handlers.on_email(|_: &str| {});
        assert!(handlers.has_handler(&ElementKind::Email));

        assert!(handlers.remove_handler(&ElementKind::Email));
        assert!(!handlers.remove_handler(&ElementKind::Email));
        assert_eq!(
            handlers.dispatch(&Element::Email {
                text: "a@b.io".into()
            }),
            DispatchTarget::Dropped
        );
    }
}
