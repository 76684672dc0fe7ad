//! In-memory browser for offline testing.
//!
//! [`MockDriver`] implements [`BrowserDriver`] over a [`MockDom`]: a flat
//! table of nodes, each registered under the locators that should find it.
//! Behaviour is attached with click handlers, delayed mutations (to imitate
//! animations and XHR round trips) and a navigation router. Detached nodes
//! keep their ids, so handles to them report `StaleElement` exactly as a real
//! driver would.
//!
//! [`store`] builds a complete DemoBlaze imitation on top of this.

pub mod store;

use crate::driver::{BrowserDriver, Screenshot};
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub use store::{CartRefresh, MockStore, MockStoreFactory, OrderRecord, Product, Timing, CATALOGUE};

/// Node identifier inside a [`MockDom`]
pub type NodeId = u64;

/// Element handle handed out by [`MockDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockElement(pub NodeId);

/// Click handler: receives the DOM and the clicked node
pub type ClickHandler = Arc<dyn Fn(&mut MockDom, NodeId) + Send + Sync>;

/// Navigation router: rebuilds the document for a URL
pub type Router = Arc<dyn Fn(&mut MockDom, &str) + Send + Sync>;

type Deferred = Box<dyn FnOnce(&mut MockDom) + Send>;

/// One element of the mock document
#[derive(Debug, Clone)]
pub struct MockNode {
    locators: Vec<Locator>,
    text: String,
    value: String,
    attributes: HashMap<String, String>,
    displayed: bool,
    enabled: bool,
    parent: Option<NodeId>,
    attached: bool,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            locators: Vec::new(),
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            displayed: true,
            enabled: true,
            parent: None,
            attached: true,
        }
    }
}

impl MockNode {
    /// Create a visible, enabled node found by `locator`
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locators: vec![locator],
            ..Self::default()
        }
    }

    /// Also match another locator
    #[must_use]
    pub fn or(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    /// Set visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Nest under another node
    #[must_use]
    pub const fn child_of(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Visible text
    #[must_use]
    pub fn visible_text(&self) -> &str {
        &self.text
    }

    /// Input value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the node is still part of the document
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    fn matches(&self, locator: &Locator) -> bool {
        self.attached && self.locators.contains(locator)
    }

    fn label(&self, id: NodeId) -> String {
        self.locators
            .first()
            .map_or_else(|| format!("node#{id}"), |loc| format!("{loc}#{id}"))
    }
}

/// Mutable document state shared by the driver, handlers and the router
pub struct MockDom {
    nodes: BTreeMap<NodeId, MockNode>,
    next_id: NodeId,
    url: String,
    alert: Option<String>,
    handlers: HashMap<NodeId, ClickHandler>,
    deferred: Vec<(Instant, u64, Deferred)>,
    deferred_seq: u64,
    router: Option<Router>,
    log: Vec<String>,
    closed: bool,
}

impl fmt::Debug for MockDom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDom")
            .field("url", &self.url)
            .field("nodes", &self.nodes.len())
            .field("alert", &self.alert)
            .field("pending", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl Default for MockDom {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            url: "about:blank".to_string(),
            alert: None,
            handlers: HashMap::new(),
            deferred: Vec::new(),
            deferred_seq: 0,
            router: None,
            log: Vec::new(),
            closed: false,
        }
    }
}

impl MockDom {
    /// Add a node and return its id
    pub fn insert(&mut self, node: MockNode) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        let _ = self.nodes.insert(id, node);
        id
    }

    /// Attach a click handler to a node
    pub fn on_click<F>(&mut self, id: NodeId, handler: F)
    where
        F: Fn(&mut MockDom, NodeId) + Send + Sync + 'static,
    {
        let _ = self.handlers.insert(id, Arc::new(handler));
    }

    /// Install the navigation router
    pub fn set_router(&mut self, router: Router) {
        self.router = Some(router);
    }

    /// Node by id (attached or not)
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&MockNode> {
        self.nodes.get(&id)
    }

    /// Attached nodes matching a locator, in insertion order
    #[must_use]
    pub fn find_matching(&self, locator: &Locator) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.matches(locator))
            .map(|(id, _)| *id)
            .collect()
    }

    /// First attached node matching a locator
    #[must_use]
    pub fn find_first(&self, locator: &Locator) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.matches(locator))
            .map(|(id, _)| *id)
    }

    /// Input value of the first node matching a locator
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> String {
        self.find_first(locator)
            .and_then(|id| self.nodes.get(&id))
            .map(|n| n.value.clone())
            .unwrap_or_default()
    }

    /// Replace the text of a node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = text.into();
        }
    }

    /// Replace the input value of a node
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.value = value.into();
        }
    }

    /// Show or hide a node
    pub fn set_displayed(&mut self, id: NodeId, displayed: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.displayed = displayed;
        }
    }

    /// Show or hide the first node matching a locator
    pub fn set_displayed_by(&mut self, locator: &Locator, displayed: bool) {
        if let Some(id) = self.find_first(locator) {
            self.set_displayed(id, displayed);
        }
    }

    /// Remove a node and all of its descendants from the document
    pub fn detach(&mut self, id: NodeId) {
        let mut doomed = vec![id];
        let mut idx = 0;
        while idx < doomed.len() {
            let current = doomed[idx];
            doomed.extend(
                self.nodes
                    .iter()
                    .filter(|(_, n)| n.attached && n.parent == Some(current))
                    .map(|(child, _)| *child),
            );
            idx += 1;
        }
        for node_id in doomed {
            if let Some(node) = self.nodes.get_mut(&node_id) {
                node.attached = false;
            }
            let _ = self.handlers.remove(&node_id);
        }
    }

    /// Remove every node matching a locator
    pub fn detach_all(&mut self, locator: &Locator) {
        for id in self.find_matching(locator) {
            self.detach(id);
        }
    }

    /// Open a native alert
    pub fn raise_alert(&mut self, text: impl Into<String>) {
        self.alert = Some(text.into());
    }

    /// Text of the pending alert
    #[must_use]
    pub fn pending_alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Run a mutation once `delay` has elapsed
    ///
    /// Deferred mutations are applied at the start of the next driver call
    /// after they fall due, in due order.
    pub fn after<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce(&mut MockDom) + Send + 'static,
    {
        self.deferred_seq += 1;
        self.deferred
            .push((Instant::now() + delay, self.deferred_seq, Box::new(action)));
    }

    /// Replace the document with the one the router builds for `url`
    ///
    /// Pending deferred mutations belong to the old document and are dropped.
    pub fn navigate(&mut self, url: &str) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.attached = false;
            }
        }
        self.handlers.clear();
        self.deferred.clear();
        self.url = url.to_string();
        if let Some(router) = self.router.clone() {
            router(self, url);
        }
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Scheme and host of the current URL
    #[must_use]
    pub fn origin(&self) -> String {
        match self.url.split_once("://") {
            Some((scheme, rest)) => {
                let host = rest.split('/').next().unwrap_or_default();
                format!("{scheme}://{host}")
            }
            None => String::new(),
        }
    }

    /// Driver calls seen so far
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.log
    }

    fn tick(&mut self) {
        loop {
            let now = Instant::now();
            let next = self
                .deferred
                .iter()
                .enumerate()
                .filter(|(_, (due, _, _))| *due <= now)
                .min_by_key(|(_, (due, seq, _))| (*due, *seq))
                .map(|(idx, _)| idx);
            match next {
                Some(idx) => {
                    let (_, _, action) = self.deferred.remove(idx);
                    action(self);
                }
                None => break,
            }
        }
    }

    fn effective_displayed(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get(&node_id) {
                Some(node) if node.displayed => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }

    fn ensure_no_alert(&self) -> ProbeResult<()> {
        match &self.alert {
            Some(text) => Err(ProbeError::UnexpectedAlert { text: text.clone() }),
            None => Ok(()),
        }
    }

    fn live(&self, element: MockElement) -> ProbeResult<&MockNode> {
        self.ensure_no_alert()?;
        match self.nodes.get(&element.0) {
            Some(node) if node.attached => Ok(node),
            Some(node) => Err(ProbeError::StaleElement {
                element: node.label(element.0),
            }),
            None => Err(ProbeError::StaleElement {
                element: format!("node#{}", element.0),
            }),
        }
    }

    fn interactable(&self, element: MockElement) -> ProbeResult<String> {
        let node = self.live(element)?;
        let label = node.label(element.0);
        if !node.enabled || !self.effective_displayed(element.0) {
            return Err(ProbeError::NotInteractable { element: label });
        }
        Ok(label)
    }
}

/// Mock browser driver over a shared [`MockDom`]
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    dom: Arc<Mutex<MockDom>>,
}

impl MockDriver {
    /// Create a driver over an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver whose documents are built by `router`
    #[must_use]
    pub fn with_router(router: Router) -> Self {
        let driver = Self::new();
        driver.with_dom(|dom| dom.set_router(router));
        driver
    }

    /// Inspect or mutate the document directly
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        let mut dom = self.dom.lock().unwrap_or_else(PoisonError::into_inner);
        dom.tick();
        f(&mut *dom)
    }

    /// Driver calls recorded so far
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.with_dom(|dom| dom.log.clone())
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.with_dom(|dom| dom.log.iter().filter(|c| c.starts_with(prefix)).count())
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.with_dom(|dom| dom.closed)
    }

    fn record(dom: &mut MockDom, entry: String) {
        tracing::trace!(call = %entry, "mock driver");
        dom.log.push(entry);
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    type Element = MockElement;

    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        self.with_dom(|dom| {
            dom.ensure_no_alert()?;
            Self::record(dom, format!("navigate:{url}"));
            dom.navigate(url);
            Ok(())
        })
    }

    async fn current_url(&self) -> ProbeResult<String> {
        self.with_dom(|dom| {
            dom.ensure_no_alert()?;
            Ok(dom.url.clone())
        })
    }

    async fn find(&self, locator: &Locator) -> ProbeResult<MockElement> {
        self.with_dom(|dom| {
            dom.ensure_no_alert()?;
            dom.find_first(locator)
                .map(MockElement)
                .ok_or_else(|| ProbeError::ElementNotFound {
                    locator: locator.to_string(),
                })
        })
    }

    async fn find_all(&self, locator: &Locator) -> ProbeResult<Vec<MockElement>> {
        self.with_dom(|dom| {
            dom.ensure_no_alert()?;
            Ok(dom.find_matching(locator).into_iter().map(MockElement).collect())
        })
    }

    async fn find_all_in(
        &self,
        parent: &MockElement,
        locator: &Locator,
    ) -> ProbeResult<Vec<MockElement>> {
        self.with_dom(|dom| {
            let _ = dom.live(*parent)?;
            Ok(dom
                .find_matching(locator)
                .into_iter()
                .filter(|id| dom.is_descendant(*id, parent.0))
                .map(MockElement)
                .collect())
        })
    }

    async fn click(&self, element: &MockElement) -> ProbeResult<()> {
        self.with_dom(|dom| {
            let label = dom.interactable(*element)?;
            Self::record(dom, format!("click:{label}"));
            if let Some(handler) = dom.handlers.get(&element.0).cloned() {
                handler(dom, element.0);
            }
            Ok(())
        })
    }

    async fn clear(&self, element: &MockElement) -> ProbeResult<()> {
        self.with_dom(|dom| {
            let label = dom.interactable(*element)?;
            Self::record(dom, format!("clear:{label}"));
            dom.set_value(element.0, "");
            Ok(())
        })
    }

    async fn send_keys(&self, element: &MockElement, text: &str) -> ProbeResult<()> {
        self.with_dom(|dom| {
            let label = dom.interactable(*element)?;
            Self::record(dom, format!("send_keys:{label}"));
            if let Some(node) = dom.nodes.get_mut(&element.0) {
                node.value.push_str(text);
            }
            Ok(())
        })
    }

    async fn text(&self, element: &MockElement) -> ProbeResult<String> {
        self.with_dom(|dom| {
            let node = dom.live(*element)?;
            // hidden elements have no rendered text
            if dom.effective_displayed(element.0) {
                Ok(node.text.clone())
            } else {
                Ok(String::new())
            }
        })
    }

    async fn attribute(&self, element: &MockElement, name: &str) -> ProbeResult<Option<String>> {
        self.with_dom(|dom| {
            let node = dom.live(*element)?;
            if name == "value" {
                return Ok(Some(node.value.clone()));
            }
            Ok(node.attributes.get(name).cloned())
        })
    }

    async fn is_displayed(&self, element: &MockElement) -> ProbeResult<bool> {
        self.with_dom(|dom| {
            let _ = dom.live(*element)?;
            Ok(dom.effective_displayed(element.0))
        })
    }

    async fn is_enabled(&self, element: &MockElement) -> ProbeResult<bool> {
        self.with_dom(|dom| Ok(dom.live(*element)?.enabled))
    }

    async fn alert_text(&self) -> ProbeResult<String> {
        self.with_dom(|dom| dom.alert.clone().ok_or(ProbeError::NoAlertPresent))
    }

    async fn accept_alert(&self) -> ProbeResult<()> {
        self.with_dom(|dom| {
            let text = dom.alert.take().ok_or(ProbeError::NoAlertPresent)?;
            Self::record(dom, format!("accept_alert:{text}"));
            Ok(())
        })
    }

    async fn dismiss_alert(&self) -> ProbeResult<()> {
        self.with_dom(|dom| {
            let text = dom.alert.take().ok_or(ProbeError::NoAlertPresent)?;
            Self::record(dom, format!("dismiss_alert:{text}"));
            Ok(())
        })
    }

    async fn execute(&self, script: &str) -> ProbeResult<serde_json::Value> {
        self.with_dom(|dom| {
            dom.ensure_no_alert()?;
            Self::record(dom, format!("execute:{script}"));
            Ok(serde_json::Value::Null)
        })
    }

    async fn screenshot(&self) -> ProbeResult<Screenshot> {
        self.with_dom(|dom| {
            Self::record(dom, "screenshot".to_string());
            // PNG signature only; enough for report embedding
            Ok(Screenshot::new(vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]))
        })
    }

    async fn close(&self) -> ProbeResult<()> {
        self.with_dom(|dom| {
            Self::record(dom, "close".to_string());
            dom.closed = true;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const BUTTON: Locator = Locator::id("btn");
    const PANEL: Locator = Locator::id("panel");
    const ITEM: Locator = Locator::css(".item");

    mod dom_tests {
        use super::*;

        #[test]
        fn test_detach_cascades_to_children() {
            let mut dom = MockDom::default();
            let panel = dom.insert(MockNode::new(PANEL));
            let item = dom.insert(MockNode::new(ITEM).child_of(panel));
            dom.detach(panel);
            assert!(!dom.node(item).unwrap().is_attached());
            assert!(dom.find_matching(&ITEM).is_empty());
        }

        #[test]
        fn test_hidden_parent_hides_child() {
            let mut dom = MockDom::default();
            let panel = dom.insert(MockNode::new(PANEL).hidden());
            let item = dom.insert(MockNode::new(ITEM).child_of(panel));
            assert!(!dom.effective_displayed(item));
            dom.set_displayed(panel, true);
            assert!(dom.effective_displayed(item));
        }

        #[test]
        fn test_deferred_runs_in_due_order() {
            let mut dom = MockDom::default();
            let id = dom.insert(MockNode::new(PANEL));
            dom.after(Duration::ZERO, move |d| d.set_text(id, "first"));
            dom.after(Duration::ZERO, move |d| d.set_text(id, "second"));
            dom.tick();
            assert_eq!(dom.node(id).unwrap().visible_text(), "second");
        }

        #[test]
        fn test_origin() {
            let mut dom = MockDom::default();
            dom.navigate("https://www.demoblaze.com/cart.html");
            assert_eq!(dom.origin(), "https://www.demoblaze.com");
        }
    }

    mod driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_runs_handler() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let btn = dom.insert(MockNode::new(BUTTON));
                let panel = dom.insert(MockNode::new(PANEL).hidden());
                dom.on_click(btn, move |d, _| d.set_displayed(panel, true));
            });
            let btn = driver.find(&BUTTON).await.unwrap();
            driver.click(&btn).await.unwrap();
            let panel = driver.find(&PANEL).await.unwrap();
            assert!(driver.is_displayed(&panel).await.unwrap());
            assert_eq!(driver.count_calls("click:"), 1);
        }

        #[tokio::test]
        async fn test_detached_element_is_stale() {
            let driver = MockDriver::new();
            let id = driver.with_dom(|dom| dom.insert(MockNode::new(ITEM)));
            let item = driver.find(&ITEM).await.unwrap();
            driver.with_dom(|dom| dom.detach(id));
            let err = driver.is_displayed(&item).await.unwrap_err();
            assert!(matches!(err, ProbeError::StaleElement { .. }));
        }

        #[tokio::test]
        async fn test_missing_element_not_found() {
            let driver = MockDriver::new();
            let err = driver.find(&BUTTON).await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
            assert!(driver.find_all(&BUTTON).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_pending_alert_blocks_queries() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(BUTTON));
                dom.raise_alert("Product added.");
            });
            let err = driver.find(&BUTTON).await.unwrap_err();
            assert!(matches!(err, ProbeError::UnexpectedAlert { ref text } if text == "Product added."));
            assert_eq!(driver.alert_text().await.unwrap(), "Product added.");
            driver.accept_alert().await.unwrap();
            assert!(driver.find(&BUTTON).await.is_ok());
        }

        #[tokio::test]
        async fn test_alert_ops_without_alert() {
            let driver = MockDriver::new();
            assert!(matches!(
                driver.alert_text().await,
                Err(ProbeError::NoAlertPresent)
            ));
            assert!(matches!(
                driver.accept_alert().await,
                Err(ProbeError::NoAlertPresent)
            ));
        }

        #[tokio::test]
        async fn test_hidden_element_not_interactable() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(BUTTON).hidden());
            });
            let btn = driver.find(&BUTTON).await.unwrap();
            let err = driver.click(&btn).await.unwrap_err();
            assert!(matches!(err, ProbeError::NotInteractable { .. }));
        }

        #[tokio::test]
        async fn test_send_keys_and_clear() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let _ = dom.insert(MockNode::new(BUTTON));
            });
            let input = driver.find(&BUTTON).await.unwrap();
            driver.send_keys(&input, "jane").await.unwrap();
            assert_eq!(
                driver.attribute(&input, "value").await.unwrap().as_deref(),
                Some("jane")
            );
            driver.clear(&input).await.unwrap();
            assert_eq!(
                driver.attribute(&input, "value").await.unwrap().as_deref(),
                Some("")
            );
        }

        #[tokio::test]
        async fn test_find_all_in_scopes_to_descendants() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                let a = dom.insert(MockNode::new(PANEL));
                let b = dom.insert(MockNode::new(PANEL));
                let _ = dom.insert(MockNode::new(ITEM).text("a1").child_of(a));
                let _ = dom.insert(MockNode::new(ITEM).text("b1").child_of(b));
            });
            let panels = driver.find_all(&PANEL).await.unwrap();
            let items = driver.find_all_in(&panels[1], &ITEM).await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(driver.text(&items[0]).await.unwrap(), "b1");
        }

        #[tokio::test]
        async fn test_delayed_mutation_visible_after_delay() {
            let driver = MockDriver::new();
            driver.with_dom(|dom| {
                dom.after(Duration::from_millis(30), |d| {
                    let _ = d.insert(MockNode::new(ITEM));
                });
            });
            assert!(driver.find_all(&ITEM).await.unwrap().is_empty());
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert_eq!(driver.find_all(&ITEM).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_close_recorded() {
            let driver = MockDriver::new();
            driver.close().await.unwrap();
            assert!(driver.is_closed());
        }
    }
}
