//! Backend overrides are per thread. Nothing in this file touches the process default.

use std::sync::mpsc;
use std::thread;

use xml_mini::budget::BudgetEnforcer;
use xml_mini::{
    Backend, Error, MarkupBuilder, Node, QuickXml, Value, XmlBackend, backend, set_backend,
    with_backend,
};

/// Delegates to quick-xml under another name, and upper-cases element names on parse so
/// tests can tell which backend decoded a document.
struct Shouting(&'static str);

impl XmlBackend for Shouting {
    fn name(&self) -> &str {
        self.0
    }

    fn parse(&self, text: &str, budget: &mut BudgetEnforcer) -> Result<Option<Node>, Error> {
        fn shout(node: &mut Node) {
            node.name = node.name.to_uppercase();
            node.children.iter_mut().for_each(shout);
        }
        let mut root = QuickXml.parse(text, budget)?;
        if let Some(root) = root.as_mut() {
            shout(root);
        }
        Ok(root)
    }

    fn builder(&self, indent: usize) -> Box<dyn MarkupBuilder> {
        QuickXml.builder(indent)
    }
}

fn named(name: &'static str) -> Backend {
    Backend::new(Shouting(name))
}

#[test]
fn default_is_quick_xml() {
    assert_eq!(backend().name(), "quick-xml");
    assert_eq!(backend(), Backend::quick_xml());
}

#[test]
fn nested_scopes_switch_and_switch_back() {
    with_backend(named("libxml"), || {
        assert_eq!(backend().name(), "libxml");
        with_backend(named("nokogiri"), || {
            assert_eq!(backend().name(), "nokogiri");
        });
        assert_eq!(backend().name(), "libxml");
    });
    assert_eq!(backend().name(), "quick-xml");
}

#[test]
fn setter_inside_a_scope_stays_in_the_scope() {
    with_backend(named("libxml"), || {
        set_backend(named("rexml"));
        assert_eq!(backend().name(), "rexml");
    });
    assert_eq!(backend().name(), "quick-xml");
}

#[test]
fn the_active_backend_does_the_parsing() {
    let value = with_backend(named("shouting"), || xml_mini::from_str("<a><b>x</b></a>")).unwrap();
    assert_eq!(value["A"]["B"], Value::from("x"));

    let value = xml_mini::from_str("<a><b>x</b></a>").unwrap();
    assert_eq!(value["a"]["b"], Value::from("x"));
}

#[test]
fn other_threads_do_not_see_an_override() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let worker = thread::spawn(move || {
        with_backend(named("libxml"), || {
            entered_tx.send(backend().name().to_owned()).unwrap();
            release_rx.recv().unwrap();
            backend().name().to_owned()
        })
    });

    assert_eq!(entered_rx.recv().unwrap(), "libxml");
    // The worker is parked inside its scope.
    assert_eq!(backend().name(), "quick-xml");
    release_tx.send(()).unwrap();
    assert_eq!(worker.join().unwrap(), "libxml");
}

#[test]
fn nested_scope_on_another_thread_is_isolated() {
    with_backend(named("rexml"), || {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            // A new thread starts without the parent's overrides.
            let inherited = backend().name().to_owned();
            with_backend(named("libxml"), || {
                entered_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            });
            inherited
        });

        entered_rx.recv().unwrap();
        assert_eq!(backend().name(), "rexml");
        release_tx.send(()).unwrap();
        assert_eq!(worker.join().unwrap(), "quick-xml");
    });
}

#[test]
fn many_threads_keep_their_own_stack() {
    let workers: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                let name: &'static str = Box::leak(format!("backend-{i}").into_boxed_str());
                with_backend(named(name), || {
                    for _ in 0..100 {
                        assert_eq!(backend().name(), name);
                        thread::yield_now();
                    }
                });
                backend().name().to_owned()
            })
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), "quick-xml");
    }
}

#[test]
fn scope_is_restored_after_a_panic() {
    let result = std::panic::catch_unwind(|| {
        with_backend(named("libxml"), || {
            with_backend(named("nokogiri"), || panic!("parser exploded"));
        })
    });
    assert!(result.is_err());
    assert_eq!(backend().name(), "quick-xml");
}
