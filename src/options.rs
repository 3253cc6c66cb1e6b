use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::budget::{Budget, BudgetReport};

/// Decoder configuration.
///
/// Use this to tune the expansion [`Budget`], opt into trusted mode, and restrict which
/// `type` attributes a document may use.
///
/// ```rust
/// let options = xml_mini::options! {
///     budget: xml_mini::budget! {
///         max_depth: 32,
///     },
///     allowed_types: Some(vec!["integer".into(), "string".into()]),
/// };
///
/// let xml = r#"<user><id type="integer">1</id><admin type="boolean">true</admin></user>"#;
/// let err = xml_mini::from_str_with_options(xml, options).unwrap_err();
/// assert!(matches!(err, xml_mini::Error::DisallowedType { .. }));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Options {
    /// Limits enforced while tokenizing (entity expansions, depth, element count).
    pub budget: Budget,
    /// Optional callback invoked with the final budget report after parsing.
    /// It is invoked both when parsing is successful and when budget was breached.
    #[serde(skip)]
    pub budget_report: Option<fn(&BudgetReport)>,

    /// Invoked both when parsing is successful and when budget was breached.
    #[serde(skip)]
    pub budget_report_cb: Option<BudgetReportCallback>,

    /// Permit `symbol` and `yaml` type attributes. Only for documents from a trusted
    /// source. Default: false.
    pub trusted: bool,
    /// Type attribute values rejected in addition to the unsafe ones.
    pub disallowed_types: Vec<String>,
    /// If set, every `type` attribute must be one of these values.
    pub allowed_types: Option<Vec<String>>,
}

pub type BudgetReportCallback = Rc<std::cell::RefCell<dyn FnMut(BudgetReport) + 'static>>;

impl Options {
    /// Options for documents from a trusted source: `symbol` and `yaml` are accepted.
    pub fn trusted() -> Self {
        Self {
            trusted: true,
            ..Self::default()
        }
    }

    /// Registers a budget-report callback. Any closure can be used, including ones that
    /// capture state from the surrounding scope.
    ///
    /// ```rust
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use xml_mini::Options;
    /// use xml_mini::budget::BudgetReport;
    ///
    /// let nodes = Rc::new(Cell::new(0));
    /// let seen = nodes.clone();
    /// let options = Options::default().with_budget_report(move |report: BudgetReport| {
    ///     seen.set(report.nodes);
    /// });
    /// xml_mini::from_str_with_options("<a><b/><c/></a>", options).unwrap();
    /// assert_eq!(nodes.get(), 3);
    /// ```
    pub fn with_budget_report<F>(mut self, cb: F) -> Self
    where
        F: FnMut(BudgetReport) + 'static,
    {
        self.budget_report_cb = Some(Rc::new(std::cell::RefCell::new(cb)));
        self
    }

    pub(crate) fn report(&self, report: &BudgetReport) {
        if let Some(callback) = self.budget_report {
            callback(report);
        }
        if let Some(callback) = &self.budget_report_cb {
            (callback.borrow_mut())(report.clone());
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            budget: Budget::default(),
            budget_report: None,
            budget_report_cb: None,
            trusted: false,
            disallowed_types: Vec::new(),
            allowed_types: None,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("budget", &self.budget)
            .field("budget_report", &self.budget_report)
            .field("budget_report_cb", &if self.budget_report_cb.is_some() { "set" } else { "none" })
            .field("trusted", &self.trusted)
            .field("disallowed_types", &self.disallowed_types)
            .field("allowed_types", &self.allowed_types)
            .finish()
    }
}
