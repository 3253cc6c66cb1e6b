//! Per-decode resource budget.
//!
//! One [`BudgetEnforcer`] is created at the start of every decode call and dropped at its
//! end. The backend charges it while tokenizing (elements, entity expansions) and the
//! converter charges it for YAML alias replay in trusted mode. The first counter that goes
//! past its ceiling aborts the decode with [`crate::Error::ExpansionLimitExceeded`], no
//! matter how much of the document is left.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Limits enforced while decoding one document.
///
/// The defaults block nested entity amplification ("billion laughs") long before it
/// costs noticeable memory, while staying out of the way of ordinary documents.
///
/// ```rust
/// let options = xml_mini::options! {
///     budget: xml_mini::budget! {
///         max_entity_expansions: 100,
///     },
/// };
///
/// let xml = r#"<!DOCTYPE note [<!ENTITY who "World">]><note>Hello &who;</note>"#;
/// let value = xml_mini::from_str_with_options(xml, options).unwrap();
/// assert_eq!(value["note"], xml_mini::Value::from("Hello World"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum number of entity references expanded (declared entities only;
    /// predefined entities and character references are free).
    ///
    /// Default: 10,000
    pub max_entity_expansions: usize,
    /// Maximum number of bytes produced by entity expansion.
    ///
    /// Default: 1,048,576 (1 MiB)
    pub max_expansion_bytes: usize,
    /// Maximum depth of entity references nested inside entity values.
    ///
    /// Default: 64
    pub max_entity_nesting: usize,
    /// Maximum element nesting depth.
    ///
    /// Default: 1,000
    pub max_depth: usize,
    /// Maximum number of elements in the document.
    ///
    /// Default: 1,000,000
    pub max_nodes: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_entity_expansions: 10_000,
            max_expansion_bytes: 1024 * 1024,
            max_entity_nesting: 64,
            max_depth: 1_000, // the converter recurses once per level
            max_nodes: 1_000_000,
        }
    }
}

/// What tripped the budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BudgetBreach {
    /// More entity expansions than [`Budget::max_entity_expansions`].
    EntityExpansions {
        /// Expansions counted at the moment of the breach.
        expansions: usize,
    },
    /// Expanded text larger than [`Budget::max_expansion_bytes`].
    ExpansionBytes {
        /// Bytes produced by expansions at the moment of the breach.
        bytes: usize,
    },
    /// Entity references nested deeper than [`Budget::max_entity_nesting`].
    EntityNesting {
        /// Nesting depth reached.
        depth: usize,
    },
    /// Elements nested deeper than [`Budget::max_depth`].
    Depth {
        /// Element depth reached.
        depth: usize,
    },
    /// More elements than [`Budget::max_nodes`].
    Nodes {
        /// Elements counted at the moment of the breach.
        nodes: usize,
    },
}

impl fmt::Display for BudgetBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetBreach::EntityExpansions { expansions } => {
                write!(f, "{expansions} entity expansions")
            }
            BudgetBreach::ExpansionBytes { bytes } => {
                write!(f, "{bytes} bytes of expanded entity text")
            }
            BudgetBreach::EntityNesting { depth } => {
                write!(f, "entity references nested {depth} deep")
            }
            BudgetBreach::Depth { depth } => write!(f, "elements nested {depth} deep"),
            BudgetBreach::Nodes { nodes } => write!(f, "{nodes} elements"),
        }
    }
}

/// Summary of one decode call (even if no breach).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BudgetReport {
    /// `Some(..)` if a limit was exceeded.
    #[serde(skip)]
    pub breached: Option<BudgetBreach>,
    /// Entity references expanded.
    pub expansions: usize,
    /// Bytes produced by entity expansion.
    pub expansion_bytes: usize,
    /// Deepest entity nesting seen.
    pub max_entity_nesting: usize,
    /// Entities declared in the internal DTD subset.
    pub entities: usize,
    /// Elements seen.
    pub nodes: usize,
    /// Deepest element nesting seen.
    pub max_depth: usize,
}

/// Stateful counter that enforces a [`Budget`] for one decode call.
#[derive(Debug)]
pub struct BudgetEnforcer {
    budget: Budget,
    report: BudgetReport,
    depth: usize,
}

impl BudgetEnforcer {
    /// Create a new enforcer for the provided `budget`.
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            report: BudgetReport::default(),
            depth: 0,
        }
    }

    /// Record the start of an element.
    pub fn enter_element(&mut self) -> Result<(), BudgetBreach> {
        self.report.nodes += 1;
        if self.report.nodes > self.budget.max_nodes {
            return self.breach(BudgetBreach::Nodes {
                nodes: self.report.nodes,
            });
        }
        self.depth += 1;
        if self.depth > self.report.max_depth {
            self.report.max_depth = self.depth;
        }
        if self.depth > self.budget.max_depth {
            return self.breach(BudgetBreach::Depth { depth: self.depth });
        }
        Ok(())
    }

    /// Record the end of an element.
    pub fn leave_element(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Record an entity declaration.
    pub fn declare_entity(&mut self) {
        self.report.entities += 1;
    }

    /// Charge one reference expansion producing `bytes` of replacement text at the given
    /// nesting level (1 for a reference written directly in the document).
    pub fn expand_reference(&mut self, bytes: usize, nesting: usize) -> Result<(), BudgetBreach> {
        self.report.expansions += 1;
        if self.report.expansions > self.budget.max_entity_expansions {
            return self.breach(BudgetBreach::EntityExpansions {
                expansions: self.report.expansions,
            });
        }
        self.report.expansion_bytes = self.report.expansion_bytes.saturating_add(bytes);
        if self.report.expansion_bytes > self.budget.max_expansion_bytes {
            return self.breach(BudgetBreach::ExpansionBytes {
                bytes: self.report.expansion_bytes,
            });
        }
        if nesting > self.report.max_entity_nesting {
            self.report.max_entity_nesting = nesting;
        }
        if nesting > self.budget.max_entity_nesting {
            return self.breach(BudgetBreach::EntityNesting { depth: nesting });
        }
        Ok(())
    }

    fn breach(&mut self, breach: BudgetBreach) -> Result<(), BudgetBreach> {
        self.report.breached = Some(breach.clone());
        Err(breach)
    }

    /// Counters accumulated so far.
    pub fn report(&self) -> &BudgetReport {
        &self.report
    }

    /// Consume the enforcer and return the accumulated [`BudgetReport`].
    pub fn into_report(self) -> BudgetReport {
        self.report
    }
}
