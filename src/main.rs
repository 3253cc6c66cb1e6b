#![forbid(unsafe_code)]

use std::process::exit;

use xml_mini::budget::BudgetReport;
use xml_mini::{EncodeOptions, Options, Value, mapping};

const USAGE: &str = "Usage: xml-mini [--trusted] <file.xml>

Decodes the given XML file, prints the budget it used and the document as the
encoder writes it back. Can also be used as an XML validator.

Options:
  --trusted   accept `symbol` and `yaml` type attributes
  -h, --help  print this message";

fn report_budget(report: &BudgetReport) {
    let summary = Value::from(mapping! {
        "nodes" => report.nodes as i64,
        "max_depth" => report.max_depth as i64,
        "entities" => report.entities as i64,
        "expansions" => report.expansions as i64,
        "expansion_bytes" => report.expansion_bytes as i64,
        "max_entity_nesting" => report.max_entity_nesting as i64,
        "breached" => report.breached.as_ref().map(|b| b.to_string()),
    });
    let options = EncodeOptions {
        root: Some("budget-report".into()),
        skip_instruct: true,
        ..EncodeOptions::default()
    };
    match xml_mini::to_string_with_options(&summary, options) {
        Ok(serialized) => println!("Budget report:\n{serialized}"),
        Err(err) => eprintln!("Failed to serialize budget report: {err}"),
    }
}

fn main() {
    let mut path = None;
    let mut trusted = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                exit(0);
            }
            "--trusted" => trusted = true,
            option if option.starts_with('-') => {
                eprintln!("Unknown option: {option}\n{USAGE}");
                exit(1);
            }
            _ if path.is_some() => {
                eprintln!("Unexpected extra argument: {arg}\n{USAGE}");
                exit(1);
            }
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        eprintln!("{USAGE}");
        exit(1);
    };

    let content = match std::fs::read(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let options = Options {
        budget_report: Some(report_budget),
        trusted,
        ..Options::default()
    };

    let value = match xml_mini::from_slice_with_options(&content, options) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{path} invalid:\n{err}");
            exit(3);
        }
    };

    // One entry, the root element.
    let Value::Mapping(document) = value else {
        return;
    };
    for (root, body) in document {
        let options = EncodeOptions {
            root: Some(root),
            ..EncodeOptions::default()
        };
        match xml_mini::to_string_with_options(&body, options) {
            Ok(xml) => println!("{xml}"),
            Err(err) => {
                eprintln!("{path} could not be encoded: {err}");
                exit(3);
            }
        }
    }
}
