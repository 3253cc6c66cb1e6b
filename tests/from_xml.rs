use chrono::{NaiveDate, TimeZone, Utc};
use indoc::indoc;
use rust_decimal::Decimal;
use std::str::FromStr;
use xml_mini::{FileRef, Mapping, Value, from_str, mapping};

fn record(xml: &str, root: &str) -> Value {
    let document = from_str(xml).expect("document decodes");
    document[root].clone()
}

#[test]
fn single_record_with_types() {
    let topic = record(
        indoc! {r#"
            <topic>
              <title>The First Topic</title>
              <author-name>David</author-name>
              <id type="integer">1</id>
              <approved type="boolean"> true </approved>
              <replies-count type="integer">0</replies-count>
              <replies-close-in type="integer">2592000000</replies-close-in>
              <written-on type="date">2003-07-16</written-on>
              <viewed-at type="datetime">2003-07-16T09:28:00+0000</viewed-at>
              <author-email-address>david@loudthinking.com</author-email-address>
              <parent-id></parent-id>
              <ad-revenue type="decimal">1.5</ad-revenue>
              <optimum-viewing-angle type="float">135</optimum-viewing-angle>
            </topic>
        "#},
        "topic",
    );

    let expected = Value::from(mapping! {
        "title" => "The First Topic",
        "author_name" => "David",
        "id" => 1i64,
        "approved" => true,
        "replies_count" => 0i64,
        "replies_close_in" => 2_592_000_000i64,
        "written_on" => NaiveDate::from_ymd_opt(2003, 7, 16).unwrap(),
        "viewed_at" => Utc.with_ymd_and_hms(2003, 7, 16, 9, 28, 0).unwrap(),
        "author_email_address" => "david@loudthinking.com",
        "parent_id" => Value::Null,
        "ad_revenue" => Decimal::from_str("1.50").unwrap(),
        "optimum_viewing_angle" => 135.0,
    });
    assert_eq!(topic, expected);
}

#[test]
fn single_record_with_nil_values() {
    let topic = record(
        indoc! {r#"
            <topic>
              <title></title>
              <id type="integer"></id>
              <approved type="boolean"></approved>
              <written-on type="date"></written-on>
              <viewed-at type="datetime"></viewed-at>
              <parent-id></parent-id>
            </topic>
        "#},
        "topic",
    );
    let mapping = topic.as_mapping().unwrap();
    assert_eq!(mapping.len(), 6);
    assert!(mapping.values().all(Value::is_null), "{topic:?}");
}

#[test]
fn multiple_records_with_extra_attributes() {
    let topics = record(
        indoc! {r#"
            <topics type="array" page="1" page-count="1000" per-page="2">
              <topic>
                <title>The First Topic</title>
                <id type="integer">1</id>
                <parent-id nil="true"></parent-id>
              </topic>
              <topic>
                <title>The Second Topic</title>
                <id type="integer">2</id>
                <parent-id></parent-id>
              </topic>
            </topics>
        "#},
        "topics",
    );
    let topics = topics.as_sequence().unwrap();
    assert_eq!(topics.len(), 2);
    assert_eq!(
        topics[0],
        Value::from(mapping! {
            "title" => "The First Topic",
            "id" => 1i64,
            "parent_id" => Value::Null,
        })
    );
    assert_eq!(topics[1]["title"], Value::from("The Second Topic"));
}

#[test]
fn attributes_other_than_type() {
    let rsp = record(
        indoc! {r#"
            <rsp stat="ok">
              <photos page="1" pages="1" perpage="100" total="16">
                <photo id="175756086" owner="55569174@N00" secret="0279bf37a1" server="76" title="Colored Pencil PhotoBooth Fun" ispublic="1" isfriend="0" isfamily="0"/>
              </photos>
            </rsp>
        "#},
        "rsp",
    );
    assert_eq!(rsp["stat"], Value::from("ok"));
    assert_eq!(rsp["photos"]["total"], Value::from("16"));
    assert_eq!(
        rsp["photos"]["photo"],
        Value::from(mapping! {
            "id" => "175756086",
            "owner" => "55569174@N00",
            "secret" => "0279bf37a1",
            "server" => "76",
            "title" => "Colored Pencil PhotoBooth Fun",
            "ispublic" => "1",
            "isfriend" => "0",
            "isfamily" => "0",
        })
    );
}

#[test]
fn all_caps_keys_are_kept() {
    let value = from_str(indoc! {"
        <ABC3XYZ>
          <TEST>Lorem Ipsum</TEST>
        </ABC3XYZ>
    "})
    .unwrap();
    assert_eq!(
        value,
        Value::from(mapping! { "ABC3XYZ" => mapping! { "TEST" => "Lorem Ipsum" } })
    );
}

#[test]
fn arrays() {
    let empty = from_str(r#"<blog><posts type="array"></posts></blog>"#).unwrap();
    assert_eq!(
        empty,
        Value::from(mapping! { "blog" => mapping! { "posts" => Value::Sequence(vec![]) } })
    );

    let whitespace = from_str(indoc! {r#"
        <blog>
          <posts type="array">
          </posts>
        </blog>
    "#})
    .unwrap();
    assert_eq!(whitespace, empty);

    let one = record(
        r#"<blog><posts type="array"><post>a post</post></posts></blog>"#,
        "blog",
    );
    assert_eq!(one["posts"], Value::from(vec!["a post"]));

    let two = record(
        indoc! {r#"
            <blog>
              <posts type="array">
                <post>a post</post>
                <post>another post</post>
              </posts>
            </blog>
        "#},
        "blog",
    );
    assert_eq!(two["posts"], Value::from(vec!["a post", "another post"]));
}

#[test]
fn files() {
    let logo = record(
        indoc! {r#"
            <blog>
              <logo type="file" name="logo.png" content_type="image/png">
              </logo>
            </blog>
        "#},
        "blog",
    );
    match &logo["logo"] {
        Value::File(file) => {
            assert_eq!(file.filename, "logo.png");
            assert_eq!(file.content_type, "image/png");
            assert!(file.content.is_empty());
        }
        other => panic!("expected a file, got {other:?}"),
    }

    let defaults = record(r#"<blog><logo type="file">aGk=</logo></blog>"#, "blog");
    assert_eq!(
        defaults["logo"],
        Value::File(FileRef::new(
            FileRef::DEFAULT_FILENAME,
            FileRef::DEFAULT_CONTENT_TYPE,
            b"hi".to_vec()
        ))
    );
}

#[test]
fn tag_with_attributes_and_whitespace() {
    let blog = record(
        indoc! {r#"
            <blog name="bacon is the best">
            </blog>
        "#},
        "blog",
    );
    assert_eq!(blog["name"], Value::from("bacon is the best"));
}

#[test]
fn empty_cdata_is_an_empty_string() {
    assert_eq!(from_str("<data><![CDATA[]]></data>").unwrap()["data"], Value::from(""));
    assert!(from_str("<data></data>").unwrap()["data"].is_null());
}

#[test]
fn xsd_like_types() {
    let bacon = record(
        indoc! {r#"
            <bacon>
              <weight type="double">0.5</weight>
              <price type="decimal">12.50</price>
              <chunky type="boolean"> 1 </chunky>
              <expires-at type="dateTime">2007-12-25T12:34:56+0000</expires-at>
              <notes type="string"></notes>
              <illustration type="base64Binary">YmFiZS5wbmc=</illustration>
              <caption type="binary" encoding="base64">VGhhdCdsbCBkbywgcGlnLg==</caption>
            </bacon>
        "#},
        "bacon",
    );
    let expected = Value::from(mapping! {
        "weight" => 0.5,
        "price" => Decimal::from_str("12.50").unwrap(),
        "chunky" => true,
        "expires_at" => Utc.with_ymd_and_hms(2007, 12, 25, 12, 34, 56).unwrap(),
        "notes" => "",
        "illustration" => Value::Binary(b"babe.png".to_vec()),
        "caption" => Value::Binary(b"That'll do, pig.".to_vec()),
    });
    assert_eq!(bacon, expected);
}

#[test]
fn unknown_type_trickles_through() {
    let product = record(
        indoc! {r#"
            <product>
              <weight type="double">0.5</weight>
              <image type="ProductImage"><filename>image.gif</filename></image>

            </product>
        "#},
        "product",
    );
    assert_eq!(
        product,
        Value::from(mapping! {
            "weight" => 0.5,
            "image" => mapping! { "type" => "ProductImage", "filename" => "image.gif" },
        })
    );
}

#[test]
fn unknown_type_on_a_leaf_is_plain_text() {
    let value = record(r#"<a><b type="money">12 EUR</b></a>"#, "a");
    assert_eq!(value["b"], Value::from("12 EUR"));
}

#[test]
fn datetimes_are_normalized_to_utc() {
    let alert = record(
        indoc! {r#"
            <alert>
              <utc type="datetime">2008-02-10T15:30:45Z</utc>
              <eastern type="datetime">2008-02-10T10:30:45-05:00</eastern>
              <future type="datetime">2050-02-10T15:30:45Z</future>
            </alert>
        "#},
        "alert",
    );
    let expected = Utc.with_ymd_and_hms(2008, 2, 10, 15, 30, 45).unwrap();
    assert_eq!(alert["utc"], Value::DateTime(expected));
    assert_eq!(alert["eastern"], Value::DateTime(expected));
    assert_eq!(
        alert["future"],
        Value::DateTime(Utc.with_ymd_and_hms(2050, 2, 10, 15, 30, 45).unwrap())
    );
}

#[test]
fn escaped_text_is_unescaped_once() {
    let person = record(
        "<person><bare-string>First &amp; Last Name</bare-string><pre-escaped-string>First &amp;amp; Last Name</pre-escaped-string></person>",
        "person",
    );
    assert_eq!(
        person,
        Value::from(mapping! {
            "bare_string" => "First & Last Name",
            "pre_escaped_string" => "First &amp; Last Name",
        })
    );
}

#[test]
fn empty_documents_are_empty_mappings() {
    assert_eq!(from_str("").unwrap(), Value::Mapping(Mapping::new()));
    assert_eq!(from_str("\n   \t").unwrap(), Value::Mapping(Mapping::new()));
    assert_eq!(
        from_str(r#"<?xml version="1.0"?>"#).unwrap(),
        Value::Mapping(Mapping::new())
    );
}

#[test]
fn malformed_markup_is_a_syntax_error() {
    let err = from_str("<a>\n  <b>\n</a>").unwrap_err();
    assert!(matches!(err, xml_mini::Error::Syntax { .. }), "{err}");
    let location = err.location().expect("syntax errors carry a location");
    assert!(location.line() >= 2, "{location:?}");
}

#[test]
fn coercion_failures_are_reported() {
    let err = from_str(r#"<a><n type="integer">12abc</n></a>"#).unwrap_err();
    match err {
        xml_mini::Error::Coercion {
            type_name,
            text,
            node,
        } => {
            assert_eq!(type_name, "integer");
            assert_eq!(text, "12abc");
            assert_eq!(node, "n");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn decoded_values_serialize_to_json() {
    let value = from_str(indoc! {r#"
        <user>
          <name>Ada</name>
          <age type="integer">36</age>
          <born type="date">1815-12-10</born>
          <tags type="array"><tag>math</tag><tag>poetry</tag></tags>
          <note nil="true"/>
        </user>
    "#})
    .unwrap();
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "user": {
                "name": "Ada",
                "age": 36,
                "born": "1815-12-10",
                "tags": ["math", "poetry"],
                "note": null
            }
        })
    );
}
