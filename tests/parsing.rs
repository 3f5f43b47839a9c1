//! Whole-document parsing tests: source text in, expected trees out.

use kdlv1::{KdlDocument, KdlErrorKind, KdlNode, KdlNumber, KdlValue};
use pretty_assertions::assert_eq;

#[test]
fn cargo_style_document() -> miette::Result<()> {
    let doc: KdlDocument = r#"
package {
    name "kdl"
    version "0.0.0"
    description "kat's document language"
    authors "Kat Marchan <kzm@zkat.tech>"
    license-file "LICENSE.md"
    edition "2018"
}
dependencies {
    nom "6.0.1"
    thiserror "1.0.22"
}
"#
    .parse()?;

    assert_eq!(doc.nodes().len(), 2);
    let package = doc.get("package").expect("package node");
    let fields = package.children().expect("package children");
    assert_eq!(fields.get_arg("name"), Some(&"kdl".into()));
    assert_eq!(fields.get_arg("edition"), Some(&"2018".into()));
    assert_eq!(
        fields.get_arg("license-file"),
        Some(&"LICENSE.md".into())
    );
    let deps = doc.get("dependencies").unwrap().children().unwrap();
    assert_eq!(deps.get_arg("nom"), Some(&"6.0.1".into()));
    Ok(())
}

#[test]
fn args_props_and_children() -> miette::Result<()> {
    let doc: KdlDocument = "foo 1 \"two\" key=3 {\n  bar true\n}".parse()?;

    let mut bar = KdlNode::new("bar");
    bar.push(true);
    let mut expected = KdlNode::new("foo");
    expected.push(1);
    expected.push("two");
    expected.insert("key", 3);
    expected.ensure_children().nodes_mut().push(bar);

    assert_eq!(doc.nodes(), &[expected]);
    Ok(())
}

#[test]
fn keywords_and_null() -> miette::Result<()> {
    let doc: KdlDocument = "flags true false null on=true off=null".parse()?;
    let node = doc.get("flags").unwrap();
    assert_eq!(
        node.args(),
        &[true.into(), false.into(), KdlValue::null()]
    );
    assert_eq!(node.get_prop("on"), Some(&true.into()));
    assert_eq!(node.get_prop("off"), Some(&KdlValue::null()));
    Ok(())
}

#[test]
fn numbers_in_every_radix() -> miette::Result<()> {
    let doc: KdlDocument = "n 0x1F 0o17 0b1010 1_000 3.14 -5 1e3".parse()?;
    let args = doc.get("n").unwrap().args();
    let expected: Vec<KdlValue> = vec![
        KdlNumber::parse("0x1F").unwrap().into(),
        KdlNumber::parse("0o17").unwrap().into(),
        KdlNumber::parse("0b1010").unwrap().into(),
        KdlNumber::Base10("1000".into()).into(),
        KdlNumber::Base10("3.14".into()).into(),
        KdlNumber::Base10("-5".into()).into(),
        KdlNumber::Base10("1E3".into()).into(),
    ];
    assert_eq!(args, &expected[..]);
    Ok(())
}

#[test]
fn quoted_and_raw_identifiers() -> miette::Result<()> {
    let doc: KdlDocument = "\"my node\" \"my key\"=1\nr#\"raw name\"# 2".parse()?;
    let first = &doc.nodes()[0];
    assert_eq!(first.name(), "my node");
    assert_eq!(first.get_prop("my key"), Some(&1.into()));
    let second = &doc.nodes()[1];
    assert_eq!(second.name(), "raw name");
    assert_eq!(second.args(), &[2.into()]);
    Ok(())
}

#[test]
fn raw_string_arguments() -> miette::Result<()> {
    let doc: KdlDocument = r####"n r"c:\path" r#"has "quotes" inside"# r##"wild "# stuff"##"####
        .parse()?;
    let args = doc.get("n").unwrap().args();
    assert_eq!(
        args,
        &[
            r"c:\path".into(),
            r#"has "quotes" inside"#.into(),
            r##"wild "# stuff"##.into(),
        ]
    );
    Ok(())
}

#[test]
fn string_escapes() -> miette::Result<()> {
    let doc: KdlDocument = r#"n "line\nbreak\ttab\u{2020}dagger\\slash\"quote""#.parse()?;
    assert_eq!(
        doc.get("n").unwrap().get_arg(0),
        Some(&"line\nbreak\ttab\u{2020}dagger\\slash\"quote".into())
    );
    Ok(())
}

#[test]
fn type_annotations() -> miette::Result<()> {
    let doc: KdlDocument = r#"(config)server (ip)"127.0.0.1" port=(u16)8080"#.parse()?;
    let server = &doc.nodes()[0];
    assert_eq!(server.ty(), Some("config"));
    assert_eq!(
        server.get_arg(0),
        Some(&KdlValue::from("127.0.0.1").with_ty("ip"))
    );
    let port = server.get_prop("port").unwrap();
    assert_eq!(port.ty(), Some("u16"));
    assert_eq!(port.as_number(), Some(KdlNumber::Base10("8080".into())));
    Ok(())
}

#[test]
fn duplicate_properties_rightmost_wins() -> miette::Result<()> {
    let doc: KdlDocument = "n a=1 a=2".parse()?;
    let node = doc.get("n").unwrap();
    assert_eq!(node.props().len(), 1);
    assert_eq!(node.get_prop("a"), Some(&2.into()));
    Ok(())
}

#[test]
fn comments_are_discarded() -> miette::Result<()> {
    let doc: KdlDocument = r#"
// leading comment
a 1 /* inline */ 2 // trailing
/* between
   nodes */
b 3
"#
    .parse()?;
    assert_eq!(
        doc.iter_args("a").collect::<Vec<_>>(),
        vec![&1.into(), &2.into()]
    );
    assert_eq!(doc.get_arg("b"), Some(&3.into()));
    Ok(())
}

#[test]
fn nested_block_comments() -> miette::Result<()> {
    let doc: KdlDocument = "/* outer /* inner */ still outer */ n".parse()?;
    assert_eq!(doc.nodes().len(), 1);
    assert_eq!(doc.nodes()[0].name(), "n");
    Ok(())
}

#[test]
fn line_comment_terminates_node() -> miette::Result<()> {
    let doc: KdlDocument = "a 1 // 2 3\nb 4".parse()?;
    assert_eq!(doc.iter_args("a").collect::<Vec<_>>(), vec![&1.into()]);
    assert_eq!(doc.get_arg("b"), Some(&4.into()));
    Ok(())
}

#[test]
fn line_escapes_continue_a_node() -> miette::Result<()> {
    let doc: KdlDocument = "a 1 \\\n  2 \\ // comment after escape\n  3\nb 4".parse()?;
    assert_eq!(
        doc.iter_args("a").collect::<Vec<_>>(),
        vec![&1.into(), &2.into(), &3.into()]
    );
    assert_eq!(doc.nodes().len(), 2);
    Ok(())
}

#[test]
fn semicolons_separate_nodes() -> miette::Result<()> {
    let doc: KdlDocument = "a 1; b 2; c { d 3; }".parse()?;
    assert_eq!(doc.nodes().len(), 3);
    assert_eq!(
        doc.get("c").unwrap().children().unwrap().get_arg("d"),
        Some(&3.into())
    );
    Ok(())
}

#[test]
fn slashdash_skips_one_item() -> miette::Result<()> {
    // One argument.
    let doc: KdlDocument = "n /- 1 2".parse()?;
    assert_eq!(doc.get("n").unwrap().args(), &[2.into()]);

    // One property.
    let doc: KdlDocument = "n /- a=1 b=2".parse()?;
    let node = doc.get("n").unwrap();
    assert_eq!(node.get_prop("a"), None);
    assert_eq!(node.get_prop("b"), Some(&2.into()));

    // One children block; a later one still attaches.
    let doc: KdlDocument = "n 1 /- { a; } { b; }".parse()?;
    let node = doc.get("n").unwrap();
    assert_eq!(node.args(), &[1.into()]);
    assert_eq!(node.children().unwrap().nodes()[0].name(), "b");

    // A whole node.
    let doc: KdlDocument = "/- a 1\nb 2".parse()?;
    assert_eq!(doc.nodes().len(), 1);
    assert_eq!(doc.get_arg("b"), Some(&2.into()));
    Ok(())
}

#[test]
fn bom_and_exotic_whitespace() -> miette::Result<()> {
    let doc: KdlDocument = "\u{FEFF}a\u{00A0}1\u{2003}2".parse()?;
    assert_eq!(
        doc.iter_args("a").collect::<Vec<_>>(),
        vec![&1.into(), &2.into()]
    );
    Ok(())
}

#[test]
fn crlf_documents() -> miette::Result<()> {
    let doc: KdlDocument = "a 1\r\nb 2\r\n".parse()?;
    assert_eq!(doc.nodes().len(), 2);
    Ok(())
}

#[test]
fn empty_children_are_preserved() -> miette::Result<()> {
    let doc: KdlDocument = "a { }".parse()?;
    let a = doc.get("a").unwrap();
    assert!(a.children().is_some());
    assert!(a.children().unwrap().is_empty());
    Ok(())
}

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_err(input: &str) -> kdlv1::KdlError {
        match input.parse::<KdlDocument>() {
            Ok(doc) => panic!("expected {input:?} to fail, got {doc:?}"),
            Err(e) => e,
        }
    }

    fn parse_err_message(input: &str) -> String {
        parse_err(input).kind.to_string()
    }

    #[test]
    fn messages() {
        assert_eq!(parse_err_message("n foo"), "Arguments may not be bare");
        assert_eq!(parse_err_message("}"), "Unexpected '}' in root document");
        assert_eq!(
            parse_err_message("a {\n b\n"),
            "Got EOF, expected a node or '}'"
        );
        assert_eq!(parse_err_message("a \"unterminated"), "Got EOF, expected '\"'");
        assert_eq!(
            parse_err_message("n r#\"x\"##"),
            "Too many # characters when closing raw string"
        );
        assert_eq!(parse_err_message("n \"\\q\""), "Illegal escape sequence");
        assert_eq!(
            parse_err_message("n /-\n1"),
            "Unexpected skip marker before newline"
        );
        assert_eq!(
            parse_err_message("n /-"),
            "Unexpected skip marker before EOF"
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        for input in [
            "n 1.2.3",
            "n 1.",
            "n 1e",
            "n 0x",
            "n 0x_1",
            "n (t)key=1",
            "n \"\\u{110000}\"",
            "n (unclosed",
            "\"\" 1",
            "/* unterminated\nn 1",
            "n \\ x",
            "a=1",
        ] {
            assert!(
                input.parse::<KdlDocument>().is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn location_snapshot_points_at_the_failure() {
        let err = parse_err("node \"bad");
        assert_eq!(err.location, "Line 1:\nnode \"bad\n---------^");

        let err = parse_err("ok 1\nnope nope\nok 2");
        assert!(err.location.starts_with("Line 2:\n"), "{}", err.location);
        assert!(err.location.contains("nope nope"), "{}", err.location);
    }

    #[test]
    fn io_failures_are_surfaced() {
        struct FailingReader(usize);
        impl std::io::Read for FailingReader {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0 == 0 {
                    Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
                } else {
                    self.0 -= 1;
                    buf[0] = b'a';
                    Ok(1)
                }
            }
        }

        let err = KdlDocument::parse_reader(FailingReader(3)).unwrap_err();
        assert!(matches!(err.kind, KdlErrorKind::Io(..)), "{:?}", err.kind);
    }
}
