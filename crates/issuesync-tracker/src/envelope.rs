//! SOAP request envelopes (RPC/encoded, as the tracker's Axis service expects).

use issuesync_core::issue::{RemoteComment, RemoteFieldValue};

const SERVICE_NS: &str = "http://soap.rpc.jira.atlassian.com";
const BEANS_NS: &str = "http://beans.soap.rpc.jira.atlassian.com";

/// One positional argument of a SOAP call (`in0`, `in1`, ...).
#[derive(Debug, Clone, Copy)]
pub enum Param<'a> {
    Str(&'a str),
    Int(i64),
    Comment(&'a RemoteComment),
    FieldValues(&'a [RemoteFieldValue]),
}

/// Build the full envelope for `operation` with positional parameters.
pub fn envelope(operation: &str, params: &[Param<'_>]) -> String {
    let mut body = String::new();
    for (index, param) in params.iter().enumerate() {
        write_param(&mut body, &format!("in{}", index), param);
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
            r#"xmlns:soapenc="http://schemas.xmlsoap.org/soap/encoding/" "#,
            r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
            r#"xmlns:jira="{service}" xmlns:beans="{beans}">"#,
            r#"<soapenv:Body>"#,
            r#"<jira:{op} soapenv:encodingStyle="http://schemas.xmlsoap.org/soap/encoding/">"#,
            "{body}",
            r#"</jira:{op}>"#,
            r#"</soapenv:Body>"#,
            r#"</soapenv:Envelope>"#,
        ),
        service = SERVICE_NS,
        beans = BEANS_NS,
        op = operation,
        body = body,
    )
}

fn write_param(out: &mut String, name: &str, param: &Param<'_>) {
    match param {
        Param::Str(value) => {
            out.push_str(&format!(
                r#"<{name} xsi:type="xsd:string">{}</{name}>"#,
                escape(value)
            ));
        }
        Param::Int(value) => {
            out.push_str(&format!(r#"<{name} xsi:type="xsd:int">{value}</{name}>"#));
        }
        Param::Comment(comment) => {
            out.push_str(&format!(
                r#"<{name} xsi:type="beans:RemoteComment"><body xsi:type="xsd:string">{}</body></{name}>"#,
                escape(&comment.body)
            ));
        }
        Param::FieldValues(fields) => {
            out.push_str(&format!(
                r#"<{name} xsi:type="soapenc:Array" soapenc:arrayType="beans:RemoteFieldValue[{}]">"#,
                fields.len()
            ));
            for field in fields.iter() {
                out.push_str(&format!(
                    r#"<item xsi:type="beans:RemoteFieldValue"><id xsi:type="xsd:string">{}</id>"#,
                    escape(&field.id)
                ));
                out.push_str(&format!(
                    r#"<values xsi:type="soapenc:Array" soapenc:arrayType="xsd:string[{}]">"#,
                    field.values.len()
                ));
                for value in &field.values {
                    out.push_str(&format!(
                        r#"<item xsi:type="xsd:string">{}</item>"#,
                        escape(value)
                    ));
                }
                out.push_str("</values></item>");
            }
            out.push_str(&format!("</{name}>"));
        }
    }
}

/// Escape text for use inside an XML element.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
