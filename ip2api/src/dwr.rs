//! IP2 pages call server-side methods through DWR (Direct Web Remoting).
//! This module builds such calls and picks apart the JavaScript they return.

use crate::constants::endpoints;
use crate::errors::Ip2Error;
use crate::transport::{Page, Transport};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::HashMap;

lazy_static! {
    static ref SCRIPT_SESSION_ID: Regex = Regex::new(r#"_origScriptSessionId\s=\s"(\w+)""#).unwrap();
    static ref ASSIGNMENT: Regex =
        Regex::new(r#"s(\d+)\.(\w+)=("(?:[^"\\]|\\.)*"|[^;]*);"#).unwrap();
    static ref CALLBACK: Regex =
        Regex::new(r#"remoteHandleCallback\('\w+','\w+',"(.*)"\);"#).unwrap();
}

/// An argument of a remote method call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DwrArg {
    Str(String),
    Number(i64),
}

impl DwrArg {
    fn encode(&self) -> String {
        match self {
            DwrArg::Str(s) => format!("string:{}", s),
            DwrArg::Number(n) => format!("number:{}", n),
        }
    }
}

/// A single remote method call.
pub(crate) struct DwrCall<'a> {
    pub endpoint: &'a str,
    /// Path or URL of the page which would make this call in a browser.
    pub page: String,
    pub script: &'a str,
    pub method: &'a str,
    pub args: Vec<DwrArg>,
}

impl DwrCall<'_> {
    pub fn send(&self, transport: &impl Transport, script_session_id: &str) -> Result<Page, Ip2Error> {
        let keys: Vec<String> = (0..self.args.len())
            .map(|i| format!("c0-param{}", i))
            .collect();
        let mut form = vec![
            ("callCount", "1".to_string()),
            ("page", self.page.clone()),
            ("httpSessionId", String::new()),
            ("scriptSessionId", script_session_id.to_string()),
            ("c0-scriptName", self.script.to_string()),
            ("c0-methodName", self.method.to_string()),
            ("c0-id", "0".to_string()),
            ("batchId", "0".to_string()),
        ];
        form.extend(keys.iter().map(|k| k.as_str()).zip(self.args.iter().map(DwrArg::encode)));
        transport.post_dwr(self.endpoint, &form)
    }
}

/// Get the script session ID which has to accompany every call.
pub(crate) fn script_session_id(transport: &impl Transport) -> Result<String, Ip2Error> {
    let page = transport.get(endpoints::DWR_ENGINE, &[])?;
    SCRIPT_SESSION_ID
        .captures(&page.text)
        .map(|c| c[1].to_string())
        .ok_or_else(|| Ip2Error::malformed("the DWR script session ID", page.url))
}

/// A JavaScript object built by a DWR response, e.g. `s0` in
/// `var s0={};s0.id=3;s0.fileName="human.fasta";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DwrObject {
    pub var: u32,
    pub fields: BTreeMap<String, String>,
}

impl DwrObject {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Collect all `sN.field=value;` assignments, grouped by object and in order
/// of first appearance. String values are unquoted.
pub(crate) fn objects(text: &str) -> Vec<DwrObject> {
    let mut order: Vec<DwrObject> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    for cap in ASSIGNMENT.captures_iter(text) {
        let var: u32 = match cap[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let i = *index.entry(var).or_insert_with(|| {
            order.push(DwrObject {
                var,
                fields: BTreeMap::new(),
            });
            order.len() - 1
        });
        order[i]
            .fields
            .insert(cap[2].to_string(), unquote(cap[3].trim()));
    }
    order
}

/// The string given to `remoteHandleCallback`, which is how DWR returns a
/// plain string result.
pub(crate) fn callback_value(text: &str) -> Option<String> {
    CALLBACK.captures(text).map(|c| unescape(&c[1]))
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        unescape(&value[1..value.len() - 1])
    } else {
        value.to_string()
    }
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
