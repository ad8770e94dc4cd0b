//! In-process tracker stub for tests.

use crate::envelope::escape;
use crate::response::field;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use regex::Regex;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const ROOT_PAGE: &str =
    "<html><head><title>System Dashboard - Atlassian JIRA</title></head></html>";

pub const WSDL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wsdl:definitions targetNamespace="http://soap.rpc.jira.atlassian.com" xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/"></wsdl:definitions>"#;

#[derive(Clone)]
struct StubState {
    calls: Arc<Mutex<Vec<String>>>,
    comments: Arc<Mutex<Vec<String>>>,
    root_page: Arc<String>,
    wsdl: Arc<String>,
}

pub struct StubTracker {
    addr: SocketAddr,
    state: StubState,
}

impl StubTracker {
    pub async fn start() -> Self {
        Self::start_with(ROOT_PAGE, WSDL).await
    }

    pub async fn start_with(root_page: &str, wsdl: &str) -> Self {
        let state = StubState {
            calls: Arc::new(Mutex::new(Vec::new())),
            comments: Arc::new(Mutex::new(vec!["Earlier note".to_string()])),
            root_page: Arc::new(root_page.to_string()),
            wsdl: Arc::new(wsdl.to_string()),
        };

        let app = Router::new()
            .route("/", get(root))
            .route("/rpc/soap/jirasoapservice-v2", get(wsdl_doc).post(soap))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }
}

/// URL of a local port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn root(State(state): State<StubState>) -> String {
    state.root_page.as_str().to_string()
}

async fn wsdl_doc(State(state): State<StubState>) -> String {
    state.wsdl.as_str().to_string()
}

async fn soap(State(state): State<StubState>, body: String) -> (StatusCode, String) {
    let op_re = Regex::new(r"<jira:(\w+)").unwrap();
    let operation = op_re
        .captures(&body)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    state.calls.lock().unwrap().push(operation.clone());

    match operation.as_str() {
        "login" => {
            if body.contains(r#"<in0 xsi:type="xsd:string">bot</in0>"#)
                && body.contains(r#"<in1 xsi:type="xsd:string">pw</in1>"#)
            {
                ok("<ns1:loginResponse><loginReturn xsi:type=\"xsd:string\">stub-token</loginReturn></ns1:loginResponse>")
            } else {
                fault("com.atlassian.jira.rpc.exception.RemoteAuthenticationException: Invalid username or password.")
            }
        }
        "getIssuesFromJqlSearch" => ok(concat!(
            "<ns1:getIssuesFromJqlSearchResponse><getIssuesFromJqlSearchReturn soapenc:arrayType=\"ns2:RemoteIssue[1]\">",
            "<getIssuesFromJqlSearchReturn href=\"#id0\"/></getIssuesFromJqlSearchReturn></ns1:getIssuesFromJqlSearchResponse>",
            "<multiRef id=\"id0\"><key xsi:type=\"xsd:string\">PROJ-12</key><status xsi:type=\"xsd:string\">1</status></multiRef>",
        )),
        "getComments" => {
            let comments = state.comments.lock().unwrap().clone();
            let mut inner = String::from("<ns1:getCommentsResponse><getCommentsReturn>");
            for text in comments {
                inner.push_str(&format!(
                    "<getCommentsReturn><author>bot</author><body>{}</body></getCommentsReturn>",
                    escape(&text)
                ));
            }
            inner.push_str("</getCommentsReturn></ns1:getCommentsResponse>");
            ok(&inner)
        }
        "addComment" => {
            if let Some(text) = field(&body, "body") {
                state.comments.lock().unwrap().push(text);
            }
            ok("<ns1:addCommentResponse/>")
        }
        "getAvailableActions" => ok(concat!(
            "<ns1:getAvailableActionsResponse><getAvailableActionsReturn href=\"#id0\"/></ns1:getAvailableActionsResponse>",
            "<multiRef id=\"id0\"><id xsi:type=\"xsd:string\">5</id><name xsi:type=\"xsd:string\">Resolve Issue</name></multiRef>",
        )),
        "progressWorkflowAction" => ok("<ns1:progressWorkflowActionResponse/>"),
        _ => fault("No such operation"),
    }
}

fn wrap(inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\"><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>",
        inner
    )
}

fn ok(inner: &str) -> (StatusCode, String) {
    (StatusCode::OK, wrap(inner))
}

fn fault(message: &str) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        wrap(&format!(
            "<soapenv:Fault><faultcode>soapenv:Server.userException</faultcode><faultstring>{}</faultstring></soapenv:Fault>",
            escape(message)
        )),
    )
}
