//! HttpFillTransport against a loopback HTTP server

mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use common::{DESCRIPTOR, values_body};
use descriptor_fill::{
    DependentSelectLoader, DescriptorForm, FillRequest, FillTransport, HttpFillTransport,
    HttpMethod, LoadError, LoadOutcome, LoaderConfig, MemoryForm, RequestParams,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Raw request text as received by the server.
type Captured = Arc<Mutex<Vec<String>>>;

/// Serve `status`/`body` to every connection; returns the address and the captured requests.
async fn serve(status: &'static str, body: String) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::default();
    let sink = Arc::clone(&captured);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let request = read_request(&mut socket).await;
            sink.lock().unwrap().push(request);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, captured)
}

/// Read headers plus a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request(addr: SocketAddr, method: HttpMethod) -> FillRequest {
    FillRequest {
        url: format!("http://{addr}/jenkins/descriptor/{DESCRIPTOR}/fillProjectNameItems"),
        method,
        params: RequestParams::new()
            .with("projectName", "my project")
            .with("updateNow", false),
    }
}

/// Loopback requests must not go through a proxy from the environment.
fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn transport() -> HttpFillTransport {
    HttpFillTransport::with_client(client())
}

#[tokio::test]
async fn post_sends_form_encoded_params() {
    let body = values_body(&[("My Project", "my project", true)]);
    let (addr, captured) = serve("200 OK", body.clone()).await;

    let response = require_ok!(transport().send(&request(addr, HttpMethod::Post)).await);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, body);

    let raw = captured.lock().unwrap()[0].clone();
    assert!(
        raw.starts_with(&format!(
            "POST /jenkins/descriptor/{DESCRIPTOR}/fillProjectNameItems HTTP/1.1"
        )),
        "unexpected request line: {raw}"
    );
    assert!(raw.to_ascii_lowercase().contains("application/x-www-form-urlencoded"));
    assert!(raw.ends_with("projectName=my+project&updateNow=false"), "body: {raw}");
}

#[tokio::test]
async fn get_sends_query_string() {
    let (addr, captured) = serve("200 OK", values_body(&[])).await;

    require_ok!(transport().send(&request(addr, HttpMethod::Get)).await);

    let raw = captured.lock().unwrap()[0].clone();
    assert!(
        raw.starts_with(&format!(
            "GET /jenkins/descriptor/{DESCRIPTOR}/fillProjectNameItems?projectName=my+project&updateNow=false HTTP/1.1"
        )),
        "unexpected request line: {raw}"
    );
}

#[tokio::test]
async fn error_status_is_a_response_not_an_error() {
    let (addr, _captured) = serve("500 Internal Server Error", "oops".to_string()).await;

    let response = require_ok!(transport().send(&request(addr, HttpMethod::Post)).await);
    assert_eq!(response.status, 500);
    assert_eq!(response.status_text, "Internal Server Error");
    assert!(!response.is_success());
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = transport().send(&request(addr, HttpMethod::Post)).await;
    assert!(
        matches!(&result, Err(LoadError::Network { .. })),
        "unexpected result: {result:?}"
    );
}

#[tokio::test]
async fn descriptor_form_end_to_end() {
    let (addr, captured) = serve(
        "200 OK",
        values_body(&[("Project One", "p1", false), ("Project Two", "p2", true)]),
    )
    .await;

    let surface = MemoryForm::new();
    let project = surface.new_select("projectName");
    surface.set_field("coverityInstanceUrl", "https://cov.example.com");

    let config = LoaderConfig::new(format!("http://{addr}/jenkins"), DESCRIPTOR);
    let loader = DependentSelectLoader::with_transport(Arc::new(transport()), &config);
    let form = DescriptorForm::with_loader(loader, config, surface.clone());

    let outcome = require_ok!(form.load_projects(false)).outcome().await;
    assert_eq!(
        outcome,
        LoadOutcome::Applied {
            option_count: 2,
            selected: "p2".to_string()
        }
    );
    assert_eq!(require_some!(project.options()).len(), 2);

    let raw = captured.lock().unwrap()[0].clone();
    assert!(raw.contains("coverityInstanceUrl=https%3A%2F%2Fcov.example.com"));
    assert!(raw.contains("updateNow=false"));
}
