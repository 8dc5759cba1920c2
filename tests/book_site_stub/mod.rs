#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const LISTING_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Best Science Fiction</title></head>
  <body>
    <table class="tableList">
      <tr itemscope itemtype="http://schema.org/Book">
        <td>
          <a class="bookTitle" href="/book/show/1.Dune"><span itemprop="name">Dune</span></a>
          <a class="authorName" href="/author/show/58"><span itemprop="name">Frank Herbert</span></a>
          <span class="minirating"><span class="stars"></span> 4.25 avg rating — 1,234 ratings</span>
        </td>
      </tr>
      <tr itemscope itemtype="http://schema.org/Book">
        <td>
          <a class="bookTitle" href="/book/show/2.Hyperion"><span itemprop="name">Hyperion</span></a>
          <a class="authorName" href="/author/show/2"><span itemprop="name">Dan Simmons</span></a>
          <span class="minirating">4.00 avg rating â€” 250,000 ratings</span>
        </td>
      </tr>
      <tr itemscope itemtype="http://schema.org/Book">
        <td>
          <a class="bookTitle" href="/book/show/3.Broken"><span itemprop="name">Broken Detail</span></a>
          <a class="authorName" href="/author/show/3"><span itemprop="name">Nobody</span></a>
          <span class="minirating">3.50 avg rating — 10 ratings</span>
        </td>
      </tr>
      <tr itemscope itemtype="http://schema.org/Book">
        <td>
          <a class="bookTitle" href="/book/show/4.Garbled"><span itemprop="name">Garbled Search</span></a>
          <span class="minirating">2.10 avg rating — 3 ratings</span>
        </td>
      </tr>
      <tr itemscope itemtype="http://schema.org/Book">
        <td><span class="minirating">no ratings yet</span></td>
      </tr>
    </table>
  </body>
</html>
"#;

const DUNE_DETAIL_HTML: &str = r#"<!doctype html>
<html><body>
  <h1 data-testid="bookTitle">Dune</h1>
  <div class="FeaturedDetails">
    <p data-testid="pagesFormat">658 pages, Paperback</p>
    <p data-testid="publicationInfo">First published August 1, 1965</p>
  </div>
</body></html>
"#;

const HYPERION_DETAIL_HTML: &str = r#"<!doctype html>
<html><body>
  <h1 data-testid="bookTitle">Hyperion</h1>
</body></html>
"#;

pub struct BookSiteStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl BookSiteStub {
    /// Serves the listing at `/list`, a volumes search at `/books/v1/volumes`
    /// and detail pages under `/book/show/`.
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start book site stub");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let parsed = url::Url::parse(&format!("http://stub{}", request.url()))
                    .expect("parse request url");
                let path = parsed.path().to_owned();
                let query = parsed
                    .query_pairs()
                    .find(|(key, _)| key == "q")
                    .map(|(_, value)| value.into_owned());

                let log_line = match &query {
                    Some(q) => format!("{path}?q={q}"),
                    None => path.clone(),
                };
                seen.lock().expect("lock request log").push(log_line);

                let (status, body, content_type) = match path.as_str() {
                    "/list" => (200, LISTING_HTML.to_owned(), "text/html; charset=utf-8"),
                    "/books/v1/volumes" => volumes_response(query.as_deref().unwrap_or("")),
                    "/book/show/1.Dune" => (200, DUNE_DETAIL_HTML.to_owned(), "text/html"),
                    "/book/show/2.Hyperion" => (200, HYPERION_DETAIL_HTML.to_owned(), "text/html"),
                    "/book/show/3.Broken" => (500, "internal error".to_owned(), "text/plain"),
                    "/book/show/4.Garbled" => (200, DUNE_DETAIL_HTML.to_owned(), "text/html"),
                    _ => (404, "not found".to_owned(), "text/plain"),
                };

                let mut response =
                    tiny_http::Response::from_string(body).with_status_code(status);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                        .expect("content-type header");
                response.add_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> url::Url {
        url::Url::parse(&format!("{}{path}", self.base_url)).expect("stub url")
    }

    /// Request paths seen so far, with the decoded `q` parameter when present.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for BookSiteStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn volumes_response(query: &str) -> (u16, String, &'static str) {
    let json = "application/json; charset=utf-8";
    match query {
        "intitle:Dune" => (
            200,
            r#"{"kind":"books#volumes","totalItems":2,"items":[
                {"volumeInfo":{"title":"Dune","imageLinks":{"smallThumbnail":"http://books.example/dune-small.jpg","thumbnail":"http://books.example/dune.jpg"}}},
                {"volumeInfo":{"title":"Dune Messiah","imageLinks":{"thumbnail":"http://books.example/messiah.jpg"}}}
            ]}"#
            .to_owned(),
            json,
        ),
        "intitle:Hyperion" => (
            200,
            r#"{"kind":"books#volumes","totalItems":0}"#.to_owned(),
            json,
        ),
        "intitle:Garbled Search" => (200, "<html>rate limited</html>".to_owned(), "text/html"),
        _ => (
            200,
            r#"{"items":[{"volumeInfo":{"imageLinks":{"thumbnail":"http://books.example/other.jpg"}}}]}"#
                .to_owned(),
            json,
        ),
    }
}
